use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use super::now_timestamp;

/// A user profile as shown on the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub subscription_status: String,
    pub created_at: String,
}

impl Profile {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }
}

pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Profile>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, email, subscription_status, created_at FROM profiles ORDER BY created_at, email",
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<Profile>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, email, subscription_status, created_at FROM profiles WHERE LOWER(email) = LOWER(?)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    /// Adds a profile with a fresh id. Fails if the email is taken.
    pub async fn add(
        &self,
        email: &str,
        subscription_status: &str,
    ) -> Result<Profile, sqlx::Error> {
        let profile = Profile {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            subscription_status: subscription_status.to_string(),
            created_at: now_timestamp(),
        };

        sqlx::query(
            "INSERT INTO profiles (id, email, subscription_status, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&profile.id)
        .bind(&profile.email)
        .bind(&profile.subscription_status)
        .bind(&profile.created_at)
        .execute(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Returns false when no profile has this email.
    pub async fn set_status(
        &self,
        email: &str,
        subscription_status: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE profiles SET subscription_status = ? WHERE LOWER(email) = LOWER(?)",
        )
        .bind(subscription_status)
        .bind(email)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns false when no profile has this email.
    pub async fn remove(&self, email: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM profiles WHERE LOWER(email) = LOWER(?)")
            .bind(email)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

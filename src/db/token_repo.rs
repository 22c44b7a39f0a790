//! Admin access tokens.
//!
//! Only the SHA-256 hash of a token is stored. The plain token is shown once
//! when it is created.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use super::now_timestamp;

/// A stored token, without the secret.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AdminToken {
    pub token_hash: String,
    pub label: String,
    pub created_at: String,
}

/// Generates a secure random token.
///
/// Returns 32 random bytes encoded as base64url (no padding).
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Lowercase hex SHA-256 of the token.
pub fn hash_token(token: &str) -> String {
    Sha256::digest(token.as_bytes())
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

pub struct TokenRepository {
    pool: SqlitePool,
}

impl TokenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a token and returns the plain value.
    pub async fn create(&self, label: &str) -> Result<String, sqlx::Error> {
        let token = generate_token();
        sqlx::query("INSERT INTO admin_tokens (token_hash, label, created_at) VALUES (?, ?, ?)")
            .bind(hash_token(&token))
            .bind(label)
            .bind(now_timestamp())
            .execute(&self.pool)
            .await?;
        Ok(token)
    }

    pub async fn list(&self) -> Result<Vec<AdminToken>, sqlx::Error> {
        sqlx::query_as("SELECT token_hash, label, created_at FROM admin_tokens ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
    }

    /// Revokes every token with this label. Returns how many were removed.
    pub async fn revoke(&self, label: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM admin_tokens WHERE label = ?")
            .bind(label)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Returns the token's label if the token is known.
    pub async fn verify(&self, token: &str) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT label FROM admin_tokens WHERE token_hash = ?")
            .bind(hash_token(token))
            .fetch_optional(&self.pool)
            .await
    }
}

//! HTTP API: image generation proxy, manual read endpoints and the admin
//! profile listing.
//!
//! # Endpoints
//!
//! - `GET /health`: Health check
//! - `POST /generate-image`: `{prompt, provider}` → `{image}`
//! - `GET /api/manuals/{id}`: stored layout as JSON
//! - `GET /api/manuals/{id}/preview`: book spreads of a stored layout
//! - `GET /.netlify/functions/admin`: profile rows (admin token required)

pub mod auth;
mod config;
mod error;

pub use config::{default_database_path, ServerConfig, DEFAULT_PORT};
pub use error::{ApiError, ErrorBody};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use neomanual_core::model::ManualLayout;
use neomanual_core::preview::{self, SpreadView};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::{ManualRepository, Profile, ProfileRepository, TokenRepository};
use crate::imagegen::ImageGenerator;
use auth::Credentials;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<ImageGenerator>,
    pub manuals: Arc<ManualRepository>,
    pub profiles: Arc<ProfileRepository>,
    pub tokens: Arc<TokenRepository>,
}

impl AppState {
    pub fn new(pool: SqlitePool, generator: ImageGenerator) -> Self {
        Self {
            generator: Arc::new(generator),
            manuals: Arc::new(ManualRepository::new(pool.clone())),
            profiles: Arc::new(ProfileRepository::new(pool.clone())),
            tokens: Arc::new(TokenRepository::new(pool)),
        }
    }
}

/// Builds the application router.
///
/// With an allowed origin, CORS admits only that origin (with credentials).
/// Without one, any origin is admitted.
pub fn router(state: AppState, allowed_origin: Option<&str>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/generate-image", post(generate_image))
        .route("/api/manuals/{id}", get(get_manual))
        .route("/api/manuals/{id}/preview", get(manual_preview))
        .route("/.netlify/functions/admin", get(admin_profiles))
        .with_state(state)
        .layer(cors_layer(allowed_origin))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let Some(origin) = allowed_origin else {
        return CorsLayer::permissive();
    };
    match HeaderValue::from_str(origin.trim_end_matches('/')) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        Err(_) => {
            tracing::warn!(origin, "Invalid allowed origin, rejecting cross-origin requests");
            CorsLayer::new()
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateImageRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateImageResponse {
    pub image: String,
}

async fn generate_image(
    State(state): State<AppState>,
    request: Result<Json<GenerateImageRequest>, JsonRejection>,
) -> Result<Json<GenerateImageResponse>, ApiError> {
    let Json(request) = request?;
    let image = state
        .generator
        .generate(request.provider.as_deref(), &request.prompt)
        .await?;
    Ok(Json(GenerateImageResponse { image }))
}

async fn get_manual(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ManualLayout>, ApiError> {
    state
        .manuals
        .fetch_layout(&id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Manual not found"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub id: String,
    pub title: Option<String>,
    pub page_count: usize,
    pub spreads: Vec<SpreadView>,
}

async fn manual_preview(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let layout = state
        .manuals
        .fetch_layout(&id)
        .await?
        .ok_or(ApiError::NotFound("Manual not found"))?;

    Ok(Json(PreviewResponse {
        title: layout.display_title().map(str::to_string),
        page_count: layout.pages.len(),
        spreads: preview::spreads(&layout),
        id: layout.id,
    }))
}

async fn admin_profiles(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Profile>>, ApiError> {
    let token = match auth::credentials(&headers) {
        Credentials::Missing => return Err(ApiError::Unauthorized("No token provided")),
        Credentials::Malformed => return Err(ApiError::Forbidden("Invalid token")),
        Credentials::Token(token) => token,
    };

    let label = state
        .tokens
        .verify(&token)
        .await?
        .ok_or(ApiError::Forbidden("Invalid token"))?;
    tracing::info!(token = %label, "Admin profile listing");

    Ok(Json(state.profiles.list().await?))
}

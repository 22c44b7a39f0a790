//! neomanual server
//!
//! Proxies image generation requests to third-party providers and serves
//! saved manuals.
//!
//! # Configuration
//!
//! Environment variables:
//! - `NEOMANUAL_PORT`: Port to listen on (default: 3001)
//! - `NEOMANUAL_DATABASE_PATH`: SQLite database (default: ~/.local/share/neomanual/neomanual.db)
//! - `NEOMANUAL_ALLOWED_ORIGIN`: Origin allowed by CORS (default: any)
//! - `STABILITY_API_KEY`, `OPENAI_API_KEY`, `DEEPAI_API_KEY`, `REPLICATE_API_TOKEN`:
//!   provider credentials; a provider without one answers 403
//!
//! # Endpoints
//!
//! - `GET /health`: Health check endpoint
//! - `POST /generate-image`: Generate an image from a prompt
//! - `GET /api/manuals/{id}`: Manual layout
//! - `GET /api/manuals/{id}/preview`: Manual book spreads
//! - `GET /.netlify/functions/admin`: Profile listing (admin token required)

use neomanual::db::init_db;
use neomanual::imagegen::ImageGenerator;
use neomanual::server::{router, AppState, ServerConfig};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neomanual=info,neomanual_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    tracing::info!("Database: {}", config.database_path.display());
    match &config.allowed_origin {
        Some(origin) => tracing::info!("Allowed origin: {}", origin),
        None => tracing::warn!("NEOMANUAL_ALLOWED_ORIGIN not set, allowing any origin"),
    }

    let configured = config.imagegen.configured();
    if configured.is_empty() {
        tracing::warn!("No image provider credentials set - image generation will fail");
    } else {
        let names: Vec<&str> = configured.iter().map(|p| p.name()).collect();
        tracing::info!("Image providers: {}", names.join(", "));
    }

    let pool = match init_db(&config.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::new(pool, ImageGenerator::new(config.imagegen.clone()));
    let app = router(state, config.allowed_origin.as_deref());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

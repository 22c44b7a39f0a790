use std::path::PathBuf;

use crate::imagegen::ImageGenConfig;

pub const DEFAULT_PORT: u16 = 3001;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// SQLite database holding manuals, profiles and admin tokens
    pub database_path: PathBuf,
    /// Origin allowed by CORS; any origin when unset
    pub allowed_origin: Option<String>,
    pub imagegen: ImageGenConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let port = std::env::var("NEOMANUAL_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let database_path = std::env::var("NEOMANUAL_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_database_path());

        let allowed_origin = std::env::var("NEOMANUAL_ALLOWED_ORIGIN")
            .ok()
            .filter(|origin| !origin.trim().is_empty());

        Self {
            port,
            database_path,
            allowed_origin,
            imagegen: ImageGenConfig::from_env(),
        }
    }
}

/// Database shared by the CLI and the server:
/// `<data_dir>/neomanual/neomanual.db`.
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("neomanual")
        .join("neomanual.db")
}

use neomanual_core::editor::DEFAULT_GRID_SIZE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_IMAGE_SERVER_URL: &str = "http://localhost:3001";

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Signed-in user, written by `auth login`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    pub user_id: Option<String>,
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// SQLite database holding saved manuals
    pub database_path: ConfigValue<PathBuf>,
    /// Editor state kept between invocations
    pub draft_path: ConfigValue<PathBuf>,
    /// Image generation server
    pub image_server_url: ConfigValue<String>,
    pub grid_size: ConfigValue<f64>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    pub session: SessionConfig,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    database_path: Option<PathBuf>,
    draft_path: Option<PathBuf>,
    image_server_url: Option<String>,
    grid_size: Option<f64>,
    session: Option<SessionConfig>,
}

/// Relative paths in the config file are relative to the file itself.
fn resolve(config_path: &std::path::Path, path: PathBuf) -> PathBuf {
    if path.is_relative() {
        config_path.parent().map(|p| p.join(&path)).unwrap_or(path)
    } else {
        path
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut database_path =
            ConfigValue::new(Self::default_database_path(), ConfigSource::Default);
        let mut draft_path = ConfigValue::new(Self::default_draft_path(), ConfigSource::Default);
        let mut image_server_url =
            ConfigValue::new(DEFAULT_IMAGE_SERVER_URL.to_string(), ConfigSource::Default);
        let mut grid_size = ConfigValue::new(DEFAULT_GRID_SIZE, ConfigSource::Default);
        let mut config_file = None;
        let mut session = SessionConfig::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            if let Some(db_path) = file_config.database_path {
                database_path = ConfigValue::new(resolve(&path, db_path), ConfigSource::File);
            }
            if let Some(draft) = file_config.draft_path {
                draft_path = ConfigValue::new(resolve(&path, draft), ConfigSource::File);
            }
            if let Some(url) = file_config.image_server_url {
                image_server_url = ConfigValue::new(url, ConfigSource::File);
            }
            if let Some(size) = file_config.grid_size {
                grid_size = ConfigValue::new(size, ConfigSource::File);
            }
            if let Some(session_config) = file_config.session {
                session = session_config;
            }
            config_file = Some(path);
        }

        if let Ok(db_path) = std::env::var("NEOMANUAL_DATABASE_PATH") {
            database_path = ConfigValue::new(PathBuf::from(db_path), ConfigSource::Environment);
        }
        if let Ok(draft) = std::env::var("NEOMANUAL_DRAFT_PATH") {
            draft_path = ConfigValue::new(PathBuf::from(draft), ConfigSource::Environment);
        }
        if let Ok(url) = std::env::var("NEOMANUAL_IMAGE_SERVER_URL") {
            image_server_url = ConfigValue::new(url, ConfigSource::Environment);
        }
        if let Ok(user_id) = std::env::var("NEOMANUAL_USER_ID") {
            session.user_id = Some(user_id);
        }

        Ok(Self {
            database_path,
            draft_path,
            image_server_url,
            grid_size,
            config_file,
            session,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/neomanual/
    /// - macOS: ~/Library/Application Support/neomanual/
    /// - Windows: %APPDATA%/neomanual/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("neomanual")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/neomanual/
    /// - macOS: ~/Library/Application Support/neomanual/
    /// - Windows: %APPDATA%/neomanual/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("neomanual")
    }

    /// Shared with the server so both see the same manuals.
    pub fn default_database_path() -> PathBuf {
        crate::server::default_database_path()
    }

    pub fn default_draft_path() -> PathBuf {
        Self::default_data_dir().join("draft.json")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }

    /// File that `auth login` and `auth logout` edit.
    pub fn writable_config_path(&self) -> PathBuf {
        self.config_file
            .clone()
            .unwrap_or_else(Self::default_config_path)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config
            .draft_path
            .value
            .to_string_lossy()
            .ends_with("draft.json"));
        assert_eq!(config.draft_path.source, ConfigSource::Default);
        assert_eq!(config.grid_size.value, DEFAULT_GRID_SIZE);
        assert_eq!(config.grid_size.source, ConfigSource::Default);
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "database_path: /custom/path/db.sqlite").unwrap();
        writeln!(file, "image_server_url: https://images.example").unwrap();
        writeln!(file, "grid_size: 25").unwrap();
        writeln!(file, "session:").unwrap();
        writeln!(file, "  user_id: user-42").unwrap();

        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(
            config.database_path.value,
            PathBuf::from("/custom/path/db.sqlite")
        );
        assert_eq!(config.database_path.source, ConfigSource::File);
        assert_eq!(config.image_server_url.value, "https://images.example");
        assert_eq!(config.grid_size.value, 25.0);
        assert_eq!(config.session.user_id.as_deref(), Some("user-42"));
        assert_eq!(config.config_file, Some(config_path.clone()));
        assert_eq!(config.writable_config_path(), config_path);
    }

    #[test]
    fn test_relative_draft_path_resolved_against_config_dir() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "draft_path: drafts/current.json\n").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(
            config.draft_path.value,
            temp_dir.path().join("drafts/current.json")
        );
    }

    #[test]
    #[ignore] // Run with --ignored; env vars can pollute parallel tests
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "image_server_url: https://fromfile\n").unwrap();

        std::env::set_var("NEOMANUAL_IMAGE_SERVER_URL", "https://fromenv");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.image_server_url.value, "https://fromenv");
        assert_eq!(config.image_server_url.source, ConfigSource::Environment);

        std::env::remove_var("NEOMANUAL_IMAGE_SERVER_URL");
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "invalid: yaml: content: [\n").unwrap();

        let err = Config::load(Some(config_path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}

//! Signed-in user for the CLI.
//!
//! The user id lives under `session.user_id` in the config file. Login and
//! logout edit that key in place and leave the rest of the file alone.

use serde_yaml::{Mapping, Value};
use std::path::Path;

use crate::config::Config;

const SESSION_KEY: &str = "session";
const USER_ID_KEY: &str = "user_id";

#[derive(Debug)]
pub enum SessionError {
    /// No user is signed in.
    NotAuthenticated,
    InvalidUserId,
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    InvalidConfig,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::NotAuthenticated => write!(f, "User not authenticated"),
            SessionError::InvalidUserId => write!(f, "User id cannot be empty"),
            SessionError::Io(e) => write!(f, "Config error: {}", e),
            SessionError::Yaml(e) => write!(f, "Config error: {}", e),
            SessionError::InvalidConfig => write!(f, "Config error: Invalid config format"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<std::io::Error> for SessionError {
    fn from(e: std::io::Error) -> Self {
        SessionError::Io(e)
    }
}

impl From<serde_yaml::Error> for SessionError {
    fn from(e: serde_yaml::Error) -> Self {
        SessionError::Yaml(e)
    }
}

/// The signed-in user id, required before touching stored manuals.
pub fn require_user(config: &Config) -> Result<&str, SessionError> {
    config
        .session
        .user_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or(SessionError::NotAuthenticated)
}

fn read_yaml(config_path: &Path) -> Result<Value, SessionError> {
    if !config_path.exists() {
        return Ok(Value::Mapping(Mapping::new()));
    }
    let contents = std::fs::read_to_string(config_path)?;
    match serde_yaml::from_str(&contents)? {
        // An empty file parses as null
        Value::Null => Ok(Value::Mapping(Mapping::new())),
        value => Ok(value),
    }
}

fn write_yaml(config_path: &Path, yaml: &Value) -> Result<(), SessionError> {
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(config_path, serde_yaml::to_string(yaml)?)?;
    Ok(())
}

/// Stores `user_id` as the signed-in user.
pub fn login(config_path: &Path, user_id: &str) -> Result<(), SessionError> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(SessionError::InvalidUserId);
    }

    let mut yaml = read_yaml(config_path)?;
    let mapping = yaml.as_mapping_mut().ok_or(SessionError::InvalidConfig)?;

    let session_key = Value::String(SESSION_KEY.to_string());
    let session = mapping
        .entry(session_key)
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    if !session.is_mapping() {
        *session = Value::Mapping(Mapping::new());
    }
    if let Some(session) = session.as_mapping_mut() {
        session.insert(
            Value::String(USER_ID_KEY.to_string()),
            Value::String(user_id.to_string()),
        );
    }

    write_yaml(config_path, &yaml)
}

/// Removes the signed-in user. Returns false when nobody was signed in.
pub fn logout(config_path: &Path) -> Result<bool, SessionError> {
    if !config_path.exists() {
        return Ok(false);
    }

    let mut yaml = read_yaml(config_path)?;
    let removed = yaml
        .as_mapping_mut()
        .and_then(|mapping| mapping.get_mut(SESSION_KEY))
        .and_then(Value::as_mapping_mut)
        .and_then(|session| session.remove(USER_ID_KEY))
        .is_some();

    if removed {
        write_yaml(config_path, &yaml)?;
    }
    Ok(removed)
}

//! JSON export and import of a [`ManualLayout`].

use thiserror::Error;

use crate::model::ManualLayout;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Invalid layout file: {0}")]
    InvalidLayout(#[source] serde_json::Error),

    #[error("Failed to serialize layout: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Pretty-printed JSON in the camelCase exchange format.
pub fn to_json(layout: &ManualLayout) -> Result<String, ExportError> {
    serde_json::to_string_pretty(layout).map_err(ExportError::Serialize)
}

/// Parses a layout. Anything that parses is accepted as is.
pub fn from_json(text: &str) -> Result<ManualLayout, ExportError> {
    serde_json::from_str(text).map_err(ExportError::InvalidLayout)
}

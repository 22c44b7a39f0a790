//! The working draft: editor state kept on disk between CLI runs.

use neomanual_core::Editor;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum DraftError {
    Io(PathBuf, std::io::Error),
    Serialize(serde_json::Error),
}

impl std::fmt::Display for DraftError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DraftError::Io(path, e) => {
                write!(f, "Failed to access draft '{}': {}", path.display(), e)
            }
            DraftError::Serialize(e) => write!(f, "Failed to serialize draft: {}", e),
        }
    }
}

impl std::error::Error for DraftError {}

pub struct DraftStore {
    path: PathBuf,
}

impl DraftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads the draft. A missing or unreadable draft yields a fresh editor.
    pub fn load(&self) -> Result<Editor, DraftError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Editor::new()),
            Err(e) => return Err(DraftError::Io(self.path.clone(), e)),
        };

        match serde_json::from_str(&contents) {
            Ok(editor) => Ok(editor),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Discarding unreadable draft"
                );
                Ok(Editor::new())
            }
        }
    }

    pub fn save(&self, editor: &Editor) -> Result<(), DraftError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DraftError::Io(self.path.clone(), e))?;
            }
        }
        let json = serde_json::to_string(editor).map_err(DraftError::Serialize)?;
        std::fs::write(&self.path, json).map_err(|e| DraftError::Io(self.path.clone(), e))
    }

    /// Removes the draft. Returns false when there was none.
    pub fn clear(&self) -> Result<bool, DraftError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DraftError::Io(self.path.clone(), e)),
        }
    }
}

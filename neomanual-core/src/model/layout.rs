use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use super::block::{new_id, Block};
use super::page::Page;

/// Violations of the layout invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("A manual must have at least one page")]
    NoPages,

    #[error("Duplicate page id: {0}")]
    DuplicatePageId(String),

    #[error("Duplicate block id: {0}")]
    DuplicateBlockId(String),

    #[error("Opacity of block {block_id} must be between 0 and 1, got {opacity}")]
    OpacityOutOfRange { block_id: String, opacity: f64 },

    #[error("Block {0} has a position, size or angle that is not a number")]
    NonFiniteGeometry(String),
}

/// A manual: an ordered list of pages, each holding positioned blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualLayout {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub pages: Vec<Page>,
}

impl ManualLayout {
    /// A fresh manual with one empty page and an empty title.
    pub fn new() -> Self {
        Self {
            id: new_id(),
            title: Some(String::new()),
            pages: vec![Page::new()],
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_pages(mut self, pages: Vec<Page>) -> Self {
        self.pages = pages;
        self
    }

    /// Title to show or store, skipping blank titles.
    pub fn display_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }

    pub fn page_ids(&self) -> HashSet<&str> {
        self.pages.iter().map(|page| page.id.as_str()).collect()
    }

    /// Ids of every block across all pages.
    pub fn block_ids(&self) -> HashSet<&str> {
        self.pages
            .iter()
            .flat_map(|page| page.blocks.iter().map(Block::id))
            .collect()
    }

    pub fn block_count(&self) -> usize {
        self.pages.iter().map(|page| page.blocks.len()).sum()
    }

    pub fn find_block(&self, id: &str) -> Option<&Block> {
        self.pages.iter().find_map(|page| page.find_block(id))
    }

    pub fn find_block_mut(&mut self, id: &str) -> Option<&mut Block> {
        self.pages
            .iter_mut()
            .flat_map(|page| page.blocks.iter_mut())
            .find(|block| block.id() == id)
    }

    /// Index of the page holding the given block.
    pub fn page_of_block(&self, id: &str) -> Option<usize> {
        self.pages
            .iter()
            .position(|page| page.find_block(id).is_some())
    }

    /// Checks the invariants a manual must hold before it is persisted.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.pages.is_empty() {
            return Err(LayoutError::NoPages);
        }

        let mut page_ids = HashSet::new();
        let mut block_ids = HashSet::new();
        for page in &self.pages {
            if !page_ids.insert(page.id.as_str()) {
                return Err(LayoutError::DuplicatePageId(page.id.clone()));
            }
            for block in &page.blocks {
                if !block_ids.insert(block.id()) {
                    return Err(LayoutError::DuplicateBlockId(block.id().to_string()));
                }
                if !block.is_finite() {
                    return Err(LayoutError::NonFiniteGeometry(block.id().to_string()));
                }
                if let Block::Image(image) = block {
                    if let Some(opacity) = image.opacity {
                        if !(0.0..=1.0).contains(&opacity) {
                            return Err(LayoutError::OpacityOutOfRange {
                                block_id: block.id().to_string(),
                                opacity,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl Default for ManualLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ManualLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = self.display_title().unwrap_or("Untitled Manual");
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "=".repeat(title.len()))?;
        writeln!(f, "ID: {}", self.id)?;
        writeln!(
            f,
            "Pages: {}  Blocks: {}",
            self.pages.len(),
            self.block_count()
        )?;
        for (index, page) in self.pages.iter().enumerate() {
            write!(f, "\n{}. {}", index + 1, page)?;
        }
        Ok(())
    }
}

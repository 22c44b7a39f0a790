use serde::{Deserialize, Serialize};
use std::fmt;

use super::block::{new_id, Block};

/// Padding added below the lowest block when sizing the editing canvas.
pub const CANVAS_BOTTOM_PADDING: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Page {
    pub fn new() -> Self {
        Self {
            id: new_id(),
            background_color: None,
            blocks: Vec::new(),
        }
    }

    pub fn with_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.blocks = blocks;
        self
    }

    /// Blocks sorted by ascending z-index.
    ///
    /// The sort is stable, so blocks sharing a layer keep insertion order.
    pub fn blocks_in_paint_order(&self) -> Vec<&Block> {
        let mut blocks: Vec<&Block> = self.blocks.iter().collect();
        blocks.sort_by_key(|block| block.z_index());
        blocks
    }

    /// Height the editing canvas needs to show every block on this page.
    pub fn content_height(&self) -> f64 {
        let max_bottom = self
            .blocks
            .iter()
            .map(|block| block.base().bottom())
            .fold(0.0, f64::max);
        max_bottom + CANVAS_BOTTOM_PADDING
    }

    /// Copy of this page with fresh ids for the page and every block.
    pub fn duplicate(&self) -> Page {
        Page {
            id: new_id(),
            background_color: self.background_color.clone(),
            blocks: self.blocks.iter().map(Block::with_new_id).collect(),
        }
    }

    pub fn find_block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id() == id)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {}", self.id)?;
        if let Some(color) = &self.background_color {
            write!(f, "  background {}", color)?;
        }
        writeln!(f)?;
        if self.blocks.is_empty() {
            writeln!(f, "  (empty)")?;
        }
        for block in self.blocks_in_paint_order() {
            writeln!(f, "  - {}", block)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockBase, ImageBlock, TextBlock};

    fn text(id: &str, z: Option<i32>) -> Block {
        let mut base = BlockBase::new(0.0, 0.0, 10.0, 10.0);
        base.id = id.to_string();
        base.z_index = z;
        Block::Text(TextBlock::new(id, 14.0, base))
    }

    #[test]
    fn test_paint_order_ascending_z_index() {
        let page = Page::new().with_blocks(vec![
            text("top", Some(5)),
            text("bottom", Some(-1)),
            text("middle", Some(2)),
        ]);

        let ids: Vec<&str> = page.blocks_in_paint_order().iter().map(|b| b.id()).collect();
        assert_eq!(ids, vec!["bottom", "middle", "top"]);
    }

    #[test]
    fn test_paint_order_ties_keep_insertion_order() {
        let page = Page::new().with_blocks(vec![
            text("first", None),
            text("raised", Some(1)),
            text("second", Some(0)),
            text("third", None),
        ]);

        let ids: Vec<&str> = page.blocks_in_paint_order().iter().map(|b| b.id()).collect();
        assert_eq!(ids, vec!["first", "second", "third", "raised"]);
    }

    #[test]
    fn test_content_height() {
        let empty = Page::new();
        assert_eq!(empty.content_height(), 50.0);

        let page = Page::new().with_blocks(vec![
            Block::Text(TextBlock::new("a", 14.0, BlockBase::new(50.0, 50.0, 200.0, 100.0))),
            Block::Image(ImageBlock::new("", BlockBase::new(0.0, 300.0, 10.0, 25.0))),
        ]);
        assert_eq!(page.content_height(), 375.0);
    }

    #[test]
    fn test_duplicate_assigns_fresh_ids() {
        let mut page = Page::new().with_blocks(vec![text("a", None), text("b", Some(3))]);
        page.background_color = Some("#000".to_string());

        let copy = page.duplicate();
        assert_ne!(copy.id, page.id);
        assert_eq!(copy.background_color.as_deref(), Some("#000"));
        assert_eq!(copy.blocks.len(), 2);
        assert!(copy.blocks.iter().all(|b| page.find_block(b.id()).is_none()));
        assert_eq!(copy.blocks[1].z_index(), 3);
    }
}

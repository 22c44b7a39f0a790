//! Read-only book presentation of a layout.
//!
//! The book shows two facing pages: the page before the current one on the
//! left and the current page on the right. Block geometry is expressed as a
//! percentage of the fixed preview canvas.

use serde::Serialize;
use std::fmt;

use crate::model::{Block, ManualLayout, Page};

pub const CANVAS_WIDTH: f64 = 800.0;
pub const CANVAS_HEIGHT: f64 = 600.0;
/// Characters of text content shown per block in a preview.
pub const TEXT_PREVIEW_CHARS: usize = 10;

const DEFAULT_BACKGROUND: &str = "#fff";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockView {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub z_index: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl BlockView {
    pub fn new(block: &Block) -> Self {
        let base = block.base();
        let (text, src, opacity) = match block {
            Block::Text(text) => (Some(truncate(&text.content)), None, None),
            Block::Image(image) => (None, Some(image.src.clone()), image.opacity),
        };
        Self {
            id: base.id.clone(),
            kind: block.kind(),
            left: base.x / CANVAS_WIDTH * 100.0,
            top: base.y / CANVAS_HEIGHT * 100.0,
            width: base.width / CANVAS_WIDTH * 100.0,
            height: base.height / CANVAS_HEIGHT * 100.0,
            z_index: block.z_index(),
            text,
            src,
            opacity,
        }
    }
}

fn truncate(content: &str) -> String {
    content.chars().take(TEXT_PREVIEW_CHARS).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub id: String,
    pub number: usize,
    pub background_color: String,
    pub blocks: Vec<BlockView>,
}

impl PageView {
    /// View of `page`, which sits at zero-based `index` in the manual.
    pub fn new(page: &Page, index: usize) -> Self {
        Self {
            id: page.id.clone(),
            number: index + 1,
            background_color: page
                .background_color
                .clone()
                .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string()),
            blocks: page
                .blocks_in_paint_order()
                .into_iter()
                .map(BlockView::new)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadView {
    pub left: Option<PageView>,
    pub right: Option<PageView>,
}

/// A layout opened at a page.
#[derive(Debug, Clone)]
pub struct Book<'a> {
    layout: &'a ManualLayout,
    current: usize,
}

impl<'a> Book<'a> {
    pub fn new(layout: &'a ManualLayout) -> Self {
        Self { layout, current: 0 }
    }

    /// Opens the book at `page`, clamped to the last page.
    pub fn at(layout: &'a ManualLayout, page: usize) -> Self {
        let current = page.min(layout.pages.len().saturating_sub(1));
        Self { layout, current }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn page_count(&self) -> usize {
        self.layout.pages.len()
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.page_count()
    }

    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.current += 1;
        true
    }

    pub fn prev(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.current -= 1;
        true
    }

    pub fn title(&self) -> Option<&str> {
        self.layout.display_title()
    }

    pub fn spread(&self) -> SpreadView {
        let view = |index: usize| {
            self.layout
                .pages
                .get(index)
                .map(|page| PageView::new(page, index))
        };
        SpreadView {
            left: self.current.checked_sub(1).and_then(view),
            right: view(self.current),
        }
    }
}

impl fmt::Display for Book<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(title) = self.title() {
            writeln!(f, "{}", title)?;
            writeln!(f)?;
        }
        let spread = self.spread();
        for (side, page) in [("Left", &spread.left), ("Right", &spread.right)] {
            let Some(page) = page else { continue };
            writeln!(f, "{} page {} ({})", side, page.number, page.background_color)?;
            if page.blocks.is_empty() {
                writeln!(f, "  (empty)")?;
            }
            for block in &page.blocks {
                let body = block.text.as_deref().or(block.src.as_deref()).unwrap_or("");
                writeln!(
                    f,
                    "  {:<5} {:>5.1}% {:>5.1}%  {:>5.1}% x {:>5.1}%  {}",
                    block.kind, block.left, block.top, block.width, block.height, body
                )?;
            }
        }
        write!(f, "Page {} of {}", self.current + 1, self.page_count())
    }
}

/// Every spread of the book, one per page turned to.
pub fn spreads(layout: &ManualLayout) -> Vec<SpreadView> {
    (0..layout.pages.len())
        .map(|index| Book::at(layout, index).spread())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockBase, ImageBlock, TextBlock};

    fn three_pages() -> ManualLayout {
        let mut back = TextBlock::new(
            "Back layer text",
            14.0,
            BlockBase::new(400.0, 300.0, 200.0, 150.0),
        );
        back.base.z_index = Some(2);
        let front = ImageBlock::new("cover.png", BlockBase::new(0.0, 0.0, 800.0, 600.0));
        let mut first = Page::new().with_blocks(vec![Block::Text(back), Block::Image(front)]);
        first.background_color = Some("#000".to_string());
        ManualLayout::new()
            .with_title("Manual")
            .with_pages(vec![first, Page::new(), Page::new()])
    }

    #[test]
    fn test_first_spread_has_no_left_page() {
        let layout = three_pages();
        let spread = Book::new(&layout).spread();

        assert!(spread.left.is_none());
        assert_eq!(spread.right.unwrap().id, layout.pages[0].id);
    }

    #[test]
    fn test_spread_shows_previous_and_current() {
        let layout = three_pages();
        let spread = Book::at(&layout, 2).spread();

        assert_eq!(spread.left.unwrap().id, layout.pages[1].id);
        assert_eq!(spread.right.unwrap().number, 3);
    }

    #[test]
    fn test_navigation_stays_in_bounds() {
        let layout = three_pages();
        let mut book = Book::new(&layout);

        assert!(!book.prev());
        assert!(book.next());
        assert!(book.next());
        assert!(book.is_last());
        assert!(!book.next());
        assert_eq!(book.current(), 2);
        assert_eq!(Book::at(&layout, 99).current(), 2);
    }

    #[test]
    fn test_blocks_scaled_and_in_paint_order() {
        let layout = three_pages();
        let page = PageView::new(&layout.pages[0], 0);

        assert_eq!(page.background_color, "#000");
        assert_eq!(page.blocks[0].kind, "image");
        assert_eq!(page.blocks[0].width, 100.0);
        let text = &page.blocks[1];
        assert_eq!((text.left, text.top, text.width, text.height), (50.0, 50.0, 25.0, 25.0));
        assert_eq!(text.text.as_deref(), Some("Back layer"));
    }

    #[test]
    fn test_default_background() {
        let layout = three_pages();
        assert_eq!(PageView::new(&layout.pages[1], 1).background_color, "#fff");
    }

    #[test]
    fn test_spreads_one_per_page() {
        let layout = three_pages();
        let all = spreads(&layout);
        assert_eq!(all.len(), 3);
        assert!(all[0].left.is_none());
        assert!(all[1].left.is_some());
    }

    #[test]
    fn test_display_reports_position() {
        let layout = three_pages();
        let rendered = Book::at(&layout, 1).to_string();
        assert!(rendered.starts_with("Manual"));
        assert!(rendered.ends_with("Page 2 of 3"));
    }
}

//! Layout editor state machine.
//!
//! [`Editor`] owns the live [`ManualLayout`] together with the current page,
//! the selected block and the undo/redo history. Every operation that
//! changes the layout snapshots the previous layout onto the undo stack and
//! clears the redo stack. A failed operation leaves the layout untouched and
//! records nothing. Selection and page navigation are not history tracked.

mod grid;
mod history;

pub use grid::{snap_to_grid, DEFAULT_GRID_SIZE};
pub use history::{History, DEFAULT_HISTORY_LIMIT};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Block, BlockBase, FontWeight, ImageBlock, ManualLayout, Page, TextBlock};
use crate::template::ManualTemplate;

/// Content of a freshly added text block.
pub const NEW_TEXT_CONTENT: &str = "New Text Block";
pub const DEFAULT_FONT_SIZE: f64 = 14.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error("Block not found: {0}")]
    BlockNotFound(String),

    #[error("Block {0} is not a text block")]
    NotText(String),

    #[error("Block {0} is not an image block")]
    NotImage(String),

    #[error("Page {index} does not exist (manual has {len} page(s))")]
    PageOutOfRange { index: usize, len: usize },

    #[error("You must have at least one page.")]
    LastPage,

    #[error("Opacity must be a number between 0 and 1")]
    InvalidOpacity,

    #[error("{0} must be a finite number")]
    NotFinite(&'static str),
}

/// Rejects NaN and infinities, naming the first offending value.
fn ensure_finite(values: &[(&'static str, f64)]) -> Result<(), EditorError> {
    match values.iter().find(|(_, value)| !value.is_finite()) {
        Some((name, _)) => Err(EditorError::NotFinite(name)),
        None => Ok(()),
    }
}

/// Font attributes to change on a text block. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontChange {
    pub size: Option<f64>,
    pub family: Option<String>,
    pub weight: Option<FontWeight>,
    pub italic: Option<bool>,
    pub color: Option<String>,
}

impl FontChange {
    pub fn is_empty(&self) -> bool {
        self.size.is_none()
            && self.family.is_none()
            && self.weight.is_none()
            && self.italic.is_none()
            && self.color.is_none()
    }
}

fn default_grid_size() -> f64 {
    DEFAULT_GRID_SIZE
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Editor {
    layout: ManualLayout,
    #[serde(default)]
    current_page: usize,
    #[serde(default)]
    selected_block: Option<String>,
    #[serde(default)]
    history: History<ManualLayout>,
    #[serde(default = "default_grid_size")]
    grid_size: f64,
}

impl Editor {
    /// An editor over a brand new manual.
    pub fn new() -> Self {
        Self::from_layout(ManualLayout::new())
    }

    /// An editor over an existing layout, with empty history.
    ///
    /// A layout without pages gets one blank page.
    pub fn from_layout(mut layout: ManualLayout) -> Self {
        if layout.pages.is_empty() {
            layout.pages.push(Page::new());
        }
        Self {
            layout,
            current_page: 0,
            selected_block: None,
            history: History::new(),
            grid_size: DEFAULT_GRID_SIZE,
        }
    }

    pub fn with_grid_size(mut self, grid_size: f64) -> Self {
        self.grid_size = grid_size;
        self
    }

    pub fn set_grid_size(&mut self, grid_size: f64) {
        self.grid_size = grid_size;
    }

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    pub fn layout(&self) -> &ManualLayout {
        &self.layout
    }

    pub fn into_layout(self) -> ManualLayout {
        self.layout
    }

    pub fn current_page_index(&self) -> usize {
        self.current_page
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.layout.pages.get(self.current_page)
    }

    pub fn page_count(&self) -> usize {
        self.layout.pages.len()
    }

    pub fn selected_block(&self) -> Option<&Block> {
        self.selected_block
            .as_deref()
            .and_then(|id| self.layout.find_block(id))
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &History<ManualLayout> {
        &self.history
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Runs a layout mutation, recording the previous layout on success and
    /// restoring it on failure.
    fn apply<R>(
        &mut self,
        change: impl FnOnce(&mut ManualLayout, usize) -> Result<R, EditorError>,
    ) -> Result<R, EditorError> {
        let snapshot = self.layout.clone();
        match change(&mut self.layout, self.current_page) {
            Ok(result) => {
                self.history.record(snapshot);
                Ok(result)
            }
            Err(e) => {
                self.layout = snapshot;
                Err(e)
            }
        }
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.history.undo(&mut self.layout);
        if changed {
            self.settle();
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo(&mut self.layout);
        if changed {
            self.settle();
        }
        changed
    }

    /// Keeps the page index and selection valid after the layout was swapped.
    fn settle(&mut self) {
        let last = self.layout.pages.len().saturating_sub(1);
        self.current_page = self.current_page.min(last);
        if let Some(id) = &self.selected_block {
            if self.layout.find_block(id).is_none() {
                self.selected_block = None;
            }
        }
    }

    // ------------------------------------------------------------------
    // Blocks
    // ------------------------------------------------------------------

    /// Adds the default text block to the current page.
    pub fn add_text_block(&mut self) -> Result<String, EditorError> {
        let block = TextBlock::new(
            NEW_TEXT_CONTENT,
            DEFAULT_FONT_SIZE,
            BlockBase::new(50.0, 50.0, 200.0, 100.0),
        );
        self.add_block(Block::Text(block))
    }

    /// Adds an empty image block to the current page.
    pub fn add_image_block(&mut self) -> Result<String, EditorError> {
        let block = ImageBlock::new("", BlockBase::new(50.0, 50.0, 150.0, 150.0));
        self.add_block(Block::Image(block))
    }

    /// Appends a block to the current page, re-keying it if its id is taken.
    pub fn add_block(&mut self, block: Block) -> Result<String, EditorError> {
        let block = if self.layout.find_block(block.id()).is_some() {
            block.with_new_id()
        } else {
            block
        };
        let id = block.id().to_string();
        self.apply(|layout, current| {
            page_mut(layout, current)?.blocks.push(block);
            Ok(())
        })?;
        Ok(id)
    }

    pub fn delete_block(&mut self, id: &str) -> Result<(), EditorError> {
        self.apply(|layout, _| {
            let page = layout
                .page_of_block(id)
                .ok_or_else(|| EditorError::BlockNotFound(id.to_string()))?;
            layout.pages[page].blocks.retain(|block| block.id() != id);
            Ok(())
        })?;
        if self.selected_block.as_deref() == Some(id) {
            self.selected_block = None;
        }
        Ok(())
    }

    /// Moves a block, snapping the new position to the grid.
    ///
    /// Returns the snapped position.
    pub fn move_block(&mut self, id: &str, x: f64, y: f64) -> Result<(f64, f64), EditorError> {
        ensure_finite(&[("x", x), ("y", y)])?;
        let x = snap_to_grid(x, self.grid_size);
        let y = snap_to_grid(y, self.grid_size);
        self.apply(|layout, _| {
            let base = block_mut(layout, id)?.base_mut();
            base.x = x;
            base.y = y;
            Ok((x, y))
        })
    }

    /// Sets size and position together, as a resize from any edge does.
    pub fn resize_block(
        &mut self,
        id: &str,
        width: f64,
        height: f64,
        x: f64,
        y: f64,
    ) -> Result<(), EditorError> {
        ensure_finite(&[("width", width), ("height", height), ("x", x), ("y", y)])?;
        self.apply(|layout, _| {
            let base = block_mut(layout, id)?.base_mut();
            base.width = width;
            base.height = height;
            base.x = x;
            base.y = y;
            Ok(())
        })
    }

    pub fn rotate_block(&mut self, id: &str, degrees: f64) -> Result<(), EditorError> {
        ensure_finite(&[("rotation", degrees)])?;
        self.apply(|layout, _| {
            text_mut(layout, id)?.rotation = Some(degrees);
            Ok(())
        })
    }

    /// Rotates a text block so it points at `(pointer_x, pointer_y)`.
    ///
    /// The angle is measured from the block centre, in degrees.
    pub fn rotate_towards(
        &mut self,
        id: &str,
        pointer_x: f64,
        pointer_y: f64,
    ) -> Result<f64, EditorError> {
        ensure_finite(&[("x", pointer_x), ("y", pointer_y)])?;
        let block = self
            .layout
            .find_block(id)
            .ok_or_else(|| EditorError::BlockNotFound(id.to_string()))?;
        let (cx, cy) = block.base().center();
        let degrees = (pointer_y - cy).atan2(pointer_x - cx).to_degrees();
        self.rotate_block(id, degrees)?;
        Ok(degrees)
    }

    pub fn set_text(&mut self, id: &str, content: impl Into<String>) -> Result<(), EditorError> {
        let content = content.into();
        self.apply(|layout, _| {
            text_mut(layout, id)?.content = content;
            Ok(())
        })
    }

    pub fn set_font_size(&mut self, id: &str, font_size: f64) -> Result<(), EditorError> {
        ensure_finite(&[("font size", font_size)])?;
        self.apply(|layout, _| {
            text_mut(layout, id)?.font_size = font_size;
            Ok(())
        })
    }

    /// Applies every field of `change` as a single history step.
    pub fn set_font(&mut self, id: &str, change: FontChange) -> Result<(), EditorError> {
        if let Some(size) = change.size {
            ensure_finite(&[("font size", size)])?;
        }
        self.apply(|layout, _| {
            let text = text_mut(layout, id)?;
            if let Some(size) = change.size {
                text.font_size = size;
            }
            if let Some(family) = change.family {
                text.font_family = Some(family);
            }
            if let Some(weight) = change.weight {
                text.font_weight = Some(weight);
            }
            if let Some(italic) = change.italic {
                text.italic = Some(italic);
            }
            if let Some(color) = change.color {
                text.color = Some(color);
            }
            Ok(())
        })
    }

    pub fn set_image_src(&mut self, id: &str, src: impl Into<String>) -> Result<(), EditorError> {
        let src = src.into();
        self.apply(|layout, _| {
            image_mut(layout, id)?.src = src;
            Ok(())
        })
    }

    pub fn clear_image(&mut self, id: &str) -> Result<(), EditorError> {
        self.set_image_src(id, "")
    }

    /// Sets image opacity, clamped into `[0, 1]`. Returns the stored value.
    pub fn set_opacity(&mut self, id: &str, opacity: f64) -> Result<f64, EditorError> {
        if !opacity.is_finite() {
            return Err(EditorError::InvalidOpacity);
        }
        let opacity = opacity.clamp(0.0, 1.0);
        self.apply(|layout, _| {
            image_mut(layout, id)?.opacity = Some(opacity);
            Ok(opacity)
        })
    }

    /// Moves a block one layer up. Returns the new z-index.
    pub fn raise_block(&mut self, id: &str) -> Result<i32, EditorError> {
        self.apply(|layout, _| {
            let block = block_mut(layout, id)?;
            let z = block.z_index() + 1;
            block.base_mut().z_index = Some(z);
            Ok(z)
        })
    }

    /// Moves a block one layer down, never below 0. Returns the new z-index.
    pub fn lower_block(&mut self, id: &str) -> Result<i32, EditorError> {
        self.apply(|layout, _| {
            let block = block_mut(layout, id)?;
            let z = (block.z_index() - 1).max(0);
            block.base_mut().z_index = Some(z);
            Ok(z)
        })
    }

    /// Inserts an image produced by the generation proxy on the current
    /// page, optionally replacing an existing block in the same step.
    pub fn insert_generated_image(
        &mut self,
        src: impl Into<String>,
        prompt: &str,
        replace: Option<&str>,
    ) -> Result<String, EditorError> {
        let mut image = ImageBlock::new(src, BlockBase::new(100.0, 100.0, 200.0, 200.0));
        image.alt_text = Some(prompt.to_string());
        image.label = Some(prompt.to_string());
        let id = image.base.id.clone();

        self.apply(|layout, current| {
            if let Some(old) = replace {
                let page = layout
                    .page_of_block(old)
                    .ok_or_else(|| EditorError::BlockNotFound(old.to_string()))?;
                layout.pages[page].blocks.retain(|block| block.id() != old);
            }
            page_mut(layout, current)?.blocks.push(Block::Image(image));
            Ok(())
        })?;

        if replace.is_some() && self.selected_block.as_deref() == replace {
            self.selected_block = Some(id.clone());
        }
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Pages
    // ------------------------------------------------------------------

    /// Appends a blank page and makes it current.
    pub fn add_page(&mut self) -> Result<String, EditorError> {
        let page = Page::new();
        let id = page.id.clone();
        self.apply(|layout, _| {
            layout.pages.push(page);
            Ok(())
        })?;
        self.current_page = self.layout.pages.len() - 1;
        Ok(id)
    }

    /// Removes the current page. The previous page becomes current.
    pub fn remove_current_page(&mut self) -> Result<(), EditorError> {
        if self.layout.pages.len() <= 1 {
            return Err(EditorError::LastPage);
        }
        self.apply(|layout, current| {
            page_mut(layout, current)?;
            layout.pages.remove(current);
            Ok(())
        })?;
        self.current_page = self.current_page.saturating_sub(1);
        self.settle();
        Ok(())
    }

    /// Duplicates the page at `index` right after itself and makes the copy
    /// current. The copy and its blocks get fresh ids.
    pub fn clone_page(&mut self, index: usize) -> Result<String, EditorError> {
        let id = self.apply(|layout, _| {
            let copy = page_mut(layout, index)?.duplicate();
            let id = copy.id.clone();
            layout.pages.insert(index + 1, copy);
            Ok(id)
        })?;
        self.current_page = index + 1;
        Ok(id)
    }

    /// Moves a page from one position to another, shifting the pages between.
    ///
    /// The current page stays on the same page after the move.
    pub fn move_page(&mut self, from: usize, to: usize) -> Result<(), EditorError> {
        let len = self.layout.pages.len();
        for index in [from, to] {
            if index >= len {
                return Err(EditorError::PageOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }

        let current_id = self.current_page().map(|page| page.id.clone());
        self.apply(|layout, _| {
            let page = layout.pages.remove(from);
            layout.pages.insert(to, page);
            Ok(())
        })?;
        if let Some(current_id) = current_id {
            if let Some(index) = self.layout.pages.iter().position(|p| p.id == current_id) {
                self.current_page = index;
            }
        }
        Ok(())
    }

    /// Sets or clears the background colour of the current page.
    pub fn set_background(&mut self, color: Option<String>) -> Result<(), EditorError> {
        self.apply(|layout, current| {
            page_mut(layout, current)?.background_color = color;
            Ok(())
        })
    }

    /// Appends the template's blocks, with fresh ids, to the current page.
    pub fn apply_template(
        &mut self,
        template: &ManualTemplate,
    ) -> Result<Vec<String>, EditorError> {
        let blocks = template.instantiate();
        let ids: Vec<String> = blocks.iter().map(|block| block.id().to_string()).collect();
        self.apply(|layout, current| {
            page_mut(layout, current)?.blocks.extend(blocks);
            Ok(())
        })?;
        Ok(ids)
    }

    // ------------------------------------------------------------------
    // Document
    // ------------------------------------------------------------------

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), EditorError> {
        let title = title.into();
        self.apply(|layout, _| {
            layout.title = Some(title);
            Ok(())
        })
    }

    /// Replaces the layout with a fresh manual. Undoable.
    pub fn clear(&mut self) -> Result<(), EditorError> {
        self.apply(|layout, _| {
            *layout = ManualLayout::new();
            Ok(())
        })?;
        self.current_page = 0;
        self.selected_block = None;
        Ok(())
    }

    /// Loads another document into the editor, dropping all history.
    pub fn replace_layout(&mut self, layout: ManualLayout) {
        let grid_size = self.grid_size;
        *self = Editor::from_layout(layout).with_grid_size(grid_size);
    }

    // ------------------------------------------------------------------
    // Navigation and selection
    // ------------------------------------------------------------------

    pub fn next_page(&mut self) -> bool {
        if self.current_page + 1 < self.layout.pages.len() {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    pub fn previous_page(&mut self) -> bool {
        if self.current_page > 0 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    pub fn go_to_page(&mut self, index: usize) -> Result<(), EditorError> {
        let len = self.layout.pages.len();
        if index >= len {
            return Err(EditorError::PageOutOfRange { index, len });
        }
        self.current_page = index;
        Ok(())
    }

    pub fn select_block(&mut self, id: &str) -> Result<(), EditorError> {
        if self.layout.find_block(id).is_none() {
            return Err(EditorError::BlockNotFound(id.to_string()));
        }
        self.selected_block = Some(id.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected_block = None;
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

fn page_mut(layout: &mut ManualLayout, index: usize) -> Result<&mut Page, EditorError> {
    let len = layout.pages.len();
    layout
        .pages
        .get_mut(index)
        .ok_or(EditorError::PageOutOfRange { index, len })
}

fn block_mut<'a>(layout: &'a mut ManualLayout, id: &str) -> Result<&'a mut Block, EditorError> {
    layout
        .find_block_mut(id)
        .ok_or_else(|| EditorError::BlockNotFound(id.to_string()))
}

fn text_mut<'a>(layout: &'a mut ManualLayout, id: &str) -> Result<&'a mut TextBlock, EditorError> {
    match block_mut(layout, id)? {
        Block::Text(text) => Ok(text),
        Block::Image(_) => Err(EditorError::NotText(id.to_string())),
    }
}

fn image_mut<'a>(
    layout: &'a mut ManualLayout,
    id: &str,
) -> Result<&'a mut ImageBlock, EditorError> {
    match block_mut(layout, id)? {
        Block::Image(image) => Ok(image),
        Block::Text(_) => Err(EditorError::NotImage(id.to_string())),
    }
}

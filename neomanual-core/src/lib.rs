//! Core library for neomanual.
//!
//! Layout model, the undo/redo editor state machine, JSON export, the book
//! preview and the diff planning used when saving to a store.

pub mod editor;
pub mod export;
pub mod model;
pub mod preview;
pub mod sync;
pub mod template;

pub use editor::{Editor, EditorError, FontChange};
pub use export::ExportError;
pub use model::{
    Block, BlockBase, FontWeight, ImageBlock, LayoutError, ManualLayout, Page, TextBlock,
};
pub use template::{builtin_templates, find_template, ManualTemplate};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(version(), "0.1.0");
    }
}

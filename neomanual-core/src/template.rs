//! Page templates: predefined block arrangements appended onto a page.

use serde::{Deserialize, Serialize};

use crate::model::{Block, BlockBase, FontWeight, ImageBlock, TextBlock};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualTemplate {
    pub name: String,
    pub blocks: Vec<Block>,
}

impl ManualTemplate {
    pub fn new(name: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            name: name.into(),
            blocks,
        }
    }

    /// Copies of the template blocks, each with a fresh id.
    pub fn instantiate(&self) -> Vec<Block> {
        self.blocks.iter().map(Block::with_new_id).collect()
    }
}

fn text(content: &str, font_size: f64, x: f64, y: f64, width: f64, height: f64) -> TextBlock {
    TextBlock::new(content, font_size, BlockBase::new(x, y, width, height))
}

fn heading(content: &str, x: f64, y: f64, width: f64) -> Block {
    let mut block = text(content, 28.0, x, y, width, 60.0);
    block.font_weight = Some(FontWeight::Bold);
    Block::Text(block)
}

fn image(label: &str, x: f64, y: f64, width: f64, height: f64) -> Block {
    let mut block = ImageBlock::new("", BlockBase::new(x, y, width, height));
    block.label = Some(label.to_string());
    Block::Image(block)
}

/// Templates shipped with the editor.
pub fn builtin_templates() -> Vec<ManualTemplate> {
    vec![
        ManualTemplate::new(
            "Title Page",
            vec![
                heading("Game Title", 100.0, 60.0, 600.0),
                image("Cover art", 200.0, 150.0, 400.0, 300.0),
                Block::Text(text("Instruction Manual", 18.0, 250.0, 480.0, 300.0, 40.0)),
            ],
        ),
        ManualTemplate::new(
            "Two Column",
            vec![
                heading("Section Title", 40.0, 30.0, 720.0),
                Block::Text(text("Left column text", 14.0, 40.0, 110.0, 340.0, 440.0)),
                Block::Text(text("Right column text", 14.0, 420.0, 110.0, 340.0, 440.0)),
            ],
        ),
        ManualTemplate::new(
            "Controls",
            vec![
                heading("Controls", 40.0, 30.0, 720.0),
                image("Controller diagram", 40.0, 110.0, 360.0, 260.0),
                Block::Text(text(
                    "A: Jump\nB: Attack\nC: Special\nD: Taunt",
                    16.0,
                    430.0,
                    110.0,
                    330.0,
                    260.0,
                )),
            ],
        ),
    ]
}

/// Finds a built-in template by name, ignoring case.
pub fn find_template(name: &str) -> Option<ManualTemplate> {
    builtin_templates()
        .into_iter()
        .find(|template| template.name.eq_ignore_ascii_case(name.trim()))
}

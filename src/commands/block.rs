use clap::{Args, Subcommand};
use neomanual::config::Config;
use neomanual_core::{Editor, FontChange, FontWeight};

use super::{with_draft, CommandResult};

#[derive(Args)]
pub struct BlockCommand {
    #[command(subcommand)]
    pub command: BlockSubcommand,
}

/// Commands that take a block id fall back to the selected block.
#[derive(Subcommand)]
pub enum BlockSubcommand {
    /// Add a text block to the current page and select it
    AddText,

    /// Add an empty image block to the current page and select it
    AddImage,

    /// Move a block (snapped to the grid)
    Move {
        x: f64,
        y: f64,
        #[arg(long)]
        id: Option<String>,
    },

    /// Set a block's size and position
    Resize {
        width: f64,
        height: f64,
        /// New left edge (defaults to the current one)
        #[arg(long)]
        x: Option<f64>,
        /// New top edge (defaults to the current one)
        #[arg(long)]
        y: Option<f64>,
        #[arg(long)]
        id: Option<String>,
    },

    /// Rotate a text block
    Rotate {
        /// Angle in degrees
        #[arg(allow_negative_numbers = true, required_unless_present = "towards")]
        degrees: Option<f64>,
        /// Point the block at this position instead, as "x,y"
        #[arg(long, value_parser = parse_point, conflicts_with = "degrees")]
        towards: Option<(f64, f64)>,
        #[arg(long)]
        id: Option<String>,
    },

    /// Replace the content of a text block
    Text {
        content: String,
        #[arg(long)]
        id: Option<String>,
    },

    /// Change the font of a text block
    Font {
        #[arg(long)]
        size: Option<f64>,
        #[arg(long)]
        family: Option<String>,
        /// normal or bold
        #[arg(long)]
        weight: Option<FontWeight>,
        #[arg(long)]
        italic: Option<bool>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        id: Option<String>,
    },

    /// Set the opacity of an image block (0 to 1)
    Opacity {
        opacity: f64,
        #[arg(long)]
        id: Option<String>,
    },

    /// Set the source URL of an image block
    Src {
        src: String,
        #[arg(long)]
        id: Option<String>,
    },

    /// Remove the image from an image block
    ClearImage {
        #[arg(long)]
        id: Option<String>,
    },

    /// Bring a block one layer forward
    Raise {
        #[arg(long)]
        id: Option<String>,
    },

    /// Send a block one layer back
    Lower {
        #[arg(long)]
        id: Option<String>,
    },

    /// Select a block, or clear the selection with --none
    Select {
        #[arg(required_unless_present = "none")]
        id: Option<String>,
        #[arg(long, conflicts_with = "id")]
        none: bool,
    },

    /// Delete a block
    Delete {
        #[arg(long)]
        id: Option<String>,
    },
}

fn parse_point(value: &str) -> Result<(f64, f64), String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected \"x,y\", got \"{}\"", value))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid coordinate \"{}\": {}", s, e))
    };
    Ok((parse(x)?, parse(y)?))
}

/// The explicit id, or the selected block.
fn target(editor: &Editor, id: &Option<String>) -> CommandResult<String> {
    match id {
        Some(id) => Ok(id.clone()),
        None => editor
            .selected_block()
            .map(|block| block.id().to_string())
            .ok_or_else(|| "No block selected. Pass --id or run 'block select'.".into()),
    }
}

impl BlockCommand {
    pub fn run(&self, config: &Config) -> CommandResult {
        with_draft(config, |editor| self.apply(editor))
    }

    fn apply(&self, editor: &mut Editor) -> CommandResult {
        match &self.command {
            BlockSubcommand::AddText => {
                let id = editor.add_text_block()?;
                editor.select_block(&id)?;
                println!("Added text block {}", id);
            }

            BlockSubcommand::AddImage => {
                let id = editor.add_image_block()?;
                editor.select_block(&id)?;
                println!("Added image block {}", id);
            }

            BlockSubcommand::Move { x, y, id } => {
                let id = target(editor, id)?;
                let (x, y) = editor.move_block(&id, *x, *y)?;
                println!("Moved block {} to ({}, {})", id, x, y);
            }

            BlockSubcommand::Resize {
                width,
                height,
                x,
                y,
                id,
            } => {
                if *width <= 0.0 || *height <= 0.0 {
                    return Err("Width and height must be positive".into());
                }
                let id = target(editor, id)?;
                let base = editor
                    .layout()
                    .find_block(&id)
                    .map(|block| block.base().clone())
                    .ok_or_else(|| format!("Block not found: {}", id))?;
                let x = x.unwrap_or(base.x);
                let y = y.unwrap_or(base.y);
                editor.resize_block(&id, *width, *height, x, y)?;
                println!("Resized block {} to {}x{} at ({}, {})", id, width, height, x, y);
            }

            BlockSubcommand::Rotate {
                degrees,
                towards,
                id,
            } => {
                let id = target(editor, id)?;
                let degrees = match (degrees, towards) {
                    (_, Some((px, py))) => editor.rotate_towards(&id, *px, *py)?,
                    (Some(degrees), None) => {
                        editor.rotate_block(&id, *degrees)?;
                        *degrees
                    }
                    (None, None) => return Err("Provide an angle or --towards".into()),
                };
                println!("Rotated block {} to {:.1}°", id, degrees);
            }

            BlockSubcommand::Text { content, id } => {
                let id = target(editor, id)?;
                editor.set_text(&id, content.as_str())?;
                println!("Updated text of block {}", id);
            }

            BlockSubcommand::Font {
                size,
                family,
                weight,
                italic,
                color,
                id,
            } => {
                let change = FontChange {
                    size: *size,
                    family: family.clone(),
                    weight: *weight,
                    italic: *italic,
                    color: color.clone(),
                };
                if change.is_empty() {
                    return Err("Nothing to update. Provide at least one option.".into());
                }
                if size.is_some_and(|size| size <= 0.0) {
                    return Err("Font size must be positive".into());
                }
                let id = target(editor, id)?;
                editor.set_font(&id, change)?;
                println!("Updated font of block {}", id);
            }

            BlockSubcommand::Opacity { opacity, id } => {
                let id = target(editor, id)?;
                let opacity = editor.set_opacity(&id, *opacity)?;
                println!("Set opacity of block {} to {}", id, opacity);
            }

            BlockSubcommand::Src { src, id } => {
                let id = target(editor, id)?;
                editor.set_image_src(&id, src.as_str())?;
                println!("Updated image of block {}", id);
            }

            BlockSubcommand::ClearImage { id } => {
                let id = target(editor, id)?;
                editor.clear_image(&id)?;
                println!("Cleared image of block {}", id);
            }

            BlockSubcommand::Raise { id } => {
                let id = target(editor, id)?;
                let z = editor.raise_block(&id)?;
                println!("Block {} is now on layer {}", id, z);
            }

            BlockSubcommand::Lower { id } => {
                let id = target(editor, id)?;
                let z = editor.lower_block(&id)?;
                println!("Block {} is now on layer {}", id, z);
            }

            BlockSubcommand::Select { id, none } => {
                if *none {
                    editor.clear_selection();
                    println!("Selection cleared");
                } else if let Some(id) = id {
                    editor.select_block(id)?;
                    println!("Selected block {}", id);
                }
            }

            BlockSubcommand::Delete { id } => {
                let id = target(editor, id)?;
                editor.delete_block(&id)?;
                println!("Deleted block {}", id);
            }
        }
        Ok(())
    }
}

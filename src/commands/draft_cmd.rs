use clap::{Args, Subcommand};
use neomanual::config::Config;
use neomanual_core::preview::Book;
use neomanual_core::{export, Editor, ManualLayout};
use std::path::PathBuf;

use super::{draft_store, load_editor, page_index, with_draft, CommandResult, OutputFormat};

#[derive(Args)]
pub struct DraftCommand {
    #[command(subcommand)]
    pub command: DraftSubcommand,
}

#[derive(Subcommand)]
pub enum DraftSubcommand {
    /// Start a new manual, discarding the draft and its history
    New {
        #[arg(long)]
        title: Option<String>,
    },

    /// Show the draft
    Show {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Set the manual title
    Title { title: String },

    /// Empty the manual (undoable)
    Clear,

    /// Write the manual as JSON to a file, or to stdout
    Export { path: Option<PathBuf> },

    /// Replace the draft with a manual read from a JSON file
    Load { path: PathBuf },

    /// Show the book spread at a page (default: the current page)
    Preview {
        page: Option<usize>,
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl DraftCommand {
    pub fn run(&self, config: &Config) -> CommandResult {
        match &self.command {
            DraftSubcommand::New { title } => {
                let layout = match title {
                    Some(title) => ManualLayout::new().with_title(title.as_str()),
                    None => ManualLayout::new(),
                };
                let editor = Editor::from_layout(layout).with_grid_size(config.grid_size.value);
                draft_store(config).save(&editor)?;
                println!("Started manual {}", editor.layout().id);
                Ok(())
            }

            DraftSubcommand::Show { format } => {
                let editor = load_editor(config)?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", export::to_json(editor.layout())?);
                    }
                    OutputFormat::Text => {
                        println!("{}", editor.layout());
                        println!(
                            "Current page: {} of {}",
                            editor.current_page_index() + 1,
                            editor.page_count()
                        );
                        if let Some(block) = editor.selected_block() {
                            println!("Selected: {}", block);
                        }
                        println!(
                            "Undo: {}  Redo: {}",
                            editor.history().undo_depth(),
                            editor.history().redo_depth()
                        );
                    }
                }
                Ok(())
            }

            DraftSubcommand::Title { title } => {
                with_draft(config, |editor| Ok(editor.set_title(title.as_str())?))?;
                println!("Title set to {}", title);
                Ok(())
            }

            DraftSubcommand::Clear => {
                with_draft(config, |editor| Ok(editor.clear()?))?;
                println!("Manual cleared. Run 'undo' to restore it.");
                Ok(())
            }

            DraftSubcommand::Export { path } => {
                let editor = load_editor(config)?;
                let json = export::to_json(editor.layout())?;
                match path {
                    Some(path) => {
                        std::fs::write(path, json)?;
                        println!("Exported manual to {}", path.display());
                    }
                    None => println!("{}", json),
                }
                Ok(())
            }

            DraftSubcommand::Load { path } => {
                let contents = std::fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
                let layout = export::from_json(&contents)?;
                let pages = layout.pages.len().max(1);
                with_draft(config, |editor| {
                    editor.replace_layout(layout);
                    Ok(())
                })?;
                println!("Loaded {} ({} page(s))", path.display(), pages);
                Ok(())
            }

            DraftSubcommand::Preview { page, format } => {
                let editor = load_editor(config)?;
                let index = match page {
                    Some(number) => page_index(*number)?,
                    None => editor.current_page_index(),
                };
                let book = Book::at(editor.layout(), index);
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&book.spread())?);
                    }
                    OutputFormat::Text => println!("{}", book),
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::test_config;
    use crate::commands::BlockCommand;

    fn run(config: &Config, command: DraftSubcommand) -> CommandResult {
        DraftCommand { command }.run(config)
    }

    #[test]
    fn test_new_discards_history() {
        let (config, _temp_dir) = test_config();
        with_draft(&config, |editor| Ok(editor.add_text_block()?)).unwrap();

        run(
            &config,
            DraftSubcommand::New {
                title: Some("Sonic".to_string()),
            },
        )
        .unwrap();

        let editor = load_editor(&config).unwrap();
        assert_eq!(editor.layout().title.as_deref(), Some("Sonic"));
        assert_eq!(editor.layout().block_count(), 0);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_export_then_load() {
        let (config, temp_dir) = test_config();
        let id = with_draft(&config, |editor| Ok(editor.add_image_block()?)).unwrap();
        let path = temp_dir.path().join("manual.json");

        run(&config, DraftSubcommand::Export { path: Some(path.clone()) }).unwrap();
        run(&config, DraftSubcommand::New { title: None }).unwrap();
        run(&config, DraftSubcommand::Load { path }).unwrap();

        let editor = load_editor(&config).unwrap();
        assert!(editor.layout().find_block(&id).is_some());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_load_invalid_file_keeps_draft() {
        let (config, temp_dir) = test_config();
        let id = with_draft(&config, |editor| Ok(editor.add_text_block()?)).unwrap();
        let path = temp_dir.path().join("broken.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let err = run(&config, DraftSubcommand::Load { path }).unwrap_err();
        assert!(err.to_string().starts_with("Invalid layout file"));
        assert!(load_editor(&config).unwrap().layout().find_block(&id).is_some());
    }

    #[test]
    fn test_clear_is_undoable() {
        let (config, _temp_dir) = test_config();
        BlockCommand {
            command: crate::commands::block::BlockSubcommand::AddText,
        }
        .run(&config)
        .unwrap();

        run(&config, DraftSubcommand::Clear).unwrap();
        assert_eq!(load_editor(&config).unwrap().layout().block_count(), 0);

        with_draft(&config, |editor| Ok(editor.undo())).unwrap();
        assert_eq!(load_editor(&config).unwrap().layout().block_count(), 1);
    }

    #[test]
    fn test_preview_out_of_range_is_clamped() {
        let (config, _temp_dir) = test_config();
        run(
            &config,
            DraftSubcommand::Preview {
                page: Some(9),
                format: OutputFormat::Json,
            },
        )
        .unwrap();
    }
}

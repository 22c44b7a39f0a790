use clap::{Args, Subcommand};
use neomanual::config::Config;
use neomanual_core::Editor;

use super::{page_index, with_draft, CommandResult};

#[derive(Args)]
pub struct PageCommand {
    #[command(subcommand)]
    pub command: PageSubcommand,
}

/// Page numbers start at 1.
#[derive(Subcommand)]
pub enum PageSubcommand {
    /// Append a blank page and go to it
    Add,

    /// Remove the current page
    Remove,

    /// Duplicate a page (default: the current one)
    Clone { page: Option<usize> },

    /// Move a page to another position
    Move { from: usize, to: usize },

    /// Go to a page
    Goto { page: usize },

    /// Go to the next page
    Next,

    /// Go to the previous page
    Prev,

    /// Set the background colour of the current page
    Background {
        #[arg(required_unless_present = "clear")]
        color: Option<String>,
        /// Reset to the default background
        #[arg(long, conflicts_with = "color")]
        clear: bool,
    },
}

fn position(editor: &Editor) -> String {
    format!(
        "Page {} of {}",
        editor.current_page_index() + 1,
        editor.page_count()
    )
}

impl PageCommand {
    pub fn run(&self, config: &Config) -> CommandResult {
        with_draft(config, |editor| self.apply(editor))
    }

    fn apply(&self, editor: &mut Editor) -> CommandResult {
        match &self.command {
            PageSubcommand::Add => {
                editor.add_page()?;
                println!("Added page. {}", position(editor));
            }

            PageSubcommand::Remove => {
                editor.remove_current_page()?;
                println!("Removed page. {}", position(editor));
            }

            PageSubcommand::Clone { page } => {
                let index = match page {
                    Some(number) => page_index(*number)?,
                    None => editor.current_page_index(),
                };
                editor.clone_page(index)?;
                println!("Cloned page {}. {}", index + 1, position(editor));
            }

            PageSubcommand::Move { from, to } => {
                editor.move_page(page_index(*from)?, page_index(*to)?)?;
                println!("Moved page {} to position {}", from, to);
            }

            PageSubcommand::Goto { page } => {
                editor.go_to_page(page_index(*page)?)?;
                println!("{}", position(editor));
            }

            PageSubcommand::Next => {
                if !editor.next_page() {
                    println!("Already on the last page");
                }
                println!("{}", position(editor));
            }

            PageSubcommand::Prev => {
                if !editor.previous_page() {
                    println!("Already on the first page");
                }
                println!("{}", position(editor));
            }

            PageSubcommand::Background { color, clear } => {
                let color = if *clear { None } else { color.clone() };
                editor.set_background(color.clone())?;
                match color {
                    Some(color) => println!("Background set to {}", color),
                    None => println!("Background reset"),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::load_editor;
    use crate::commands::testing::test_config;

    fn run(config: &Config, command: PageSubcommand) -> CommandResult {
        PageCommand { command }.run(config)
    }

    #[test]
    fn test_add_and_navigate() {
        let (config, _temp_dir) = test_config();
        run(&config, PageSubcommand::Add).unwrap();
        run(&config, PageSubcommand::Add).unwrap();
        assert_eq!(load_editor(&config).unwrap().current_page_index(), 2);

        run(&config, PageSubcommand::Goto { page: 1 }).unwrap();
        run(&config, PageSubcommand::Next).unwrap();
        assert_eq!(load_editor(&config).unwrap().current_page_index(), 1);

        assert!(run(&config, PageSubcommand::Goto { page: 4 }).is_err());
        assert!(run(&config, PageSubcommand::Goto { page: 0 }).is_err());
    }

    #[test]
    fn test_cannot_remove_last_page() {
        let (config, _temp_dir) = test_config();
        let err = run(&config, PageSubcommand::Remove).unwrap_err();
        assert_eq!(err.to_string(), "You must have at least one page.");
    }

    #[test]
    fn test_background() {
        let (config, _temp_dir) = test_config();
        run(
            &config,
            PageSubcommand::Background {
                color: Some("#000".to_string()),
                clear: false,
            },
        )
        .unwrap();
        let editor = load_editor(&config).unwrap();
        assert_eq!(
            editor.current_page().unwrap().background_color.as_deref(),
            Some("#000")
        );

        run(&config, PageSubcommand::Background { color: None, clear: true }).unwrap();
        let editor = load_editor(&config).unwrap();
        assert!(editor.current_page().unwrap().background_color.is_none());
    }
}

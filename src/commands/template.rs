use clap::{Args, Subcommand};
use neomanual::config::Config;
use neomanual_core::{builtin_templates, find_template, Block};

use super::{with_draft, CommandResult, OutputFormat};

#[derive(Args)]
pub struct TemplateCommand {
    #[command(subcommand)]
    pub command: TemplateSubcommand,
}

#[derive(Subcommand)]
pub enum TemplateSubcommand {
    /// List the built-in templates
    List {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Add a template's blocks to the current page
    Apply {
        /// Template name (case-insensitive)
        name: String,
    },
}

impl TemplateCommand {
    pub fn run(&self, config: &Config) -> CommandResult {
        match &self.command {
            TemplateSubcommand::List { format } => {
                let templates = builtin_templates();
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&templates)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<20}  {:>6}  {:>6}", "NAME", "TEXT", "IMAGES");
                        println!("{}", "-".repeat(36));
                        for template in &templates {
                            let texts = template
                                .blocks
                                .iter()
                                .filter(|block| matches!(block, Block::Text(_)))
                                .count();
                            let images = template.blocks.len() - texts;
                            println!("{:<20}  {:>6}  {:>6}", template.name, texts, images);
                        }
                    }
                }
                Ok(())
            }

            TemplateSubcommand::Apply { name } => {
                let template = find_template(name)
                    .ok_or_else(|| format!("Template not found: {}", name))?;
                let ids = with_draft(config, |editor| Ok(editor.apply_template(&template)?))?;
                println!("Applied template '{}' ({} block(s))", template.name, ids.len());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::load_editor;
    use crate::commands::testing::test_config;

    #[test]
    fn test_apply_template() {
        let (config, _temp_dir) = test_config();
        let command = TemplateCommand {
            command: TemplateSubcommand::Apply {
                name: "title page".to_string(),
            },
        };
        command.run(&config).unwrap();

        let editor = load_editor(&config).unwrap();
        assert_eq!(editor.current_page().unwrap().blocks.len(), 3);
        assert!(editor.can_undo());
    }

    #[test]
    fn test_unknown_template() {
        let (config, _temp_dir) = test_config();
        let command = TemplateCommand {
            command: TemplateSubcommand::Apply {
                name: "Credits".to_string(),
            },
        };
        let err = command.run(&config).unwrap_err();
        assert_eq!(err.to_string(), "Template not found: Credits");
    }
}

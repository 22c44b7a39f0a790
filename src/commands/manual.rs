use clap::{Args, Subcommand};
use neomanual::config::Config;
use neomanual::db::ManualRepository;
use neomanual::session::require_user;
use neomanual_core::preview;
use std::io::{self, Write};

use super::{draft_store, load_editor, with_draft, CommandResult, OutputFormat};

#[derive(Args)]
pub struct ManualCommand {
    #[command(subcommand)]
    pub command: ManualSubcommand,
}

/// Stored manuals belong to the signed-in user (see `auth login`).
#[derive(Subcommand)]
pub enum ManualSubcommand {
    /// Save the draft to the database
    Save,

    /// List your saved manuals
    List {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Open a saved manual as the draft
    Open { id: String },

    /// Open your most recently saved manual as the draft
    Latest,

    /// Rename a saved manual
    Rename { id: String, title: String },

    /// Delete a saved manual
    Delete {
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Show every spread of a saved manual
    Preview {
        id: String,
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ManualCommand {
    pub async fn run(&self, repo: &ManualRepository, config: &Config) -> CommandResult {
        let user_id = require_user(config)?;

        match &self.command {
            ManualSubcommand::Save => {
                let editor = load_editor(config)?;
                let id = repo.save_manual_with_pages(user_id, editor.layout()).await?;
                // Keep the draft pointing at the saved manual
                draft_store(config).save(&editor)?;
                println!(
                    "Saved manual {} ({} page(s), {} block(s))",
                    id,
                    editor.page_count(),
                    editor.layout().block_count()
                );
                Ok(())
            }

            ManualSubcommand::List { format } => {
                let manuals = repo.list_by_user(user_id).await?;

                if manuals.is_empty() {
                    println!("No manuals found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&manuals)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<36}  {:<30}  UPDATED", "ID", "TITLE");
                        println!("{}", "-".repeat(86));
                        for manual in &manuals {
                            let title = if manual.title.chars().count() > 30 {
                                let short: String = manual.title.chars().take(27).collect();
                                format!("{}...", short)
                            } else {
                                manual.title.clone()
                            };
                            println!(
                                "{:<36}  {:<30}  {}",
                                manual.id,
                                title,
                                manual.updated_at.format("%Y-%m-%d %H:%M")
                            );
                        }
                        println!("\nTotal: {} manual(s)", manuals.len());
                    }
                }
                Ok(())
            }

            ManualSubcommand::Open { id } => {
                let layout = repo
                    .fetch_layout_for_user(user_id, id)
                    .await?
                    .ok_or_else(|| format!("Manual not found: {}", id))?;
                let title = layout.display_title().unwrap_or("Untitled Manual").to_string();
                with_draft(config, |editor| {
                    editor.replace_layout(layout);
                    Ok(())
                })?;
                println!("Opened {}", title);
                Ok(())
            }

            ManualSubcommand::Latest => {
                let layout = repo
                    .fetch_latest_for_user(user_id)
                    .await?
                    .ok_or("No saved manuals")?;
                let id = layout.id.clone();
                with_draft(config, |editor| {
                    editor.replace_layout(layout);
                    Ok(())
                })?;
                println!("Opened manual {}", id);
                Ok(())
            }

            ManualSubcommand::Rename { id, title } => {
                let title = title.trim();
                if title.is_empty() {
                    return Err("Title cannot be empty".into());
                }
                if !repo.update_title(user_id, id, title).await? {
                    return Err(format!("Manual not found: {}", id).into());
                }
                println!("Renamed manual {} to {}", id, title);
                Ok(())
            }

            ManualSubcommand::Delete { id, force } => {
                if !force {
                    print!("Delete manual '{}'? [y/N] ", id);
                    io::stdout().flush()?;

                    let mut input = String::new();
                    io::stdin().read_line(&mut input)?;

                    if !input.trim().eq_ignore_ascii_case("y") {
                        println!("Deletion cancelled.");
                        return Ok(());
                    }
                }

                if !repo.delete(user_id, id).await? {
                    return Err(format!("Manual not found: {}", id).into());
                }
                println!("Deleted manual {}", id);
                Ok(())
            }

            ManualSubcommand::Preview { id, format } => {
                let layout = repo
                    .fetch_layout_for_user(user_id, id)
                    .await?
                    .ok_or_else(|| format!("Manual not found: {}", id))?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&preview::spreads(&layout))?);
                    }
                    OutputFormat::Text => {
                        let mut book = preview::Book::new(&layout);
                        loop {
                            println!("{}\n", book);
                            if !book.next() {
                                break;
                            }
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

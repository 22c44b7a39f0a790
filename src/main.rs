use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{
    with_draft, AuthCommand, BlockCommand, ConfigCommand, DraftCommand, GenerateCommand,
    ManualCommand, PageCommand, TemplateCommand,
};
use neomanual::config::Config;
use neomanual::db::{init_db, ManualRepository};

#[derive(Parser)]
#[command(name = "neomanual")]
#[command(version)]
#[command(about = "Lay out instruction manuals page by page", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the working draft
    Draft(DraftCommand),

    /// Edit blocks on the current page
    Block(BlockCommand),

    /// Add, remove and navigate pages
    Page(PageCommand),

    /// Apply predefined page layouts
    Template(TemplateCommand),

    /// Undo the last change to the draft
    Undo,

    /// Redo the last undone change
    Redo,

    /// Generate an image and add it to the current page
    Generate(GenerateCommand),

    /// Save and open manuals in the database
    Manual(ManualCommand),

    /// Sign in and out
    Auth(AuthCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Draft(cmd)) => cmd.run(&config)?,
        Some(Commands::Block(cmd)) => cmd.run(&config)?,
        Some(Commands::Page(cmd)) => cmd.run(&config)?,
        Some(Commands::Template(cmd)) => cmd.run(&config)?,
        Some(Commands::Undo) => {
            if with_draft(&config, |editor| Ok(editor.undo()))? {
                println!("Undone");
            } else {
                println!("Nothing to undo");
            }
        }
        Some(Commands::Redo) => {
            if with_draft(&config, |editor| Ok(editor.redo()))? {
                println!("Redone");
            } else {
                println!("Nothing to redo");
            }
        }
        Some(Commands::Generate(cmd)) => cmd.run(&config).await?,
        Some(Commands::Manual(cmd)) => {
            let pool = init_db(&config.database_path.value).await?;
            let repo = ManualRepository::new(pool);
            cmd.run(&repo, &config).await?;
        }
        Some(Commands::Auth(cmd)) => cmd.run(&config)?,
        Some(Commands::Config(cmd)) => cmd.run(&config)?,
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}

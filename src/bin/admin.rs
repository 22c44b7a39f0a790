//! neomanual admin CLI
//!
//! Manages user profiles and the tokens accepted by the admin endpoint.
//!
//! # Usage
//!
//! ```bash
//! neomanual-admin profile add ann@example.com --status active
//! neomanual-admin profile list
//! neomanual-admin profile status ann@example.com canceled
//! neomanual-admin token create dashboard
//! neomanual-admin token revoke dashboard
//! ```
//!
//! # Environment Variables
//!
//! - `NEOMANUAL_DATABASE_PATH`: Server database (default: ~/.local/share/neomanual/neomanual.db)

use clap::{Args, Parser, Subcommand};
use neomanual::db::{init_db, ProfileRepository, TokenRepository};
use neomanual::server::default_database_path;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ============================================================================
// CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "neomanual-admin")]
#[command(version)]
#[command(about = "neomanual server administration tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage user profiles
    Profile(ProfileCommand),
    /// Manage admin endpoint tokens
    Token(TokenCommand),
}

#[derive(Args)]
struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Subcommand)]
enum ProfileSubcommand {
    /// Add a profile
    Add {
        /// User's email address
        email: String,
        /// Subscription status
        #[arg(long, short, default_value = "free")]
        status: String,
    },
    /// List all profiles
    List,
    /// Change a profile's subscription status
    Status {
        email: String,
        status: String,
    },
    /// Remove a profile
    Remove {
        email: String,
    },
}

#[derive(Args)]
struct TokenCommand {
    #[command(subcommand)]
    command: TokenSubcommand,
}

#[derive(Subcommand)]
enum TokenSubcommand {
    /// Create a token; it is printed once and stored hashed
    Create {
        /// Name to recognise the token by
        label: String,
    },
    /// List tokens
    List,
    /// Revoke every token with this label
    Revoke {
        label: String,
    },
}

fn database_path() -> PathBuf {
    std::env::var("NEOMANUAL_DATABASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_database_path())
}

// ============================================================================
// Commands
// ============================================================================

async fn run_profile(
    repo: &ProfileRepository,
    command: ProfileSubcommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        ProfileSubcommand::Add { email, status } => {
            if repo.get_by_email(&email).await?.is_some() {
                return Err(format!("Profile '{}' already exists", email).into());
            }
            let profile = repo.add(&email, &status).await?;
            println!("Added profile: {}", profile.email);
            println!("  Status: {}", profile.subscription_status);
        }
        ProfileSubcommand::List => {
            let profiles = repo.list().await?;
            if profiles.is_empty() {
                println!("No profiles registered.");
                return Ok(());
            }

            println!("{:<40} {:<16} {:<20}", "EMAIL", "STATUS", "CREATED");
            println!("{}", "-".repeat(80));
            for profile in &profiles {
                let created = profile
                    .created_at()
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| profile.created_at.clone());
                println!(
                    "{:<40} {:<16} {:<20}",
                    profile.email, profile.subscription_status, created
                );
            }
            println!();
            println!("Total: {} profile(s)", profiles.len());
        }
        ProfileSubcommand::Status { email, status } => {
            if !repo.set_status(&email, &status).await? {
                return Err(format!("Profile '{}' not found", email).into());
            }
            println!("Updated profile: {} ({})", email, status);
        }
        ProfileSubcommand::Remove { email } => {
            if !repo.remove(&email).await? {
                return Err(format!("Profile '{}' not found", email).into());
            }
            println!("Removed profile: {}", email);
        }
    }
    Ok(())
}

async fn run_token(
    repo: &TokenRepository,
    command: TokenSubcommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        TokenSubcommand::Create { label } => {
            let token = repo.create(&label).await?;
            println!("Created token '{}':", label);
            println!("  {}", token);
            println!("Store it now; it cannot be shown again.");
        }
        TokenSubcommand::List => {
            let tokens = repo.list().await?;
            if tokens.is_empty() {
                println!("No tokens.");
                return Ok(());
            }

            println!("{:<24} {:<20} {:<32}", "LABEL", "HASH", "CREATED");
            println!("{}", "-".repeat(80));
            for token in &tokens {
                let hash: String = token.token_hash.chars().take(16).collect();
                println!("{:<24} {:<20} {:<32}", token.label, hash, token.created_at);
            }
            println!();
            println!("Total: {} token(s)", tokens.len());
        }
        TokenSubcommand::Revoke { label } => {
            let revoked = repo.revoke(&label).await?;
            if revoked == 0 {
                return Err(format!("No token labelled '{}'", label).into());
            }
            println!("Revoked {} token(s) labelled '{}'", revoked, label);
        }
    }
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let pool = init_db(&database_path()).await?;

    match cli.command {
        Commands::Profile(cmd) => run_profile(&ProfileRepository::new(pool), cmd.command).await,
        Commands::Token(cmd) => run_token(&TokenRepository::new(pool), cmd.command).await,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

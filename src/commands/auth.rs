//! Sign-in commands. Saved manuals are stored under the signed-in user id.

use clap::{Args, Subcommand};
use neomanual::config::Config;
use neomanual::session;

use super::CommandResult;

#[derive(Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    command: AuthSubcommand,
}

#[derive(Subcommand)]
enum AuthSubcommand {
    /// Sign in as a user
    Login { user_id: String },
    /// Sign out
    Logout,
    /// Show who is signed in
    Status,
}

impl AuthCommand {
    pub fn run(&self, config: &Config) -> CommandResult {
        let config_path = config.writable_config_path();

        match &self.command {
            AuthSubcommand::Login { user_id } => {
                session::login(&config_path, user_id)?;
                println!("Signed in as {}", user_id.trim());
            }
            AuthSubcommand::Logout => {
                if session::logout(&config_path)? {
                    println!("Signed out.");
                } else {
                    println!("Already signed out.");
                }
            }
            AuthSubcommand::Status => match session::require_user(config) {
                Ok(user_id) => println!("Signed in as {}", user_id),
                Err(_) => println!("Not signed in. Run 'neomanual auth login <user-id>'."),
            },
        }
        Ok(())
    }
}

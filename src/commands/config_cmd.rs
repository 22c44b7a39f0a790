use clap::{Args, Subcommand};
use neomanual::config::{Config, ConfigValue};
use std::fmt::Display;

use super::{CommandResult, OutputFormat};

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

fn print_value<T>(name: &str, value: &ConfigValue<T>, display: impl Display) {
    println!("{}: {}", name, display);
    println!("  source: {}", value.source);
    println!();
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> CommandResult {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        match &config.config_file {
                            Some(path) => println!("Config file: {}", path.display()),
                            None => println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            ),
                        }
                        println!();

                        print_value(
                            "database_path",
                            &config.database_path,
                            config.database_path.value.display(),
                        );
                        print_value(
                            "draft_path",
                            &config.draft_path,
                            config.draft_path.value.display(),
                        );
                        print_value(
                            "image_server_url",
                            &config.image_server_url,
                            &config.image_server_url.value,
                        );
                        print_value("grid_size", &config.grid_size, config.grid_size.value);

                        println!(
                            "session.user_id: {}",
                            config.session.user_id.as_deref().unwrap_or("(not signed in)")
                        );
                    }
                }
                Ok(())
            }
        }
    }
}

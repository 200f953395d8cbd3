use clap::{Args, Subcommand};

use crate::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show,
    /// Print the config file path
    Path,
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show => {
                println!("Configuration");
                println!("=============");
                println!();
                println!("database_path: {}", config.database_path.display());
                println!(
                    "remote: {}",
                    if config.remote.is_configured() {
                        "configured"
                    } else {
                        "not configured"
                    }
                );
                if let Some(uid) = &config.remote.user_id {
                    println!("user_id: {}", uid);
                }
                println!("sync.max_retries: {}", config.sync.max_retries);
                println!("sync.backoff_secs: {}", config.sync.backoff_secs);
                println!(
                    "ai: {}",
                    if config.ai.api_key.is_some() {
                        "configured"
                    } else {
                        "not configured"
                    }
                );
            }
            ConfigSubcommand::Path => {
                println!("{}", Config::default_config_path().display());
            }
        }
        Ok(())
    }
}

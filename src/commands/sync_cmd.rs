//! Sync CLI commands.

use clap::{Args, Subcommand};

use crate::config::Config;
use crate::remote::{check_server, RemoteStore};
use crate::sync::{SyncOutcome, SyncWorker};

/// Sync with the cloud mirror
#[derive(Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    command: Option<SyncSubcommand>,
}

#[derive(Subcommand)]
enum SyncSubcommand {
    /// Show sync configuration and server status
    Status,
}

impl SyncCommand {
    pub async fn run<R: RemoteStore + 'static>(
        &self,
        worker: &SyncWorker<R>,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            None => self.sync(worker).await,
            Some(SyncSubcommand::Status) => self.status(config).await,
        }
    }

    async fn sync<R: RemoteStore + 'static>(
        &self,
        worker: &SyncWorker<R>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        println!("Syncing with server...");

        match worker.run().await {
            SyncOutcome::Completed => {
                println!("Sync complete.");
                Ok(())
            }
            SyncOutcome::Retry => Err("sync failed; check the log and try again".into()),
        }
    }

    async fn status(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        println!("Sync Configuration");
        println!("==================");
        println!();

        if !config.remote.is_configured() {
            println!("Status: Not configured");
            println!();
            println!("To enable sync, add to your config file:");
            println!();
            println!("  remote:");
            println!("    server_url: \"https://sync.example.com\"");
            println!("    api_key: \"your-api-key\"");
            println!("    user_id: \"your-user-id\"");
            println!();
            println!("Or set environment variables:");
            println!("  FOCUSLIVE_SERVER_URL");
            println!("  FOCUSLIVE_API_KEY");
            println!("  FOCUSLIVE_USER_ID");
            return Ok(());
        }

        // is_configured() guarantees both are present.
        let server_url = config.remote.server_url.as_deref().unwrap_or_default();
        let api_key = config.remote.api_key.as_deref().unwrap_or_default();

        println!("Server:  {}", server_url);
        println!("API Key: {}...", &api_key[..api_key.len().min(8)]);
        match &config.remote.user_id {
            Some(uid) => println!("User:    {}", uid),
            None => println!("User:    (not signed in)"),
        }
        println!();

        print!("Server status: ");
        if check_server(server_url).await {
            println!("✓ reachable");
        } else {
            println!("✗ unreachable");
        }

        Ok(())
    }
}

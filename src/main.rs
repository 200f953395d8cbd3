use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use focuslive::ai::BrainDumpClient;
use focuslive::commands::{
    BraindumpCommand, ConfigCommand, FinanceCommand, HabitCommand, NoteCommand, SyncCommand,
    TaskCommand,
};
use focuslive::config::Config;
use focuslive::db::{init_db, HabitStore, NoteStore, TaskStore, TransactionStore};
use focuslive::remote::{check_server, HttpRemoteStore};
use focuslive::repo::{HabitRepository, NoteRepository, TaskRepository, TransactionRepository};
use focuslive::sync::{sync_channel, SyncOutcome, SyncWorker};

#[derive(Parser)]
#[command(name = "focuslive")]
#[command(version)]
#[command(about = "Offline-first tasks, notes, habits and finance tracking")]
struct Cli {
    /// Path to the config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage tasks
    Task(TaskCommand),
    /// Manage notes
    Note(NoteCommand),
    /// Manage habits
    Habit(HabitCommand),
    /// Track income and expenses
    Finance(FinanceCommand),
    /// Sync with the cloud mirror
    Sync(SyncCommand),
    /// Turn free text into tasks
    Braindump(BraindumpCommand),
    /// Inspect configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "focuslive=warn".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load(cli.config)?;

    if let Commands::Config(cmd) = &cli.command {
        return cmd.run(&config);
    }

    let pool = init_db(config.database_path.clone()).await?;
    let remote = Arc::new(HttpRemoteStore::from_config(&config.remote));
    let (sync_handle, mut sync_rx) = sync_channel();

    let tasks = Arc::new(TaskRepository::new(
        TaskStore::new(pool.clone()),
        remote.clone(),
        sync_handle.clone(),
    ));
    let notes = Arc::new(NoteRepository::new(
        NoteStore::new(pool.clone()),
        remote.clone(),
        sync_handle.clone(),
    ));
    let habits = Arc::new(HabitRepository::new(
        HabitStore::new(pool.clone()),
        remote.clone(),
        sync_handle.clone(),
    ));
    let finance = Arc::new(TransactionRepository::new(
        TransactionStore::new(pool.clone()),
        remote.clone(),
        sync_handle,
    ));

    let worker = SyncWorker::new(tasks.clone(), notes.clone(), habits.clone(), finance.clone());

    match cli.command {
        Commands::Task(cmd) => cmd.run(&tasks).await?,
        Commands::Note(cmd) => cmd.run(&notes).await?,
        Commands::Habit(cmd) => cmd.run(&habits).await?,
        Commands::Finance(cmd) => cmd.run(&finance).await?,
        Commands::Sync(cmd) => {
            cmd.run(&worker, &config).await?;
            return Ok(());
        }
        Commands::Braindump(cmd) => {
            let client = BrainDumpClient::from_config(&config.ai)?;
            cmd.run(&client, &tasks).await?;
        }
        Commands::Config(_) => unreachable!("handled before opening the database"),
    }

    flush_pending_sync(&mut sync_rx, &worker, &config).await;
    Ok(())
}

/// Run any sync request queued by the command before the process exits.
///
/// A long-lived host would hand the receiver to `SyncScheduler::spawn`
/// instead; a one-shot CLI has nothing to retry against, so a failed
/// job just leaves the rows dirty for the next explicit sync.
async fn flush_pending_sync(
    sync_rx: &mut mpsc::Receiver<()>,
    worker: &SyncWorker<HttpRemoteStore>,
    config: &Config,
) {
    if sync_rx.try_recv().is_err() {
        return;
    }
    if !config.remote.is_configured() {
        tracing::debug!("Sync requested but remote is not configured; skipping");
        return;
    }
    if let Some(url) = &config.remote.server_url {
        if !check_server(url).await {
            eprintln!("Server unreachable; changes saved locally. Run 'focuslive sync' later.");
            return;
        }
    }
    if worker.run().await == SyncOutcome::Retry {
        eprintln!("Sync incomplete; run 'focuslive sync' to retry.");
    }
}

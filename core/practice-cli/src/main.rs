//! practice: terminal client for the practice log.
//!
//! ## Subcommands
//!
//! - `add`, `list`, `remove`: manage the pool of items to practice
//! - `start`, `stop`, `status`, `discard`: run a timed session; `stop`
//!   walks through classifying the pool
//! - `history`, `archive`, `note`, `delete-session`, `share`: past sessions
//! - `export`, `import`: move data between installs

mod classify;
mod commands;
mod error;
mod logging;
mod render;

use clap::{Parser, Subcommand};
use practice_core::{PracticeEngine, StorageConfig};
use std::path::PathBuf;

use crate::error::CliResult;

#[derive(Parser)]
#[command(name = "practice")]
#[command(about = "Practice log with timed sessions")]
#[command(version)]
struct Cli {
    /// Data directory (defaults to ~/.practice-log)
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add items to the pool, one per argument (or per line)
    Add {
        #[arg(value_name = "TEXT", required = true)]
        texts: Vec<String>,
    },

    /// List the pool
    List,

    /// Delete a pool item
    Remove {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Start a practice session
    Start,

    /// Stop the running session and classify the pool
    Stop,

    /// Show the running session, if any
    Status,

    /// Drop the running session without logging it
    Discard,

    /// List past sessions, most recent first
    History,

    /// Show items worked on and items completed
    Archive,

    /// Attach a note to a past session
    Note {
        #[arg(value_name = "SESSION_ID")]
        session_id: String,

        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Delete a past session
    DeleteSession {
        #[arg(value_name = "SESSION_ID")]
        session_id: String,
    },

    /// Print a past session as shareable text
    Share {
        #[arg(value_name = "SESSION_ID")]
        session_id: String,
    },

    /// Write all data to a JSON file
    Export {
        /// Output file (defaults to practice-log_<date>.json)
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,
    },

    /// Replace all data with an exported JSON file
    Import {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}

fn run(engine: &mut PracticeEngine, command: Commands) -> CliResult<()> {
    match command {
        Commands::Add { texts } => commands::add(engine, &texts),
        Commands::List => commands::list(engine),
        Commands::Remove { id } => commands::remove(engine, &id),
        Commands::Start => commands::start(engine),
        Commands::Stop => commands::stop(engine),
        Commands::Status => commands::status(engine),
        Commands::Discard => commands::discard(engine),
        Commands::History => commands::history(engine),
        Commands::Archive => commands::archive(engine),
        Commands::Note { session_id, text } => commands::note(engine, &session_id, &text),
        Commands::DeleteSession { session_id } => commands::delete_session(engine, &session_id),
        Commands::Share { session_id } => commands::share(engine, &session_id),
        Commands::Export { path } => commands::export(engine, path),
        Commands::Import { path } => commands::import(engine, &path),
    }
}

fn main() {
    let cli = Cli::parse();
    let storage = cli
        .root
        .map(StorageConfig::with_root)
        .unwrap_or_default();
    let _logging_guard = logging::init(&storage.logs_dir());

    let mut engine = PracticeEngine::with_storage(storage);
    if engine.started_fresh() {
        eprintln!("Warning: stored practice data was unreadable; a backup was kept and a fresh log started");
    }

    if let Err(e) = run(&mut engine, cli.command) {
        tracing::error!(error = %e, "practice command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

//! BrainTrip - quiz-driven trip planner
//!
//! CLI entry point for planning sessions and trip management.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::info;

use std::time::Duration;

use braintrip::cli::{Cli, Command};
use braintrip::config::Config;
use braintrip::generation::create_client;
use braintrip::repl::ReplSession;
use braintrip::session::{DraftAutosave, SessionController};
use tripstore::{DraftStore, TripStore, UserStore};

fn setup_logging(config: &Config, verbose: bool) -> Result<()> {
    // Logs go to a file so the interactive session stays clean.
    let log_dir = PathBuf::from(&config.storage.log_dir);
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(log_dir.join("braintrip.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    setup_logging(&config, cli.verbose).context("Failed to setup logging")?;

    info!(
        "BrainTrip loaded config: provider={}, model={}",
        config.generation.provider, config.generation.model
    );

    match cli.command {
        Some(Command::Plan { city, hotel, hands_free }) => cmd_plan(&config, city, hotel, hands_free).await,
        Some(Command::Trips) => cmd_trips(&config),
        Some(Command::Delete { trip_id }) => cmd_delete(&config, &trip_id),
        None => cmd_plan(&config, None, None, false).await,
    }
}

/// Run the interactive planning session
async fn cmd_plan(config: &Config, city: Option<String>, hotel: Option<String>, hands_free: bool) -> Result<()> {
    config.validate()?;

    let trips = TripStore::open(&config.storage.store_dir).context("Failed to open trip store")?;
    let drafts = DraftStore::open(&config.storage.store_dir).context("Failed to open draft store")?;
    let users = UserStore::open(&config.storage.store_dir).context("Failed to open user store")?;

    let client = create_client(&config.generation).context("Failed to create generation client")?;
    let autosave = DraftAutosave::spawn(drafts.clone(), Duration::from_millis(config.autosave.debounce_ms));
    let controller = SessionController::new(trips.clone(), drafts, autosave, client);

    let mut repl = ReplSession::new(controller, trips, users);
    repl.run(city, hotel, hands_free).await
}

/// List saved trips
fn cmd_trips(config: &Config) -> Result<()> {
    let trips = TripStore::open(&config.storage.store_dir).context("Failed to open trip store")?;
    let all = trips.list().context("Failed to read trips")?;

    if all.is_empty() {
        println!("No saved trips yet. Run {} to plan one.", "braintrip plan".yellow());
        return Ok(());
    }

    for trip in &all {
        println!("{}  {} ({} item(s))", trip.id.dimmed(), trip.city.bright_white(), trip.items.len());
    }
    Ok(())
}

/// Delete a saved trip by id
fn cmd_delete(config: &Config, trip_id: &str) -> Result<()> {
    let trips = TripStore::open(&config.storage.store_dir).context("Failed to open trip store")?;
    if trips.delete(trip_id).context("Failed to delete trip")? {
        println!("Deleted trip {}", trip_id);
    } else {
        println!("No trip with id {}", trip_id);
    }
    Ok(())
}

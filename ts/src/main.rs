use chrono::TimeZone;
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use tripstore::cli::{Cli, Command};
use tripstore::config::Config;
use tripstore::{DraftStore, SavedTrip, TripStore, UserStore};

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();
    Ok(())
}

fn format_created(created_at: i64) -> String {
    chrono::Utc
        .timestamp_millis_opt(created_at)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| created_at.to_string())
}

fn print_trip(trip: &SavedTrip) {
    println!("{} {}", trip.city.cyan().bold(), format!("({})", trip.id).dimmed());
    println!(
        "  created {} | start: {}",
        format_created(trip.created_at),
        trip.hotel_location.as_deref().unwrap_or("City Center")
    );
    if !trip.trip_notes.is_empty() {
        println!("  notes: {}", trip.trip_notes);
    }
    for (idx, item) in trip.items.iter().enumerate() {
        let marker = if item.completed { "✓".green() } else { "·".normal() };
        println!("  {} {}. {} [{}]", marker, idx + 1, item.title(), item.poi.category);
        if !item.notes.is_empty() {
            println!("       {}", item.notes.dimmed());
        }
    }
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("tripstore starting");

    match cli.command {
        Command::List => {
            let store = TripStore::open(&config.store_path)?;
            let trips = store.list()?;
            if trips.is_empty() {
                println!("No saved trips.");
            }
            for trip in &trips {
                println!(
                    "{}  {}  {} items  {}",
                    trip.id.dimmed(),
                    trip.city.cyan(),
                    trip.items.len(),
                    format_created(trip.created_at)
                );
            }
        }
        Command::Show { trip_id } => {
            let store = TripStore::open(&config.store_path)?;
            match store.get(&trip_id)? {
                Some(trip) => print_trip(&trip),
                None => println!("{} No trip with id {}", "✗".red(), trip_id),
            }
        }
        Command::Delete { trip_id } => {
            let store = TripStore::open(&config.store_path)?;
            if store.delete(&trip_id)? {
                println!("{} Deleted trip {}", "✓".green(), trip_id.cyan());
            } else {
                println!("{} No trip with id {}", "✗".red(), trip_id);
            }
        }
        Command::Draft => {
            let store = DraftStore::open(&config.store_path)?;
            match store.load()? {
                Some(draft) => {
                    println!("{} ({} items)", draft.city.cyan().bold(), draft.items.len());
                    for item in &draft.items {
                        println!("  - {}", item.title());
                    }
                    if !draft.trip_notes.is_empty() {
                        println!("  notes: {}", draft.trip_notes);
                    }
                }
                None => println!("No draft."),
            }
        }
        Command::ClearDraft => {
            let store = DraftStore::open(&config.store_path)?;
            store.clear()?;
            println!("{} Draft cleared", "✓".green());
        }
        Command::Users => {
            let store = UserStore::open(&config.store_path)?;
            let users = store.list()?;
            if users.is_empty() {
                println!("No accounts.");
            }
            for user in &users {
                println!("{}  {}", user.email.cyan(), user.name);
            }
        }
    }

    Ok(())
}

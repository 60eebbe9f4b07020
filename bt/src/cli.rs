//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// BrainTrip - quiz-driven trip planner
#[derive(Parser)]
#[command(
    name = "braintrip",
    about = "Plan a city trip from a trivia quiz to a saved itinerary",
    version,
    after_help = "Logs are written to: ~/.local/share/braintrip/logs/braintrip.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Start an interactive planning session
    Plan {
        /// City to start planning immediately
        city: Option<String>,

        /// Hotel or neighborhood to anchor suggestions
        #[arg(short = 'H', long)]
        hotel: Option<String>,

        /// Fetch suggestions automatically after the quiz
        #[arg(long)]
        hands_free: bool,
    },

    /// List saved trips
    Trips,

    /// Delete a saved trip by id
    Delete {
        /// Trip id (see `braintrip trips`)
        trip_id: String,
    },
}

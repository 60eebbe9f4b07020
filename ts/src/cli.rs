//! CLI argument parsing for tripstore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ts")]
#[command(author, version, about = "BrainTrip trip storage", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List saved trips
    List,

    /// Show a saved trip in full
    Show {
        /// Trip ID to show
        #[arg(required = true)]
        trip_id: String,
    },

    /// Delete a saved trip
    Delete {
        /// Trip ID to delete
        #[arg(required = true)]
        trip_id: String,
    },

    /// Show the autosaved draft
    Draft,

    /// Clear the autosaved draft
    ClearDraft,

    /// List known accounts
    Users,
}

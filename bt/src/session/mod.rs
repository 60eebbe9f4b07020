//! Session module for BrainTrip
//!
//! The controller owns the active planning session; the autosave actor
//! persists debounced draft snapshots behind it.

mod autosave;
mod controller;

pub use autosave::DraftAutosave;
pub use controller::{EnrichmentTicket, SessionController};

//! Domain types for trip planning
//!
//! Persisted types live in the tripstore crate; this module re-exports
//! them and adds the transient quiz types.

mod quiz;

pub use quiz::QuizQuestion;
pub use tripstore::{Category, Coordinates, DraftTrip, ItineraryItem, PointOfInterest, SavedTrip, User, now_ms};

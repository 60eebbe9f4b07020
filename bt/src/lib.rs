//! BrainTrip - quiz-driven trip planner
//!
//! BrainTrip turns a city name into a trivia quiz, the quiz topics into
//! personalized place suggestions, and the suggestions into an editable
//! itinerary that is saved, resumed, and reordered. The session
//! controller keeps the in-progress session, the autosaved draft, and
//! the library of saved trips mutually consistent.
//!
//! # Core Concepts
//!
//! - **Merge on revisit**: starting a session for an already-saved city
//!   binds to that trip instead of creating a duplicate
//! - **Write-through**: bound sessions persist every mutation; the
//!   first item added to a fresh session creates and binds a trip
//! - **Debounced draft**: every session change queues a draft snapshot,
//!   coalesced over a quiet period and flushed on exit
//!
//! # Modules
//!
//! - [`session`] - Session controller and draft autosave actor
//! - [`itinerary`] - Ordered itinerary operations (value semantics)
//! - [`generation`] - Generation client trait and Gemini implementation
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod generation;
pub mod itinerary;
pub mod repl;
pub mod session;

// Re-export commonly used types
pub use config::{Config, GenerationConfig};
pub use domain::QuizQuestion;
pub use generation::{GenerationClient, GenerationError, create_client};
pub use itinerary::ItemUpdate;
pub use session::{DraftAutosave, EnrichmentTicket, SessionController};

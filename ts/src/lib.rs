//! TripStore - durable storage for BrainTrip planning data
//!
//! Four JSON snapshot slots under one store directory:
//!
//! ```text
//! <store>/
//! ├── trips.json    # saved-trip collection, newest-created first
//! ├── draft.json    # the single autosaved scratch session
//! ├── user.json     # current signed-in user
//! └── users.json    # credential list
//! ```
//!
//! Every write persists a complete slot (last write wins); there are no
//! partial or delta writes. This is a single-session, single-device
//! design - concurrent writers would clobber each other and that is
//! accepted.
//!
//! # Example
//!
//! ```ignore
//! use tripstore::{SavedTrip, TripStore};
//!
//! let store = TripStore::open("~/.local/share/braintrip")?;
//! store.create(SavedTrip::new("Paris", None, vec![], ""))?;
//! let paris = store.find_by_city("paris ")?;
//! ```

pub mod cli;
pub mod config;
pub mod model;
pub mod store;
pub mod users;

pub use model::{Category, Coordinates, DraftTrip, ItineraryItem, PointOfInterest, SavedTrip, now_ms};
pub use store::{DraftStore, StoreError, StoreResult, TripId, TripStore, find_trip_for_city, normalize_city};
pub use users::{AuthError, User, UserStore};

/// Slot file holding the saved-trip collection
pub const TRIPS_FILE: &str = "trips.json";

/// Slot file holding the autosaved draft
pub const DRAFT_FILE: &str = "draft.json";

/// Slot file holding the current signed-in user
pub const USER_FILE: &str = "user.json";

/// Slot file holding the credential list
pub const USERS_FILE: &str = "users.json";

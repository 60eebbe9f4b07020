//! Trip collection and draft slot stores
//!
//! Each store owns one JSON slot file under the store directory and
//! always writes the complete snapshot (last write wins). Callers above
//! the repository layer treat write failures as non-fatal.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::model::{DraftTrip, SavedTrip};
use crate::{DRAFT_FILE, TRIPS_FILE};

/// Unique identifier for a saved trip
pub type TripId = String;

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt store data: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Result of store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Normalize a city name for merge matching: lowercase + trim.
/// Display strings keep their original casing.
pub fn normalize_city(city: &str) -> String {
    city.trim().to_lowercase()
}

/// Find the saved trip for a city, matching case-insensitively and
/// trimmed. Pure function, decoupled from I/O, so the merge rule is
/// testable on its own.
pub fn find_trip_for_city<'a>(trips: &'a [SavedTrip], city: &str) -> Option<&'a SavedTrip> {
    let wanted = normalize_city(city);
    trips.iter().find(|t| normalize_city(&t.city) == wanted)
}

/// Durable keyed collection of saved trips
///
/// The whole collection is one JSON snapshot. New trips are prepended;
/// updates replace in place and never reorder. At most one trip exists
/// per normalized city; the session layer enforces this by binding to
/// the existing trip on revisit.
#[derive(Debug, Clone)]
pub struct TripStore {
    dir: PathBuf,
}

impl TripStore {
    /// Open or create a trip store rooted at the given directory
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!(?dir, "Opened trip store");
        Ok(Self { dir })
    }

    fn slot_path(&self) -> PathBuf {
        self.dir.join(TRIPS_FILE)
    }

    /// All saved trips, newest-created first
    pub fn list(&self) -> StoreResult<Vec<SavedTrip>> {
        let path = self.slot_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, trips: &[SavedTrip]) -> StoreResult<()> {
        let content = serde_json::to_string(trips)?;
        fs::write(self.slot_path(), content)?;
        debug!(count = trips.len(), "Wrote trip collection");
        Ok(())
    }

    /// Get a trip by id
    pub fn get(&self, id: &str) -> StoreResult<Option<SavedTrip>> {
        Ok(self.list()?.into_iter().find(|t| t.id == id))
    }

    /// Find the trip for a city using normalized matching
    pub fn find_by_city(&self, city: &str) -> StoreResult<Option<SavedTrip>> {
        let trips = self.list()?;
        Ok(find_trip_for_city(&trips, city).cloned())
    }

    /// Persist a new trip, prepending it to the collection
    pub fn create(&self, trip: SavedTrip) -> StoreResult<()> {
        let mut trips = self.list()?;
        info!(trip_id = %trip.id, city = %trip.city, "Creating trip");
        trips.insert(0, trip);
        self.write(&trips)
    }

    /// Replace the trip with a matching id in place, keeping its
    /// position. A trip the collection has never seen is prepended.
    pub fn upsert(&self, trip: SavedTrip) -> StoreResult<()> {
        let mut trips = self.list()?;
        match trips.iter_mut().find(|t| t.id == trip.id) {
            Some(slot) => {
                debug!(trip_id = %trip.id, "Updating trip in place");
                *slot = trip;
            }
            None => {
                debug!(trip_id = %trip.id, "Upsert of unknown trip, prepending");
                trips.insert(0, trip);
            }
        }
        self.write(&trips)
    }

    /// Delete a trip by id. Returns whether anything was removed.
    pub fn delete(&self, id: &str) -> StoreResult<bool> {
        let mut trips = self.list()?;
        let before = trips.len();
        trips.retain(|t| t.id != id);
        if trips.len() == before {
            return Ok(false);
        }
        info!(trip_id = %id, "Deleted trip");
        self.write(&trips)?;
        Ok(true)
    }
}

/// Single-slot holder for the autosaved draft
#[derive(Debug, Clone)]
pub struct DraftStore {
    dir: PathBuf,
}

impl DraftStore {
    /// Open or create a draft store rooted at the given directory
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        debug!(?dir, "Opened draft store");
        Ok(Self { dir })
    }

    fn slot_path(&self) -> PathBuf {
        self.dir.join(DRAFT_FILE)
    }

    /// The current draft, if one has been saved
    pub fn load(&self) -> StoreResult<Option<DraftTrip>> {
        let path = self.slot_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Overwrite the draft slot
    pub fn save(&self, draft: &DraftTrip) -> StoreResult<()> {
        let content = serde_json::to_string(draft)?;
        fs::write(self.slot_path(), content)?;
        debug!(city = %draft.city, items = draft.items.len(), "Saved draft");
        Ok(())
    }

    /// Remove the draft slot
    pub fn clear(&self) -> StoreResult<()> {
        let path = self.slot_path();
        if path.exists() {
            fs::remove_file(&path)?;
            info!("Cleared draft");
        }
        Ok(())
    }
}

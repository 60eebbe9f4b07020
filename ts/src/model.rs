//! Persisted trip data model
//!
//! These types are the JSON shapes written by the stores. A
//! [`PointOfInterest`] is immutable once generated except for the
//! lazily-filled `image_url`; an [`ItineraryItem`] layers the
//! user-owned fields (notes, completion) on top of it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current time as Unix milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Category of a generated point of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Category {
    #[default]
    Sightseeing,
    Food,
    Culture,
    Adventure,
}

impl Category {
    /// Parse a category from a free-form label, falling back to Sightseeing
    /// for anything the generation backend invents.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Food" => Self::Food,
            "Culture" => Self::Culture,
            "Adventure" => Self::Adventure,
            _ => Self::Sightseeing,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sightseeing => write!(f, "Sightseeing"),
            Self::Food => write!(f, "Food"),
            Self::Culture => write!(f, "Culture"),
            Self::Adventure => write!(f, "Adventure"),
        }
    }
}

/// Geographic coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A generated place recommendation
///
/// Ids are stable within a generation batch (`s-0`, `s-1`, ...) and are
/// the sole identity used by itinerary operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub related_quiz_topic: Option<String>,
    #[serde(default)]
    pub nearby_interest: Option<String>,
    #[serde(default)]
    pub nearby_interest_description: Option<String>,
    #[serde(default)]
    pub distance_text: Option<String>,
    #[serde(default)]
    pub travel_time_text: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub maps_link: Option<String>,
    /// Filled in asynchronously after generation, at most once per item
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A point of interest placed on an itinerary, with user-owned fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryItem {
    #[serde(flatten)]
    pub poi: PointOfInterest,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub completed: bool,
}

impl ItineraryItem {
    pub fn id(&self) -> &str {
        &self.poi.id
    }

    pub fn title(&self) -> &str {
        &self.poi.title
    }
}

impl From<PointOfInterest> for ItineraryItem {
    fn from(poi: PointOfInterest) -> Self {
        Self {
            poi,
            notes: String::new(),
            completed: false,
        }
    }
}

/// A named saved trip
///
/// The id is assigned at first persistence and never regenerated. The
/// city keeps its display casing; merge matching normalizes it. Item
/// order is meaningful (visiting sequence).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedTrip {
    pub id: String,
    pub city: String,
    #[serde(default)]
    pub hotel_location: Option<String>,
    pub items: Vec<ItineraryItem>,
    #[serde(default)]
    pub trip_notes: String,
    /// Creation timestamp (Unix milliseconds), immutable after creation
    pub created_at: i64,
}

impl SavedTrip {
    /// Create a trip with a fresh id and creation timestamp
    pub fn new(
        city: impl Into<String>,
        hotel_location: Option<String>,
        items: Vec<ItineraryItem>,
        trip_notes: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            city: city.into(),
            hotel_location,
            items,
            trip_notes: trip_notes.into(),
            created_at: now_ms(),
        }
    }
}

/// The single autosaved scratch session
///
/// Same shape as [`SavedTrip`] minus identity, plus the autosave time.
/// Exactly one draft exists; every write overwrites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftTrip {
    pub city: String,
    #[serde(default)]
    pub hotel_location: Option<String>,
    pub items: Vec<ItineraryItem>,
    #[serde(default)]
    pub trip_notes: String,
    /// Last autosave timestamp (Unix milliseconds)
    pub updated_at: i64,
}

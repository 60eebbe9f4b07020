//! SessionController - the active planning session
//!
//! Single authoritative in-memory representation of the trip being
//! planned, plus the rule for binding it to persistent storage. All
//! mutations flow through here; bound sessions write through to the
//! trip store, and every mutation queues a debounced draft snapshot.

use std::sync::Arc;

use tracing::{debug, info, warn};

use tripstore::{DraftStore, DraftTrip, ItineraryItem, PointOfInterest, SavedTrip, TripId, TripStore, find_trip_for_city, now_ms};

use crate::domain::QuizQuestion;
use crate::generation::{GenerationClient, GenerationError};
use crate::itinerary::{self, ItemUpdate};

use super::autosave::DraftAutosave;

/// Relevance token for an in-flight image enrichment
///
/// Issued against the session epoch at request time; a result arriving
/// after the session moved on (new city, loaded trip, resumed draft)
/// carries a stale epoch and is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentTicket {
    item_id: String,
    epoch: u64,
}

impl EnrichmentTicket {
    pub fn item_id(&self) -> &str {
        &self.item_id
    }
}

/// The active planning session
pub struct SessionController {
    trips: TripStore,
    drafts: DraftStore,
    autosave: DraftAutosave,
    client: Arc<dyn GenerationClient>,

    city: String,
    hotel: String,
    hands_free: bool,
    itinerary: Vec<ItineraryItem>,
    trip_notes: String,
    bound_trip_id: Option<TripId>,

    quiz: Vec<QuizQuestion>,
    suggestions: Vec<PointOfInterest>,

    /// Bumped whenever the session is replaced wholesale
    epoch: u64,
}

impl SessionController {
    pub fn new(trips: TripStore, drafts: DraftStore, autosave: DraftAutosave, client: Arc<dyn GenerationClient>) -> Self {
        Self {
            trips,
            drafts,
            autosave,
            client,
            city: String::new(),
            hotel: String::new(),
            hands_free: false,
            itinerary: Vec::new(),
            trip_notes: String::new(),
            bound_trip_id: None,
            quiz: Vec::new(),
            suggestions: Vec::new(),
            epoch: 0,
        }
    }

    // === View accessors ===

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn hotel(&self) -> &str {
        &self.hotel
    }

    pub fn hands_free(&self) -> bool {
        self.hands_free
    }

    pub fn itinerary(&self) -> &[ItineraryItem] {
        &self.itinerary
    }

    pub fn trip_notes(&self) -> &str {
        &self.trip_notes
    }

    pub fn bound_trip_id(&self) -> Option<&str> {
        self.bound_trip_id.as_deref()
    }

    pub fn quiz(&self) -> &[QuizQuestion] {
        &self.quiz
    }

    pub fn suggestions(&self) -> &[PointOfInterest] {
        &self.suggestions
    }

    // === Session lifecycle ===

    /// Start a planning session for a city
    ///
    /// Looks up the trip store for a normalized-city match before the
    /// generation call, but applies nothing until the quiz arrives, so
    /// a generation failure leaves the session exactly as it was.
    pub async fn start_session(&mut self, city: &str, hands_free: bool, hotel_input: &str) -> Result<(), GenerationError> {
        let city = city.trim().to_string();
        let hotel_input = hotel_input.trim().to_string();
        debug!(%city, hands_free, %hotel_input, "start_session: called");

        // Snapshot the merge target synchronously. A read failure
        // degrades to "no existing trip" rather than blocking.
        let trips = match self.trips.list() {
            Ok(trips) => trips,
            Err(e) => {
                warn!(error = %e, "start_session: trip list unavailable, starting fresh");
                Vec::new()
            }
        };
        let existing = find_trip_for_city(&trips, &city).cloned();

        let quiz = self.client.generate_quiz(&city).await?;

        self.epoch += 1;
        self.city = city;
        self.hands_free = hands_free;
        self.quiz = quiz;
        self.suggestions = Vec::new();

        match existing {
            Some(trip) => {
                info!(trip_id = %trip.id, city = %trip.city, "start_session: merged into existing trip");
                self.bound_trip_id = Some(trip.id.clone());
                self.itinerary = trip.items.clone();
                self.trip_notes = trip.trip_notes.clone();

                let stored_hotel = trip.hotel_location.clone().unwrap_or_default();
                if hotel_input.is_empty() {
                    self.hotel = stored_hotel;
                } else {
                    self.hotel = hotel_input;
                    if self.hotel != stored_hotel {
                        let mut updated = trip;
                        updated.hotel_location = Some(self.hotel.clone());
                        if let Err(e) = self.trips.upsert(updated) {
                            warn!(error = %e, "start_session: hotel write-through failed");
                        }
                    }
                }
            }
            None => {
                debug!("start_session: no existing trip, fresh session");
                self.bound_trip_id = None;
                self.itinerary = Vec::new();
                self.trip_notes = String::new();
                self.hotel = hotel_input;
            }
        }

        self.queue_autosave();
        Ok(())
    }

    /// Generate place suggestions from the current quiz topics
    pub async fn fetch_suggestions(&mut self) -> Result<(), GenerationError> {
        debug!(city = %self.city, "fetch_suggestions: called");
        let topics: Vec<String> = self.quiz.iter().map(|q| q.related_topic.clone()).collect();
        let suggestions = self.client.generate_suggestions(&self.city, &topics, &self.hotel).await?;
        info!(count = suggestions.len(), "fetch_suggestions: received suggestions");
        self.suggestions = suggestions;
        Ok(())
    }

    /// Replace all session state from a saved trip
    pub fn load_trip(&mut self, trip: &SavedTrip) {
        info!(trip_id = %trip.id, city = %trip.city, "load_trip: called");
        self.epoch += 1;
        self.city = trip.city.clone();
        self.hotel = trip.hotel_location.clone().unwrap_or_default();
        self.itinerary = trip.items.clone();
        self.trip_notes = trip.trip_notes.clone();
        self.bound_trip_id = Some(trip.id.clone());
        self.quiz = Vec::new();
        self.suggestions = Vec::new();
        self.queue_autosave();
    }

    /// Replace session state from the autosaved draft
    ///
    /// A resumed draft is always unbound, even if it was derived from a
    /// bound session; the next edit creates a new trip. The draft slot
    /// is left in place, so resuming twice reloads the same draft.
    pub fn resume_draft(&mut self) -> bool {
        debug!("resume_draft: called");
        let draft = match self.drafts.load() {
            Ok(Some(draft)) => draft,
            Ok(None) => {
                debug!("resume_draft: no draft to resume");
                return false;
            }
            Err(e) => {
                warn!(error = %e, "resume_draft: draft unreadable");
                return false;
            }
        };

        info!(city = %draft.city, item_count = draft.items.len(), "resume_draft: session restored");
        self.epoch += 1;
        self.city = draft.city;
        self.hotel = draft.hotel_location.unwrap_or_default();
        self.itinerary = draft.items;
        self.trip_notes = draft.trip_notes;
        self.bound_trip_id = None;
        self.quiz = Vec::new();
        self.suggestions = Vec::new();
        true
    }

    // === Itinerary mutations ===

    /// Add a generated place to the itinerary (idempotent by id)
    pub fn add_item(&mut self, poi: PointOfInterest) {
        debug!(id = %poi.id, title = %poi.title, "add_item: called");
        self.append_item(ItineraryItem::from(poi));
    }

    /// Remove an item by id, returning it for undo
    pub fn remove_item(&mut self, id: &str) -> Option<ItineraryItem> {
        debug!(%id, "remove_item: called");
        let (items, removed) = itinerary::remove(&self.itinerary, id);
        if removed.is_some() {
            self.itinerary = items;
            self.persist_session();
        }
        removed
    }

    /// Re-add a previously removed item (appends at the end)
    pub fn restore_item(&mut self, item: ItineraryItem) {
        debug!(id = %item.id(), "restore_item: called");
        self.append_item(item);
    }

    /// Replace the itinerary order
    ///
    /// Unknown ids are ignored; known ids missing from the requested
    /// order are re-appended in their original relative order.
    pub fn reorder_items(&mut self, new_order: &[String]) {
        debug!(requested = new_order.len(), current = self.itinerary.len(), "reorder_items: called");
        self.itinerary = itinerary::reorder(&self.itinerary, new_order);
        self.persist_session();
    }

    /// Merge notes/completed fields into the item matching id
    pub fn update_item(&mut self, id: &str, update: ItemUpdate) {
        debug!(%id, "update_item: called");
        self.itinerary = itinerary::update(&self.itinerary, id, &update);
        self.persist_session();
    }

    /// Replace the trip-level notes
    pub fn update_trip_notes(&mut self, text: &str) {
        debug!(text_len = text.len(), "update_trip_notes: called");
        self.trip_notes = text.to_string();
        self.persist_session();
    }

    /// Ask the generation service for an efficient visiting order
    ///
    /// Ids the service dropped or invented are reconciled defensively;
    /// the itinerary never loses an item to a sloppy response.
    pub async fn optimize_route(&mut self) -> Result<(), GenerationError> {
        debug!(item_count = self.itinerary.len(), "optimize_route: called");
        if self.itinerary.len() < 2 {
            return Ok(());
        }
        let order = self.client.optimize_route(&self.city, &self.hotel, &self.itinerary).await?;
        self.itinerary = itinerary::reorder(&self.itinerary, &order);
        self.persist_session();
        Ok(())
    }

    /// Explicit save action
    ///
    /// Bound sessions write through; an unbound non-empty session
    /// creates and binds a new trip; an empty unbound session is a
    /// no-op.
    pub fn save_session(&mut self) -> bool {
        debug!(bound = self.bound_trip_id.is_some(), item_count = self.itinerary.len(), "save_session: called");
        if self.bound_trip_id.is_some() {
            self.write_through();
            true
        } else if !self.itinerary.is_empty() {
            self.create_and_bind();
            true
        } else {
            false
        }
    }

    /// Delete a saved trip; unbinds the session if it was the target
    pub fn delete_trip(&mut self, id: &str) -> bool {
        debug!(%id, "delete_trip: called");
        let deleted = match self.trips.delete(id) {
            Ok(deleted) => deleted,
            Err(e) => {
                warn!(error = %e, %id, "delete_trip: store delete failed");
                false
            }
        };
        if self.bound_trip_id.as_deref() == Some(id) {
            info!(%id, "delete_trip: session unbound from deleted trip");
            self.bound_trip_id = None;
        }
        deleted
    }

    // === Image enrichment ===

    /// Issue a relevance token for enriching one suggestion's image
    ///
    /// Returns None if the item is unknown or already has an image, so
    /// enrichment is attempted at most once per item.
    pub fn enrichment_ticket(&self, item_id: &str) -> Option<EnrichmentTicket> {
        let poi = self.suggestions.iter().find(|p| p.id == item_id)?;
        if poi.image_url.is_some() {
            return None;
        }
        Some(EnrichmentTicket {
            item_id: item_id.to_string(),
            epoch: self.epoch,
        })
    }

    /// Fetch an image reference for the ticketed suggestion
    pub async fn fetch_enrichment(&self, ticket: &EnrichmentTicket) -> Option<String> {
        let poi = self.suggestions.iter().find(|p| p.id == ticket.item_id)?;
        self.client.enrich_image(&poi.title, &self.city).await.ok().flatten()
    }

    /// Apply a late-arriving enrichment result
    ///
    /// Dropped when the ticket's epoch is stale or the item meanwhile
    /// got an image. Returns whether the result was applied.
    pub fn apply_enrichment(&mut self, ticket: &EnrichmentTicket, url: String) -> bool {
        if ticket.epoch != self.epoch {
            debug!(item_id = %ticket.item_id, "apply_enrichment: stale ticket, dropping result");
            return false;
        }
        let Some(poi) = self.suggestions.iter_mut().find(|p| p.id == ticket.item_id) else {
            return false;
        };
        if poi.image_url.is_some() {
            return false;
        }
        poi.image_url = Some(url.clone());

        // An already-added copy on the itinerary picks it up too.
        if let Some(item) = self.itinerary.iter_mut().find(|i| i.id() == ticket.item_id) {
            item.poi.image_url = Some(url);
            self.persist_session();
        }
        true
    }

    // === Teardown ===

    /// Force a draft write regardless of the debounce window
    pub async fn flush_draft(&self) {
        debug!("flush_draft: called");
        self.autosave.flush().await;
    }

    // === Internals ===

    fn append_item(&mut self, item: ItineraryItem) {
        let before = self.itinerary.len();
        self.itinerary = itinerary::append(&self.itinerary, item);
        if self.itinerary.len() == before {
            debug!("append_item: duplicate id, no-op");
            return;
        }
        self.persist_session();
    }

    /// Persist the current session: write through or create, then
    /// queue the draft snapshot
    fn persist_session(&mut self) {
        if self.bound_trip_id.is_some() {
            self.write_through();
        } else if !self.itinerary.is_empty() {
            self.create_and_bind();
        } else {
            self.queue_autosave();
        }
    }

    /// Update the bound trip in place
    ///
    /// A bound id missing from the store (deleted externally) is
    /// recreated under the same id, which prepends it.
    fn write_through(&mut self) {
        let Some(id) = self.bound_trip_id.clone() else {
            return;
        };
        let trip = match self.trips.get(&id) {
            Ok(Some(mut trip)) => {
                trip.items = self.itinerary.clone();
                trip.trip_notes = self.trip_notes.clone();
                if !self.hotel.is_empty() {
                    trip.hotel_location = Some(self.hotel.clone());
                }
                trip
            }
            Ok(None) => {
                warn!(%id, "write_through: bound trip missing from store, recreating");
                let mut trip = self.snapshot_trip();
                trip.id = id;
                trip
            }
            Err(e) => {
                warn!(error = %e, %id, "write_through: trip read failed, session stays in memory");
                self.queue_autosave();
                return;
            }
        };

        let trip_id = trip.id.clone();
        if let Err(e) = self.trips.upsert(trip) {
            warn!(error = %e, %trip_id, "write_through: trip write failed, session stays in memory");
        }
        self.queue_autosave();
    }

    /// Create a new trip from the session and bind to its id
    fn create_and_bind(&mut self) {
        let trip = self.snapshot_trip();
        info!(trip_id = %trip.id, city = %trip.city, "create_and_bind: new trip created");
        self.bound_trip_id = Some(trip.id.clone());
        let trip_id = trip.id.clone();
        if let Err(e) = self.trips.create(trip) {
            warn!(error = %e, %trip_id, "create_and_bind: trip write failed, session stays in memory");
        }
        self.queue_autosave();
    }

    fn snapshot_trip(&self) -> SavedTrip {
        SavedTrip::new(
            self.city.clone(),
            (!self.hotel.is_empty()).then(|| self.hotel.clone()),
            self.itinerary.clone(),
            self.trip_notes.clone(),
        )
    }

    fn queue_autosave(&self) {
        self.autosave.update(DraftTrip {
            city: self.city.clone(),
            hotel_location: (!self.hotel.is_empty()).then(|| self.hotel.clone()),
            items: self.itinerary.clone(),
            trip_notes: self.trip_notes.clone(),
            updated_at: now_ms(),
        });
    }
}

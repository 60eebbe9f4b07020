//! Integration tests for BrainTrip
//!
//! These tests drive full planning flows across controller restarts,
//! verifying that saved trips, the autosaved draft, and the in-memory
//! session stay consistent.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use braintrip::generation::{GenerationClient, GenerationError};
use braintrip::session::{DraftAutosave, SessionController};
use braintrip::{ItemUpdate, QuizQuestion};
use tripstore::model::{Category, PointOfInterest};
use tripstore::{DraftStore, ItineraryItem, TripStore};

/// Canned generation backend for end-to-end flows
struct CannedClient;

#[async_trait]
impl GenerationClient for CannedClient {
    async fn generate_quiz(&self, city: &str) -> Result<Vec<QuizQuestion>, GenerationError> {
        Ok(vec![QuizQuestion {
            id: "q-0".to_string(),
            text: format!("What is {} famous for?", city),
            options: vec!["History".into(), "Beaches".into(), "Food".into(), "Mountains".into()],
            correct_index: 0,
            related_topic: "History".to_string(),
            fun_fact: "Founded over a thousand years ago.".to_string(),
        }])
    }

    async fn generate_suggestions(
        &self,
        _city: &str,
        topics: &[String],
        _hotel: &str,
    ) -> Result<Vec<PointOfInterest>, GenerationError> {
        Ok(["Old Castle", "River Market", "City Museum"]
            .iter()
            .enumerate()
            .map(|(i, title)| PointOfInterest {
                id: format!("s-{}", i),
                title: title.to_string(),
                description: format!("{} related to {}", title, topics.join(", ")),
                category: Category::Sightseeing,
                ..PointOfInterest::default()
            })
            .collect())
    }

    async fn optimize_route(
        &self,
        _city: &str,
        _hotel: &str,
        items: &[ItineraryItem],
    ) -> Result<Vec<String>, GenerationError> {
        // Reverse order, and "forget" the first id to exercise the
        // defensive re-append path.
        let mut ids: Vec<String> = items.iter().rev().map(|i| i.id().to_string()).collect();
        ids.pop();
        Ok(ids)
    }

    async fn enrich_image(&self, _title: &str, _city: &str) -> Result<Option<String>, GenerationError> {
        Ok(Some("https://images.example/canned.jpg".to_string()))
    }
}

fn controller(dir: &TempDir, debounce: Duration) -> SessionController {
    let trips = TripStore::open(dir.path()).expect("Failed to open trip store");
    let drafts = DraftStore::open(dir.path()).expect("Failed to open draft store");
    let autosave = DraftAutosave::spawn(drafts.clone(), debounce);
    SessionController::new(trips, drafts, autosave, Arc::new(CannedClient))
}

#[tokio::test]
async fn test_full_planning_flow_persists_one_trip() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut session = controller(&dir, Duration::from_millis(20));

    session.start_session("Lisbon", false, "Alfama").await.unwrap();
    assert_eq!(session.quiz().len(), 1);

    session.fetch_suggestions().await.unwrap();
    assert_eq!(session.suggestions().len(), 3);

    let first = session.suggestions()[0].clone();
    let second = session.suggestions()[1].clone();
    session.add_item(first);
    session.add_item(second);
    session.update_item("s-0", ItemUpdate::notes("go early"));
    session.update_trip_notes("long weekend");

    let trips = TripStore::open(dir.path()).unwrap();
    let all = trips.list().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].city, "Lisbon");
    assert_eq!(all[0].hotel_location.as_deref(), Some("Alfama"));
    assert_eq!(all[0].items.len(), 2);
    assert_eq!(all[0].items[0].notes, "go early");
    assert_eq!(all[0].trip_notes, "long weekend");
}

#[tokio::test]
async fn test_revisit_merges_across_controller_restarts() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    let first_id = {
        let mut session = controller(&dir, Duration::from_millis(20));
        session.start_session("Lisbon", false, "").await.unwrap();
        session.fetch_suggestions().await.unwrap();
        let poi = session.suggestions()[0].clone();
        session.add_item(poi);
        session.flush_draft().await;
        session.bound_trip_id().unwrap().to_string()
    };

    // Fresh process, same store: the city revisit binds to the same
    // trip instead of creating a second one.
    let mut session = controller(&dir, Duration::from_millis(20));
    session.start_session("  LISBON ", false, "").await.unwrap();

    assert_eq!(session.bound_trip_id(), Some(first_id.as_str()));
    assert_eq!(session.itinerary().len(), 1);
    assert_eq!(TripStore::open(dir.path()).unwrap().list().unwrap().len(), 1);
}

#[tokio::test]
async fn test_route_optimization_never_loses_items() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut session = controller(&dir, Duration::from_millis(20));

    session.start_session("Lisbon", false, "").await.unwrap();
    session.fetch_suggestions().await.unwrap();
    for poi in session.suggestions().to_vec() {
        session.add_item(poi);
    }

    session.optimize_route().await.unwrap();

    // CannedClient returns [s-2, s-1]; s-0 must be re-appended.
    let ids: Vec<&str> = session.itinerary().iter().map(|i| i.id()).collect();
    assert_eq!(ids, vec!["s-2", "s-1", "s-0"]);
}

#[tokio::test]
async fn test_draft_coalesces_and_survives_restart() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    {
        let mut session = controller(&dir, Duration::from_millis(50));
        session.start_session("Lisbon", false, "").await.unwrap();
        for i in 0..10 {
            session.update_trip_notes(&format!("revision {}", i));
        }
        session.flush_draft().await;
    }

    let drafts = DraftStore::open(dir.path()).unwrap();
    let draft = drafts.load().unwrap().expect("Draft should exist after flush");
    assert_eq!(draft.city, "Lisbon");
    assert_eq!(draft.trip_notes, "revision 9");

    // A new session resumes the draft, unbound.
    let mut session = controller(&dir, Duration::from_millis(50));
    assert!(session.resume_draft());
    assert_eq!(session.trip_notes(), "revision 9");
    assert!(session.bound_trip_id().is_none());
}

#[tokio::test]
async fn test_deleting_a_trip_orphans_the_session() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut session = controller(&dir, Duration::from_millis(20));

    session.start_session("Lisbon", false, "").await.unwrap();
    session.fetch_suggestions().await.unwrap();
    let poi = session.suggestions()[0].clone();
    session.add_item(poi);
    let id = session.bound_trip_id().unwrap().to_string();

    assert!(session.delete_trip(&id));
    assert!(session.bound_trip_id().is_none());
    assert_eq!(session.itinerary().len(), 1);

    // The next edit creates a brand-new trip under a new id.
    let poi = session.suggestions()[1].clone();
    session.add_item(poi);
    let new_id = session.bound_trip_id().unwrap();
    assert_ne!(new_id, id);
    assert_eq!(TripStore::open(dir.path()).unwrap().list().unwrap().len(), 1);
}

//! DraftAutosave - actor that owns debounced draft persistence
//!
//! Session mutations send draft snapshots here; the actor coalesces
//! rapid updates and writes only the latest snapshot after a quiet
//! period. A flush writes any pending snapshot immediately.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::sleep;
use tracing::{debug, warn};

use tripstore::{DraftStore, DraftTrip};

/// Commands accepted by the autosave actor
enum AutosaveMsg {
    /// Replace the pending snapshot and restart the quiet period
    Update(DraftTrip),
    /// Write any pending snapshot now and acknowledge
    Flush(oneshot::Sender<()>),
}

/// Handle to send draft snapshots to the autosave actor
#[derive(Clone)]
pub struct DraftAutosave {
    tx: mpsc::UnboundedSender<AutosaveMsg>,
}

impl DraftAutosave {
    /// Spawn the autosave actor
    pub fn spawn(store: DraftStore, debounce: Duration) -> Self {
        debug!(debounce_ms = debounce.as_millis() as u64, "spawn: called");
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(actor_loop(store, rx, debounce));
        Self { tx }
    }

    /// Queue a draft snapshot for debounced persistence
    ///
    /// Each call replaces any snapshot still waiting and restarts the
    /// quiet period.
    pub fn update(&self, draft: DraftTrip) {
        if self.tx.send(AutosaveMsg::Update(draft)).is_err() {
            warn!("update: autosave actor is gone, draft snapshot dropped");
        }
    }

    /// Write any pending snapshot immediately
    ///
    /// Resolves once the write has happened (or there was nothing to
    /// write).
    pub async fn flush(&self) {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.tx.send(AutosaveMsg::Flush(reply_tx)).is_err() {
            warn!("flush: autosave actor is gone");
            return;
        }
        // A dropped reply means the actor exited mid-flush; the
        // teardown path below still writes the pending snapshot.
        let _ = reply_rx.await;
    }
}

async fn actor_loop(store: DraftStore, mut rx: mpsc::UnboundedReceiver<AutosaveMsg>, debounce: Duration) {
    debug!("actor_loop: started");
    let mut pending: Option<DraftTrip> = None;

    loop {
        tokio::select! {
            msg = rx.recv() => {
                match msg {
                    Some(AutosaveMsg::Update(draft)) => {
                        debug!(city = %draft.city, "actor_loop: snapshot queued");
                        pending = Some(draft);
                    }
                    Some(AutosaveMsg::Flush(reply)) => {
                        write_pending(&store, &mut pending);
                        let _ = reply.send(());
                    }
                    None => {
                        // All handles dropped; persist whatever is left.
                        write_pending(&store, &mut pending);
                        debug!("actor_loop: channel closed, exiting");
                        return;
                    }
                }
            }
            _ = sleep(debounce), if pending.is_some() => {
                write_pending(&store, &mut pending);
            }
        }
    }
}

fn write_pending(store: &DraftStore, pending: &mut Option<DraftTrip>) {
    if let Some(draft) = pending.take() {
        debug!(city = %draft.city, item_count = draft.items.len(), "write_pending: persisting draft");
        if let Err(e) = store.save(&draft) {
            warn!(error = %e, "write_pending: draft write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tripstore::ItineraryItem;
    use tripstore::model::PointOfInterest;

    fn draft(notes: &str) -> DraftTrip {
        DraftTrip {
            city: "Lisbon".to_string(),
            hotel_location: Some("Alfama".to_string()),
            items: vec![ItineraryItem::from(PointOfInterest {
                id: "p-0".to_string(),
                title: "Castle".to_string(),
                ..PointOfInterest::default()
            })],
            trip_notes: notes.to_string(),
            updated_at: 0,
        }
    }

    #[tokio::test]
    async fn test_rapid_updates_coalesce_to_one_write() {
        let dir = TempDir::new().unwrap();
        let store = DraftStore::open(dir.path()).unwrap();
        let autosave = DraftAutosave::spawn(store.clone(), Duration::from_millis(100));

        for i in 0..5 {
            autosave.update(draft(&format!("note {}", i)));
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        // Still inside the quiet period: nothing written yet.
        assert!(store.load().unwrap().is_none());

        tokio::time::sleep(Duration::from_millis(250)).await;

        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved.trip_notes, "note 4");
    }

    #[tokio::test]
    async fn test_flush_writes_immediately() {
        let dir = TempDir::new().unwrap();
        let store = DraftStore::open(dir.path()).unwrap();
        let autosave = DraftAutosave::spawn(store.clone(), Duration::from_secs(60));

        autosave.update(draft("flushed"));
        autosave.flush().await;

        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved.trip_notes, "flushed");
    }

    #[tokio::test]
    async fn test_flush_with_nothing_pending_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let store = DraftStore::open(dir.path()).unwrap();
        let autosave = DraftAutosave::spawn(store.clone(), Duration::from_millis(50));

        autosave.flush().await;
        assert!(store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_drop_persists_pending_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = DraftStore::open(dir.path()).unwrap();
        let autosave = DraftAutosave::spawn(store.clone(), Duration::from_secs(60));

        autosave.update(draft("teardown"));
        drop(autosave);

        // Give the actor a moment to observe the closed channel.
        tokio::time::sleep(Duration::from_millis(100)).await;

        let saved = store.load().unwrap().unwrap();
        assert_eq!(saved.trip_notes, "teardown");
    }
}

//! Itinerary list operations
//!
//! An itinerary is an ordered sequence of [`ItineraryItem`]s where
//! identity is the item id and order is the visiting sequence. Every
//! operation returns a new sequence so session state and persisted
//! trips never share hidden mutation.

use tracing::debug;

use crate::domain::ItineraryItem;

/// Field-merge update for a single item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemUpdate {
    pub notes: Option<String>,
    pub completed: Option<bool>,
}

impl ItemUpdate {
    pub fn notes(text: impl Into<String>) -> Self {
        Self {
            notes: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn completed(value: bool) -> Self {
        Self {
            completed: Some(value),
            ..Self::default()
        }
    }
}

/// Append an item at the end. Inserting an id that is already present
/// is a no-op, so the result always has unique ids.
pub fn append(items: &[ItineraryItem], item: ItineraryItem) -> Vec<ItineraryItem> {
    if items.iter().any(|i| i.id() == item.id()) {
        debug!(id = %item.id(), "append: id already present, no-op");
        return items.to_vec();
    }
    let mut next = items.to_vec();
    next.push(item);
    next
}

/// Remove an item by id, returning the new sequence and the removed
/// item (for undo).
pub fn remove(items: &[ItineraryItem], id: &str) -> (Vec<ItineraryItem>, Option<ItineraryItem>) {
    let removed = items.iter().find(|i| i.id() == id).cloned();
    let next = items.iter().filter(|i| i.id() != id).cloned().collect();
    (next, removed)
}

/// Reorder the sequence to follow the requested id order.
///
/// The request does not have to be a clean permutation: ids that are
/// not in the itinerary are ignored, and items the request left out are
/// appended at the end in their original relative order. The result
/// always contains exactly the original items.
pub fn reorder(items: &[ItineraryItem], order: &[String]) -> Vec<ItineraryItem> {
    let mut next: Vec<ItineraryItem> = Vec::with_capacity(items.len());
    for id in order {
        if next.iter().any(|i| i.id() == id) {
            continue;
        }
        if let Some(item) = items.iter().find(|i| i.id() == id.as_str()) {
            next.push(item.clone());
        } else {
            debug!(%id, "reorder: unknown id ignored");
        }
    }
    for item in items {
        if !next.iter().any(|i| i.id() == item.id()) {
            debug!(id = %item.id(), "reorder: missing id re-appended");
            next.push(item.clone());
        }
    }
    next
}

/// Merge fields into the item matching the id. Unknown ids leave the
/// sequence unchanged.
pub fn update(items: &[ItineraryItem], id: &str, update: &ItemUpdate) -> Vec<ItineraryItem> {
    items
        .iter()
        .map(|item| {
            if item.id() != id {
                return item.clone();
            }
            let mut next = item.clone();
            if let Some(notes) = &update.notes {
                next.notes = notes.clone();
            }
            if let Some(completed) = update.completed {
                next.completed = completed;
            }
            next
        })
        .collect()
}

//! Ordered, append-only item collection observed by the presentation layer.
//!
//! Writers follow a single-writer discipline: only the controller's current
//! session appends, and the controller only clears once the previous session
//! has reached a terminal state. The lock below exists so the collection can be
//! shared across tasks; it is never contended by two writers.

use crate::types::{Event, FeedItem};
use std::sync::{PoisonError, RwLock};
use tokio::sync::broadcast;

#[derive(Default)]
struct Inner {
    items: Vec<FeedItem>,
    next_sequence: u64,
}

/// Feed items in arrival order, with per-append change notifications
pub struct FeedAccumulator {
    inner: RwLock<Inner>,
    event_tx: broadcast::Sender<Event>,
}

impl FeedAccumulator {
    /// Create an empty accumulator publishing change events on `event_tx`
    pub fn new(event_tx: broadcast::Sender<Event>) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            event_tx,
        }
    }

    /// Append an item, assigning it the next sequence index
    ///
    /// Returns the assigned sequence index. Emits [`Event::ItemAppended`].
    pub fn append(&self, item: FeedItem) -> u64 {
        let (index, sequence_index) = {
            let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            let sequence_index = inner.next_sequence;
            inner.next_sequence += 1;
            inner.items.push(item.with_sequence(sequence_index));
            (inner.items.len() - 1, sequence_index)
        };

        let _ = self.event_tx.send(Event::ItemAppended {
            index,
            sequence_index,
        });
        sequence_index
    }

    /// Remove every item and reset the sequence counter to zero
    ///
    /// Must only be called while no session is appending.
    pub fn clear(&self) {
        {
            let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            inner.items.clear();
            inner.next_sequence = 0;
        }
        let _ = self.event_tx.send(Event::Cleared);
    }

    /// Snapshot of the current items
    pub fn items(&self) -> Vec<FeedItem> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .items
            .clone()
    }

    /// Item at `index`, if present
    pub fn get(&self, index: usize) -> Option<FeedItem> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .items
            .get(index)
            .cloned()
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .items
            .len()
    }

    /// Whether the accumulator holds no items
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sequence index the next append will receive
    pub fn next_sequence(&self) -> u64 {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .next_sequence
    }
}

//! User-facing fault notifications
//!
//! Faults that are swallowed at a boundary (a failed page, a failed export page,
//! a session that panicked during teardown) are handed to a [`Notifier`] as a
//! message plus optional inner cause. Cancellation is never reported.

use crate::types::{Event, Notification};
use tokio::sync::broadcast;

/// Error/log collaborator receiving `(message, cause)` pairs
pub trait Notifier: Send + Sync {
    /// Surface a fault to the user
    fn notify(&self, notification: Notification);
}

/// Notifier that logs the fault and republishes it on the event channel
#[derive(Clone)]
pub struct BroadcastNotifier {
    event_tx: broadcast::Sender<Event>,
}

impl BroadcastNotifier {
    /// Create a notifier publishing to `event_tx`
    pub fn new(event_tx: broadcast::Sender<Event>) -> Self {
        Self { event_tx }
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, notification: Notification) {
        tracing::warn!(
            message = %notification.message,
            cause = notification.cause.as_deref().unwrap_or(""),
            "Feed fault reported"
        );
        // No subscribers is fine
        let _ = self.event_tx.send(Event::Notification {
            message: notification.message,
            cause: notification.cause,
        });
    }
}

//! One page load: fetch a single page and append its items.
//!
//! A [`LoadSession`] moves through `Created -> Running -> {Completed | Cancelled |
//! Faulted}`. Cancellation is checked before the fetch and before every append,
//! so a cancelled session leaves at most the items appended before the check
//! that stopped it. Sessions are never reused; the controller builds a fresh one
//! for every trigger.

use crate::accumulator::FeedAccumulator;
use crate::error::{Error, Result};
use crate::fetcher::PageFetcher;
use crate::notify::Notifier;
use crate::types::{Event, FeedItem, Notification, PageRequest, SessionState};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Collaborators shared by every session of one controller
#[derive(Clone)]
pub struct SessionContext {
    /// Page transport
    pub fetcher: Arc<dyn PageFetcher>,
    /// Fault reporting
    pub notifier: Arc<dyn Notifier>,
    /// Destination of appended items
    pub accumulator: Arc<FeedAccumulator>,
    /// "Load more" flag written by the most recent successful page
    pub more_available: Arc<AtomicBool>,
    /// Event channel for presentation subscribers
    pub event_tx: broadcast::Sender<Event>,
}

/// What a session loads
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionParams {
    /// Source identifier
    pub source_id: String,
    /// Zero-based page number
    pub page: u32,
    /// Items per page
    pub page_size: u32,
    /// Sort direction
    pub ascending: bool,
}

/// Result of a finished session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionOutcome {
    /// Page the session loaded
    pub page: u32,
    /// Terminal state
    pub state: SessionState,
    /// Items appended before the session stopped
    pub appended: usize,
    /// Remote "more" flag, when the fetch succeeded
    pub has_more: Option<bool>,
}

/// Single-page load operation
pub struct LoadSession {
    context: SessionContext,
    params: SessionParams,
    cancel: CancellationToken,
    state_tx: watch::Sender<SessionState>,
}

impl LoadSession {
    /// Create a session in the `Created` state
    pub fn new(context: SessionContext, params: SessionParams, cancel: CancellationToken) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Created);
        Self {
            context,
            params,
            cancel,
            state_tx,
        }
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// Receiver that observes every state transition
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Run the session to a terminal state
    ///
    /// Remote failures are reported to the notifier and end in `Faulted`; an
    /// observed cancellation ends in `Cancelled` and is not reported.
    pub async fn run(self) -> SessionOutcome {
        self.state_tx.send_replace(SessionState::Running);

        let mut appended = 0;
        let result = self.load_page(&mut appended).await;

        let (state, has_more) = match result {
            Ok(has_more) => (SessionState::Completed, Some(has_more)),
            Err(Error::Cancelled) => {
                tracing::debug!(
                    source_id = %self.params.source_id,
                    page = self.params.page,
                    appended,
                    "Load session cancelled"
                );
                (SessionState::Cancelled, None)
            }
            Err(e) => {
                tracing::warn!(
                    source_id = %self.params.source_id,
                    page = self.params.page,
                    error = %e,
                    "Load session faulted"
                );
                self.context.notifier.notify(Notification::from_error(&e));
                (SessionState::Faulted, None)
            }
        };

        self.state_tx.send_replace(state);
        let _ = self.context.event_tx.send(Event::SessionFinished {
            page: self.params.page,
            state,
        });

        SessionOutcome {
            page: self.params.page,
            state,
            appended,
            has_more,
        }
    }

    /// Spawn [`run`](Self::run) on the runtime and return a tracking handle
    pub fn spawn(self) -> SessionHandle {
        let page = self.params.page;
        let cancel = self.cancel.clone();
        let state_rx = self.state_tx.subscribe();
        let join = tokio::spawn(self.run());

        SessionHandle {
            page,
            cancel,
            state_rx,
            join,
        }
    }

    async fn load_page(&self, appended: &mut usize) -> Result<bool> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let request = PageRequest::for_page(
            self.params.source_id.clone(),
            self.params.page,
            self.params.page_size,
            self.params.ascending,
        );
        let page = self
            .context
            .fetcher
            .fetch_page(&request, &self.cancel)
            .await?;

        self.context
            .more_available
            .store(page.has_more, Ordering::SeqCst);
        let _ = self.context.event_tx.send(Event::MoreAvailable {
            more: page.has_more,
        });

        for raw in page.items {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            self.context.accumulator.append(FeedItem::from_raw(raw));
            *appended += 1;
        }

        tracing::debug!(
            source_id = %self.params.source_id,
            page = self.params.page,
            appended = *appended,
            has_more = page.has_more,
            "Page appended"
        );
        Ok(page.has_more)
    }
}

/// Tracking handle for a spawned session
pub struct SessionHandle {
    page: u32,
    cancel: CancellationToken,
    state_rx: watch::Receiver<SessionState>,
    join: JoinHandle<SessionOutcome>,
}

impl SessionHandle {
    /// Page the session is loading
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Latest published state
    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    /// Request cooperative cancellation of this session only
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the session task has finished
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the session to reach its terminal state
    ///
    /// # Errors
    /// Returns error if the session task panicked or was aborted
    pub async fn wait(self) -> Result<SessionOutcome> {
        self.join
            .await
            .map_err(|e| Error::Other(format!("load session task failed: {}", e)))
    }
}

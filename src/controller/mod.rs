//! Session lifecycle owner split into focused submodules.
//!
//! The `SessionController` struct and its methods are organized by concern:
//! - [`control`] - opening a source, page advance, sort toggle
//! - [`playback`] - play all, add all, bulk export
//! - [`lifecycle`] - teardown and the disposed guard
//!
//! Exactly one [`LoadSession`] is current at a time. Before a new session is
//! started (or the accumulator is cleared) the outgoing one is awaited to a
//! terminal state, so only one session ever writes to the accumulator.

mod control;
mod lifecycle;
mod playback;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::accumulator::FeedAccumulator;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::export::BulkExporter;
use crate::fetcher::{HttpPageFetcher, PageFetcher, SourceDirectory};
use crate::notify::{BroadcastNotifier, Notifier};
use crate::session::{LoadSession, SessionContext, SessionHandle, SessionParams};
use crate::sinks::{ExportSink, NoOpSink, PlaylistSink};
use crate::types::{Event, FeedItem, Notification, SessionState, SourceDetail};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, broadcast};
use tokio_util::sync::{CancellationToken, DropGuard};

/// Mutable per-page-instance state, guarded by the controller mutex
#[derive(Default)]
pub(crate) struct ControllerState {
    /// Attached source
    pub(crate) source: Option<SourceDetail>,
    /// Cover image handle derived from the source
    pub(crate) cover: Option<String>,
    /// Last page handed to a session (None before the first load)
    pub(crate) page: Option<u32>,
    /// Sort direction
    pub(crate) ascending: bool,
    /// Current session, if one has been started
    pub(crate) current: Option<SessionHandle>,
}

/// Lifecycle owner for the feed of one page instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct SessionController {
    /// Configuration
    pub(crate) config: Arc<Config>,
    /// Collaborators handed to every session
    pub(crate) context: SessionContext,
    /// Source metadata lookups
    pub(crate) directory: Arc<dyn SourceDirectory>,
    /// Bulk export flow
    pub(crate) exporter: Arc<BulkExporter>,
    /// Playback queue collaborator
    pub(crate) playlist: Arc<dyn PlaylistSink>,
    /// Source, page counter, sort flag and current session
    pub(crate) state: Arc<Mutex<ControllerState>>,
    /// Root cancellation signal; only teardown cancels it
    pub(crate) shutdown: CancellationToken,
    /// Set once teardown has completed
    pub(crate) disposed: Arc<AtomicBool>,
    /// Cancels the root signal when the last clone is dropped without teardown
    _shutdown_guard: Arc<DropGuard>,
}

/// Builder wiring a [`SessionController`] to its collaborators
///
/// Fetcher and directory default to an [`HttpPageFetcher`] built from the
/// config; the notifier defaults to a [`BroadcastNotifier`] on the controller's
/// event channel; sinks default to [`NoOpSink`].
pub struct ControllerBuilder {
    config: Config,
    fetcher: Option<Arc<dyn PageFetcher>>,
    directory: Option<Arc<dyn SourceDirectory>>,
    notifier: Option<Arc<dyn Notifier>>,
    export_sink: Option<Arc<dyn ExportSink>>,
    playlist: Option<Arc<dyn PlaylistSink>>,
}

impl ControllerBuilder {
    /// Use a custom page fetcher
    pub fn fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Use a custom source directory
    pub fn directory(mut self, directory: Arc<dyn SourceDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Use a custom notifier
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Set the sink receiving bulk export results
    pub fn export_sink(mut self, sink: Arc<dyn ExportSink>) -> Self {
        self.export_sink = Some(sink);
        self
    }

    /// Set the playback queue collaborator
    pub fn playlist(mut self, playlist: Arc<dyn PlaylistSink>) -> Self {
        self.playlist = Some(playlist);
        self
    }

    /// Validate the config and build the controller
    ///
    /// # Errors
    /// Returns error if the config is invalid or the default HTTP fetcher cannot be created
    pub fn build(self) -> Result<SessionController> {
        self.config.validate()?;

        let (event_tx, _rx) = broadcast::channel(self.config.event_channel_capacity);

        let (fetcher, directory): (Arc<dyn PageFetcher>, Arc<dyn SourceDirectory>) =
            match (self.fetcher, self.directory) {
                (Some(fetcher), Some(directory)) => (fetcher, directory),
                (fetcher, directory) => {
                    let http = Arc::new(HttpPageFetcher::new(&self.config.api)?);
                    let default_fetcher: Arc<dyn PageFetcher> = http.clone();
                    let default_directory: Arc<dyn SourceDirectory> = http;
                    (
                        fetcher.unwrap_or(default_fetcher),
                        directory.unwrap_or(default_directory),
                    )
                }
            };

        let notifier: Arc<dyn Notifier> = match self.notifier {
            Some(notifier) => notifier,
            None => Arc::new(BroadcastNotifier::new(event_tx.clone())),
        };
        let export_sink: Arc<dyn ExportSink> = match self.export_sink {
            Some(sink) => sink,
            None => Arc::new(NoOpSink),
        };
        let playlist: Arc<dyn PlaylistSink> = match self.playlist {
            Some(playlist) => playlist,
            None => Arc::new(NoOpSink),
        };

        let exporter = BulkExporter::new(
            fetcher.clone(),
            notifier.clone(),
            export_sink,
            event_tx.clone(),
            self.config.paging.export_page_size,
            self.config.paging.max_export_failures,
        );

        let context = SessionContext {
            fetcher,
            notifier,
            accumulator: Arc::new(FeedAccumulator::new(event_tx.clone())),
            more_available: Arc::new(AtomicBool::new(false)),
            event_tx,
        };

        let shutdown = CancellationToken::new();
        let shutdown_guard = shutdown.clone().drop_guard();

        Ok(SessionController {
            config: Arc::new(self.config),
            context,
            directory,
            exporter: Arc::new(exporter),
            playlist,
            state: Arc::new(Mutex::new(ControllerState::default())),
            shutdown,
            disposed: Arc::new(AtomicBool::new(false)),
            _shutdown_guard: Arc::new(shutdown_guard),
        })
    }
}

impl SessionController {
    /// Start building a controller from `config`
    pub fn builder(config: Config) -> ControllerBuilder {
        ControllerBuilder {
            config,
            fetcher: None,
            directory: None,
            notifier: None,
            export_sink: None,
            playlist: None,
        }
    }

    /// Subscribe to accumulator, session and notification events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.context.event_tx.subscribe()
    }

    /// The accumulator observed by the presentation layer
    pub fn accumulator(&self) -> Arc<FeedAccumulator> {
        self.context.accumulator.clone()
    }

    /// Snapshot of the accumulated items
    pub fn items(&self) -> Vec<FeedItem> {
        self.context.accumulator.items()
    }

    /// Whether the most recent successful page reported more pages
    pub fn more_available(&self) -> bool {
        self.context.more_available.load(Ordering::SeqCst)
    }

    /// Whether teardown has completed
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Last page handed to a session (None before the first load)
    pub async fn page(&self) -> Option<u32> {
        self.state.lock().await.page
    }

    /// Current sort direction
    pub async fn ascending(&self) -> bool {
        self.state.lock().await.ascending
    }

    /// Attached source detail
    pub async fn detail(&self) -> Option<SourceDetail> {
        self.state.lock().await.source.clone()
    }

    /// Cover image handle for the attached source
    pub async fn cover(&self) -> Option<String> {
        self.state.lock().await.cover.clone()
    }

    /// List source tag the presentation and playback layers bind to (`rd{id}`)
    pub async fn list_source(&self) -> Option<String> {
        self.state
            .lock()
            .await
            .source
            .as_ref()
            .map(|s| format!("rd{}", s.id))
    }

    /// State of the current session, if one has been started
    pub async fn current_state(&self) -> Option<SessionState> {
        self.state
            .lock()
            .await
            .current
            .as_ref()
            .map(SessionHandle::state)
    }

    /// Fail fast once teardown has begun
    pub(crate) fn ensure_live(&self) -> Result<()> {
        if self.disposed.load(Ordering::SeqCst) || self.shutdown.is_cancelled() {
            return Err(Error::Disposed);
        }
        Ok(())
    }

    /// Id of the attached source
    pub(crate) fn source_id(state: &ControllerState) -> Result<String> {
        state
            .source
            .as_ref()
            .map(|s| s.id.clone())
            .ok_or(Error::NoSource)
    }

    /// Wait for the current session (if any) to reach a terminal state
    ///
    /// With `supersede` the session's own signal is cancelled first. A session
    /// task that failed to join is reported and otherwise ignored.
    pub(crate) async fn settle_current(&self, state: &mut ControllerState, supersede: bool) {
        let Some(handle) = state.current.take() else {
            return;
        };

        if supersede {
            handle.cancel();
        }

        let page = handle.page();
        match handle.wait().await {
            Ok(outcome) => {
                tracing::debug!(
                    page = outcome.page,
                    state = ?outcome.state,
                    appended = outcome.appended,
                    "Previous session settled"
                );
            }
            Err(e) => {
                tracing::warn!(page, error = %e, "Previous session did not finish cleanly");
                self.context.notifier.notify(Notification::from_error(&e));
            }
        }
    }

    /// Spawn a session for the page after `state.page` and make it current
    pub(crate) fn start_session(&self, state: &mut ControllerState, source_id: String) {
        let page = state.page.map_or(0, |p| p + 1);
        state.page = Some(page);

        let params = SessionParams {
            source_id,
            page,
            page_size: self.config.paging.page_size,
            ascending: state.ascending,
        };
        tracing::info!(
            source_id = %params.source_id,
            page,
            ascending = params.ascending,
            "Starting load session"
        );

        let session = LoadSession::new(self.context.clone(), params, self.shutdown.child_token());
        state.current = Some(session.spawn());
    }

    /// Cover handle for `detail`, honoring the display settings
    pub(crate) fn cover_for(&self, detail: &SourceDetail) -> Option<String> {
        if !self.config.display.load_covers {
            return None;
        }
        detail
            .cover_url
            .as_ref()
            .map(|url| format!("{}?param={}", url, self.config.display.cover_size))
    }
}

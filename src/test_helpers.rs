//! Shared substitutes for collaborators used across unit tests.

use crate::config::Config;
use crate::controller::SessionController;
use crate::error::{Error, RemoteError, Result};
use crate::fetcher::{PageFetcher, SourceDirectory};
use crate::notify::Notifier;
use crate::sinks::{ExportSink, PlaylistSink};
use crate::types::{
    Event, FeedItem, Notification, PageRequest, PageResult, RawProgram, SourceDetail,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::ops::Range;
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, broadcast};
use tokio_util::sync::CancellationToken;

/// Raw programs with the given ids, named after their id
pub(crate) fn programs(ids: Range<u64>) -> Vec<RawProgram> {
    ids.map(|id| RawProgram {
        id,
        name: Some(format!("program {id}")),
        ..RawProgram::default()
    })
    .collect()
}

/// Holds a scripted fetch "in flight" until the test releases it
pub(crate) struct Gate {
    started: Notify,
    release: Notify,
    honor_cancel: bool,
}

impl Gate {
    /// Gate that ignores cancellation while held (transport runs to completion)
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            started: Notify::new(),
            release: Notify::new(),
            honor_cancel: false,
        })
    }

    /// Gate that gives up with `Cancelled` when the token fires while held
    pub(crate) fn cancellable() -> Arc<Self> {
        Arc::new(Self {
            started: Notify::new(),
            release: Notify::new(),
            honor_cancel: true,
        })
    }

    /// Wait until a fetch is parked on this gate
    pub(crate) async fn wait_started(&self) {
        self.started.notified().await;
    }

    /// Let the parked fetch return
    pub(crate) fn release(&self) {
        self.release.notify_one();
    }
}

enum Step {
    Page { items: Vec<RawProgram>, more: bool },
    Fail(String),
}

/// Page fetcher answering from a script, in call order
///
/// Calls beyond the script return an empty last page.
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    steps: Mutex<VecDeque<(Step, Option<Arc<Gate>>)>>,
    requests: Mutex<Vec<PageRequest>>,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn page(self, items: Vec<RawProgram>, more: bool) -> Self {
        self.push(Step::Page { items, more }, None)
    }

    pub(crate) fn gated_page(self, items: Vec<RawProgram>, more: bool, gate: Arc<Gate>) -> Self {
        self.push(Step::Page { items, more }, Some(gate))
    }

    pub(crate) fn fail(self, message: &str) -> Self {
        self.push(Step::Fail(message.to_string()), None)
    }

    fn push(self, step: Step, gate: Option<Arc<Gate>>) -> Self {
        self.steps.lock().unwrap().push_back((step, gate));
        self
    }

    /// Requests received so far (cancelled-before-call requests are not recorded)
    pub(crate) fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch_page(
        &self,
        request: &PageRequest,
        cancel: &CancellationToken,
    ) -> Result<PageResult> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        self.requests.lock().unwrap().push(request.clone());

        let next = self.steps.lock().unwrap().pop_front();
        let (step, gate) = next.unwrap_or((
            Step::Page {
                items: Vec::new(),
                more: false,
            },
            None,
        ));

        if let Some(gate) = gate {
            gate.started.notify_one();
            if gate.honor_cancel {
                tokio::select! {
                    _ = gate.release.notified() => {}
                    _ = cancel.cancelled() => return Err(Error::Cancelled),
                }
            } else {
                gate.release.notified().await;
            }
        }

        match step {
            Step::Page { items, more } => Ok(PageResult {
                items,
                has_more: more,
            }),
            Step::Fail(message) => Err(RemoteError::Rejected(message).into()),
        }
    }
}

/// Source directory returning a fixed detail, or failing when it has none
#[derive(Default)]
pub(crate) struct StaticDirectory {
    detail: Option<SourceDetail>,
}

impl StaticDirectory {
    pub(crate) fn with(detail: SourceDetail) -> Self {
        Self {
            detail: Some(detail),
        }
    }
}

#[async_trait]
impl SourceDirectory for StaticDirectory {
    async fn fetch_detail(&self, source_id: &str) -> Result<SourceDetail> {
        self.detail.clone().ok_or_else(|| {
            RemoteError::Rejected(format!("unknown source {}", source_id)).into()
        })
    }
}

/// Notifier that remembers every notification
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub(crate) fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

/// Calls received by [`RecordingSink`] as a playlist
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum PlaylistCall {
    AppendSource { list_source: String, reverse: bool },
    MoveTo(usize),
    AppendSourceList { source_id: String, ascending: bool },
}

/// Export and playlist sink that records calls and can be told to fail
#[derive(Default)]
pub(crate) struct RecordingSink {
    batches: Mutex<Vec<Vec<FeedItem>>>,
    calls: Mutex<Vec<PlaylistCall>>,
    failure: Mutex<Option<String>>,
}

impl RecordingSink {
    pub(crate) fn batches(&self) -> Vec<Vec<FeedItem>> {
        self.batches.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> Vec<PlaylistCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    fn check(&self) -> Result<()> {
        match self.failure.lock().unwrap().clone() {
            Some(message) => Err(RemoteError::Rejected(message).into()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ExportSink for RecordingSink {
    async fn accept(&self, items: Vec<FeedItem>) -> Result<()> {
        self.check()?;
        self.batches.lock().unwrap().push(items);
        Ok(())
    }
}

#[async_trait]
impl PlaylistSink for RecordingSink {
    async fn append_source(&self, list_source: &str, reverse: bool) -> Result<()> {
        self.check()?;
        self.calls.lock().unwrap().push(PlaylistCall::AppendSource {
            list_source: list_source.to_string(),
            reverse,
        });
        Ok(())
    }

    async fn move_to(&self, index: usize) -> Result<()> {
        self.check()?;
        self.calls.lock().unwrap().push(PlaylistCall::MoveTo(index));
        Ok(())
    }

    async fn append_source_list(&self, source_id: &str, ascending: bool) -> Result<()> {
        self.check()?;
        self.calls.lock().unwrap().push(PlaylistCall::AppendSourceList {
            source_id: source_id.to_string(),
            ascending,
        });
        Ok(())
    }
}

/// Detail record used by controller tests
pub(crate) fn sample_detail() -> SourceDetail {
    SourceDetail {
        id: "336355127".into(),
        name: "Night Talk".into(),
        description: Some("Stories after midnight".into()),
        cover_url: Some("https://img.local/cover.jpg".into()),
        dj: None,
    }
}

/// Controller wired to recording collaborators
pub(crate) struct TestRig {
    pub(crate) controller: SessionController,
    pub(crate) fetcher: Arc<ScriptedFetcher>,
    pub(crate) notifier: Arc<RecordingNotifier>,
    pub(crate) sink: Arc<RecordingSink>,
    pub(crate) events: broadcast::Receiver<Event>,
}

/// Build a controller around `fetcher` with default config
pub(crate) fn test_controller(fetcher: ScriptedFetcher) -> TestRig {
    test_controller_with(fetcher, Config::default())
}

/// Build a controller around `fetcher` with a custom config
pub(crate) fn test_controller_with(fetcher: ScriptedFetcher, config: Config) -> TestRig {
    let fetcher = Arc::new(fetcher);
    let notifier = Arc::new(RecordingNotifier::default());
    let sink = Arc::new(RecordingSink::default());

    let controller = SessionController::builder(config)
        .fetcher(fetcher.clone())
        .directory(Arc::new(StaticDirectory::with(sample_detail())))
        .notifier(notifier.clone())
        .export_sink(sink.clone())
        .playlist(sink.clone())
        .build()
        .unwrap();
    let events = controller.subscribe();

    TestRig {
        controller,
        fetcher,
        notifier,
        sink,
        events,
    }
}

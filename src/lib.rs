//! # feed-session
//!
//! Paginated feed loading for a single page instance: one source, pages
//! fetched in order, items accumulated for display, and every in-flight load
//! cancelled and settled before the page goes away.
//!
//! ## Design
//!
//! - **One writer** - at most one [`LoadSession`] appends to the
//!   [`FeedAccumulator`]; the next one starts only after the previous one settled
//! - **Cooperative cancellation** - every session carries a child of the
//!   controller's root [`CancellationToken`](tokio_util::sync::CancellationToken)
//! - **Event-driven** - subscribers receive appends, clears, session results and
//!   notifications over a broadcast channel
//! - **Pluggable collaborators** - transport, source lookup, notifier and sinks
//!   are traits with default implementations
//!
//! ## Quick Start
//!
//! ```no_run
//! use feed_session::{Config, SessionController, SourceTarget};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let controller = SessionController::builder(Config::default()).build()?;
//!
//!     let mut events = controller.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     controller.open(SourceTarget::Id("336355127".into())).await?;
//!     controller.load_next().await?;
//!
//!     controller.teardown().await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Ordered item collection observed by the presentation layer
pub mod accumulator;
/// Configuration types
pub mod config;
/// Session lifecycle owner (decomposed into focused submodules)
pub mod controller;
/// Error types
pub mod error;
/// Best-effort bulk export
pub mod export;
/// Page transport and source lookup
pub mod fetcher;
/// User-facing fault reporting
pub mod notify;
/// Single-page load sessions
pub mod session;
/// Export and playback collaborators
pub mod sinks;
/// Core types
pub mod types;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use accumulator::FeedAccumulator;
pub use config::{ApiConfig, Config, DisplayConfig, PagingConfig};
pub use controller::{ControllerBuilder, SessionController};
pub use error::{Error, RemoteError, Result};
pub use export::BulkExporter;
pub use fetcher::{HttpPageFetcher, PageFetcher, SourceDirectory};
pub use notify::{BroadcastNotifier, Notifier};
pub use session::{LoadSession, SessionContext, SessionHandle, SessionOutcome, SessionParams};
pub use sinks::{ExportSink, NoOpSink, PlaylistSink};
pub use types::{
    Event, FeedItem, ItemKind, Notification, PageRequest, PageResult, SessionState,
    SourceDetail, SourceTarget,
};

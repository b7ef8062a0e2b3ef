//! Downstream collaborators that receive finished results
//!
//! - [`ExportSink`] receives the full result of a bulk export as one batch
//!   (typically a download queue)
//! - [`PlaylistSink`] receives "play all" / "add all" requests for the opened source
//!
//! [`NoOpSink`] implements both and refuses every call with
//! [`Error::NotSupported`], for embedders that do not wire one of them up.

use crate::error::{Error, Result};
use crate::types::FeedItem;
use async_trait::async_trait;

/// Receives the result of a bulk export in a single call
#[async_trait]
pub trait ExportSink: Send + Sync {
    /// Accept the exported items, in export order
    async fn accept(&self, items: Vec<FeedItem>) -> Result<()>;
}

/// Playback queue collaborator
#[async_trait]
pub trait PlaylistSink: Send + Sync {
    /// Replace the playback queue with the contents of a list source
    ///
    /// `reverse` is set when the feed is displayed in ascending order, so the
    /// queue plays in the order the user sees.
    async fn append_source(&self, list_source: &str, reverse: bool) -> Result<()>;

    /// Jump playback to the queue entry at `index`
    async fn move_to(&self, index: usize) -> Result<()>;

    /// Append every item of a source to the queue in the given direction
    async fn append_source_list(&self, source_id: &str, ascending: bool) -> Result<()>;
}

/// Sink that supports nothing
pub struct NoOpSink;

#[async_trait]
impl ExportSink for NoOpSink {
    async fn accept(&self, items: Vec<FeedItem>) -> Result<()> {
        Err(Error::NotSupported(format!(
            "no export sink configured ({} items dropped)",
            items.len()
        )))
    }
}

#[async_trait]
impl PlaylistSink for NoOpSink {
    async fn append_source(&self, _list_source: &str, _reverse: bool) -> Result<()> {
        Err(Error::NotSupported("no playlist configured".into()))
    }

    async fn move_to(&self, _index: usize) -> Result<()> {
        Err(Error::NotSupported("no playlist configured".into()))
    }

    async fn append_source_list(&self, _source_id: &str, _ascending: bool) -> Result<()> {
        Err(Error::NotSupported("no playlist configured".into()))
    }
}

//! Traits for remote page access

use crate::types::{PageRequest, PageResult, SourceDetail};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Fetches one page of a paginated source
///
/// # Errors
///
/// - [`Error::Cancelled`](crate::Error::Cancelled) if `cancel` was already
///   triggered when the call started, or the transport observed it in flight
/// - [`Error::Remote`](crate::Error::Remote) on transport or parse failure
///
/// Implementations must check `cancel` before issuing the network call. They are
/// not required to abort a call that is already in flight; callers must not rely
/// on it.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page described by `request`
    async fn fetch_page(
        &self,
        request: &PageRequest,
        cancel: &CancellationToken,
    ) -> crate::Result<PageResult>;
}

/// Resolves a source identifier to its descriptive metadata
#[async_trait]
pub trait SourceDirectory: Send + Sync {
    /// Look up the detail record for `source_id`
    async fn fetch_detail(&self, source_id: &str) -> crate::Result<SourceDetail>;
}

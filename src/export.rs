//! Bulk export of every page of a source.
//!
//! Unlike a [`LoadSession`](crate::LoadSession), the exporter does not stop on
//! the first failure: each failed page is reported and the loop moves on to the
//! next offset, so a partial result is preferred over none. The result never
//! touches the display accumulator; it is handed to an [`ExportSink`] in one
//! batch.

use crate::fetcher::PageFetcher;
use crate::notify::Notifier;
use crate::sinks::ExportSink;
use crate::types::{Event, FeedItem, Notification, PageRequest};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// Best-effort exporter draining all pages of a source
pub struct BulkExporter {
    fetcher: Arc<dyn PageFetcher>,
    notifier: Arc<dyn Notifier>,
    sink: Arc<dyn ExportSink>,
    event_tx: broadcast::Sender<Event>,
    page_size: u32,
    max_consecutive_failures: u32,
}

impl BulkExporter {
    /// Create an exporter
    ///
    /// # Arguments
    /// * `page_size` - items requested per page
    /// * `max_consecutive_failures` - failed pages in a row before giving up
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        notifier: Arc<dyn Notifier>,
        sink: Arc<dyn ExportSink>,
        event_tx: broadcast::Sender<Event>,
        page_size: u32,
        max_consecutive_failures: u32,
    ) -> Self {
        Self {
            fetcher,
            notifier,
            sink,
            event_tx,
            page_size,
            max_consecutive_failures: max_consecutive_failures.max(1),
        }
    }

    /// Fetch every page of `source_id` and hand the result to the sink
    ///
    /// Items are returned in page order with sequence indices `0..n`. Page
    /// failures are reported once each and skipped; the "more" flag is only
    /// updated by pages that succeed.
    pub async fn export_all(&self, source_id: &str, ascending: bool) -> Vec<FeedItem> {
        // Export is not part of the cancellable session model
        let never = CancellationToken::new();

        let mut items: Vec<FeedItem> = Vec::new();
        let mut has_more = true;
        let mut page = 0u32;
        let mut failures = 0u32;
        let mut consecutive_failures = 0u32;

        tracing::info!(source_id, ascending, "Starting bulk export");

        while has_more {
            let request = PageRequest::for_page(source_id, page, self.page_size, ascending);
            page += 1;

            match self.fetcher.fetch_page(&request, &never).await {
                Ok(result) => {
                    consecutive_failures = 0;
                    has_more = result.has_more;
                    let base = items.len() as u64;
                    items.extend(
                        result
                            .items
                            .into_iter()
                            .zip(base..)
                            .map(|(raw, seq)| FeedItem::from_raw(raw).with_sequence(seq)),
                    );
                }
                Err(e) if e.is_cancelled() => break,
                Err(e) => {
                    failures += 1;
                    consecutive_failures += 1;
                    tracing::warn!(
                        source_id,
                        offset = request.offset,
                        error = %e,
                        "Export page failed, continuing with next page"
                    );
                    self.notifier.notify(Notification::from_error(&e));

                    if consecutive_failures >= self.max_consecutive_failures {
                        tracing::warn!(
                            source_id,
                            consecutive_failures,
                            "Giving up export after repeated page failures"
                        );
                        break;
                    }
                }
            }
        }

        tracing::info!(
            source_id,
            items = items.len(),
            failures,
            "Bulk export finished"
        );

        if let Err(e) = self.sink.accept(items.clone()).await {
            self.notifier.notify(Notification::from_error(&e));
        }
        let _ = self.event_tx.send(Event::ExportFinished {
            source_id: source_id.to_string(),
            items: items.len(),
            failures,
        });

        items
    }
}

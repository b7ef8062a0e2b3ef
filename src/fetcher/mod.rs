//! Remote page fetching
//!
//! The core abstraction is the [`PageFetcher`] trait: one call fetches one page
//! of raw program records and reports whether more pages remain. Source
//! metadata lookups go through the separate [`SourceDirectory`] trait.
//!
//! - [`HttpPageFetcher`]: implements both traits over the remote JSON API
//!
//! Sessions and the exporter hold these as `Arc<dyn Trait>`, so tests and
//! embedders can substitute their own transport.
//!
//! ## Usage
//!
//! ```no_run
//! use feed_session::config::ApiConfig;
//! use feed_session::fetcher::{HttpPageFetcher, PageFetcher};
//! use feed_session::PageRequest;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = HttpPageFetcher::new(&ApiConfig::default())?;
//! let cancel = CancellationToken::new();
//!
//! let page = fetcher
//!     .fetch_page(&PageRequest::for_page("336355127", 0, 30, false), &cancel)
//!     .await?;
//! println!("{} programs, more: {}", page.items.len(), page.has_more);
//! # Ok(())
//! # }
//! ```

mod http;
mod traits;


pub use http::HttpPageFetcher;
pub use traits::{PageFetcher, SourceDirectory};

//! Core types for feed-session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of playable item carried by a feed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Radio program episode
    #[default]
    Radio,
    /// Plain song
    Song,
}

/// One unit of feed content (a program episode)
///
/// Built from a [`RawProgram`] and never mutated once it has been appended to
/// a [`FeedAccumulator`](crate::FeedAccumulator).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Program identifier
    pub id: u64,
    /// Display title
    pub title: String,
    /// Item kind (always [`ItemKind::Radio`] for program feeds)
    pub kind: ItemKind,
    /// Identifier of the underlying audio track
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song_id: Option<u64>,
    /// Episode number within the source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_num: Option<u32>,
    /// Host display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dj_name: Option<String>,
    /// Program description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Cover image URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    /// Duration in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Publication time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Arrival order within the current session (reset by a clear)
    pub sequence_index: u64,
}

impl FeedItem {
    /// Map a raw program record to a feed item
    ///
    /// The sequence index starts at zero; the accumulator (or exporter) assigns
    /// the real value when the item is collected.
    pub fn from_raw(raw: RawProgram) -> Self {
        let song_name = raw.main_song.as_ref().and_then(|s| s.name.clone());
        let title = raw
            .name
            .filter(|n| !n.is_empty())
            .or(song_name)
            .unwrap_or_else(|| raw.id.to_string());

        Self {
            id: raw.id,
            title,
            kind: ItemKind::Radio,
            song_id: raw.main_song.map(|s| s.id),
            serial_num: raw.serial_num,
            dj_name: raw.dj.and_then(|d| d.nickname),
            description: raw.description,
            cover_url: raw.cover_url,
            duration_ms: raw.duration,
            created_at: raw.create_time.and_then(DateTime::<Utc>::from_timestamp_millis),
            sequence_index: 0,
        }
    }

    /// Return the item with its sequence index set
    pub fn with_sequence(mut self, sequence_index: u64) -> Self {
        self.sequence_index = sequence_index;
        self
    }
}

/// Serde view of one raw program record from the page API
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProgram {
    /// Program identifier (the only required field)
    pub id: u64,
    /// Program name
    #[serde(default)]
    pub name: Option<String>,
    /// Program description
    #[serde(default)]
    pub description: Option<String>,
    /// Cover image URL
    #[serde(default)]
    pub cover_url: Option<String>,
    /// Duration in milliseconds
    #[serde(default)]
    pub duration: Option<u64>,
    /// Episode number
    #[serde(default)]
    pub serial_num: Option<u32>,
    /// Creation time (milliseconds since the Unix epoch)
    #[serde(default)]
    pub create_time: Option<i64>,
    /// Underlying audio track
    #[serde(default)]
    pub main_song: Option<RawSong>,
    /// Program host
    #[serde(default)]
    pub dj: Option<RawDj>,
}

/// Audio track attached to a raw program
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSong {
    /// Track identifier
    pub id: u64,
    /// Track name
    #[serde(default)]
    pub name: Option<String>,
}

/// Host of a source or program, as sent by the page API
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDj {
    /// User identifier
    #[serde(default)]
    pub user_id: Option<u64>,
    /// Display name
    #[serde(default)]
    pub nickname: Option<String>,
}

/// Host reference exposed on a [`SourceDetail`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DjRef {
    /// User identifier
    pub id: u64,
    /// Display name
    pub name: String,
}

/// Descriptive metadata for a paginated source
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDetail {
    /// Source identifier used in page requests
    pub id: String,
    /// Source name
    pub name: String,
    /// Source description
    #[serde(default)]
    pub description: Option<String>,
    /// Cover image URL
    #[serde(default)]
    pub cover_url: Option<String>,
    /// Host
    #[serde(default)]
    pub dj: Option<DjRef>,
}

impl SourceDetail {
    /// Minimal detail used when only the identifier is known
    pub fn placeholder(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            description: None,
            cover_url: None,
            dj: None,
        }
    }
}

/// What a controller is asked to open
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceTarget {
    /// Only the identifier is known; details are looked up remotely
    Id(String),
    /// Details were already resolved by the caller
    Detail(SourceDetail),
}

/// One page fetch request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Source identifier
    pub source_id: String,
    /// Item offset of the first requested item
    pub offset: u64,
    /// Maximum number of items requested
    pub limit: u32,
    /// Sort direction
    pub ascending: bool,
}

impl PageRequest {
    /// Build the request for a zero-based page number
    pub fn for_page(source_id: impl Into<String>, page: u32, limit: u32, ascending: bool) -> Self {
        Self {
            source_id: source_id.into(),
            offset: u64::from(page) * u64::from(limit),
            limit,
            ascending,
        }
    }
}

/// One page returned by a [`PageFetcher`](crate::PageFetcher)
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageResult {
    /// Raw records in remote order
    pub items: Vec<RawProgram>,
    /// Whether pages exist beyond this one
    pub has_more: bool,
}

/// Lifecycle state of a [`LoadSession`](crate::LoadSession)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Constructed, not yet running
    Created,
    /// Fetching or appending
    Running,
    /// The page was fully appended
    Completed,
    /// A cancellation signal was observed
    Cancelled,
    /// The page fetch failed
    Faulted,
}

impl SessionState {
    /// Returns true for Completed, Cancelled and Faulted
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Cancelled | SessionState::Faulted
        )
    }
}

/// A fault surfaced to the user-facing error collaborator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Headline message
    pub message: String,
    /// Inner cause, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl Notification {
    /// Create a notification with a message and optional cause
    pub fn new(message: impl Into<String>, cause: Option<String>) -> Self {
        Self {
            message: message.into(),
            cause,
        }
    }

    /// Build a notification from an error and its innermost cause
    pub fn from_error(error: &crate::Error) -> Self {
        Self {
            message: error.to_string(),
            cause: error.cause_message(),
        }
    }
}

/// Events emitted to presentation-layer subscribers
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// An item was appended at `index` (add semantics, not a reset)
    ItemAppended {
        /// Position in the accumulator
        index: usize,
        /// Sequence index assigned to the item
        sequence_index: u64,
    },

    /// The accumulator was cleared
    Cleared,

    /// The "more available" flag changed after a page arrived
    MoreAvailable {
        /// Whether another page can be requested
        more: bool,
    },

    /// A session reached a terminal state
    SessionFinished {
        /// Page number the session loaded
        page: u32,
        /// Terminal state
        state: SessionState,
    },

    /// A fault was reported to the user
    Notification {
        /// Headline message
        message: String,
        /// Inner cause, if any
        #[serde(skip_serializing_if = "Option::is_none")]
        cause: Option<String>,
    },

    /// A bulk export finished and was handed to the export sink
    ExportFinished {
        /// Source identifier
        source_id: String,
        /// Number of exported items
        items: usize,
        /// Number of pages that failed
        failures: u32,
    },

    /// The controller was torn down
    Disposed,
}

//! Feed snapshot and error types.

use crate::model::TrackRecord;

/// What one fetch of a station feed produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedSnapshot {
    /// The JSON endpoint the tracks came from (after landing-page resolution)
    pub source_url: String,
    /// Program title of the first entry, if the feed had any entries
    pub program_title: Option<String>,
    /// Number of raw entries, placeholders included
    pub entry_count: usize,
    /// Non-placeholder tracks in feed order
    pub tracks: Vec<TrackRecord>,
}

impl FeedSnapshot {
    /// A feed with no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    /// Whether the feed belongs to the expected show.
    ///
    /// An empty expectation accepts any program.
    pub fn matches_program(&self, expected: &str) -> bool {
        if expected.is_empty() {
            return true;
        }
        self.program_title.as_deref() == Some(expected)
    }
}

/// Errors raised while fetching or parsing a feed
#[derive(Debug, Clone, thiserror::Error)]
pub enum FeedError {
    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} fetching {url}")]
    Http { url: String, status: u16 },

    #[error("Failed to parse tracklist from {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Landing page {0} has no tracklist locator")]
    MissingTracklistUrl(String),
}

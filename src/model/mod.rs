//! Core data model shared by the feed, catalog and sync layers.
//!
//! A [`TrackRecord`] is what the station feed tells us was played. Records
//! have no stable key of their own: two records are "the same track" when
//! their title and artist match. Once a record carries a catalog id it can
//! be stored in history and pushed to a playlist.

use serde::{Deserialize, Serialize};

/// A single track as reported by the station feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    /// Track title (empty titles are ad-break placeholders)
    pub title: String,
    /// Artist as credited by the station
    pub artist: String,
    /// Album title, may be empty
    #[serde(default)]
    pub album: String,
    /// Spotify track id, either supplied by the feed or resolved by the matcher
    #[serde(default)]
    pub catalog_id: Option<String>,
}

impl TrackRecord {
    /// Create an unresolved record.
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            catalog_id: None,
        }
    }

    /// Attach a catalog id.
    pub fn with_catalog_id(mut self, id: impl Into<String>) -> Self {
        self.catalog_id = Some(id.into());
        self
    }

    /// Ad breaks show up in the feed as entries without a title.
    pub fn is_placeholder(&self) -> bool {
        self.title.trim().is_empty()
    }

    /// Whether the record already has a catalog id.
    pub fn is_resolved(&self) -> bool {
        self.catalog_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

impl std::fmt::Display for TrackRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} by {}", self.title, self.artist)
    }
}

/// Collect the catalog ids of resolved records, preserving order.
pub fn catalog_ids(tracks: &[TrackRecord]) -> Vec<String> {
    tracks
        .iter()
        .filter_map(|t| t.catalog_id.clone())
        .filter(|id| !id.is_empty())
        .collect()
}

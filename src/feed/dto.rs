//! Station feed Data Transfer Objects
//!
//! The tracklist endpoint returns a JSON array with one object per played
//! segment. Every field may be missing or null depending on the segment
//! type, so everything is optional here and the adapter decides defaults.

use serde::{Deserialize, Serialize};

/// One entry of the tracklist JSON array
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Spotify id when the station already knows it (often empty)
    pub spotify_id: Option<String>,
    /// Name of the show this segment aired in
    pub program_title: Option<String>,
}

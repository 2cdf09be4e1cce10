//! Adapter layer: Convert feed DTOs to track records

use super::domain::FeedSnapshot;
use super::dto::FeedEntry;
use crate::model::TrackRecord;

/// Convert one feed entry into a track record.
///
/// Empty `spotify_id` values count as "no id".
pub fn to_track(entry: FeedEntry) -> TrackRecord {
    let catalog_id = entry
        .spotify_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    TrackRecord {
        title: entry.title.unwrap_or_default(),
        artist: entry.artist.unwrap_or_default(),
        album: entry.album.unwrap_or_default(),
        catalog_id,
    }
}

/// Drop ad-break placeholders, keeping the order of everything else.
pub fn without_placeholders(tracks: Vec<TrackRecord>) -> Vec<TrackRecord> {
    tracks.into_iter().filter(|t| !t.is_placeholder()).collect()
}

/// Build a snapshot from the raw tracklist.
pub fn to_snapshot(source_url: impl Into<String>, entries: Vec<FeedEntry>) -> FeedSnapshot {
    let entry_count = entries.len();
    let program_title = entries
        .first()
        .map(|e| e.program_title.clone().unwrap_or_default());
    let tracks = without_placeholders(entries.into_iter().map(to_track).collect());

    FeedSnapshot {
        source_url: source_url.into(),
        program_title,
        entry_count,
        tracks,
    }
}

//! Adapter layer: Convert Spotify DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types,
//! and the only place that knows how track ids map to Spotify URIs.

use super::domain::{PlaylistRef, SearchPage};
use super::dto;

const TRACK_URI_PREFIX: &str = "spotify:track:";

/// Convert a search response into a [`SearchPage`].
///
/// Items without an id (local files) are skipped; the reported total is kept
/// as-is because matching keys off it.
pub fn to_search_page(response: dto::SearchResponse) -> SearchPage {
    let Some(tracks) = response.tracks else {
        return SearchPage::default();
    };

    SearchPage {
        total: tracks.total,
        track_ids: tracks.items.into_iter().filter_map(|t| t.id).collect(),
    }
}

/// Convert a playlist object into a [`PlaylistRef`].
pub fn to_playlist_ref(playlist: dto::Playlist) -> PlaylistRef {
    PlaylistRef {
        name: playlist.name,
        remote_id: playlist.id,
    }
}

/// Turn a bare track id into the URI form playlist endpoints expect.
pub fn track_uri(id: &str) -> String {
    if id.starts_with(TRACK_URI_PREFIX) {
        id.to_string()
    } else {
        format!("{TRACK_URI_PREFIX}{id}")
    }
}

/// Build the body for removing every occurrence of the given tracks.
pub fn to_remove_request(ids: &[String]) -> dto::RemoveTracksRequest {
    dto::RemoveTracksRequest {
        tracks: ids
            .iter()
            .map(|id| dto::TrackUri { uri: track_uri(id) })
            .collect(),
    }
}

//! Test utilities and fixtures for playlist-minder tests.
//!
//! Common builders for tracks and feed snapshots, plus a scratch history
//! store, so sync tests stay focused on behavior.
//!
//! # Example
//!
//! ```ignore
//! use playlist_minder::test_utils::{temp_store, snapshot, resolved};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let (store, _dir) = temp_store();
//!     let snap = snapshot("https://feed/1", "Show", vec![resolved("Song", "id-1")]);
//!     // ... test logic
//! }
//! ```

use tempfile::TempDir;

use crate::feed::FeedSnapshot;
use crate::model::TrackRecord;
use crate::sync::HistoryStore;

/// Creates a history store in a temporary directory.
///
/// Keep the `TempDir` alive for the duration of the test; the files are
/// deleted when it is dropped.
pub fn temp_store() -> (HistoryStore, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let store = HistoryStore::new(dir.path().join("data"));
    (store, dir)
}

/// A track the feed did not resolve.
pub fn track(title: &str, artist: &str) -> TrackRecord {
    TrackRecord::new(title, artist, "Test Album")
}

/// A track that already carries a catalog id.
pub fn resolved(title: &str, id: &str) -> TrackRecord {
    TrackRecord::new(title, "Test Artist", "Test Album").with_catalog_id(id)
}

/// A feed snapshot with one raw entry per track.
pub fn snapshot(source_url: &str, program: &str, tracks: Vec<TrackRecord>) -> FeedSnapshot {
    FeedSnapshot {
        source_url: source_url.to_string(),
        program_title: Some(program.to_string()),
        entry_count: tracks.len(),
        tracks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_store_lives_in_temp_dir() {
        let (store, dir) = temp_store();
        assert!(store.dir().starts_with(dir.path()));
    }

    #[test]
    fn test_fixture_defaults() {
        assert!(!track("Song", "Band").is_resolved());
        assert!(resolved("Song", "id-1").is_resolved());

        let snap = snapshot("https://feed/1", "Show", vec![track("A", "B")]);
        assert_eq!(snap.entry_count, 1);
        assert!(snap.matches_program("Show"));
    }
}

//! History file persistence.
//!
//! One file per managed playlist, named from the playlist's Spotify id:
//! `<data_dir>/playlist-<id>.json`. The file is a versioned envelope around
//! [`HistoryState`] so the retention format can evolve with an explicit
//! migration instead of silently changing shape.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::history::{HistoryPolicy, HistoryState};
use crate::error::{Error, Result, ResultExt};
use crate::model::TrackRecord;

/// Current on-disk schema version
pub const SCHEMA_VERSION: u32 = 1;

/// On-disk envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryFile {
    pub version: u32,
    pub playlist_id: String,
    pub state: HistoryState,
}

/// Directory of per-playlist history files
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    /// Store rooted at `dir` (created on first save).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the history files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing the playlist `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("playlist-{key}.json"))
    }

    /// Read the stored file for `key` as is, without any migration.
    pub fn read(&self, key: &str) -> Result<Option<HistoryFile>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(format!("reading history {}", path.display()))?;
        let file: HistoryFile = serde_json::from_str(&raw)
            .with_context(format!("parsing history {}", path.display()))?;

        if file.version > SCHEMA_VERSION {
            return Err(Error::UnsupportedHistoryVersion {
                path,
                found: file.version,
                supported: SCHEMA_VERSION,
            });
        }
        if file.playlist_id != key {
            return Err(Error::HistoryMismatch {
                path,
                expected: key.to_string(),
                found: file.playlist_id,
            });
        }
        Ok(Some(file))
    }

    /// Load the state for `key`, or an empty state when no file exists.
    ///
    /// A state stored under a different policy is migrated to `policy`;
    /// tracks the migration pushes out are returned alongside the state.
    pub fn load(&self, key: &str, policy: HistoryPolicy) -> Result<(HistoryState, Vec<TrackRecord>)> {
        let Some(file) = self.read(key)? else {
            tracing::debug!("No history for {}, starting empty", key);
            return Ok((HistoryState::empty(policy), Vec::new()));
        };

        let mut state = file.state;
        let dropped = state.conform(policy);
        if !dropped.is_empty() {
            tracing::info!(
                "History for {} migrated to {:?}, {} tracks no longer fit",
                key,
                policy,
                dropped.len()
            );
        }
        Ok((state, dropped))
    }

    /// A fresh empty state for `key`; nothing is written.
    pub fn reset(&self, key: &str, policy: HistoryPolicy) -> HistoryState {
        tracing::info!("Resetting history for {}", key);
        HistoryState::empty(policy)
    }

    /// Write `state` for `key` atomically (temp file, then rename).
    pub fn save(&self, key: &str, state: &HistoryState) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(format!("creating {}", self.dir.display()))?;

        let path = self.path_for(key);
        let file = HistoryFile {
            version: SCHEMA_VERSION,
            playlist_id: key.to_string(),
            state: state.clone(),
        };
        let contents = serde_json::to_string_pretty(&file)?;

        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, contents)
            .with_context(format!("writing {}", temp_path.display()))?;
        std::fs::rename(&temp_path, &path)
            .with_context(format!("replacing {}", path.display()))?;

        tracing::debug!("Saved history to {:?}", path);
        Ok(())
    }

    /// Write an empty state for a freshly created playlist.
    pub fn initialize(&self, key: &str, policy: HistoryPolicy) -> Result<HistoryState> {
        let state = HistoryState::empty(policy);
        self.save(key, &state)?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::history::TrackHistory;
    use crate::test_utils::temp_store;

    #[test]
    fn test_file_name_is_derived_from_id() {
        let store = HistoryStore::new("/data");
        assert_eq!(
            store.path_for("6YdPiiezSwhcGgxvTNIRh2"),
            PathBuf::from("/data/playlist-6YdPiiezSwhcGgxvTNIRh2.json")
        );
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let (store, _dir) = temp_store();
        let (state, dropped) = store.load("nope", HistoryPolicy::Flat { limit: 10 }).unwrap();
        assert_eq!(state, HistoryState::empty(HistoryPolicy::Flat { limit: 10 }));
        assert!(dropped.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let (store, _dir) = temp_store();
        let policy = HistoryPolicy::Flat { limit: 0 };
        let mut state = HistoryState::empty(policy);
        state.record_url("https://feed/1");
        if let TrackHistory::Flat(flat) = &mut state.tracks {
            flat.prepend_and_cap(
                vec![TrackRecord::new("Song", "Band", "LP").with_catalog_id("id-1")],
                0,
            );
        }

        store.save("pl-1", &state).unwrap();
        let (loaded, _) = store.load("pl-1", policy).unwrap();

        assert_eq!(loaded, state);
        assert!(!store.path_for("pl-1").with_extension("json.tmp").exists());
    }

    #[test]
    fn test_read_skips_migration() {
        let (store, _dir) = temp_store();
        store
            .initialize("pl-1", HistoryPolicy::DaySlots { last_day: 2 })
            .unwrap();

        let file = store.read("pl-1").unwrap().unwrap();
        assert!(matches!(file.state.tracks, TrackHistory::DaySlots(_)));
        assert!(store.read("missing").unwrap().is_none());
    }

    #[test]
    fn test_initialize_writes_empty_file() {
        let (store, _dir) = temp_store();
        store
            .initialize("pl-new", HistoryPolicy::DaySlots { last_day: 7 })
            .unwrap();

        let raw = std::fs::read_to_string(store.path_for("pl-new")).unwrap();
        let file: HistoryFile = serde_json::from_str(&raw).unwrap();
        assert_eq!(file.version, SCHEMA_VERSION);
        assert_eq!(file.playlist_id, "pl-new");
        assert_eq!(file.state.track_count(), 0);
    }

    #[test]
    fn test_reset_ignores_stored_state() {
        let (store, _dir) = temp_store();
        let policy = HistoryPolicy::Flat { limit: 0 };
        let mut state = HistoryState::empty(policy);
        state.record_url("https://feed/1");
        store.save("pl-1", &state).unwrap();

        let reset = store.reset("pl-1", policy);
        assert!(reset.url_history.is_empty());
        // Reset does not touch disk
        let (loaded, _) = store.load("pl-1", policy).unwrap();
        assert_eq!(loaded.url_history.len(), 1);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let (store, _dir) = temp_store();
        std::fs::create_dir_all(store.dir()).unwrap();
        let state = HistoryState::empty(HistoryPolicy::default());
        let file = HistoryFile {
            version: SCHEMA_VERSION + 1,
            playlist_id: "pl-1".to_string(),
            state,
        };
        std::fs::write(store.path_for("pl-1"), serde_json::to_string(&file).unwrap()).unwrap();

        let err = store.load("pl-1", HistoryPolicy::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedHistoryVersion { found: 2, .. }));
    }

    #[test]
    fn test_file_copied_from_other_playlist_is_rejected() {
        let (store, _dir) = temp_store();
        store
            .initialize("pl-other", HistoryPolicy::Flat { limit: 0 })
            .unwrap();
        std::fs::copy(store.path_for("pl-other"), store.path_for("pl-1")).unwrap();

        let err = store.load("pl-1", HistoryPolicy::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::HistoryMismatch { ref expected, ref found, .. } if expected == "pl-1" && found == "pl-other"
        ));
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let (store, _dir) = temp_store();
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.path_for("pl-1"), "not json").unwrap();

        let err = store.load("pl-1", HistoryPolicy::default()).unwrap_err();
        assert!(err.to_string().contains("parsing history"));
    }
}

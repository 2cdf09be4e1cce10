//! Playlist sync core.
//!
//! - [`matcher`] resolves feed tracks to Spotify ids
//! - [`history`] holds the rolling window of what the playlist contains
//! - [`store`] persists that window per playlist
//! - [`orchestrator`] runs a check/match/reconcile/persist cycle

pub mod history;
pub mod matcher;
pub mod orchestrator;
pub mod store;

pub use history::{DaySlot, DaySlots, FlatHistory, HistoryPolicy, HistoryState, TrackHistory};
pub use matcher::{MatchReport, TrackMatcher};
pub use orchestrator::{Orchestrator, PlaylistJob, RunSummary, SkipReason, SyncOutcome, SyncReport};
pub use store::HistoryStore;

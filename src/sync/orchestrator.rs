//! Sync orchestrator
//!
//! One cycle per configured playlist:
//!
//! ```text
//! Check -> Fetch -> Match -> Reconcile -> Persist
//!   \
//!    -> Skip
//! ```
//!
//! History is loaded at the start of a cycle, mutated in memory and written
//! only after the playlist has been reconciled. Any error before that leaves
//! the history file as it was.

use std::collections::{HashMap, HashSet};
use std::fmt;

use super::history::{DaySlot, DaySlots, FlatHistory, HistoryPolicy, TrackHistory};
use super::matcher::TrackMatcher;
use super::store::HistoryStore;
use crate::catalog::{CatalogApi, find_or_create_playlist};
use crate::error::{Error, Result, ResultExt};
use crate::feed::{FeedSnapshot, FeedSource};
use crate::model::{TrackRecord, catalog_ids};

/// Everything needed to sync one playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistJob {
    pub playlist_name: String,
    /// Expected program title; empty accepts any show
    pub program_title: String,
    pub feed_url: String,
    pub policy: HistoryPolicy,
    /// Start from an empty history instead of the stored one
    pub reset_history: bool,
}

/// Why a cycle did nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    FeedUnavailable(String),
    EmptyFeed,
    ProgramMismatch { expected: String, found: Option<String> },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FeedUnavailable(msg) => write!(f, "feed unavailable ({msg})"),
            Self::EmptyFeed => write!(f, "feed is empty"),
            Self::ProgramMismatch { expected, found } => write!(
                f,
                "feed is playing {:?}, not {:?}",
                found.as_deref().unwrap_or(""),
                expected
            ),
        }
    }
}

/// What a completed cycle changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub playlist_id: String,
    /// Tracks added to history this cycle
    pub added: usize,
    /// Tracks that left the history window
    pub evicted: usize,
    /// Feed tracks no search could resolve
    pub dropped: usize,
    /// Tracks in the history after the cycle
    pub playlist_len: usize,
    /// The feed URL had been processed before
    pub repeated_url: bool,
}

/// Result of one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Skipped(SkipReason),
    Updated(SyncReport),
}

/// Totals for a whole run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub updated: usize,
    pub skipped: usize,
    /// Playlist name and error for every failed cycle
    pub failed: Vec<(String, String)>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Drives sync cycles against a catalog, a feed and a history store.
pub struct Orchestrator<'a> {
    catalog: &'a dyn CatalogApi,
    feed: &'a dyn FeedSource,
    store: &'a HistoryStore,
}

impl<'a> Orchestrator<'a> {
    pub fn new(catalog: &'a dyn CatalogApi, feed: &'a dyn FeedSource, store: &'a HistoryStore) -> Self {
        Self {
            catalog,
            feed,
            store,
        }
    }

    /// Run one cycle for `job`.
    pub async fn sync(&self, job: &PlaylistJob) -> Result<SyncOutcome> {
        let snapshot = match self.check(job).await {
            Ok(snapshot) => snapshot,
            Err(reason) => {
                tracing::info!("{}: nothing changed, {}", job.playlist_name, reason);
                return Ok(SyncOutcome::Skipped(reason));
            }
        };

        let (playlist, created) = find_or_create_playlist(self.catalog, &job.playlist_name).await?;
        let key = playlist.remote_id.as_str();

        let (mut state, migrated_out) = if created {
            tracing::info!("Created playlist {} ({})", playlist.name, key);
            (self.store.initialize(key, job.policy)?, Vec::new())
        } else if job.reset_history {
            (self.store.reset(key, job.policy), Vec::new())
        } else {
            self.store.load(key, job.policy)?
        };

        tracing::info!(
            "{}: {} tracks from {}",
            job.playlist_name,
            snapshot.tracks.len(),
            snapshot.source_url
        );
        let matched = TrackMatcher::new(self.catalog)
            .resolve_all(snapshot.tracks)
            .await?;

        let repeated_url = state.record_url(&snapshot.source_url);
        if repeated_url {
            tracing::warn!(
                "{}: {} was already processed, updating anyway",
                job.playlist_name,
                snapshot.source_url
            );
        }

        let added = matched.resolved.len();
        let evicted = match &mut state.tracks {
            TrackHistory::DaySlots(days) => {
                let new_slot = DaySlot {
                    source_url: snapshot.source_url.clone(),
                    tracks: matched.resolved,
                };
                self.reconcile_days(key, days, new_slot, migrated_out).await?
            }
            TrackHistory::Flat(flat) => {
                self.reconcile_flat(key, flat, matched.resolved, job.policy.track_limit(), migrated_out.len())
                    .await?
            }
        };

        self.store.save(key, &state)?;

        let report = SyncReport {
            playlist_id: playlist.remote_id.clone(),
            added,
            evicted,
            dropped: matched.dropped.len(),
            playlist_len: state.track_count(),
            repeated_url,
        };
        tracing::info!(
            "{}: +{} -{} ({} unmatched), {} tracks",
            job.playlist_name,
            report.added,
            report.evicted,
            report.dropped,
            report.playlist_len
        );
        Ok(SyncOutcome::Updated(report))
    }

    /// Run every job in order.
    ///
    /// A failed cycle is logged and the run moves on; an authentication
    /// failure stops the run.
    pub async fn sync_all(&self, jobs: &[PlaylistJob]) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for job in jobs {
            match self.sync(job).await {
                Ok(SyncOutcome::Updated(_)) => summary.updated += 1,
                Ok(SyncOutcome::Skipped(_)) => summary.skipped += 1,
                Err(e) if e.is_fatal() => {
                    return Err(e.context(format!("syncing {}", job.playlist_name)));
                }
                Err(e) => {
                    tracing::error!("{}: sync failed: {}", job.playlist_name, e);
                    summary.failed.push((job.playlist_name.clone(), e.to_string()));
                }
            }
        }

        Ok(summary)
    }

    async fn check(&self, job: &PlaylistJob) -> std::result::Result<FeedSnapshot, SkipReason> {
        let snapshot = self.feed.fetch(&job.feed_url).await.map_err(|e| {
            tracing::warn!("{}: {}", job.playlist_name, e);
            SkipReason::FeedUnavailable(e.to_string())
        })?;

        if snapshot.is_empty() {
            return Err(SkipReason::EmptyFeed);
        }
        if !snapshot.matches_program(&job.program_title) {
            return Err(SkipReason::ProgramMismatch {
                expected: job.program_title.clone(),
                found: snapshot.program_title,
            });
        }
        Ok(snapshot)
    }

    /// Push the new day into the window, then bring the playlist to the
    /// window's per-track counts: remove what fell out, add what is missing.
    ///
    /// A day without any matched tracks leaves the window alone.
    async fn reconcile_days(
        &self,
        playlist_id: &str,
        days: &mut DaySlots,
        new_slot: DaySlot,
        mut leaving: Vec<TrackRecord>,
    ) -> Result<usize> {
        // The playlist holds the window plus whatever a migration pushed out
        let before = id_counts(days.tracks().chain(&leaving));
        if !new_slot.tracks.is_empty() {
            leaving.extend(days.advance(new_slot));
        }
        let after = id_counts(days.tracks());

        // Removal drops every occurrence, so an id that lost copies goes whole
        // and is re-added as often as the window still holds it
        let mut seen = HashSet::new();
        let remove_ids: Vec<String> = catalog_ids(&leaving)
            .into_iter()
            .filter(|id| count(&after, id) < count(&before, id) && seen.insert(id.clone()))
            .collect();

        let mut missing: HashMap<&str, usize> = after
            .iter()
            .filter_map(|(id, &wanted)| {
                let held = if seen.contains(id) { 0 } else { count(&before, id) };
                (wanted > held).then(|| (id.as_str(), wanted - held))
            })
            .collect();
        let mut new_ids = Vec::new();
        for id in days.tracks().filter_map(|t| t.catalog_id.as_deref()) {
            if let Some(n) = missing.get_mut(id).filter(|n| **n > 0) {
                *n -= 1;
                new_ids.push(id.to_string());
            }
        }

        if !remove_ids.is_empty() {
            self.catalog
                .remove_all_occurrences(playlist_id, &remove_ids)
                .await
                .map_err(Error::from)
                .with_context("removing evicted tracks")?;
        }
        if !new_ids.is_empty() {
            self.catalog
                .add_tracks(playlist_id, &new_ids)
                .await
                .map_err(Error::from)
                .with_context("adding new tracks")?;
        }

        Ok(leaving.len())
    }

    /// Prepend with cap and replace the playlist with the whole list.
    async fn reconcile_flat(
        &self,
        playlist_id: &str,
        flat: &mut FlatHistory,
        new_tracks: Vec<TrackRecord>,
        limit: usize,
        already_dropped: usize,
    ) -> Result<usize> {
        let dropped = flat.prepend_and_cap(new_tracks, limit);
        self.catalog
            .replace_tracks(playlist_id, &catalog_ids(&flat.tracks))
            .await
            .map_err(Error::from)
            .with_context("replacing playlist tracks")?;
        Ok(already_dropped + dropped)
    }
}

/// How many times each catalog id occurs
fn id_counts<'t>(tracks: impl Iterator<Item = &'t TrackRecord>) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for id in tracks.filter_map(|t| t.catalog_id.as_deref()) {
        *counts.entry(id.to_string()).or_insert(0) += 1;
    }
    counts
}

fn count(counts: &HashMap<String, usize>, id: &str) -> usize {
    counts.get(id).copied().unwrap_or(0)
}

//! Rolling track history.
//!
//! Two retention policies exist:
//!
//! - **Day slots**: a fixed window of per-cycle batches (Day 0 .. Day N).
//!   Advancing pushes a new batch into Day 0 and pops Day N, whose tracks
//!   must then be removed from the live playlist.
//! - **Flat**: one newest-first list truncated to a track limit. The
//!   playlist is simply replaced with the list, so nothing is evicted
//!   explicitly.
//!
//! Both keep `url_history`, every feed URL ever processed. It is only used
//! to spot a feed that did not change between runs.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::model::TrackRecord;

/// How a playlist's history is retained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryPolicy {
    /// Newest-first list capped at `limit` tracks (0 = uncapped)
    Flat { limit: usize },
    /// Slots Day 0 ..= Day `last_day`
    DaySlots { last_day: usize },
}

impl HistoryPolicy {
    /// Track cap of the flat policy (0 = uncapped, and always 0 for day slots).
    pub fn track_limit(&self) -> usize {
        match self {
            Self::Flat { limit } => *limit,
            Self::DaySlots { .. } => 0,
        }
    }
}

impl Default for HistoryPolicy {
    fn default() -> Self {
        Self::Flat { limit: 0 }
    }
}

/// One cycle's worth of tracks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySlot {
    pub source_url: String,
    pub tracks: Vec<TrackRecord>,
}

/// Fixed window of day slots, index 0 newest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySlots {
    slots: VecDeque<DaySlot>,
}

impl DaySlots {
    /// Empty window with slots Day 0 ..= Day `last_day`.
    pub fn new(last_day: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(DaySlot::default)
                .take(last_day + 1)
                .collect(),
        }
    }

    /// Build from explicit slots, newest first.
    #[cfg(test)]
    pub fn from_slots(slots: Vec<DaySlot>) -> Self {
        Self {
            slots: slots.into(),
        }
    }

    /// Number of slots in the window.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Slot `day` (0 = newest).
    pub fn day(&self, day: usize) -> Option<&DaySlot> {
        self.slots.get(day)
    }

    /// Slots newest first.
    pub fn iter(&self) -> impl Iterator<Item = &DaySlot> {
        self.slots.iter()
    }

    /// Shift every slot down one day, put `new_slot` in Day 0 and return the
    /// tracks of the slot that fell out of the window.
    pub fn advance(&mut self, new_slot: DaySlot) -> Vec<TrackRecord> {
        if self.slots.is_empty() {
            // A zero-length window keeps nothing
            return new_slot.tracks;
        }
        self.slots.push_front(new_slot);
        self.slots.pop_back().map(|slot| slot.tracks).unwrap_or_default()
    }

    /// Grow or shrink the window to Day 0 ..= Day `last_day`.
    ///
    /// Returns the tracks of slots cut off by shrinking, oldest first.
    pub fn resize(&mut self, last_day: usize) -> Vec<TrackRecord> {
        let capacity = last_day + 1;
        let mut dropped = Vec::new();
        while self.slots.len() > capacity {
            if let Some(slot) = self.slots.pop_back() {
                dropped.extend(slot.tracks);
            }
        }
        while self.slots.len() < capacity {
            self.slots.push_back(DaySlot::default());
        }
        dropped
    }

    /// All tracks, newest day first.
    pub fn tracks(&self) -> impl Iterator<Item = &TrackRecord> {
        self.slots.iter().flat_map(|slot| slot.tracks.iter())
    }
}

/// Newest-first track list with a cap
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatHistory {
    pub tracks: Vec<TrackRecord>,
}

impl FlatHistory {
    /// Put `new_tracks` (order preserved) in front of the existing ones and
    /// truncate to `limit` when `limit > 0`. Returns how many were dropped.
    pub fn prepend_and_cap(&mut self, new_tracks: Vec<TrackRecord>, limit: usize) -> usize {
        let mut combined = new_tracks;
        combined.append(&mut self.tracks);
        let dropped = if limit > 0 && combined.len() > limit {
            let dropped = combined.len() - limit;
            combined.truncate(limit);
            dropped
        } else {
            0
        };
        self.tracks = combined;
        dropped
    }
}

/// Track storage for one of the retention policies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackHistory {
    DaySlots(DaySlots),
    Flat(FlatHistory),
}

/// Everything remembered about one playlist between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
    /// Every feed URL processed, oldest first
    #[serde(default)]
    pub url_history: Vec<String>,
    pub tracks: TrackHistory,
}

impl HistoryState {
    /// Fresh state for a policy.
    pub fn empty(policy: HistoryPolicy) -> Self {
        let tracks = match policy {
            HistoryPolicy::Flat { .. } => TrackHistory::Flat(FlatHistory::default()),
            HistoryPolicy::DaySlots { last_day } => TrackHistory::DaySlots(DaySlots::new(last_day)),
        };
        Self {
            url_history: Vec::new(),
            tracks,
        }
    }

    /// Append `url` to the URL history; true if it had been seen before.
    pub fn record_url(&mut self, url: &str) -> bool {
        let repeated = self.url_history.iter().any(|u| u == url);
        self.url_history.push(url.to_string());
        repeated
    }

    /// The most recently processed URL.
    pub fn last_url(&self) -> Option<&str> {
        self.url_history.last().map(String::as_str)
    }

    /// Total tracks currently stored.
    pub fn track_count(&self) -> usize {
        match &self.tracks {
            TrackHistory::DaySlots(days) => days.tracks().count(),
            TrackHistory::Flat(flat) => flat.tracks.len(),
        }
    }

    /// Stored tracks in playlist order (newest first).
    pub fn tracks(&self) -> Vec<TrackRecord> {
        match &self.tracks {
            TrackHistory::DaySlots(days) => days.tracks().cloned().collect(),
            TrackHistory::Flat(flat) => flat.tracks.clone(),
        }
    }

    /// Bring the stored state in line with the configured policy.
    ///
    /// Flat history becomes Day 0 of a day-slot window; a day-slot window is
    /// flattened newest first and capped. Returns tracks that no longer fit
    /// and must leave the playlist.
    pub fn conform(&mut self, policy: HistoryPolicy) -> Vec<TrackRecord> {
        let current = std::mem::replace(&mut self.tracks, TrackHistory::Flat(FlatHistory::default()));
        let (tracks, dropped) = match (current, policy) {
            (TrackHistory::DaySlots(mut days), HistoryPolicy::DaySlots { last_day }) => {
                let dropped = days.resize(last_day);
                (TrackHistory::DaySlots(days), dropped)
            }
            (TrackHistory::Flat(mut flat), HistoryPolicy::Flat { limit }) => {
                let dropped = split_over_limit(&mut flat.tracks, limit);
                (TrackHistory::Flat(flat), dropped)
            }
            (TrackHistory::Flat(flat), HistoryPolicy::DaySlots { last_day }) => {
                let mut days = DaySlots::new(last_day);
                // Day N of a fresh window is empty, so nothing is evicted
                days.advance(DaySlot {
                    source_url: self.url_history.last().cloned().unwrap_or_default(),
                    tracks: flat.tracks,
                });
                (TrackHistory::DaySlots(days), Vec::new())
            }
            (TrackHistory::DaySlots(days), HistoryPolicy::Flat { limit }) => {
                let mut tracks: Vec<TrackRecord> = days.tracks().cloned().collect();
                let dropped = split_over_limit(&mut tracks, limit);
                (TrackHistory::Flat(FlatHistory { tracks }), dropped)
            }
        };
        self.tracks = tracks;
        dropped
    }
}

/// Cut `tracks` down to `limit` (0 = no limit), returning the overflow.
fn split_over_limit(tracks: &mut Vec<TrackRecord>, limit: usize) -> Vec<TrackRecord> {
    if limit > 0 && tracks.len() > limit {
        tracks.split_off(limit)
    } else {
        Vec::new()
    }
}

//! Station "now playing" feed.
//!
//! Fetches a station's tracklist (directly, or via the show's landing page)
//! and turns it into [`TrackRecord`](crate::model::TrackRecord)s with ad
//! breaks already removed.

pub mod adapter;
pub mod client;
pub mod domain;
pub mod dto;

use async_trait::async_trait;

pub use client::FeedClient;
pub use domain::{FeedError, FeedSnapshot};

/// Source of feed snapshots, mocked in tests.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the current snapshot behind a locator.
    async fn fetch(&self, locator: &str) -> Result<FeedSnapshot, FeedError>;
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch(&self, locator: &str) -> Result<FeedSnapshot, FeedError> {
        self.fetch(locator).await
    }
}

//! Trait definition for the catalog service.
//!
//! The matcher and the sync orchestrator only see [`CatalogApi`], so tests
//! can substitute [`mocks::MockCatalog`] for the real Spotify client.

use async_trait::async_trait;

use super::client::SpotifyClient;
use super::domain::{CatalogError, PlaylistRef, SearchPage};

/// Operations the sync core needs from the music catalog.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Run a track search and return the first page of hits.
    async fn search_tracks(&self, query: &str) -> Result<SearchPage, CatalogError>;

    /// All playlists owned by the configured user.
    async fn user_playlists(&self) -> Result<Vec<PlaylistRef>, CatalogError>;

    /// Create a playlist owned by the configured user.
    async fn create_playlist(&self, name: &str, public: bool)
    -> Result<PlaylistRef, CatalogError>;

    /// Replace the playlist contents, preserving order.
    async fn replace_tracks(&self, playlist_id: &str, track_ids: &[String])
    -> Result<(), CatalogError>;

    /// Append tracks to the playlist.
    async fn add_tracks(&self, playlist_id: &str, track_ids: &[String])
    -> Result<(), CatalogError>;

    /// Remove every occurrence of the given tracks.
    async fn remove_all_occurrences(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), CatalogError>;
}

#[async_trait]
impl CatalogApi for SpotifyClient {
    async fn search_tracks(&self, query: &str) -> Result<SearchPage, CatalogError> {
        self.search_tracks(query).await
    }

    async fn user_playlists(&self) -> Result<Vec<PlaylistRef>, CatalogError> {
        self.user_playlists().await
    }

    async fn create_playlist(
        &self,
        name: &str,
        public: bool,
    ) -> Result<PlaylistRef, CatalogError> {
        self.create_playlist(name, public).await
    }

    async fn replace_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), CatalogError> {
        self.replace_tracks(playlist_id, track_ids).await
    }

    async fn add_tracks(&self, playlist_id: &str, track_ids: &[String]) -> Result<(), CatalogError> {
        self.add_tracks(playlist_id, track_ids).await
    }

    async fn remove_all_occurrences(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), CatalogError> {
        self.remove_all_occurrences(playlist_id, track_ids).await
    }
}

/// Look up a playlist by name, creating it (public) when it does not exist.
///
/// Returns the reference and whether it was just created.
pub async fn find_or_create_playlist(
    catalog: &dyn CatalogApi,
    name: &str,
) -> Result<(PlaylistRef, bool), CatalogError> {
    let existing = catalog
        .user_playlists()
        .await?
        .into_iter()
        .find(|p| p.name == name);

    if let Some(playlist) = existing {
        return Ok((playlist, false));
    }

    let created = catalog.create_playlist(name, true).await?;
    Ok((created, true))
}

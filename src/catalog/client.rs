//! Spotify Web API HTTP client
//!
//! One client is built per run with an already-valid access token and passed
//! by reference to everything that talks to the catalog.
//! See: https://developer.spotify.com/documentation/web-api
//!
//! Playlist mutation endpoints accept at most 100 items per request, so the
//! add/remove/replace helpers split their input into batches.

use std::path::Path;

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use super::auth::SpotifyAuth;
use super::domain::{CatalogError, PlaylistRef, SearchPage};
use super::{adapter, dto};
use crate::config::Credentials;

/// Maximum number of items per playlist mutation request
pub const MAX_ITEMS_PER_REQUEST: usize = 100;

/// Number of search results requested per query
const SEARCH_LIMIT: u32 = 10;

/// Spotify Web API client bound to one user session
pub struct SpotifyClient {
    http_client: reqwest::Client,
    base_url: String,
    username: String,
    access_token: String,
}

impl SpotifyClient {
    /// Authenticate with the cached token (refreshing it if needed) and build a client.
    pub async fn connect(credentials: &Credentials, data_dir: &Path) -> Result<Self, CatalogError> {
        tracing::info!("Connecting to Spotify as {}", credentials.username);
        let auth = SpotifyAuth::new(credentials.clone(), data_dir);
        let access_token = auth.access_token().await?;
        Ok(Self::new(&credentials.username, access_token))
    }

    /// Create a client from an access token
    pub fn new(username: impl Into<String>, access_token: impl Into<String>) -> Self {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            base_url: "https://api.spotify.com/v1".to_string(),
            username: username.into(),
            access_token: access_token.into(),
        }
    }

    /// Create a client for testing with custom base URL
    #[cfg(test)]
    pub fn with_base_url(
        username: impl Into<String>,
        access_token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::new(username, access_token)
        }
    }

    /// Owner of the managed playlists
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Search tracks with a field-filter query such as `track:Song artist:Band`.
    pub async fn search_tracks(&self, query: &str) -> Result<SearchPage, CatalogError> {
        let limit = SEARCH_LIMIT.to_string();
        let request = self
            .http_client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())]);

        let response: dto::SearchResponse = self.send_json(request).await?;
        Ok(adapter::to_search_page(response))
    }

    /// List every playlist of the user, following pagination.
    pub async fn user_playlists(&self) -> Result<Vec<PlaylistRef>, CatalogError> {
        let mut url = format!(
            "{}/users/{}/playlists?limit=50",
            self.base_url,
            urlencoding::encode(&self.username)
        );
        let mut playlists = Vec::new();

        loop {
            let page: dto::Paging<dto::Playlist> =
                self.send_json(self.http_client.get(&url)).await?;
            playlists.extend(page.items.into_iter().map(adapter::to_playlist_ref));
            match page.next {
                Some(next) => url = next,
                None => break,
            }
        }

        Ok(playlists)
    }

    /// Create a playlist owned by the user.
    pub async fn create_playlist(
        &self,
        name: &str,
        public: bool,
    ) -> Result<PlaylistRef, CatalogError> {
        let request = self
            .http_client
            .post(format!(
                "{}/users/{}/playlists",
                self.base_url,
                urlencoding::encode(&self.username)
            ))
            .json(&dto::CreatePlaylistRequest { name, public });

        let playlist: dto::Playlist = self.send_json(request).await?;
        tracing::info!("Created playlist '{}' ({})", playlist.name, playlist.id);
        Ok(adapter::to_playlist_ref(playlist))
    }

    /// Replace the playlist contents with `track_ids`, in order.
    pub async fn replace_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), CatalogError> {
        let uris: Vec<String> = track_ids.iter().map(|id| adapter::track_uri(id)).collect();
        let split = uris.len().min(MAX_ITEMS_PER_REQUEST);
        let (first, rest) = uris.split_at(split);

        let request = self
            .http_client
            .put(self.tracks_url(playlist_id))
            .json(&dto::UrisRequest { uris: first });
        let _: dto::SnapshotResponse = self.send_json(request).await?;

        for chunk in rest.chunks(MAX_ITEMS_PER_REQUEST) {
            self.post_uris(playlist_id, chunk).await?;
        }
        Ok(())
    }

    /// Append `track_ids` to the end of the playlist.
    pub async fn add_tracks(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), CatalogError> {
        let uris: Vec<String> = track_ids.iter().map(|id| adapter::track_uri(id)).collect();
        for chunk in uris.chunks(MAX_ITEMS_PER_REQUEST) {
            self.post_uris(playlist_id, chunk).await?;
        }
        Ok(())
    }

    /// Remove every occurrence of `track_ids` from the playlist.
    pub async fn remove_all_occurrences(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<(), CatalogError> {
        for chunk in track_ids.chunks(MAX_ITEMS_PER_REQUEST) {
            let request = self
                .http_client
                .delete(self.tracks_url(playlist_id))
                .json(&adapter::to_remove_request(chunk));
            let _: dto::SnapshotResponse = self.send_json(request).await?;
        }
        Ok(())
    }

    async fn post_uris(&self, playlist_id: &str, uris: &[String]) -> Result<(), CatalogError> {
        let request = self
            .http_client
            .post(self.tracks_url(playlist_id))
            .json(&dto::UrisRequest { uris });
        let _: dto::SnapshotResponse = self.send_json(request).await?;
        Ok(())
    }

    fn tracks_url(&self, playlist_id: &str) -> String {
        format!(
            "{}/playlists/{}/tracks",
            self.base_url,
            urlencoding::encode(playlist_id)
        )
    }

    /// Send an authenticated request and parse the JSON body
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, CatalogError> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(CatalogError::Auth(
                "access token rejected; run `playlist-minder authorize` again".to_string(),
            ));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimited);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(response.url().path().to_string()));
        }

        if !status.is_success() {
            if let Ok(error) = response.json::<dto::ErrorResponse>().await {
                return Err(CatalogError::ApiError {
                    status: error.error.status,
                    message: error.error.message,
                });
            }
            return Err(CatalogError::ApiError {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

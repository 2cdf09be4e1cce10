//! Spotify OAuth handling
//!
//! The first authorization is interactive (see `playlist-minder authorize`):
//! the user opens [`SpotifyAuth::authorize_url`], approves the app and pastes
//! the redirected URL back, which we exchange for an access/refresh token
//! pair. Afterwards the cached token is refreshed silently on every run.
//!
//! The cache lives next to the history files as `token-<username>.json`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::domain::CatalogError;
use super::dto;
use crate::config::Credentials;

/// Scopes needed to edit public and private playlists
pub const SCOPES: &str = "playlist-modify-private playlist-modify-public";

/// Refresh when the token has less than this many seconds left
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Token cache persisted between runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CachedToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Expiry as Unix epoch seconds
    pub expires_at: i64,
    pub scope: Option<String>,
}

impl CachedToken {
    fn from_response(response: dto::TokenResponse, previous_refresh: Option<String>) -> Self {
        Self {
            access_token: response.access_token,
            // Refresh responses usually omit the refresh token; keep the old one
            refresh_token: response.refresh_token.or(previous_refresh),
            expires_at: Utc::now().timestamp() + response.expires_in,
            scope: response.scope,
        }
    }

    /// Whether the token is expired or about to be.
    pub fn needs_refresh(&self, now: i64) -> bool {
        now + EXPIRY_MARGIN_SECS >= self.expires_at
    }
}

/// Handles token acquisition for one Spotify user
pub struct SpotifyAuth {
    http_client: reqwest::Client,
    credentials: Credentials,
    accounts_url: String,
    cache_path: PathBuf,
}

impl SpotifyAuth {
    /// Create an auth helper that caches tokens under `data_dir`.
    pub fn new(credentials: Credentials, data_dir: &Path) -> Self {
        let cache_path = token_cache_path(data_dir, &credentials.username);
        Self {
            http_client: reqwest::Client::new(),
            credentials,
            accounts_url: "https://accounts.spotify.com".to_string(),
            cache_path,
        }
    }

    /// Create an auth helper against a custom accounts service
    #[cfg(test)]
    pub fn with_accounts_url(
        credentials: Credentials,
        data_dir: &Path,
        accounts_url: impl Into<String>,
    ) -> Self {
        Self {
            accounts_url: accounts_url.into(),
            ..Self::new(credentials, data_dir)
        }
    }

    /// Path of the token cache file
    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// URL the user must open to grant access.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}/authorize?client_id={}&response_type=code&redirect_uri={}&scope={}",
            self.accounts_url,
            urlencoding::encode(&self.credentials.client_id),
            urlencoding::encode(&self.credentials.redirect_uri),
            urlencoding::encode(SCOPES)
        )
    }

    /// Exchange the code from a redirected URL and cache the resulting token.
    pub async fn complete_authorization(
        &self,
        redirected_url: &str,
    ) -> Result<CachedToken, CatalogError> {
        let code = parse_redirect_code(redirected_url)?;
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("redirect_uri", self.credentials.redirect_uri.as_str()),
        ];
        let response = self.request_token(&params).await?;
        let token = CachedToken::from_response(response, None);
        self.store(&token)?;
        tracing::info!("Authorized Spotify user {}", self.credentials.username);
        Ok(token)
    }

    /// Return a valid access token, refreshing the cached one if needed.
    pub async fn access_token(&self) -> Result<String, CatalogError> {
        let token = self.load_cached()?.ok_or_else(|| {
            CatalogError::Auth(format!(
                "no cached token for '{}'; run `playlist-minder authorize` first",
                self.credentials.username
            ))
        })?;

        if !token.needs_refresh(Utc::now().timestamp()) {
            return Ok(token.access_token);
        }

        tracing::debug!("Spotify token near expiry, refreshing");
        let refreshed = self.refresh(&token).await?;
        Ok(refreshed.access_token)
    }

    async fn refresh(&self, token: &CachedToken) -> Result<CachedToken, CatalogError> {
        let refresh_token = token
            .refresh_token
            .clone()
            .ok_or_else(|| CatalogError::Auth("cached token has no refresh token".to_string()))?;
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
        ];
        let response = self.request_token(&params).await?;
        let refreshed = CachedToken::from_response(response, Some(refresh_token));
        self.store(&refreshed)?;
        Ok(refreshed)
    }

    async fn request_token(
        &self,
        params: &[(&str, &str)],
    ) -> Result<dto::TokenResponse, CatalogError> {
        if let Some(field) = self.credentials.missing_fields().first() {
            return Err(CatalogError::Auth(format!("credential '{field}' is not set")));
        }

        let url = format!("{}/api/token", self.accounts_url);
        let response = self
            .http_client
            .post(&url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(params)
            .send()
            .await
            .map_err(|e| CatalogError::Auth(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<dto::AuthErrorResponse>().await {
                Ok(err) => err.error_description.unwrap_or(err.error),
                Err(_) => status.canonical_reason().unwrap_or("Unknown").to_string(),
            };
            return Err(CatalogError::Auth(format!("HTTP {status}: {detail}")));
        }

        response
            .json::<dto::TokenResponse>()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }

    fn load_cached(&self) -> Result<Option<CachedToken>, CatalogError> {
        if !self.cache_path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.cache_path).map_err(|e| {
            CatalogError::Auth(format!("cannot read {}: {e}", self.cache_path.display()))
        })?;
        serde_json::from_str(&raw).map(Some).map_err(|e| {
            CatalogError::Auth(format!("corrupt token cache {}: {e}", self.cache_path.display()))
        })
    }

    fn store(&self, token: &CachedToken) -> Result<(), CatalogError> {
        let write = || -> std::io::Result<()> {
            if let Some(parent) = self.cache_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let contents = serde_json::to_string_pretty(token)?;
            let temp_path = self.cache_path.with_extension("json.tmp");
            std::fs::write(&temp_path, contents)?;
            std::fs::rename(&temp_path, &self.cache_path)
        };
        write().map_err(|e| {
            CatalogError::Auth(format!("cannot write {}: {e}", self.cache_path.display()))
        })
    }
}

/// Location of the token cache for a user
pub fn token_cache_path(data_dir: &Path, username: &str) -> PathBuf {
    data_dir.join(format!("token-{username}.json"))
}

/// Pull the `code` parameter out of the URL Spotify redirected to.
pub fn parse_redirect_code(redirected_url: &str) -> Result<String, CatalogError> {
    let url = reqwest::Url::parse(redirected_url.trim())
        .map_err(|e| CatalogError::Auth(format!("not a URL: {e}")))?;

    let mut code = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "error" => {
                return Err(CatalogError::Auth(format!("authorization denied: {value}")));
            }
            _ => {}
        }
    }
    code.ok_or_else(|| CatalogError::Auth("redirected URL has no `code` parameter".to_string()))
}

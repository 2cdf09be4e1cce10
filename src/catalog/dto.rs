//! Spotify Web API Data Transfer Objects
//!
//! These types match what the Web API returns for the endpoints we call.
//! DO NOT use these types outside the catalog module - convert to domain types.
//!
//! API Reference: https://developer.spotify.com/documentation/web-api

use serde::{Deserialize, Serialize};

/// `GET /search?type=track` response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    /// Track results (absent when no track type was requested)
    pub tracks: Option<Paging<Track>>,
}

/// Generic paging object
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Total number of items available
    #[serde(default)]
    pub total: u32,
    /// URL of the next page, if any
    pub next: Option<String>,
}

/// Track object (only the id is read)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    /// Spotify track id (null for local files)
    pub id: Option<String>,
}

/// Simplified playlist object
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
}

/// Body for `POST /users/{user_id}/playlists`
#[derive(Debug, Clone, Serialize)]
pub struct CreatePlaylistRequest<'a> {
    pub name: &'a str,
    pub public: bool,
}

/// Body for replacing or adding playlist items
#[derive(Debug, Clone, Serialize)]
pub struct UrisRequest<'a> {
    pub uris: &'a [String],
}

/// Body for `DELETE /playlists/{id}/tracks`
#[derive(Debug, Clone, Serialize)]
pub struct RemoveTracksRequest {
    pub tracks: Vec<TrackUri>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackUri {
    pub uri: String,
}

/// Response from playlist mutations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnapshotResponse {
    pub snapshot_id: Option<String>,
}

/// Regular error object
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
}

/// Accounts service token response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
    /// Only returned by the authorization-code exchange (and sometimes on refresh)
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
}

/// Accounts service error (`{"error": "invalid_grant", ...}`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthErrorResponse {
    pub error: String,
    pub error_description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let json = r#"{
            "tracks": {
                "href": "https://api.spotify.com/v1/search?query=track%3Ablack+dog&type=track",
                "items": [{
                    "id": "3qT4bUD1MaWpGrTwcvguhb",
                    "name": "Black Dog - Remaster",
                    "artists": [{"id": "36QJpDe2go2KgaRleHCDTp", "name": "Led Zeppelin"}]
                }],
                "limit": 10,
                "next": null,
                "offset": 0,
                "total": 812
            }
        }"#;

        let response: SearchResponse = serde_json::from_str(json).expect("Should parse search");
        let tracks = response.tracks.expect("tracks present");
        assert_eq!(tracks.total, 812);
        assert_eq!(tracks.items.len(), 1);
        assert_eq!(tracks.items[0].id.as_deref(), Some("3qT4bUD1MaWpGrTwcvguhb"));
    }

    #[test]
    fn test_parse_empty_search_response() {
        let json = r#"{"tracks": {"items": [], "total": 0, "next": null}}"#;
        let response: SearchResponse = serde_json::from_str(json).expect("Should parse empty");
        let tracks = response.tracks.unwrap();
        assert_eq!(tracks.total, 0);
        assert!(tracks.items.is_empty());
    }

    #[test]
    fn test_parse_playlists_page() {
        let json = r#"{
            "items": [
                {"id": "6YdPiiezSwhcGgxvTNIRh2", "name": "Morning Becomes Eclectic", "owner": {"id": "dj"}},
                {"id": "37i9dQZF1DXcBWIGoYBM5M", "name": "Today's Top Hits", "owner": {"id": "spotify"}}
            ],
            "total": 51,
            "next": "https://api.spotify.com/v1/users/dj/playlists?offset=50&limit=50"
        }"#;

        let page: Paging<Playlist> = serde_json::from_str(json).expect("Should parse playlists");
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].name, "Morning Becomes Eclectic");
        assert!(page.next.is_some());
    }

    #[test]
    fn test_parse_error_response() {
        let json = r#"{"error": {"status": 401, "message": "The access token expired"}}"#;
        let response: ErrorResponse = serde_json::from_str(json).expect("Should parse error");
        assert_eq!(response.error.status, 401);
    }

    #[test]
    fn test_parse_refresh_without_refresh_token() {
        let json = r#"{
            "access_token": "BQD",
            "token_type": "Bearer",
            "expires_in": 3600,
            "scope": "playlist-modify-private playlist-modify-public"
        }"#;
        let token: TokenResponse = serde_json::from_str(json).expect("Should parse token");
        assert_eq!(token.expires_in, 3600);
        assert!(token.refresh_token.is_none());
    }

    #[test]
    fn test_remove_request_shape() {
        let body = RemoveTracksRequest {
            tracks: vec![TrackUri {
                uri: "spotify:track:abc".to_string(),
            }],
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"tracks":[{"uri":"spotify:track:abc"}]}"#);
    }
}

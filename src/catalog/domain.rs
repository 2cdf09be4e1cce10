//! Internal domain models for the Spotify catalog.
//!
//! These types are OUR types - they don't change when the Web API changes.
//! All API responses get converted into these types via the adapter.

/// One page of track search results, reduced to what matching needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    /// Total number of hits reported by the service
    pub total: u32,
    /// Track ids on this page, in ranking order
    pub track_ids: Vec<String>,
}

impl SearchPage {
    /// Build a page whose total equals the number of ids.
    #[cfg(test)]
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let track_ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        Self {
            total: track_ids.len() as u32,
            track_ids,
        }
    }

    /// The top-ranked id, if the search matched anything.
    pub fn first_id(&self) -> Option<&str> {
        if self.total == 0 {
            return None;
        }
        self.track_ids.first().map(String::as_str)
    }
}

/// A playlist owned by the configured user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRef {
    /// Display name (the lookup key in the settings table)
    pub name: String,
    /// Spotify playlist id
    pub remote_id: String,
}

/// Errors raised by the catalog client
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API request failed (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited - try again later")]
    RateLimited,
}

impl CatalogError {
    /// Whether the session itself is unusable.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::ApiError { status: 401, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_id_requires_nonzero_total() {
        let page = SearchPage {
            total: 0,
            track_ids: vec!["stale".to_string()],
        };
        assert_eq!(page.first_id(), None);

        let page = SearchPage::from_ids(["a", "b"]);
        assert_eq!(page.total, 2);
        assert_eq!(page.first_id(), Some("a"));
    }

    #[test]
    fn test_total_without_items_has_no_first_id() {
        let page = SearchPage {
            total: 12,
            track_ids: vec![],
        };
        assert_eq!(page.first_id(), None);
    }

    #[test]
    fn test_unauthorized_status_counts_as_auth() {
        let err = CatalogError::ApiError {
            status: 401,
            message: "The access token expired".to_string(),
        };
        assert!(err.is_auth());
        assert!(!CatalogError::RateLimited.is_auth());
    }
}

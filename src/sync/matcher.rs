//! Track matcher
//!
//! Resolves a feed record without a Spotify id to a best guess by searching
//! with progressively looser queries. The first hit of the first non-empty
//! search wins; there is no scoring.

use crate::catalog::{CatalogApi, CatalogError};
use crate::model::TrackRecord;

/// Result of matching a whole batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReport {
    /// Records with a catalog id, in feed order
    pub resolved: Vec<TrackRecord>,
    /// Records no search tier could resolve
    pub dropped: Vec<TrackRecord>,
}

/// Search-based track matcher
pub struct TrackMatcher<'a> {
    catalog: &'a dyn CatalogApi,
}

impl<'a> TrackMatcher<'a> {
    pub fn new(catalog: &'a dyn CatalogApi) -> Self {
        Self { catalog }
    }

    /// Find a catalog id for `title` by `artist`.
    ///
    /// Tries `track:<title> artist:<artist>`, then the artist's first word
    /// when the name has several, then the title alone.
    pub async fn resolve(&self, title: &str, artist: &str) -> Result<Option<String>, CatalogError> {
        let mut tried: Vec<String> = Vec::with_capacity(3);

        for query in search_tiers(title, artist) {
            if tried.contains(&query) {
                continue;
            }
            let page = self.catalog.search_tracks(&query).await?;
            if let Some(id) = page.first_id() {
                tracing::debug!("Matched {:?} via {:?} -> {}", title, query, id);
                return Ok(Some(id.to_string()));
            }
            tried.push(query);
        }

        Ok(None)
    }

    /// Resolve every record lacking an id, keeping feed order.
    ///
    /// Records that already carry an id are passed through untouched.
    pub async fn resolve_all(&self, records: Vec<TrackRecord>) -> Result<MatchReport, CatalogError> {
        let mut report = MatchReport::default();

        for record in records {
            if record.is_resolved() {
                report.resolved.push(record);
                continue;
            }

            match self.resolve(&record.title, &record.artist).await? {
                Some(id) => report.resolved.push(record.with_catalog_id(id)),
                None => {
                    tracing::warn!("No Spotify match for {}, dropping it", record);
                    report.dropped.push(record);
                }
            }
        }

        Ok(report)
    }
}

/// Queries to try, most specific first.
fn search_tiers(title: &str, artist: &str) -> Vec<String> {
    let mut tiers = Vec::with_capacity(3);

    if artist.is_empty() {
        tiers.push(title_query(title));
    } else {
        tiers.push(format!("track:{title} artist:{artist}"));
        if artist.contains(' ') {
            let first_word = artist.split(' ').next().unwrap_or(artist);
            if !first_word.is_empty() {
                tiers.push(format!("track:{title} artist:{first_word}"));
            }
        }
    }

    tiers.push(title_query(title));
    tiers
}

fn title_query(title: &str) -> String {
    format!("track:{title}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::traits::mocks::MockCatalog;

    #[test]
    fn test_tiers_for_multi_word_artist() {
        assert_eq!(
            search_tiers("Dreams", "Fleetwood Mac"),
            vec![
                "track:Dreams artist:Fleetwood Mac",
                "track:Dreams artist:Fleetwood",
                "track:Dreams",
            ]
        );
    }

    #[test]
    fn test_tiers_for_single_word_artist() {
        assert_eq!(
            search_tiers("Hey Ya", "OutKast"),
            vec!["track:Hey Ya artist:OutKast", "track:Hey Ya"]
        );
    }

    #[tokio::test]
    async fn test_exact_pair_wins() {
        let catalog = MockCatalog::empty()
            .with_search("track:Dreams artist:Fleetwood Mac", &["exact", "other"])
            .with_search("track:Dreams", &["loose"]);
        let matcher = TrackMatcher::new(&catalog);

        let id = matcher.resolve("Dreams", "Fleetwood Mac").await.unwrap();
        assert_eq!(id.as_deref(), Some("exact"));
        assert_eq!(catalog.searches().len(), 1);
    }

    #[tokio::test]
    async fn test_first_word_fallback() {
        let catalog = MockCatalog::empty()
            .with_search("track:Dreams artist:Fleetwood", &["first-word"])
            .with_search("track:Dreams", &["loose"]);
        let matcher = TrackMatcher::new(&catalog);

        let id = matcher.resolve("Dreams", "Fleetwood Mac").await.unwrap();
        assert_eq!(id.as_deref(), Some("first-word"));
    }

    #[tokio::test]
    async fn test_title_only_fallback_after_three_tiers() {
        let catalog = MockCatalog::empty().with_search("track:Dreams", &["title-only"]);
        let matcher = TrackMatcher::new(&catalog);

        let id = matcher.resolve("Dreams", "Fleetwood Mac").await.unwrap();

        assert_eq!(id.as_deref(), Some("title-only"));
        assert_eq!(
            catalog.searches(),
            vec![
                "track:Dreams artist:Fleetwood Mac",
                "track:Dreams artist:Fleetwood",
                "track:Dreams",
            ]
        );
    }

    #[tokio::test]
    async fn test_not_found() {
        let catalog = MockCatalog::empty();
        let matcher = TrackMatcher::new(&catalog);
        assert_eq!(matcher.resolve("Nothing", "Nobody Here").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_artist_searches_title_once() {
        let catalog = MockCatalog::empty();
        let matcher = TrackMatcher::new(&catalog);

        assert_eq!(matcher.resolve("Untitled", "").await.unwrap(), None);
        assert_eq!(catalog.searches(), vec!["track:Untitled"]);
    }

    #[tokio::test]
    async fn test_resolve_all_keeps_order_and_bypasses_known_ids() {
        let catalog = MockCatalog::empty().with_search("track:Second", &["id-2"]);
        let matcher = TrackMatcher::new(&catalog);
        let records = vec![
            TrackRecord::new("First", "Band", "").with_catalog_id("id-1"),
            TrackRecord::new("Second", "Some Band", ""),
            TrackRecord::new("Lost", "Nobody", ""),
            TrackRecord::new("Third", "Band", "").with_catalog_id("id-3"),
        ];

        let report = matcher.resolve_all(records).await.unwrap();

        let ids: Vec<_> = report
            .resolved
            .iter()
            .filter_map(|t| t.catalog_id.as_deref())
            .collect();
        assert_eq!(ids, vec!["id-1", "id-2", "id-3"]);
        assert_eq!(report.dropped.len(), 1);
        assert_eq!(report.dropped[0].title, "Lost");
        // Known ids never hit the search endpoint
        assert!(!catalog.searches().iter().any(|q| q.contains("First")));
    }

    #[tokio::test]
    async fn test_search_failure_propagates() {
        let catalog = MockCatalog::with_error(CatalogError::RateLimited);
        let matcher = TrackMatcher::new(&catalog);
        let err = matcher.resolve("Song", "Band").await.unwrap_err();
        assert!(matches!(err, CatalogError::RateLimited));
    }
}

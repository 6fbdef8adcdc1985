//! Catalog listing, type filtering and name search over the bucket.
//!
//! Every call re-lists the whole bucket and filters in memory. That is only
//! reasonable while catalogs stay small; there is no server-side paging or
//! index.

use super::{MediaError, MediaResult, classifier::classify};
use crate::{
    models::media::{MediaEntry, TypeFilter},
    store::ObjectStore,
};
use std::sync::Arc;

/// Relative path of the download-link endpoint; entry URLs are built on it.
pub const DOWNLOAD_ROUTE: &str = "/api/media/download";

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn ObjectStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Every object in the bucket, decorated. Ids are 1-based positions.
    pub async fn list_all(&self) -> MediaResult<Vec<MediaEntry>> {
        let objects = self.store.list().await.map_err(|err| {
            MediaError::from_store(err, "list", None, "Failed to retrieve media files")
        })?;

        Ok(objects
            .into_iter()
            .enumerate()
            .map(|(index, object)| MediaEntry {
                id: index + 1,
                category: classify(&object.key),
                url: format!("{}/{}", DOWNLOAD_ROUTE, urlencoding::encode(&object.key)),
                name: object.key,
                size: object.size_bytes,
                last_modified: object.last_modified,
            })
            .collect())
    }

    /// Entries of one category; `all` passes everything through. The type is
    /// validated before the store is queried.
    pub async fn list_by_type(&self, media_type: &str) -> MediaResult<Vec<MediaEntry>> {
        let filter = parse_type(media_type)?;
        let entries = self.list_all().await?;
        Ok(apply_filter(entries, filter))
    }

    /// Entries whose name contains `query` (case-insensitive), optionally
    /// narrowed by type. A missing or empty query is rejected.
    pub async fn search(
        &self,
        query: Option<&str>,
        media_type: Option<&str>,
    ) -> MediaResult<Vec<MediaEntry>> {
        let query = query
            .filter(|q| !q.is_empty())
            .ok_or_else(|| MediaError::invalid("Search query is required"))?;
        let filter = match media_type {
            None | Some("") => TypeFilter::All,
            Some(value) => parse_type(value)?,
        };

        let needle = query.to_lowercase();
        let entries = self.list_all().await.map_err(|err| match err {
            MediaError::Upstream { source, .. } => MediaError::Upstream {
                context: "Failed to search media files",
                source,
            },
            other => other,
        })?;

        let matched = entries
            .into_iter()
            .filter(|entry| entry.name.to_lowercase().contains(&needle))
            .collect();
        Ok(apply_filter(matched, filter))
    }
}

fn parse_type(value: &str) -> MediaResult<TypeFilter> {
    value
        .parse::<TypeFilter>()
        .map_err(|_| MediaError::invalid("Invalid media type"))
}

fn apply_filter(entries: Vec<MediaEntry>, filter: TypeFilter) -> Vec<MediaEntry> {
    entries
        .into_iter()
        .filter(|entry| filter.matches(entry.category))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::media::MediaCategory, services::ErrorKind, store::memory::MemoryStore};
    use std::collections::BTreeSet;

    fn seeded() -> Arc<MemoryStore> {
        let store = MemoryStore::default();
        store.insert("Song One.mp3", b"a", Some("application/octet-stream"));
        store.insert("another-song.WAV", b"bb", None);
        store.insert("contract.pdf", b"ccc", Some("application/pdf"));
        store.insert("holiday.jpg", b"dddd", Some("image/jpeg"));
        store.insert("README", b"e", None);
        store.insert("songbook.docx", b"ff", None);
        Arc::new(store)
    }

    fn names(entries: &[MediaEntry]) -> BTreeSet<String> {
        entries.iter().map(|e| e.name.clone()).collect()
    }

    #[tokio::test]
    async fn list_all_decorates_entries() {
        let catalog = CatalogService::new(seeded());
        let entries = catalog.list_all().await.unwrap();

        assert_eq!(entries.len(), 6);
        let ids: Vec<usize> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);

        let song = entries.iter().find(|e| e.name == "Song One.mp3").unwrap();
        assert_eq!(song.category, MediaCategory::Audio);
        assert_eq!(song.url, "/api/media/download/Song%20One.mp3");
        assert_eq!(song.size, 1);

        let readme = entries.iter().find(|e| e.name == "README").unwrap();
        assert_eq!(readme.category, MediaCategory::Other);
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let catalog = CatalogService::new(Arc::new(MemoryStore::default()));
        assert!(catalog.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_upstream() {
        let catalog = CatalogService::new(Arc::new(MemoryStore::failing()));
        let err = catalog.list_all().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
        assert_eq!(err.to_string(), "Failed to retrieve media files");
    }

    #[tokio::test]
    async fn type_all_matches_list_all() {
        let catalog = CatalogService::new(seeded());
        let all = catalog.list_all().await.unwrap();
        let by_all = catalog.list_by_type("all").await.unwrap();
        assert_eq!(all, by_all);
    }

    #[tokio::test]
    async fn filters_by_type() {
        let catalog = CatalogService::new(seeded());
        let audio = catalog.list_by_type("audio").await.unwrap();
        assert_eq!(
            names(&audio),
            BTreeSet::from(["Song One.mp3".to_string(), "another-song.WAV".to_string()])
        );
        assert!(audio.iter().all(|e| e.category == MediaCategory::Audio));
    }

    #[tokio::test]
    async fn invalid_type_rejected_before_store_call() {
        let store = seeded();
        let catalog = CatalogService::new(store.clone());
        for bad in ["video", "other", "AUDIO", ""] {
            let err = catalog.list_by_type(bad).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn search_is_case_insensitive() {
        let catalog = CatalogService::new(seeded());
        let upper = catalog.search(Some("SONG"), None).await.unwrap();
        let lower = catalog.search(Some("song"), None).await.unwrap();
        assert_eq!(names(&upper), names(&lower));
        assert_eq!(names(&upper).len(), 3);
    }

    #[tokio::test]
    async fn search_results_nest_inside_type_listing() {
        let catalog = CatalogService::new(seeded());
        let everything = names(&catalog.list_all().await.unwrap());
        for media_type in ["all", "audio", "pdf", "image"] {
            let typed = names(&catalog.list_by_type(media_type).await.unwrap());
            assert!(typed.is_subset(&everything));
            for query in ["song", "o", "PDF", "zzz"] {
                let found = names(&catalog.search(Some(query), Some(media_type)).await.unwrap());
                assert!(found.is_subset(&typed), "{query}/{media_type}");
            }
        }
    }

    #[tokio::test]
    async fn search_narrows_by_type() {
        let catalog = CatalogService::new(seeded());
        let found = catalog.search(Some("song"), Some("audio")).await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|e| e.category == MediaCategory::Audio));
    }

    #[tokio::test]
    async fn search_requires_query() {
        let store = seeded();
        let catalog = CatalogService::new(store.clone());
        for query in [None, Some("")] {
            let err = catalog.search(query, None).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
            assert_eq!(err.to_string(), "Search query is required");
        }
        let err = catalog.search(Some("x"), Some("video")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn search_failure_reports_search_context() {
        let catalog = CatalogService::new(Arc::new(MemoryStore::failing()));
        let err = catalog.search(Some("a"), None).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to search media files");
    }
}

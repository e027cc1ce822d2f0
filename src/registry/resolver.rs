//! Package resolution on top of the store and cache clients.
//!
//! # Responsibilities
//! - Map store results to Found / NotFound / StoreError
//! - Read the package list from the cache without interpretation
//! - Record resolution outcomes
//!
//! # Design Decisions
//! - Shared by reference across request tasks; holds no mutable state
//! - A missing cache entry is steady state, not a failure

use std::sync::Arc;

use thiserror::Error;

use crate::observability::metrics;
use crate::registry::{CacheLookup, ListCache, Package, PackageStore, StoreError};

/// Why a single package could not be resolved.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("package `{0}` not found")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolves packages and the package list.
#[derive(Clone)]
pub struct PackageResolver {
    store: Arc<dyn PackageStore>,
    cache: Arc<dyn ListCache>,
    list_key: String,
}

impl PackageResolver {
    pub fn new(
        store: Arc<dyn PackageStore>,
        cache: Arc<dyn ListCache>,
        list_key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            cache,
            list_key: list_key.into(),
        }
    }

    /// Look up a single package by exact name.
    pub async fn resolve_package(&self, name: &str) -> Result<Package, ResolveError> {
        match self.store.find_package(name).await {
            Ok(Some(package)) => {
                metrics::record_resolution("package", "found");
                Ok(package)
            }
            Ok(None) => {
                metrics::record_resolution("package", "not_found");
                Err(ResolveError::NotFound(name.to_string()))
            }
            Err(e) => {
                metrics::record_resolution("package", "error");
                Err(e.into())
            }
        }
    }

    /// Read the serialized package list.
    pub async fn resolve_package_list(&self) -> CacheLookup {
        let lookup = self.cache.fetch(&self.list_key).await;
        let outcome = match &lookup {
            CacheLookup::Hit(_) => "hit",
            CacheLookup::Miss => "miss",
            CacheLookup::Error(_) => "error",
        };
        metrics::record_resolution("list", outcome);
        lookup
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CacheError;
    use async_trait::async_trait;
    use axum::body::Bytes;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MapStore(HashMap<String, String>);

    #[async_trait]
    impl PackageStore for MapStore {
        async fn find_package(&self, name: &str) -> Result<Option<Package>, StoreError> {
            Ok(self.0.get(name).map(|url| Package::new(name, url.clone())))
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl PackageStore for BrokenStore {
        async fn find_package(&self, _name: &str) -> Result<Option<Package>, StoreError> {
            Err(StoreError::Unavailable("connection reset".into()))
        }
    }

    #[derive(Default)]
    struct RecordingCache {
        value: Option<&'static [u8]>,
        fail: bool,
        keys: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ListCache for RecordingCache {
        async fn fetch(&self, key: &str) -> CacheLookup {
            self.keys.lock().unwrap().push(key.to_string());
            if self.fail {
                return CacheLookup::Error(CacheError::Unavailable("refused".into()));
            }
            match self.value {
                Some(v) => CacheLookup::Hit(Bytes::from_static(v)),
                None => CacheLookup::Miss,
            }
        }
    }

    fn resolver(store: impl PackageStore + 'static, cache: Arc<RecordingCache>) -> PackageResolver {
        PackageResolver::new(Arc::new(store), cache, "packages")
    }

    #[tokio::test]
    async fn resolves_existing_package() {
        let store = MapStore(HashMap::from([(
            "jquery".to_string(),
            "git://github.com/jquery/jquery.git".to_string(),
        )]));
        let resolver = resolver(store, Arc::default());

        let package = resolver.resolve_package("jquery").await.unwrap();
        assert_eq!(package, Package::new("jquery", "git://github.com/jquery/jquery.git"));
    }

    #[tokio::test]
    async fn lookup_is_case_sensitive() {
        let store = MapStore(HashMap::from([("jquery".to_string(), "u".to_string())]));
        let resolver = resolver(store, Arc::default());

        let err = resolver.resolve_package("JQuery").await.unwrap_err();
        assert!(matches!(err, ResolveError::NotFound(name) if name == "JQuery"));
    }

    #[tokio::test]
    async fn store_failure_is_store_error() {
        let resolver = resolver(BrokenStore, Arc::default());

        let err = resolver.resolve_package("jquery").await.unwrap_err();
        assert!(matches!(err, ResolveError::Store(_)));
    }

    #[tokio::test]
    async fn list_hit_passes_bytes_through() {
        let cache = Arc::new(RecordingCache {
            value: Some(br#"[{"name":"a","url":"b"}]"#),
            ..Default::default()
        });
        let resolver = resolver(MapStore(HashMap::new()), cache.clone());

        match resolver.resolve_package_list().await {
            CacheLookup::Hit(bytes) => assert_eq!(&bytes[..], br#"[{"name":"a","url":"b"}]"#),
            other => panic!("expected hit, got {other:?}"),
        }
        assert_eq!(*cache.keys.lock().unwrap(), vec!["packages".to_string()]);
    }

    #[tokio::test]
    async fn list_miss_and_error_are_distinct() {
        let resolver_miss = resolver(MapStore(HashMap::new()), Arc::default());
        assert!(matches!(resolver_miss.resolve_package_list().await, CacheLookup::Miss));

        let failing = Arc::new(RecordingCache {
            fail: true,
            ..Default::default()
        });
        let resolver_err = resolver(MapStore(HashMap::new()), failing);
        assert!(matches!(resolver_err.resolve_package_list().await, CacheLookup::Error(_)));
    }
}

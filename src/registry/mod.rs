//! Package metadata subsystem.
//!
//! # Data Flow
//! ```text
//! GET /packages/<name>
//!     → resolver.rs (name extraction, outcome mapping)
//!     → store.rs (prepared lookup against PostgreSQL)
//!     → Package | NotFound | StoreError
//!
//! GET /packages
//!     → resolver.rs
//!     → cache.rs (single memcached read of the list key)
//!     → CacheLookup::{Hit, Miss, Error}
//! ```
//!
//! # Design Decisions
//! - Read-only: nothing here creates, updates or evicts entries
//! - Backends sit behind traits so handlers can be exercised without a database
//! - Cached list bytes are passed through without parsing

pub mod cache;
pub mod resolver;
pub mod store;

use axum::body::Bytes;
use serde::{Deserialize, Serialize};

pub use cache::{CacheError, ListCache, MemcacheListCache};
pub use resolver::{PackageResolver, ResolveError};
pub use store::{PackageStore, PgPackageStore, StoreError};

/// A registered package: a name and the repository URL it points to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub url: String,
}

impl Package {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Result of a single cache read.
#[derive(Debug)]
pub enum CacheLookup {
    /// The key holds a value; bytes are returned untouched.
    Hit(Bytes),
    /// The key is absent.
    Miss,
    /// The cache client failed.
    Error(CacheError),
}

/// Extract the package name from a request path: the last `/`-delimited
/// segment, verbatim. A trailing slash yields an empty name.
pub fn package_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or_default()
}

//! Request predicates.
//!
//! # Responsibilities
//! - Match request method
//! - Match host (case-insensitive, one of a set)
//! - Match path exactly or by prefix (case-sensitive)
//! - Combine conditions with AND / NOT semantics
//!
//! # Design Decisions
//! - Host matching is case-insensitive (RFC 9110)
//! - Path matching is case-sensitive
//! - Matchers are pure and side-effect-free
//! - No regex to guarantee O(n) matching

use axum::body::Body;
use axum::http::{header, Method, Request};

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Host the request is addressed to: the `Host` header, or the URI
/// authority when the header is absent (HTTP/2).
pub fn request_host(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| req.uri().authority().map(|a| a.as_str()))
}

/// Matches the request method.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    method: Method,
}

impl MethodMatcher {
    pub fn new(method: Method) -> Self {
        Self { method }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.method() == self.method
    }
}

/// Matches when the host is any of a set of hosts.
#[derive(Debug, Clone)]
pub struct HostMatcher {
    hosts: Vec<String>,
}

impl HostMatcher {
    /// Create a new host matcher.
    /// The host is normalized to lowercase for case-insensitive matching.
    pub fn new(host: impl Into<String>) -> Self {
        Self::any_of([host])
    }

    /// Match any of the given hosts.
    pub fn any_of<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: hosts.into_iter().map(|h| h.into().to_lowercase()).collect(),
        }
    }
}

impl Matcher for HostMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        request_host(req)
            .map(|host| self.hosts.iter().any(|h| h.eq_ignore_ascii_case(host)))
            .unwrap_or(false)
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.uri().path().starts_with(&self.prefix)
    }
}

/// Matches one exact request path.
#[derive(Debug, Clone)]
pub struct PathExactMatcher {
    path: String,
}

impl PathExactMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Matcher for PathExactMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.uri().path() == self.path
    }
}

/// Inverts another matcher.
#[derive(Debug)]
pub struct NotMatcher {
    inner: Box<dyn Matcher>,
}

impl NotMatcher {
    pub fn new(inner: impl Matcher + 'static) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }
}

impl Matcher for NotMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        !self.inner.matches(req)
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        // All matchers must pass (AND), evaluated in order
        self.matchers.iter().all(|m| m.matches(req))
    }
}

//! Ordered rule table and request classification.
//!
//! # Responsibilities
//! - Store rules in registration order
//! - Return the first rule whose predicate holds, or explicit no-match
//! - Build the registry rule set from configuration
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in registration order; first match wins
//! - The migration rule is registered before the list and lookup rules,
//!   so clients on non-migrated hosts never reach the resolver

use axum::body::Body;
use axum::http::{Method, Request};

use crate::config::RegistryConfig;
use crate::routing::matcher::{
    AndMatcher, HostMatcher, Matcher, MethodMatcher, NotMatcher, PathExactMatcher,
    PathPrefixMatcher,
};

/// Behavior selected for a classified request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Deprecation notice for search, throttled redirect for everything else.
    Migrate,
    /// Serve the cached package list.
    ListPackages,
    /// Look up one package in the metadata store.
    LookupPackage,
}

/// A predicate paired with the action it selects.
#[derive(Debug)]
pub struct Rule {
    /// Rule identifier for logging/metrics.
    pub name: &'static str,
    matcher: Box<dyn Matcher>,
    pub action: Action,
}

impl Rule {
    pub fn new(name: &'static str, matcher: Box<dyn Matcher>, action: Action) -> Self {
        Self {
            name,
            matcher,
            action,
        }
    }

    /// Returns true if this rule applies to the request.
    pub fn matches(&self, req: &Request<Body>) -> bool {
        self.matcher.matches(req)
    }
}

/// First-match-wins classifier over an ordered rule list.
#[derive(Debug, Default)]
pub struct Router {
    rules: Vec<Rule>,
}

impl Router {
    /// Create an empty router; every request is unmatched.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. Rules are evaluated in the order they are added.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Build the registry rule set: migrate, then list, then lookup.
    pub fn from_config(config: &RegistryConfig) -> Self {
        let router = Self::new()
            .with_rule(Rule::new(
                "migrate",
                is_migratable_traffic(&config.migrated_hosts),
                Action::Migrate,
            ))
            .with_rule(Rule::new(
                "list",
                is_list_packages(&config.list_path),
                Action::ListPackages,
            ))
            .with_rule(Rule::new(
                "lookup",
                is_package_lookup(&config.package_prefix, &config.search_prefix),
                Action::LookupPackage,
            ));

        tracing::info!(rules = router.rules.len(), "Routing table compiled");
        router
    }

    /// Find the first rule matching the request.
    pub fn classify(&self, req: &Request<Body>) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(req))
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// GET on exactly the list endpoint.
pub fn is_list_packages(list_path: &str) -> Box<dyn Matcher> {
    Box::new(AndMatcher::new(vec![
        Box::new(MethodMatcher::new(Method::GET)),
        Box::new(PathExactMatcher::new(list_path)),
    ]))
}

/// GET under the package prefix, excluding the search sub-namespace.
pub fn is_package_lookup(package_prefix: &str, search_prefix: &str) -> Box<dyn Matcher> {
    Box::new(AndMatcher::new(vec![
        Box::new(MethodMatcher::new(Method::GET)),
        Box::new(PathPrefixMatcher::new(package_prefix)),
        Box::new(NotMatcher::new(PathPrefixMatcher::new(search_prefix))),
    ]))
}

/// GET from a client not yet pointed at a migrated host.
pub fn is_migratable_traffic(migrated_hosts: &[String]) -> Box<dyn Matcher> {
    Box::new(AndMatcher::new(vec![
        Box::new(MethodMatcher::new(Method::GET)),
        Box::new(NotMatcher::new(HostMatcher::any_of(migrated_hosts.iter().cloned()))),
    ]))
}

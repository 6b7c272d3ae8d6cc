//! Route matching logic.
//!
//! # Responsibilities
//! - Match request method
//! - Match request path (exact or literal prefix, case-sensitive)
//! - Match header values (name case-insensitive, value exact)
//! - Evaluate injected predicates
//!
//! # Design Decisions
//! - Matchers are pure: no I/O, no mutation of the request
//! - Header names go through `HeaderName`, so lookups are case-insensitive
//! - Header values are compared byte-for-byte with the first value present
//! - No regex and no path templates

use std::fmt;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderName, Method, Request};

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Matches the request method.
#[derive(Debug, Clone, PartialEq, Eq)]
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

/// How a route compares its path against the request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathRule {
    /// The request path must equal this path.
    Exact(String),
    /// The request path must start with this literal prefix.
    Prefix(String),
}

impl PathRule {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathRule::Exact(expected) => path == expected,
            PathRule::Prefix(prefix) => path.starts_with(prefix.as_str()),
        }
    }

    /// The part of `path` left over after a prefix match.
    ///
    /// Returns `None` for exact rules and for paths the rule does not match.
    pub fn suffix<'a>(&self, path: &'a str) -> Option<&'a str> {
        match self {
            PathRule::Exact(_) => None,
            PathRule::Prefix(prefix) => path.strip_prefix(prefix.as_str()),
        }
    }
}

impl fmt::Display for PathRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathRule::Exact(path) => write!(f, "{}", path),
            PathRule::Prefix(prefix) => write!(f, "{}*", prefix),
        }
    }
}

/// Matches the request path against a [`PathRule`].
#[derive(Debug, Clone)]
pub struct PathMatcher {
    rule: PathRule,
}

impl PathMatcher {
    pub fn new(rule: PathRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> &PathRule {
        &self.rule
    }
}

impl Matcher for PathMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.rule.matches(req.uri().path())
    }
}

/// Matches a header carrying exactly the expected value.
#[derive(Debug, Clone)]
pub struct HeaderMatcher {
    name: HeaderName,
    value: String,
}

impl HeaderMatcher {
    pub fn new(name: HeaderName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

impl Matcher for HeaderMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.headers()
            .get(&self.name)
            .map(|v| v.as_bytes() == self.value.as_bytes())
            .unwrap_or(false)
    }
}

/// Matches using an arbitrary predicate over the whole request.
#[derive(Clone)]
pub struct FnMatcher {
    predicate: Arc<dyn Fn(&Request<Body>) -> bool + Send + Sync>,
}

impl FnMatcher {
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Request<Body>) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }
}

impl fmt::Debug for FnMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMatcher").finish_non_exhaustive()
    }
}

impl Matcher for FnMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        (self.predicate)(req)
    }
}

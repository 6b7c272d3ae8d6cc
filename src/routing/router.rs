//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store routes in registration order
//! - Look up the first route whose conditions all hold
//! - Run the selected handler and finalize its result into a response
//!
//! # Design Decisions
//! - Immutable after construction (shared via `Arc`, no locks)
//! - O(n) linear scan; registration order is priority
//! - Handlers return `Result<Response, AppError>`; the error half is turned
//!   into bytes in exactly one place (`serve`)

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{HeaderName, Method, Request};
use axum::response::{IntoResponse, Response};
use futures_util::future::{BoxFuture, FutureExt};

use crate::http::error::AppError;
use crate::http::handlers::not_found_handler;
use crate::observability::metrics;
use crate::routing::matcher::{FnMatcher, HeaderMatcher, Matcher, MethodMatcher, PathMatcher, PathRule};

/// What every handler returns.
pub type HandlerResult = Result<Response, AppError>;

/// Type-erased async handler.
pub type Handler = Arc<dyn Fn(Request<Body>) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Remainder of the request path after a prefix route matched.
///
/// Inserted into the request extensions before the handler runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSuffix(pub String);

fn boxed<F, Fut>(handler: F) -> Handler
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(move |req| handler(req).boxed())
}

/// A conjunctive bundle of conditions bound to a handler.
pub struct Route {
    method: MethodMatcher,
    path: PathMatcher,
    headers: Vec<HeaderMatcher>,
    predicate: Option<FnMatcher>,
    handler: Handler,
    label: String,
}

impl Route {
    pub fn new<F, Fut>(method: Method, path: PathRule, handler: F) -> Self
    where
        F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let label = format!("{} {}", method, path);
        Self {
            method: MethodMatcher::new(method),
            path: PathMatcher::new(path),
            headers: Vec::new(),
            predicate: None,
            handler: boxed(handler),
            label,
        }
    }

    /// Require a header to carry exactly `value`.
    pub fn header(&mut self, name: HeaderName, value: impl Into<String>) -> &mut Self {
        self.headers.push(HeaderMatcher::new(name, value));
        self
    }

    /// Require `predicate` to hold. A route has at most one predicate; a
    /// second call replaces the first.
    pub fn matcher_fn<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&Request<Body>) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(FnMatcher::new(predicate));
        self
    }

    pub fn path(&self) -> &PathRule {
        self.path.rule()
    }

    /// Method and path, used in logs and metric labels.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("headers", &self.headers)
            .field("predicate", &self.predicate.is_some())
            .finish_non_exhaustive()
    }
}

impl Matcher for Route {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.method.matches(req)
            && self.path.matches(req)
            && self.headers.iter().all(|h| h.matches(req))
            && self.predicate.as_ref().map_or(true, |p| p.matches(req))
    }
}

/// Ordered route table.
pub struct Router {
    routes: Vec<Route>,
    not_found: Handler,
}

impl Router {
    /// Create an empty router whose fallback is the negotiated 404 handler.
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            not_found: boxed(not_found_handler),
        }
    }

    /// Append a route. Earlier routes take precedence.
    pub fn register(&mut self, route: Route) -> &mut Route {
        self.routes.push(route);
        let last = self.routes.len() - 1;
        &mut self.routes[last]
    }

    /// Register an exact-path route.
    pub fn route<F, Fut>(&mut self, method: Method, path: &str, handler: F) -> &mut Route
    where
        F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(Route::new(method, PathRule::Exact(path.to_string()), handler))
    }

    /// Register a literal-prefix route.
    pub fn route_prefix<F, Fut>(&mut self, method: Method, prefix: &str, handler: F) -> &mut Route
    where
        F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(Route::new(method, PathRule::Prefix(prefix.to_string()), handler))
    }

    /// Replace the handler used when no route matches.
    pub fn fallback<F, Fut>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.not_found = boxed(handler);
        self
    }

    /// First route matching the request, in registration order.
    pub fn find(&self, req: &Request<Body>) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(req))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Dispatch the request and turn the handler result into a response.
    pub async fn serve(self: Arc<Self>, mut req: Request<Body>) -> Response {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let (handler, label) = match self.find(&req) {
            Some(route) => {
                if let Some(suffix) = route.path().suffix(&path) {
                    req.extensions_mut().insert(PathSuffix(suffix.to_string()));
                }
                (Arc::clone(&route.handler), route.label().to_string())
            }
            None => {
                tracing::debug!(method = %method, path = %path, "No route matched");
                (Arc::clone(&self.not_found), "none".to_string())
            }
        };

        let response = match handler(req).await {
            Ok(response) => response,
            Err(err) => err.into_response(),
        };

        metrics::record_request(&method, &label, response.status().as_u16(), start);
        response
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.routes.iter().map(Route::label))
            .finish()
    }
}

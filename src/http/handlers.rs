//! Request handlers and route table.
//!
//! # Responsibilities
//! - Hold the configured collaborators
//! - Register routes in priority order, skipping optional families
//! - Render the identity document as JSON, plain text or HTML
//!
//! # Design Decisions
//! - Every identity handler goes through `Server::identity`, so the three
//!   representations always agree
//! - Handlers extract what they need from the request before awaiting
//!   anything

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{ACCEPT, CONTENT_TYPE, HOST};
use axum::http::{HeaderName, HeaderValue, Method, Request};
use axum::response::{Html, IntoResponse, Response};
use percent_encoding::percent_decode_str;

use crate::http::error::{AppError, JSON_MEDIA_TYPE, TEXT_MEDIA_TYPE};
use crate::http::request::{cli_matcher, client_ip};
use crate::http::response::{last_segment, parse_port};
use crate::http::template::{Page, PageRenderer, TemplateRenderer};
use crate::lookup::{GeoDatabase, PortProbe, ReverseResolver};
use crate::routing::{HandlerResult, PathSuffix, Router};

const NOT_FOUND_MESSAGE: &str = "404 page not found";
const DEFAULT_RESOLVER_TIMEOUT: Duration = Duration::from_secs(1);
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// The identity service: collaborators plus the handlers using them.
pub struct Server {
    trusted_header: Option<HeaderName>,
    geo: Option<Arc<dyn GeoDatabase>>,
    resolver: Option<Arc<dyn ReverseResolver>>,
    ports: Option<Arc<dyn PortProbe>>,
    template: Arc<dyn PageRenderer>,
    resolver_timeout: Duration,
    probe_timeout: Duration,
}

impl Server {
    /// A server with no optional collaborators and the built-in page.
    pub fn new() -> Self {
        Self {
            trusted_header: None,
            geo: None,
            resolver: None,
            ports: None,
            template: Arc::new(TemplateRenderer::builtin()),
            resolver_timeout: DEFAULT_RESOLVER_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Read the caller's address from `header` when present.
    pub fn with_trusted_header(mut self, header: HeaderName) -> Self {
        self.trusted_header = Some(header);
        self
    }

    /// Enable geolocation fields and the `/country`, `/country-iso` and `/city` routes.
    pub fn with_geo(mut self, geo: Arc<dyn GeoDatabase>) -> Self {
        self.geo = Some(geo);
        self
    }

    /// Enable the `hostname` field.
    pub fn with_resolver(mut self, resolver: Arc<dyn ReverseResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Enable the `/port/` route.
    pub fn with_port_probe(mut self, probe: Arc<dyn PortProbe>) -> Self {
        self.ports = Some(probe);
        self
    }

    pub fn with_template(mut self, template: Arc<dyn PageRenderer>) -> Self {
        self.template = template;
        self
    }

    /// Deadline after which the `hostname` field is given up on.
    pub fn with_resolver_timeout(mut self, timeout: Duration) -> Self {
        self.resolver_timeout = timeout;
        self
    }

    /// Deadline after which a port counts as unreachable.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn geo(&self) -> Option<&dyn GeoDatabase> {
        self.geo.as_deref()
    }

    pub fn resolver(&self) -> Option<&dyn ReverseResolver> {
        self.resolver.as_deref()
    }

    pub fn port_probe(&self) -> Option<&dyn PortProbe> {
        self.ports.as_deref()
    }

    pub fn resolver_timeout(&self) -> Duration {
        self.resolver_timeout
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    pub fn port_testing_enabled(&self) -> bool {
        self.ports.is_some()
    }

    fn client_ip(&self, req: &Request<Body>) -> Result<std::net::IpAddr, AppError> {
        client_ip(self.trusted_header.as_ref(), req).map_err(AppError::internal_server_error)
    }

    /// Build the route table. Order is priority.
    pub fn routes(self: &Arc<Self>) -> Router {
        let mut r = Router::new();

        // JSON
        r.route(Method::GET, "/", self.bind(Self::json_handler))
            .header(ACCEPT, JSON_MEDIA_TYPE);
        r.route(Method::GET, "/json", self.bind(Self::json_handler));

        // CLI
        r.route(Method::GET, "/", self.bind(Self::cli_handler))
            .matcher_fn(cli_matcher);
        r.route(Method::GET, "/", self.bind(Self::cli_handler))
            .header(ACCEPT, TEXT_MEDIA_TYPE);
        r.route(Method::GET, "/ip", self.bind(Self::cli_handler));
        if self.geo.is_some() {
            r.route(Method::GET, "/country", self.bind(Self::cli_country_handler));
            r.route(Method::GET, "/country-iso", self.bind(Self::cli_country_iso_handler));
            r.route(Method::GET, "/city", self.bind(Self::cli_city_handler));
        }

        // Browser
        r.route(Method::GET, "/", self.bind(Self::default_handler));

        // Port testing
        if self.ports.is_some() {
            r.route_prefix(Method::GET, "/port/", self.bind(Self::port_handler));
        }

        tracing::debug!(routes = ?r, "Routes registered");
        r
    }

    fn bind<F, Fut>(self: &Arc<Self>, handler: F) -> impl Fn(Request<Body>) -> Fut + Send + Sync + 'static
    where
        F: Fn(Arc<Self>, Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let server = Arc::clone(self);
        move |req| handler(Arc::clone(&server), req)
    }

    pub async fn cli_handler(self: Arc<Self>, req: Request<Body>) -> HandlerResult {
        let ip = self.client_ip(&req)?;
        Ok(text_line(&ip.to_string()))
    }

    pub async fn cli_country_handler(self: Arc<Self>, req: Request<Body>) -> HandlerResult {
        let ip = self.client_ip(&req)?;
        let response = self.identity(ip).await;
        Ok(text_line(response.country.as_deref().unwrap_or("")))
    }

    pub async fn cli_country_iso_handler(self: Arc<Self>, req: Request<Body>) -> HandlerResult {
        let ip = self.client_ip(&req)?;
        let response = self.identity(ip).await;
        Ok(text_line(response.country_iso.as_deref().unwrap_or("")))
    }

    pub async fn cli_city_handler(self: Arc<Self>, req: Request<Body>) -> HandlerResult {
        let ip = self.client_ip(&req)?;
        let response = self.identity(ip).await;
        Ok(text_line(response.city.as_deref().unwrap_or("")))
    }

    pub async fn json_handler(self: Arc<Self>, req: Request<Body>) -> HandlerResult {
        let ip = self.client_ip(&req).map_err(AppError::as_json)?;
        let response = self.identity(ip).await;
        let body = serde_json::to_vec(&response)
            .map_err(|e| AppError::internal_server_error(e).as_json())?;
        Ok(json_body(body))
    }

    pub async fn port_handler(self: Arc<Self>, req: Request<Body>) -> HandlerResult {
        let segment = {
            let raw = req
                .extensions()
                .get::<PathSuffix>()
                .map(|PathSuffix(suffix)| suffix.as_str())
                .unwrap_or_else(|| req.uri().path());
            let decoded = percent_decode_str(raw).decode_utf8_lossy();
            last_segment(&decoded).to_string()
        };
        let port = parse_port(&segment).map_err(|e| {
            AppError::bad_request(&e)
                .with_message(format!("Invalid port: {}", e.0))
                .as_json()
        })?;
        let ip = self.client_ip(&req).map_err(AppError::as_json)?;

        let response = self.port_reachability(ip, port).await;
        let body = serde_json::to_vec(&response)
            .map_err(|e| AppError::internal_server_error(e).as_json())?;
        Ok(json_body(body))
    }

    pub async fn default_handler(self: Arc<Self>, req: Request<Body>) -> HandlerResult {
        let ip = self.client_ip(&req)?;
        let host = req
            .headers()
            .get(HOST)
            .and_then(|h| h.to_str().ok())
            .or_else(|| req.uri().authority().map(|a| a.as_str()))
            .unwrap_or("")
            .to_string();

        let response = self.identity(ip).await;
        let json = serde_json::to_string_pretty(&response).map_err(AppError::internal_server_error)?;
        let page = Page {
            response: &response,
            host: &host,
            json,
            port: self.port_testing_enabled(),
        };
        let html = self
            .template
            .render(&page)
            .map_err(AppError::internal_server_error)?;
        Ok(Html(html).into_response())
    }
}

impl Default for Server {
    fn default() -> Self {
        Self::new()
    }
}

/// Negotiated 404: JSON when the client asked for JSON, plain text otherwise.
pub async fn not_found_handler(req: Request<Body>) -> HandlerResult {
    let err = AppError::not_found().with_message(NOT_FOUND_MESSAGE);
    let wants_json = req
        .headers()
        .get(ACCEPT)
        .map(|accept| accept.as_bytes() == JSON_MEDIA_TYPE.as_bytes())
        .unwrap_or(false);
    Err(if wants_json { err.as_json() } else { err })
}

fn text_line(value: &str) -> Response {
    format!("{}\n", value).into_response()
}

fn json_body(body: Vec<u8>) -> Response {
    ([(CONTENT_TYPE, HeaderValue::from_static(JSON_MEDIA_TYPE))], body).into_response()
}

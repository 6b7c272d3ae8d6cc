//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum app around the ordered route table
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Serve until shutdown is signalled

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderName, Request};
use axum::response::Response;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::IpdConfig;
use crate::http::handlers::Server;
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::routing::Router;

/// HTTP server for the identity service.
pub struct HttpServer {
    app: axum::Router,
    routes: Arc<Router>,
}

impl HttpServer {
    /// Create a new HTTP server for `server` with the given configuration.
    pub fn new(config: &IpdConfig, server: Server) -> Self {
        let server = Arc::new(server);
        let routes = Arc::new(server.routes());
        let app = Self::build_app(config, Arc::clone(&routes));
        tracing::info!(routes = routes.len(), "Route table built");
        Self { app, routes }
    }

    /// Build the Axum app with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &IpdConfig, routes: Arc<Router>) -> axum::Router {
        let request_id = HeaderName::from_static(X_REQUEST_ID);

        axum::Router::new()
            .fallback(dispatch)
            .with_state(routes)
            .layer(TimeoutLayer::new(Duration::from_secs(config.http.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::new(request_id.clone()))
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                let request_id = req
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    path = %req.uri().path(),
                    request_id = %request_id,
                )
            }))
            .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
    }

    /// The Axum app, for in-process testing.
    pub fn app(&self) -> axum::Router {
        self.app.clone()
    }

    pub fn routes(&self) -> &Router {
        &self.routes
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.app.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn dispatch(State(routes): State<Arc<Router>>, request: Request<Body>) -> Response {
    routes.serve(request).await
}

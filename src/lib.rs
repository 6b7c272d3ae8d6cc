//! ipd: a service that tells callers their own IP address.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ routing::Router ──▶ http::handlers
//!                                      (first match wins)        │
//!                                                                ▼
//!                                                             lookup
//!                                                   geo / reverse DNS / port probe
//!                                                                │
//!     Client Response                                            ▼
//!     ◀────────────── http::error ◀── http::template ◀── http::response
//!                     (text or JSON)   (browsers)       (identity document)
//!
//!     Cross-cutting: config, observability, lifecycle
//! ```

pub mod cli;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod lookup;
pub mod observability;
pub mod routing;
pub mod useragent;

pub use config::schema::IpdConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

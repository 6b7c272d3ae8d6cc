//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → routing::Router (first matching route wins)
//!     → handlers.rs (extract client address, call lookups)
//!     → response.rs (identity and port documents)
//!     → template.rs (HTML page for browsers)
//!     → error.rs (status, plain text or JSON body)
//!     → Send to client
//! ```

pub mod error;
pub mod handlers;
pub mod request;
pub mod response;
pub mod server;
pub mod template;

pub use error::AppError;
pub use handlers::Server;
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use response::{IdentityResponse, PortResponse};
pub use server::HttpServer;

//! Lookup collaborators.
//!
//! # Data Flow
//! ```text
//! caller IpAddr
//!     → geo.rs  (country name, country ISO code, city from MaxMind databases)
//!     → dns.rs  (reverse hostname via PTR query)
//!     → port.rs (TCP connect probe to ip:port)
//! ```
//!
//! # Design Decisions
//! - Each collaborator sits behind a small trait so handlers can be tested
//!   with stubs
//! - Collaborators only report errors; deciding what a failure means for the
//!   response is the handler's job
//! - Anything that can block (network, socket) enforces its own deadline

pub mod dns;
pub mod geo;
pub mod port;

pub use dns::{ReverseResolver, SystemResolver};
pub use geo::{Country, GeoDatabase, MaxMindDatabase};
pub use port::{PortProbe, TcpProbe};

use thiserror::Error;

/// Failure reported by a lookup collaborator.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("geolocation lookup failed: {0}")]
    Geo(#[from] maxminddb::MaxMindDBError),

    #[error("reverse lookup failed: {0}")]
    Resolve(#[from] hickory_resolver::error::ResolveError),

    #[error("no record for {0}")]
    NotFound(std::net::IpAddr),

    #[error("connection failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),
}

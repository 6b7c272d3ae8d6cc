//! Response assembly.
//!
//! # Responsibilities
//! - Define the identity and port documents sent to clients
//! - Query lookup collaborators for a caller address
//! - Validate port numbers taken from the request path
//!
//! # Design Decisions
//! - Collaborator failures degrade to missing fields; only the caller's own
//!   address is mandatory
//! - Probe errors collapse to `reachable: false` and are never shown
//! - Collaborator calls run under their own deadline, shorter than the
//!   request timeout, so a slow lookup still yields a full document
//! - Every document is built fresh per request

use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::http::handlers::Server;
use crate::lookup::LookupError;

/// Identity document: the caller's address and what is known about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityResponse {
    pub ip: IpAddr,
    pub ip_decimal: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_iso: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

impl IdentityResponse {
    /// Document carrying only the address.
    pub fn new(ip: IpAddr) -> Self {
        Self {
            ip,
            ip_decimal: ip_decimal(ip),
            country: None,
            country_iso: None,
            city: None,
            hostname: None,
        }
    }
}

/// Port reachability document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortResponse {
    pub ip: IpAddr,
    pub port: u16,
    pub reachable: bool,
}

/// Rejected port input. Holds the literal text that was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid port: {0}")]
pub struct PortError(pub String);

/// Numeric form of an address: 32 bits for IPv4, 128 bits for IPv6.
pub fn ip_decimal(ip: IpAddr) -> u128 {
    match ip {
        IpAddr::V4(v4) => u128::from(u32::from(v4)),
        IpAddr::V6(v6) => u128::from(v6),
    }
}

/// Last non-empty segment of a path, ignoring trailing slashes.
pub fn last_segment(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or("")
}

/// Parse a decimal port in the range 1..=65535.
pub fn parse_port(segment: &str) -> Result<u16, PortError> {
    let rejected = || PortError(segment.to_string());
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(rejected());
    }
    match segment.parse::<u16>() {
        Ok(0) | Err(_) => Err(rejected()),
        Ok(port) => Ok(port),
    }
}

/// Run a collaborator call, giving up after `deadline`.
async fn bounded<T, F>(deadline: Duration, call: F) -> Result<T, LookupError>
where
    F: Future<Output = Result<T, LookupError>>,
{
    tokio::time::timeout(deadline, call)
        .await
        .unwrap_or(Err(LookupError::Timeout(deadline)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl Server {
    /// Build the identity document for `ip`.
    pub async fn identity(&self, ip: IpAddr) -> IdentityResponse {
        let mut response = IdentityResponse::new(ip);

        if let Some(geo) = self.geo() {
            match geo.country(ip) {
                Ok(country) => {
                    response.country = non_empty(country.name);
                    response.country_iso = non_empty(country.iso);
                }
                Err(e) => tracing::debug!(ip = %ip, error = %e, "Country lookup failed"),
            }
            match geo.city(ip) {
                Ok(city) => response.city = non_empty(city),
                Err(e) => tracing::debug!(ip = %ip, error = %e, "City lookup failed"),
            }
        }

        if let Some(resolver) = self.resolver() {
            match bounded(self.resolver_timeout(), resolver.lookup_addr(ip)).await {
                Ok(hostname) => response.hostname = non_empty(Some(hostname)),
                Err(e) => tracing::debug!(ip = %ip, error = %e, "Reverse lookup failed"),
            }
        }

        response
    }

    /// Probe `ip:port`. Without a configured probe the port is unreachable.
    pub async fn port_reachability(&self, ip: IpAddr, port: u16) -> PortResponse {
        let reachable = match self.port_probe() {
            Some(probe) => match bounded(self.probe_timeout(), probe.probe(ip, port)).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::debug!(ip = %ip, port, error = %e, "Port probe failed");
                    false
                }
            },
            None => false,
        };
        PortResponse { ip, port, reachable }
    }
}

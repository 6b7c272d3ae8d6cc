//! Request inspection.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4)
//! - Determine the caller's address (trusted header or socket peer)
//! - Classify command-line clients by User-Agent
//!
//! # Design Decisions
//! - A configured trusted header wins over the socket address when present
//! - A trusted header that is present but unparseable is an error, not a
//!   silent fallback to the peer address
//! - IPv4-mapped IPv6 peers are reported as plain IPv4

use std::net::{IpAddr, SocketAddr};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::header::USER_AGENT;
use axum::http::{HeaderName, HeaderValue, Request};
use thiserror::Error;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::useragent;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID generator for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(id))
    }
}

/// The caller's address could not be determined.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("could not parse IP: {0}")]
    Parse(String),

    #[error("remote address unavailable")]
    MissingRemote,
}

/// Resolve the caller's address.
pub fn client_ip(trusted_header: Option<&HeaderName>, req: &Request<Body>) -> Result<IpAddr, AddressError> {
    let forwarded = trusted_header
        .and_then(|name| req.headers().get(name))
        .filter(|value| !value.is_empty());

    let ip = match forwarded {
        Some(value) => {
            let raw = value
                .to_str()
                .map_err(|_| AddressError::Parse(String::from_utf8_lossy(value.as_bytes()).into_owned()))?;
            raw.trim()
                .parse::<IpAddr>()
                .map_err(|_| AddressError::Parse(raw.to_string()))?
        }
        None => {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
                .ok_or(AddressError::MissingRemote)?
        }
    };

    Ok(ip.to_canonical())
}

/// True when the request comes from a known command-line HTTP client.
pub fn cli_matcher(req: &Request<Body>) -> bool {
    req.headers()
        .get(USER_AGENT)
        .and_then(|ua| ua.to_str().ok())
        .map(|ua| useragent::parse(ua).is_cli())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_peer(peer: &str) -> axum::http::request::Builder {
        let addr: SocketAddr = peer.parse().unwrap();
        Request::builder().extension(ConnectInfo(addr))
    }

    #[test]
    fn test_ip_from_remote_addr() {
        let req = from_peer("127.0.0.1:1337").body(Body::empty()).unwrap();
        assert_eq!(client_ip(None, &req), Ok("127.0.0.1".parse().unwrap()));

        let req = from_peer("[::1]:1337").body(Body::empty()).unwrap();
        assert_eq!(client_ip(None, &req), Ok("::1".parse().unwrap()));
    }

    #[test]
    fn test_ipv4_mapped_peer_is_canonical() {
        let req = from_peer("[::ffff:192.0.2.7]:80").body(Body::empty()).unwrap();
        assert_eq!(client_ip(None, &req), Ok("192.0.2.7".parse().unwrap()));
    }

    #[test]
    fn test_ip_from_trusted_header() {
        let header = HeaderName::from_static("x-real-ip");
        let req = from_peer("127.0.0.1:1337")
            .header("X-Real-IP", "203.0.113.9")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(Some(&header), &req), Ok("203.0.113.9".parse().unwrap()));

        // Header not configured: peer address is used.
        assert_eq!(client_ip(None, &req), Ok("127.0.0.1".parse().unwrap()));
    }

    #[test]
    fn test_missing_trusted_header_falls_back_to_peer() {
        let header = HeaderName::from_static("x-real-ip");
        let req = from_peer("127.0.0.1:1337").body(Body::empty()).unwrap();
        assert_eq!(client_ip(Some(&header), &req), Ok("127.0.0.1".parse().unwrap()));
    }

    #[test]
    fn test_unparseable_trusted_header() {
        let header = HeaderName::from_static("x-real-ip");
        let req = from_peer("127.0.0.1:1337")
            .header("X-Real-IP", "not-an-ip")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            client_ip(Some(&header), &req),
            Err(AddressError::Parse("not-an-ip".to_string()))
        );
    }

    #[test]
    fn test_no_address_available() {
        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_ip(None, &req), Err(AddressError::MissingRemote));
    }

    #[test]
    fn test_cli_matcher() {
        let curl = Request::builder()
            .header("User-Agent", "curl/8.4.0")
            .body(Body::empty())
            .unwrap();
        assert!(cli_matcher(&curl));

        let browser = Request::builder()
            .header("User-Agent", "Mozilla/5.0 (X11; Linux x86_64)")
            .body(Body::empty())
            .unwrap();
        assert!(!cli_matcher(&browser));

        let none = Request::builder().body(Body::empty()).unwrap();
        assert!(!cli_matcher(&none));
    }

    #[test]
    fn test_request_ids_are_unique() {
        let req = Request::builder().body(()).unwrap();
        let mut make = MakeRequestUuid;
        let a = make.make_request_id(&req).unwrap();
        let b = make.make_request_id(&req).unwrap();
        assert_ne!(a.header_value(), b.header_value());
    }
}

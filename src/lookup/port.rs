//! Port reachability probing.
//!
//! # Responsibilities
//! - Open a TCP connection to ip:port and close it again
//!
//! # Design Decisions
//! - The probe owns its deadline; callers never wait longer than `timeout`
//! - Only connect success is reported, nothing is written to the peer

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use tokio::net::TcpStream;

use crate::lookup::LookupError;

/// Checks whether a TCP port on an address accepts connections.
pub trait PortProbe: Send + Sync {
    fn probe(&self, ip: IpAddr, port: u16) -> BoxFuture<'_, Result<(), LookupError>>;
}

/// Probe using a plain TCP connect with a timeout.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

impl PortProbe for TcpProbe {
    fn probe(&self, ip: IpAddr, port: u16) -> BoxFuture<'_, Result<(), LookupError>> {
        let addr = SocketAddr::new(ip, port);
        async move {
            match tokio::time::timeout(self.timeout, TcpStream::connect(addr)).await {
                Ok(Ok(_stream)) => Ok(()),
                Ok(Err(e)) => Err(LookupError::Io(e)),
                Err(_) => Err(LookupError::Timeout(self.timeout)),
            }
        }
        .boxed()
    }
}

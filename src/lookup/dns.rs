//! Reverse hostname lookup.

use std::net::IpAddr;
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::system_conf::read_system_conf;
use hickory_resolver::TokioAsyncResolver;

use crate::lookup::LookupError;

/// Resolves an address to a hostname.
pub trait ReverseResolver: Send + Sync {
    fn lookup_addr(&self, ip: IpAddr) -> BoxFuture<'_, Result<String, LookupError>>;
}

/// PTR lookups through the system's configured name servers.
pub struct SystemResolver {
    resolver: TokioAsyncResolver,
    timeout: Duration,
}

impl SystemResolver {
    /// Use `/etc/resolv.conf` when readable, otherwise the resolver defaults.
    /// Each query gets a single attempt bounded by `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let (config, mut opts) = read_system_conf().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "System resolver configuration unavailable, using defaults");
            (ResolverConfig::default(), ResolverOpts::default())
        });
        opts.timeout = timeout;
        opts.attempts = 1;
        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
            timeout,
        }
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl ReverseResolver for SystemResolver {
    fn lookup_addr(&self, ip: IpAddr) -> BoxFuture<'_, Result<String, LookupError>> {
        async move {
            let names = tokio::time::timeout(self.timeout, self.resolver.reverse_lookup(ip))
                .await
                .map_err(|_| LookupError::Timeout(self.timeout))??;
            let name = names.iter().next().ok_or(LookupError::NotFound(ip))?;
            Ok(name.to_utf8().trim_end_matches('.').to_string())
        }
        .boxed()
    }
}

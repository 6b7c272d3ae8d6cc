//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.
//! Every section has defaults, so an empty file is a valid configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct IpdConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Lookup collaborators.
    pub lookup: LookupConfig,

    /// Request handling.
    pub http: HttpConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Which lookups are enabled and where their data lives.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LookupConfig {
    /// Path to a MaxMind country database.
    pub country_db: Option<PathBuf>,

    /// Path to a MaxMind city database.
    pub city_db: Option<PathBuf>,

    /// Resolve hostnames for callers.
    pub reverse_lookup: bool,

    /// Serve `/port/<n>` reachability checks.
    pub port_lookup: bool,

    /// Connect timeout for port checks in milliseconds.
    pub port_timeout_ms: u64,

    /// Deadline for a reverse hostname lookup in milliseconds.
    pub reverse_timeout_ms: u64,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            country_db: None,
            city_db: None,
            reverse_lookup: false,
            port_lookup: false,
            port_timeout_ms: 2000,
            reverse_timeout_ms: 1000,
        }
    }
}

/// Request handling configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    /// Header carrying the client address when running behind a proxy
    /// (e.g., "X-Real-IP").
    pub trusted_header: Option<String>,

    /// HTML template path. The built-in page is used when unset.
    pub template: Option<PathBuf>,

    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            trusted_header: None,
            template: None,
            request_timeout_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

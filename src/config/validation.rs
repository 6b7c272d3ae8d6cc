//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, header names and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: IpdConfig → Result<(), Vec<ValidationError>>
//! - File existence is checked when the files are opened, not here

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::IpdConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid {field}: {value:?} is not a socket address")]
    Address { field: &'static str, value: String },

    #[error("invalid trusted header: {0:?}")]
    HeaderName(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("unknown log level: {0:?}")]
    LogLevel(String),

    #[error("{field} ({value_ms} ms) must be shorter than http.request_timeout_secs ({limit_ms} ms)")]
    Deadline {
        field: &'static str,
        value_ms: u64,
        limit_ms: u64,
    },
}

/// Check the configuration, collecting every error found.
pub fn validate_config(config: &IpdConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Address {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::Address {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if let Some(header) = &config.http.trusted_header {
        if HeaderName::from_bytes(header.as_bytes()).is_err() {
            errors.push(ValidationError::HeaderName(header.clone()));
        }
    }

    if config.lookup.port_timeout_ms == 0 {
        errors.push(ValidationError::Zero("lookup.port_timeout_ms"));
    }

    if config.lookup.reverse_timeout_ms == 0 {
        errors.push(ValidationError::Zero("lookup.reverse_timeout_ms"));
    }

    if config.http.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero("http.request_timeout_secs"));
    } else {
        // Lookups must give up before the request does.
        let limit_ms = config.http.request_timeout_secs.saturating_mul(1000);
        for (field, value_ms) in [
            ("lookup.port_timeout_ms", config.lookup.port_timeout_ms),
            ("lookup.reverse_timeout_ms", config.lookup.reverse_timeout_ms),
        ] {
            if value_ms >= limit_ms {
                errors.push(ValidationError::Deadline { field, value_ms, limit_ms });
            }
        }
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&IpdConfig::default()), Ok(()));
    }

    #[test]
    fn test_all_errors_are_reported() {
        let mut config = IpdConfig::default();
        config.listener.bind_address = ":8080".into();
        config.http.trusted_header = Some("X Real IP".into());
        config.lookup.port_timeout_ms = 0;
        config.lookup.reverse_timeout_ms = 0;
        config.http.request_timeout_secs = 0;
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::Address {
                    field: "listener.bind_address",
                    value: ":8080".into(),
                },
                ValidationError::HeaderName("X Real IP".into()),
                ValidationError::Zero("lookup.port_timeout_ms"),
                ValidationError::Zero("lookup.reverse_timeout_ms"),
                ValidationError::Zero("http.request_timeout_secs"),
                ValidationError::LogLevel("loud".into()),
            ]
        );
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = IpdConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_lookup_deadlines_must_fit_request_timeout() {
        let mut config = IpdConfig::default();
        config.lookup.port_timeout_ms = 60_000;
        config.lookup.reverse_timeout_ms = 10_000;
        config.http.request_timeout_secs = 10;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::Deadline {
                    field: "lookup.port_timeout_ms",
                    value_ms: 60_000,
                    limit_ms: 10_000,
                },
                ValidationError::Deadline {
                    field: "lookup.reverse_timeout_ms",
                    value_ms: 10_000,
                    limit_ms: 10_000,
                },
            ]
        );

        config.lookup.port_timeout_ms = 9_999;
        config.lookup.reverse_timeout_ms = 500;
        assert_eq!(validate_config(&config), Ok(()));
    }
}

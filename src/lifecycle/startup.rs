//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the collaborators named in the configuration
//! - Assemble the `Server` they are injected into
//!
//! # Design Decisions
//! - Fail fast: an unreadable database or template is fatal
//! - Optional features are expressed by which collaborators exist, never by
//!   flags on the router

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::IpdConfig;
use crate::http::handlers::Server;
use crate::http::template::{TemplateError, TemplateRenderer};
use crate::lookup::{LookupError, MaxMindDatabase, SystemResolver, TcpProbe};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open geolocation database: {0}")]
    Geo(#[from] LookupError),

    #[error("failed to load template: {0}")]
    Template(#[from] TemplateError),

    #[error("invalid trusted header: {0:?}")]
    Header(String),
}

/// Build the service described by `config`.
pub fn build_server(config: &IpdConfig) -> Result<Server, StartupError> {
    let mut server = Server::new();

    if let Some(name) = &config.http.trusted_header {
        let header = HeaderName::from_bytes(name.as_bytes()).map_err(|_| StartupError::Header(name.clone()))?;
        tracing::info!(header = %header, "Trusting client address header");
        server = server.with_trusted_header(header);
    }

    let geo = MaxMindDatabase::open(config.lookup.country_db.as_deref(), config.lookup.city_db.as_deref())?;
    if geo.is_empty() {
        tracing::info!("No geolocation database configured, /country, /country-iso and /city disabled");
    } else {
        server = server.with_geo(Arc::new(geo));
    }

    if config.lookup.reverse_lookup {
        let timeout = Duration::from_millis(config.lookup.reverse_timeout_ms);
        tracing::info!(timeout = ?timeout, "Reverse hostname lookup enabled");
        server = server
            .with_resolver(Arc::new(SystemResolver::new(timeout)))
            .with_resolver_timeout(timeout);
    }

    if config.lookup.port_lookup {
        let timeout = Duration::from_millis(config.lookup.port_timeout_ms);
        tracing::info!(timeout = ?timeout, "Port lookup enabled");
        server = server
            .with_port_probe(Arc::new(TcpProbe::new(timeout)))
            .with_probe_timeout(timeout);
    }

    let template = match &config.http.template {
        Some(path) => TemplateRenderer::from_file(path)?,
        None => TemplateRenderer::builtin(),
    };
    server = server.with_template(Arc::new(template));

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_builds_minimal_server() {
        let server = build_server(&IpdConfig::default()).unwrap();
        assert!(server.geo().is_none());
        assert!(server.resolver().is_none());
        assert!(server.port_probe().is_none());
        assert!(!server.port_testing_enabled());
    }

    #[tokio::test]
    async fn test_optional_collaborators() {
        let mut config = IpdConfig::default();
        config.lookup.port_lookup = true;
        config.lookup.reverse_lookup = true;

        let server = build_server(&config).unwrap();
        assert!(server.port_testing_enabled());
        assert!(server.resolver().is_some());
    }

    #[test]
    fn test_missing_database_is_fatal() {
        let mut config = IpdConfig::default();
        config.lookup.city_db = Some("/nonexistent/city.mmdb".into());
        assert!(matches!(build_server(&config), Err(StartupError::Geo(_))));
    }

    #[test]
    fn test_custom_template() {
        let mut file = tempfile::Builder::new().suffix(".html").tempfile().unwrap();
        write!(file, "<p>{{{{ ip }}}}</p>").unwrap();

        let mut config = IpdConfig::default();
        config.http.template = Some(file.path().to_path_buf());
        assert!(build_server(&config).is_ok());

        let mut broken = tempfile::Builder::new().suffix(".html").tempfile().unwrap();
        write!(broken, "{{% if %}}").unwrap();
        config.http.template = Some(broken.path().to_path_buf());
        assert!(matches!(build_server(&config), Err(StartupError::Template(_))));
    }
}

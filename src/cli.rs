//! Command-line interface.
//!
//! Flags override the matching configuration file values; anything not given
//! on the command line keeps the file's value, or the default.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{load_config, validate_config, ConfigError, IpdConfig};

#[derive(Debug, Parser)]
#[command(name = "ipd")]
#[command(version, about = "A service that tells callers their own IP address", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short = 'C', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// MaxMind country database
    #[arg(short = 'f', long, value_name = "FILE")]
    pub country_db: Option<PathBuf>,

    /// MaxMind city database
    #[arg(short = 'c', long, value_name = "FILE")]
    pub city_db: Option<PathBuf>,

    /// Listening address [default: 0.0.0.0:8080]
    #[arg(short, long, value_name = "ADDR")]
    pub listen: Option<String>,

    /// Perform reverse hostname lookups
    #[arg(short, long)]
    pub reverse_lookup: bool,

    /// Enable port lookup
    #[arg(short, long)]
    pub port_lookup: bool,

    /// Path to HTML template
    #[arg(short, long, value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// Header to trust for the client address, e.g. X-Real-IP
    #[arg(short = 'H', long, value_name = "NAME")]
    pub trusted_header: Option<String>,
}

impl Cli {
    /// Load the configuration file (if any), apply overrides and validate.
    pub fn into_config(self) -> Result<IpdConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => IpdConfig::default(),
        };
        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    fn apply(self, config: &mut IpdConfig) {
        if let Some(listen) = self.listen {
            config.listener.bind_address = listen;
        }
        if self.country_db.is_some() {
            config.lookup.country_db = self.country_db;
        }
        if self.city_db.is_some() {
            config.lookup.city_db = self.city_db;
        }
        config.lookup.reverse_lookup |= self.reverse_lookup;
        config.lookup.port_lookup |= self.port_lookup;
        if self.template.is_some() {
            config.http.template = self.template;
        }
        if self.trusted_header.is_some() {
            config.http.trusted_header = self.trusted_header;
        }
    }
}

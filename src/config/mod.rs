//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → command-line overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → IpdConfig (validated, immutable)
//!     → used once to build collaborators and routes
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; the route table depends on it
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{HttpConfig, IpdConfig, ListenerConfig, LookupConfig, ObservabilityConfig};
pub use validation::{validate_config, ValidationError};

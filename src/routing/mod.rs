//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, headers)
//!     → router.rs (scan routes in registration order)
//!     → matcher.rs (evaluate method, path, header and predicate conditions)
//!     → Return: first matching Route, or the not-found fallback
//!
//! Route Registration (at startup):
//!     Server configuration
//!     → register routes in priority order (optional families skipped)
//!     → Freeze as immutable Router behind Arc
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - No path templates; every condition is a boolean predicate
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)

pub mod matcher;
pub mod router;

pub use matcher::{Matcher, PathRule};
pub use router::{Handler, HandlerResult, PathSuffix, Route, Router};

//! Configuration for the gmcp servers
//!
//! Provides types and loading for `gmcp.toml` plus environment overrides.

pub mod loader;
pub mod schema;

pub use loader::{load_config, ConfigError};
pub use schema::*;

//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod catalog;
pub mod config;
pub mod context;
pub mod deploy;
pub mod error;
pub mod identifiers;
pub mod knowledge;
pub mod mount;
pub mod scale;
pub mod subdomain;
pub mod timeline;
pub mod validate;
pub mod verify;

#[allow(unused_imports)]
pub use config::{ZcpConfig, validate_config_key, validate_config_value};
#[allow(unused_imports)]
pub use error::{ApiError, Canceled, ConfigError, ErrorCode, ZcpError};

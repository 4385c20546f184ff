//! Command implementations

pub mod config;
pub mod context;
pub mod knowledge;
pub mod mount;
pub mod preflight;
pub mod validate;
pub mod version;

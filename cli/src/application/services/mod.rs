//! Application services: one module per operation.
//!
//! Each service module composes domain logic with port trait calls.
//! Services import only from `crate::domain` and `crate::application::ports`,
//! never from `crate::infra`, `crate::commands`, or `crate::output`.

pub mod catalog_cache;
pub mod config_service;
pub mod context;
pub mod deploy;
pub mod discover;
pub mod env;
pub mod events;
pub mod import;
pub mod knowledge;
pub mod knowledge_tracker;
pub mod logs;
pub mod manage;
pub mod mount;
pub mod poll;
pub mod process;
pub mod session;
pub mod subdomain;
pub mod validate;
pub mod verify;

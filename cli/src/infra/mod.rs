//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, remote
//! and local command executors, sshfs mounts, HTTP adapters and the config
//! file.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod command_runner;
pub mod config;
pub mod executors;
pub mod fs;
pub mod http;
pub mod mounter;

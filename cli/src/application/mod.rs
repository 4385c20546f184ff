//! Application layer: port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain` and `zcp_common`, never on
//! `crate::infra`, `crate::commands`, or `crate::output`.

pub mod ports;
pub mod services;

#[allow(unused_imports)]
pub use ports::{
    CommandRunner, ConfigStore, ExecOutput, GitPreparer, HttpProbe, HttpResponse,
    LocalAgentExecutor, LocalFs, LogFetcher, Mounter, PlatformClient, ProgressReporter,
    ShellExecutor,
};

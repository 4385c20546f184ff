//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` and `zcp_common`, never from
//! `crate::infra`, `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;
use zcp_common::{
    AppVersionEvent, AutoscalingParams, EnvVar, ImportResult, LogAccess, LogEntry, LogFetchParams,
    Process, Project, ServiceStack, ServiceStackType,
};

use crate::domain::config::ZcpConfig;

// ── Platform Port ─────────────────────────────────────────────────────────────

/// The platform API as consumed by operations.
///
/// Errors carrying a platform error code are surfaced as
/// [`crate::domain::error::ApiError`].
#[allow(async_fn_in_trait)]
pub trait PlatformClient {
    async fn get_project(&self, project_id: &str) -> Result<Project>;
    async fn list_services(&self, project_id: &str) -> Result<Vec<ServiceStack>>;

    async fn get_service_env(&self, service_id: &str) -> Result<Vec<EnvVar>>;
    async fn get_project_env(&self, project_id: &str) -> Result<Vec<EnvVar>>;
    async fn create_project_env(&self, project_id: &str, key: &str, content: &str)
    -> Result<Process>;
    async fn delete_project_env(&self, env_id: &str) -> Result<Process>;
    /// Replaces the service's env file with `content` (`KEY=value` lines).
    async fn set_service_env_file(&self, service_id: &str, content: &str) -> Result<Process>;
    async fn delete_user_data(&self, user_data_id: &str) -> Result<Process>;

    async fn start_service(&self, service_id: &str) -> Result<Process>;
    async fn stop_service(&self, service_id: &str) -> Result<Process>;
    async fn restart_service(&self, service_id: &str) -> Result<Process>;
    async fn reload_service(&self, service_id: &str) -> Result<Process>;
    async fn delete_service(&self, service_id: &str) -> Result<Process>;
    /// `None` when the platform applied the change synchronously.
    async fn set_autoscaling(
        &self,
        service_id: &str,
        params: &AutoscalingParams,
    ) -> Result<Option<Process>>;
    async fn connect_storage(&self, service_id: &str, storage_id: &str) -> Result<Process>;
    async fn disconnect_storage(&self, service_id: &str, storage_id: &str) -> Result<Process>;

    async fn enable_subdomain_access(&self, service_id: &str) -> Result<Process>;
    async fn disable_subdomain_access(&self, service_id: &str) -> Result<Process>;

    async fn get_process(&self, process_id: &str) -> Result<Process>;
    async fn cancel_process(&self, process_id: &str) -> Result<Process>;
    async fn search_processes(&self, project_id: &str, limit: usize) -> Result<Vec<Process>>;
    async fn search_app_versions(
        &self,
        project_id: &str,
        limit: usize,
    ) -> Result<Vec<AppVersionEvent>>;

    async fn import_services(&self, project_id: &str, yaml: &str) -> Result<ImportResult>;
    async fn list_service_stack_types(&self) -> Result<Vec<ServiceStackType>>;
    async fn get_project_log(&self, project_id: &str) -> Result<LogAccess>;
}

// ── Log Backend Port ──────────────────────────────────────────────────────────

#[allow(async_fn_in_trait)]
pub trait LogFetcher {
    /// Entries in ascending timestamp order, at most `params.limit`.
    async fn fetch_logs(&self, access: &LogAccess, params: &LogFetchParams)
    -> Result<Vec<LogEntry>>;
}

// ── Executor Ports ────────────────────────────────────────────────────────────

/// Combined stdout and stderr of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub combined: String,
    /// Set when the command exited unsuccessfully.
    pub failure: Option<String>,
}

impl ExecOutput {
    #[must_use]
    pub fn success(combined: impl Into<String>) -> Self {
        Self {
            combined: combined.into(),
            failure: None,
        }
    }

    #[must_use]
    pub fn failed(combined: impl Into<String>, failure: impl Into<String>) -> Self {
        Self {
            combined: combined.into(),
            failure: Some(failure.into()),
        }
    }
}

/// Runs a shell command on a sibling service container.
#[allow(async_fn_in_trait)]
pub trait ShellExecutor {
    /// `Err` only when the command could not be run at all (spawn failure,
    /// timeout); non-zero exits come back as [`ExecOutput::failure`].
    async fn exec_ssh(&self, hostname: &str, command: &str) -> Result<ExecOutput>;
}

/// Runs the local platform agent (`zcli`).
#[allow(async_fn_in_trait)]
pub trait LocalAgentExecutor {
    async fn exec_local_agent(&self, args: &[String]) -> Result<ExecOutput>;
}

/// Makes sure a local working directory is a git repository.
#[allow(async_fn_in_trait)]
pub trait GitPreparer {
    /// Initializes and commits when `.git` is missing; with `fresh`, any
    /// existing `.git` is removed first. An existing repository is left
    /// untouched otherwise.
    async fn ensure_repository(&self, working_dir: &Path, fresh: bool) -> Result<()>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
}

// ── Mount Port ────────────────────────────────────────────────────────────────

/// Userspace mounts of service filesystems.
#[allow(async_fn_in_trait)]
pub trait Mounter {
    async fn is_mounted(&self, path: &str) -> Result<bool>;
    async fn mount(&self, hostname: &str, local_path: &str) -> Result<()>;
    async fn unmount(&self, hostname: &str, path: &str) -> Result<()>;
    async fn is_writable(&self, path: &str) -> Result<bool>;
}

// ── HTTP Probe Port ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Plain HTTP GET used by health checks.
#[allow(async_fn_in_trait)]
pub trait HttpProbe {
    /// `Err` for transport failures (refused, DNS, timeout); any HTTP status
    /// is an `Ok`.
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Receives poll ticks while processes and builds are awaited.
/// Sync trait, no async needed.
pub trait ProgressReporter {
    /// One tick per poll iteration. `progress` is the share of the poll
    /// timeout spent so far and runs from 0 to `total` (always 100).
    fn progress(&self, message: &str, progress: f64, total: f64);
}

// ── Filesystem and Config Ports ───────────────────────────────────────────────

/// Local file access used for manifests and repository checks.
pub trait LocalFs {
    fn exists(&self, path: &Path) -> bool;
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn read_to_string(&self, path: &Path) -> Result<String>;
}

/// Abstracts loading and saving the YAML configuration.
pub trait ConfigStore {
    /// Load the configuration, returning defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<ZcpConfig>;
    /// Persist the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn save(&self, config: &ZcpConfig) -> Result<()>;
    /// Location of the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    fn path(&self) -> Result<PathBuf>;
}

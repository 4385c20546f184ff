//! Typed domain errors.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator. Callers that need the code use
//! `err.downcast_ref::<ZcpError>()`.

use serde::Serialize;
use thiserror::Error;

// ── Error codes ───────────────────────────────────────────────────────────────

/// Closed set of stable, externally visible error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ServiceNotFound,
    ServiceRequired,
    InvalidHostname,
    ConfirmRequired,
    InvalidParameter,
    InvalidUsage,
    InvalidEnvFormat,
    InvalidScaling,
    InvalidImportYml,
    InvalidZeropsYml,
    ImportHasProject,
    FileNotFound,
    SshDeployFailed,
    MountFailed,
    UnmountFailed,
    ProcessNotFound,
    ProcessAlreadyTerminal,
    ApiTimeout,
    ApiError,
    NotImplemented,
}

impl ErrorCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ServiceNotFound => "SERVICE_NOT_FOUND",
            Self::ServiceRequired => "SERVICE_REQUIRED",
            Self::InvalidHostname => "INVALID_HOSTNAME",
            Self::ConfirmRequired => "CONFIRM_REQUIRED",
            Self::InvalidParameter => "INVALID_PARAMETER",
            Self::InvalidUsage => "INVALID_USAGE",
            Self::InvalidEnvFormat => "INVALID_ENV_FORMAT",
            Self::InvalidScaling => "INVALID_SCALING",
            Self::InvalidImportYml => "INVALID_IMPORT_YML",
            Self::InvalidZeropsYml => "INVALID_ZEROPS_YML",
            Self::ImportHasProject => "IMPORT_HAS_PROJECT",
            Self::FileNotFound => "FILE_NOT_FOUND",
            Self::SshDeployFailed => "SSH_DEPLOY_FAILED",
            Self::MountFailed => "MOUNT_FAILED",
            Self::UnmountFailed => "UNMOUNT_FAILED",
            Self::ProcessNotFound => "PROCESS_NOT_FOUND",
            Self::ProcessAlreadyTerminal => "PROCESS_ALREADY_TERMINAL",
            Self::ApiTimeout => "API_TIMEOUT",
            Self::ApiError => "API_ERROR",
            Self::NotImplemented => "NOT_IMPLEMENTED",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Operation errors ──────────────────────────────────────────────────────────

/// Failure of a user-facing operation: a stable code, a human-readable
/// message and a remediation hint the caller should surface verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[error("{message}")]
pub struct ZcpError {
    pub code: ErrorCode,
    #[serde(rename = "error")]
    pub message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub suggestion: String,
}

impl ZcpError {
    pub fn new(code: ErrorCode, message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }
}

/// Error reported by the platform API with its own code, e.g.
/// `SUBDOMAIN_ALREADY_ENABLED`. Passed through operations unchanged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Returned when the caller cancels an operation. Never wrapped into a
/// [`ZcpError`].
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("operation canceled")]
pub struct Canceled;

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: String,
        value: String,
        valid: String,
    },
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Extracts the operation error code from an `anyhow` chain, if any.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> Option<ErrorCode> {
    err.downcast_ref::<ZcpError>().map(|e| e.code)
}

/// Returns `true` if the error chain ends in a cancellation.
#[must_use]
pub fn is_canceled(err: &anyhow::Error) -> bool {
    err.downcast_ref::<Canceled>().is_some()
}

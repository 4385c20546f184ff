//! JSON output helpers.
//!
//! Results are printed as pretty JSON on stdout. Failures in `--json` mode
//! become a single error object on stdout so callers can parse both paths.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::error::{ErrorCode, ZcpError};

/// Renders results as JSON.
pub struct JsonRenderer;

impl JsonRenderer {
    /// Print `value` as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render(value: &impl Serialize) -> Result<()> {
        let out = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
        println!("{out}");
        Ok(())
    }
}

/// Error object for `--json` mode:
///
/// ```json
/// { "code": "SERVICE_NOT_FOUND", "error": "...", "suggestion": "..." }
/// ```
///
/// Errors without an operation code are reported as `API_ERROR`.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn format_error(err: &anyhow::Error) -> Result<String> {
    let obj = match err.downcast_ref::<ZcpError>() {
        Some(zcp) => serde_json::to_value(zcp),
        None => serde_json::to_value(ZcpError::new(
            ErrorCode::ApiError,
            format!("{err:#}"),
            String::new(),
        )),
    }
    .context("JSON serialization failed")?;
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

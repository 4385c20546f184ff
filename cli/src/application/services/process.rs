//! Application service: inspecting and canceling platform processes.

use anyhow::Result;
use serde::Serialize;
use tracing::info;
use zcp_common::{Process, ProcessStatus};

use crate::application::ports::PlatformClient;
use crate::domain::error::{ErrorCode, ZcpError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessStatusResult {
    pub process_id: String,
    pub action_name: String,
    pub status: ProcessStatus,
    pub created: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_reason: Option<String>,
}

impl From<Process> for ProcessStatusResult {
    fn from(p: Process) -> Self {
        Self {
            process_id: p.id,
            action_name: p.action_name,
            status: p.status,
            created: p.created,
            started: p.started,
            finished: p.finished,
            fail_reason: p.fail_reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelResult {
    pub process_id: String,
    pub status: ProcessStatus,
    pub message: String,
}

fn require_id(process_id: &str) -> Result<(), ZcpError> {
    if process_id.is_empty() {
        return Err(ZcpError::new(
            ErrorCode::InvalidParameter,
            "Process ID is required",
            "Provide a valid process ID",
        ));
    }
    Ok(())
}

async fn fetch(client: &impl PlatformClient, process_id: &str) -> Result<Process> {
    client.get_process(process_id).await.map_err(|_| {
        ZcpError::new(
            ErrorCode::ProcessNotFound,
            format!("Process '{process_id}' not found"),
            "Check the process ID",
        )
        .into()
    })
}

/// # Errors
///
/// `INVALID_PARAMETER` for an empty id, `PROCESS_NOT_FOUND` when the lookup
/// fails.
pub async fn process_status(client: &impl PlatformClient, process_id: &str) -> Result<ProcessStatusResult> {
    require_id(process_id)?;
    Ok(fetch(client, process_id).await?.into())
}

/// Cancels a pending or running process.
///
/// # Errors
///
/// `PROCESS_ALREADY_TERMINAL` for finished, failed or canceled processes,
/// plus the errors of [`process_status`] and the cancel call.
pub async fn cancel_process(client: &impl PlatformClient, process_id: &str) -> Result<CancelResult> {
    require_id(process_id)?;
    let process = fetch(client, process_id).await?;
    if process.status.is_terminal() {
        return Err(ZcpError::new(
            ErrorCode::ProcessAlreadyTerminal,
            format!("Process '{process_id}' is already {}", process.status),
            "Only PENDING or RUNNING processes can be canceled",
        )
        .into());
    }
    client.cancel_process(process_id).await?;
    info!(process_id, "process canceled");
    Ok(CancelResult {
        process_id: process_id.to_string(),
        status: ProcessStatus::Canceled,
        message: format!("Process {process_id} canceled"),
    })
}

//! Deploy command construction and failure classification. No I/O.

use serde::Serialize;

use crate::domain::error::{ErrorCode, ZcpError};

/// Working directory used on the source container when none is given.
pub const DEFAULT_WORKING_DIR: &str = "/var/www";

/// Output fragments proving the build was handed to the platform.
pub const BUILD_TRIGGERED_MARKERS: &[&str] = &["BUILD ARTEFACTS READY TO DEPLOY", "Deploying service"];

pub const MONITOR_HINT: &str =
    "Build runs asynchronously. Poll zerops_events for build/deploy FINISHED status.";

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployMode {
    /// Build runs on a sibling container reached over SSH.
    Ssh,
    /// Push from the local working directory with zcli.
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeployStatus {
    BuildTriggered,
    Deployed,
    BuildFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployResult {
    pub status: DeployStatus,
    pub mode: DeployMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_service: Option<String>,
    pub target_service: String,
    pub target_service_id: String,
    pub message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub monitor_hint: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub suggestion: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub build_status: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub build_duration: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub timed_out: bool,
}

/// Everything needed to build the remote deploy command.
#[derive(Debug, Clone, Default)]
pub struct SshDeployCommand<'a> {
    pub token: &'a str,
    pub region: &'a str,
    pub setup: Option<&'a str>,
    pub working_dir: &'a str,
    pub target_service_id: &'a str,
    pub include_git: bool,
    pub fresh_git: bool,
}

// ── Command construction ──────────────────────────────────────────────────────

/// Single-quotes `value` for `sh` unless it is made of safe characters only.
#[must_use]
pub fn shell_quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./@:+=,".contains(c));
    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

/// Remote command: login, optional setup, git guard, push; joined with `&&`.
#[must_use]
pub fn build_ssh_command(cmd: &SshDeployCommand<'_>) -> String {
    let wd = shell_quote(cmd.working_dir);
    let mut parts = vec![format!(
        "zcli login {} --zeropsRegion {}",
        shell_quote(cmd.token),
        shell_quote(cmd.region)
    )];
    if let Some(setup) = cmd.setup.filter(|s| !s.trim().is_empty()) {
        parts.push(setup.to_string());
    }

    let init = format!(
        "git -C {wd} init -q && git -C {wd} add -A && git -C {wd} commit -q --allow-empty -m 'deploy'"
    );
    if cmd.fresh_git {
        parts.push(format!("rm -rf {wd}/.git && {init}"));
    } else {
        parts.push(format!("(test -d {wd}/.git || ({init}))"));
    }

    let mut push = format!(
        "cd {wd} && zcli push --serviceId {}",
        shell_quote(cmd.target_service_id)
    );
    if cmd.include_git {
        push.push_str(" -G");
    }
    parts.push(push);

    parts.join(" && ")
}

/// Arguments for a local `zcli push`.
#[must_use]
pub fn build_zcli_args(target_service_id: &str, working_dir: Option<&str>, include_git: bool) -> Vec<String> {
    let mut args = vec![
        "push".to_string(),
        "--serviceId".to_string(),
        target_service_id.to_string(),
    ];
    if let Some(wd) = working_dir.filter(|w| !w.is_empty()) {
        args.push("--workingDir".to_string());
        args.push(wd.to_string());
    }
    if include_git {
        args.push("-G".to_string());
    }
    args
}

/// `true` when the output shows the build was submitted, regardless of the
/// SSH exit status (255 is common when the container restarts mid-deploy).
#[must_use]
pub fn is_build_triggered(output: &str) -> bool {
    BUILD_TRIGGERED_MARKERS.iter().any(|m| output.contains(m))
}

// ── Failure classification ────────────────────────────────────────────────────

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Maps a failed remote deploy to an actionable `SSH_DEPLOY_FAILED` error.
#[must_use]
pub fn classify_ssh_failure(message: &str, source: &str, target: &str) -> ZcpError {
    let failed = |why: &str, suggestion: String| {
        ZcpError::new(
            ErrorCode::SshDeployFailed,
            format!("SSH deploy from {source} to {target} failed: {why}"),
            suggestion,
        )
    };
    let lower = message.to_ascii_lowercase();

    if message.contains("signal: killed") || message.contains("OOM") || lower.contains("out of memory") {
        failed(
            "process killed (likely OOM)",
            format!(
                "Process killed, likely insufficient RAM. Scale up the source service: zerops_scale serviceHostname={source} minRam=2"
            ),
        )
    } else if contains_any(message, &["zerops.yml", "zerops.yaml"]) {
        failed(
            "zerops.yml not found",
            "zerops.yml must be present in workingDir. After a deploy the container only holds deployFiles artifacts, so dev services must use deployFiles: [.] to keep zerops.yml for cross-service deploys.".to_string(),
        )
    } else if contains_any(&lower, &["connection refused", "no route to host"]) {
        failed(
            "cannot reach source service",
            format!("Verify the source service is RUNNING: zerops_discover service={source}"),
        )
    } else if contains_any(&lower, &["not in a git directory", "not a git repository"]) {
        failed(
            "working directory is not a usable git repository",
            "Retry the deploy with freshGit=true to reinitialize the repository.".to_string(),
        )
    } else if lower.contains("command not found") {
        failed(
            "command not found",
            "zcli is not available on the source container. Use a runtime service type that ships zcli as the source.".to_string(),
        )
    } else if contains_any(&lower, &["no space left on device", "disk quota exceeded"]) {
        failed(
            "out of disk space",
            format!("Scale up the source service disk: zerops_scale serviceHostname={source} minDisk=5"),
        )
    } else if lower.contains("permission denied") {
        failed(
            "permission denied",
            "Check file ownership and permissions touched by the build commands in zerops.yml.".to_string(),
        )
    } else if contains_any(&lower, &["module not found", "cannot find module"]) {
        failed(
            "missing module",
            "Add the dependency install step (e.g. npm ci, pip install) to build.buildCommands in zerops.yml.".to_string(),
        )
    } else if lower.contains("exec format error") {
        failed(
            "exec format error",
            "The binary was built for the wrong platform. Build it for linux/amd64.".to_string(),
        )
    } else {
        failed(
            message,
            "Check the full error output above for diagnosis.".to_string(),
        )
    }
}

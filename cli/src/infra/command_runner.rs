//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` runs external programs (`ssh`, `zcli`, `git`,
//! `fusermount`, `zsc`) with a hard timeout. On timeout the child is killed
//! explicitly, not merely dropped.

use std::process::{Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::application::ports::CommandRunner;

/// Default timeout for short helper commands (git, fusermount).
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(30);

pub struct TokioCommandRunner {
    timeout: Duration,
    /// Directory the child runs in; inherited when `None`.
    current_dir: Option<std::path::PathBuf>,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            current_dir: None,
        }
    }

    /// Same runner, with children started in `dir`.
    #[must_use]
    pub fn in_dir(&self, dir: &std::path::Path) -> Self {
        Self {
            timeout: self.timeout,
            current_dir: Some(dir.to_path_buf()),
        }
    }
}

async fn read_all<R: tokio::io::AsyncRead + Unpin>(handle: Option<&mut R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(h) = handle {
        let _ = h.read_to_end(&mut buf).await;
    }
    buf
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, self.timeout).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        debug!(program, ?args, "spawning");
        let mut command = tokio::process::Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        let mut child = command
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        tokio::select! {
            result = async {
                let (status, stdout, stderr) = tokio::join!(
                    child.wait(),
                    read_all(stdout_handle.as_mut()),
                    read_all(stderr_handle.as_mut()),
                );
                Ok(Output {
                    status: status.with_context(|| format!("waiting for {program}"))?,
                    stdout,
                    stderr,
                })
            } => result,
            () = tokio::time::sleep(timeout) => {
                let _ = child.kill().await;
                anyhow::bail!("{program} timed out after {}s", timeout.as_secs())
            }
        }
    }
}

/// Stdout followed by stderr, lossily decoded.
#[must_use]
pub fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.is_empty() {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&stderr);
    }
    text
}

/// Describes a non-zero exit, e.g. `exit status 255`.
#[must_use]
pub fn exit_description(output: &Output) -> Option<String> {
    if output.status.success() {
        return None;
    }
    Some(match output.status.code() {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    })
}

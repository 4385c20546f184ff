//! Infrastructure implementations of the executor ports.
//!
//! `SshExecutor<R>` reaches sibling containers over `ssh`, `ZcliExecutor<R>`
//! runs the local `zcli` agent and prepares the git repository it uploads.
//! Both route through a `CommandRunner` so tests can inject a fake.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::application::ports::{
    CommandRunner, ExecOutput, GitPreparer, LocalAgentExecutor, ShellExecutor,
};
use crate::infra::command_runner::{
    DEFAULT_CMD_TIMEOUT, TokioCommandRunner, combined_output, exit_description,
};

const SSH_OPTIONS: &[&str] = &["-o", "StrictHostKeyChecking=no", "-o", "BatchMode=yes"];

fn exec_output(output: &std::process::Output) -> ExecOutput {
    let combined = combined_output(output);
    match exit_description(output) {
        Some(failure) => ExecOutput::failed(combined, failure),
        None => ExecOutput::success(combined),
    }
}

/// Runs commands on sibling containers. The platform grants key-based SSH
/// between services of one project.
pub struct SshExecutor<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> SshExecutor<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl SshExecutor<TokioCommandRunner> {
    /// Production executor; `exec_timeout` bounds the whole remote build
    /// trigger.
    #[must_use]
    pub fn system(exec_timeout: Duration) -> Self {
        Self::new(TokioCommandRunner::new(exec_timeout))
    }
}

impl<R: CommandRunner> ShellExecutor for SshExecutor<R> {
    async fn exec_ssh(&self, hostname: &str, command: &str) -> Result<ExecOutput> {
        let mut args: Vec<&str> = SSH_OPTIONS.to_vec();
        args.push(hostname);
        args.push(command);
        let output = self
            .runner
            .run("ssh", &args)
            .await
            .with_context(|| format!("ssh {hostname}"))?;
        Ok(exec_output(&output))
    }
}

/// Runs `zcli` and `git` in the local container.
pub struct ZcliExecutor<R: CommandRunner> {
    agent_runner: R,
    git_runner: R,
}

impl<R: CommandRunner> ZcliExecutor<R> {
    pub fn new(agent_runner: R, git_runner: R) -> Self {
        Self {
            agent_runner,
            git_runner,
        }
    }

    async fn git(&self, dir: &str, args: &[&str]) -> Result<()> {
        let mut full = vec!["-C", dir];
        full.extend_from_slice(args);
        let output = self.git_runner.run("git", &full).await?;
        if let Some(failure) = exit_description(&output) {
            anyhow::bail!(
                "git {}: {failure}: {}",
                args.join(" "),
                combined_output(&output).trim()
            );
        }
        Ok(())
    }
}

impl ZcliExecutor<TokioCommandRunner> {
    #[must_use]
    pub fn system(exec_timeout: Duration) -> Self {
        Self::new(
            TokioCommandRunner::new(exec_timeout),
            TokioCommandRunner::new(DEFAULT_CMD_TIMEOUT),
        )
    }
}

impl<R: CommandRunner> LocalAgentExecutor for ZcliExecutor<R> {
    async fn exec_local_agent(&self, args: &[String]) -> Result<ExecOutput> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        debug!(?args, "running zcli");
        let output = self.agent_runner.run("zcli", &args).await.context("zcli")?;
        Ok(exec_output(&output))
    }
}

impl<R: CommandRunner> GitPreparer for ZcliExecutor<R> {
    async fn ensure_repository(&self, working_dir: &Path, fresh: bool) -> Result<()> {
        let git_dir = working_dir.join(".git");
        if git_dir.exists() {
            if !fresh {
                return Ok(());
            }
            tokio::fs::remove_dir_all(&git_dir)
                .await
                .with_context(|| format!("cannot remove {}", git_dir.display()))?;
        }

        let dir = working_dir.to_string_lossy();
        self.git(&dir, &["init", "-q"]).await?;
        self.git(&dir, &["add", "-A"]).await?;
        self.git(&dir, &["commit", "-q", "--allow-empty", "-m", "deploy"])
            .await?;
        info!(dir = %dir, "initialized git repository for deploy");
        Ok(())
    }
}

//! Infrastructure implementation of the `Mounter` port.
//!
//! Service filesystems are mounted with `sshfs` running under a `zsc`
//! systemd unit named `sshfs-<hostname>`. Mount state comes from
//! `/proc/mounts`, which stays accurate inside LXC containers where
//! `mountpoint(1)` does not.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::application::ports::{CommandRunner, Mounter};
use crate::domain::mount::validate_mount_hostname;
use crate::infra::command_runner::{TokioCommandRunner, combined_output, exit_description};

const MOUNT_CHECK_TIMEOUT: Duration = Duration::from_secs(10);
const MOUNT_CREATE_TIMEOUT: Duration = Duration::from_secs(30);
const UNMOUNT_TIMEOUT: Duration = Duration::from_secs(10);

const SSHFS_FS_TYPE: &str = "fuse.sshfs";
const WRITE_CHECK_FILE: &str = ".mount_test";

fn unit_name(hostname: &str) -> String {
    format!("sshfs-{hostname}")
}

/// True when `table` (in `/proc/mounts` format) has an sshfs entry at `path`.
#[must_use]
pub fn has_sshfs_mount(table: &str, path: &str) -> bool {
    table.lines().any(|line| {
        let mut fields = line.split_whitespace();
        let (_, Some(mount_point), Some(fs_type)) = (fields.next(), fields.next(), fields.next())
        else {
            return false;
        };
        mount_point == path && fs_type == SSHFS_FS_TYPE
    })
}

pub struct SshfsMounter<R: CommandRunner> {
    runner: R,
    mounts_table: PathBuf,
}

impl<R: CommandRunner> SshfsMounter<R> {
    pub fn new(runner: R) -> Self {
        Self::with_mounts_table(runner, "/proc/mounts")
    }

    /// Reads mount state from `table` instead of `/proc/mounts`.
    pub fn with_mounts_table(runner: R, table: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            mounts_table: table.into(),
        }
    }

    async fn checked(&self, program: &str, args: &[&str], timeout: Duration) -> Result<()> {
        let output = self.runner.run_with_timeout(program, args, timeout).await?;
        if let Some(failure) = exit_description(&output) {
            anyhow::bail!(
                "{program} {}: {failure}: {}",
                args.join(" "),
                combined_output(&output).trim()
            );
        }
        Ok(())
    }
}

impl SshfsMounter<TokioCommandRunner> {
    #[must_use]
    pub fn system() -> Self {
        Self::new(TokioCommandRunner::new(MOUNT_CREATE_TIMEOUT))
    }
}

impl<R: CommandRunner> Mounter for SshfsMounter<R> {
    async fn is_mounted(&self, path: &str) -> Result<bool> {
        let table = tokio::fs::read_to_string(&self.mounts_table)
            .await
            .with_context(|| format!("cannot read {}", self.mounts_table.display()))?;
        Ok(has_sshfs_mount(&table, path))
    }

    async fn mount(&self, hostname: &str, local_path: &str) -> Result<()> {
        validate_mount_hostname(hostname)?;
        tokio::fs::create_dir_all(local_path)
            .await
            .with_context(|| format!("cannot create {local_path}"))?;

        let sshfs = format!(
            "sshfs -f -o reconnect,StrictHostKeyChecking=no,ServerAliveInterval=15,ServerAliveCountMax=3 {hostname}:/var/www {local_path}"
        );
        let unit = unit_name(hostname);
        debug!(unit, "creating sshfs unit");
        self.checked(
            "sudo",
            &["-E", "zsc", "unit", "create", &unit, &sshfs],
            MOUNT_CREATE_TIMEOUT,
        )
        .await
        .context("zsc unit create")
    }

    /// FUSE is released before the unit is removed, so a failure never
    /// leaves a live mount without its unit. A busy mount falls back to a
    /// lazy unmount.
    async fn unmount(&self, hostname: &str, path: &str) -> Result<()> {
        validate_mount_hostname(hostname)?;
        if let Err(e) = self
            .checked("fusermount", &["-u", path], UNMOUNT_TIMEOUT)
            .await
        {
            warn!(path, error = %e, "unmount failed, retrying lazily");
            self.checked("fusermount", &["-uz", path], UNMOUNT_TIMEOUT)
                .await
                .with_context(|| format!("fusermount: {e}"))?;
        }
        let unit = unit_name(hostname);
        self.checked("sudo", &["-E", "zsc", "unit", "remove", &unit], UNMOUNT_TIMEOUT)
            .await
            .context("zsc unit remove")
    }

    async fn is_writable(&self, path: &str) -> Result<bool> {
        let marker = Path::new(path).join(WRITE_CHECK_FILE);
        let marker = marker.to_string_lossy();
        self.checked("touch", &[&marker], MOUNT_CHECK_TIMEOUT)
            .await
            .context("writable check")?;
        if let Err(e) = self.checked("rm", &["-f", &marker], MOUNT_CHECK_TIMEOUT).await {
            debug!(path = %marker, error = %e, "write check file left behind");
        }
        Ok(true)
    }
}

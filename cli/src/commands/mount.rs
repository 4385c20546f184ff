//! `zcp mount`, `zcp unmount` and `zcp mounts`.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::Mounter;
use crate::application::services::mount;
use crate::domain::mount::MountResult;
use crate::output::progress;

#[derive(Args)]
pub struct MountArgs {
    /// Service hostname
    pub hostname: String,
}

#[derive(Args)]
pub struct MountsArgs {
    /// Service hostnames to inspect
    #[arg(required = true)]
    pub hostnames: Vec<String>,
}

/// # Errors
///
/// `SERVICE_REQUIRED`, `INVALID_HOSTNAME` or `MOUNT_FAILED`.
pub async fn mount(app: &AppContext, mounter: &impl Mounter, args: &MountArgs) -> Result<ExitCode> {
    let label = format!("Mounting {}", args.hostname);
    with_spinner(app, &label, mount::mount_hostname(mounter, &args.hostname)).await
}

/// # Errors
///
/// `SERVICE_REQUIRED`, `INVALID_HOSTNAME` or `UNMOUNT_FAILED`.
pub async fn unmount(
    app: &AppContext,
    mounter: &impl Mounter,
    args: &MountArgs,
) -> Result<ExitCode> {
    let label = format!("Unmounting {}", args.hostname);
    with_spinner(app, &label, mount::unmount_hostname(mounter, &args.hostname)).await
}

/// Shows a spinner on a terminal while `work` runs. The finished spinner
/// line replaces the human rendering; JSON is always rendered.
async fn with_spinner(
    app: &AppContext,
    label: &str,
    work: impl Future<Output = Result<MountResult>>,
) -> Result<ExitCode> {
    let spinner = app.output.show_progress().then(|| progress::spinner(label));
    let result = work.await;
    if let Some(pb) = &spinner {
        match &result {
            Ok(r) => progress::finish(pb, Ok(&r.message)),
            Err(e) => progress::finish(pb, Err(&e.to_string())),
        }
    }
    let result = result?;
    if spinner.is_none() || app.is_json() {
        app.renderer().render_mount(&result)?;
    }
    Ok(ExitCode::SUCCESS)
}

/// # Errors
///
/// JSON rendering failure only; per-service check errors show as not
/// mounted.
pub async fn status(
    app: &AppContext,
    mounter: &impl Mounter,
    args: &MountsArgs,
) -> Result<ExitCode> {
    let status = mount::mount_infos(mounter, &args.hostnames).await;
    app.renderer().render_mount_status(&status)?;
    Ok(ExitCode::SUCCESS)
}

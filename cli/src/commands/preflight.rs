//! `zcp preflight`: checks the local `zerops.yml` before a deploy.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::deploy::preflight_zerops_yml;

#[derive(Args)]
pub struct PreflightArgs {
    /// Hostname of the service that will be deployed
    pub hostname: String,

    /// Directory holding zerops.yml
    #[arg(long, default_value = ".")]
    pub working_dir: PathBuf,
}

/// Warnings never fail the command; the deploy decides.
///
/// # Errors
///
/// JSON rendering failure only.
pub fn run(app: &AppContext, args: &PreflightArgs) -> Result<ExitCode> {
    let warnings = preflight_zerops_yml(&app.fs, &args.working_dir, &args.hostname);
    app.renderer().render_preflight(&args.hostname, &warnings)?;
    Ok(ExitCode::SUCCESS)
}

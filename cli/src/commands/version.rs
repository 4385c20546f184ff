//! Version command

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;

/// # Errors
///
/// JSON rendering failure only.
pub fn run(app: &AppContext) -> Result<ExitCode> {
    app.renderer().render_version(env!("CARGO_PKG_VERSION"))?;
    Ok(ExitCode::SUCCESS)
}

//! `zcp context`: prints the platform primer.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::domain::context::compose_context;

/// Without a platform connection the live catalog section is left out.
///
/// # Errors
///
/// JSON rendering failure only.
pub fn run(app: &AppContext) -> Result<ExitCode> {
    app.renderer().render_context(&compose_context(None))?;
    Ok(ExitCode::SUCCESS)
}

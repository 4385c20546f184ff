//! `zcp validate`: offline check of a `zerops.yml` or `import.yml`.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::validate;
use crate::domain::error::{ErrorCode, ZcpError};
use crate::domain::validate::FileType;

#[derive(Args)]
pub struct ValidateArgs {
    /// Path to the file to validate
    #[arg(conflicts_with = "content")]
    pub file: Option<String>,

    /// Inline YAML instead of a file
    #[arg(long)]
    pub content: Option<String>,

    /// Force the file type (zerops.yml or import.yml) instead of detecting it
    #[arg(long = "type", value_name = "TYPE")]
    pub file_type: Option<String>,
}

/// Exits non-zero when the file has errors.
///
/// # Errors
///
/// Input errors (`INVALID_USAGE`, `FILE_NOT_FOUND`), an unknown `--type`,
/// or a YAML syntax error.
pub fn run(app: &AppContext, args: &ValidateArgs) -> Result<ExitCode> {
    let file_type = args
        .file_type
        .as_deref()
        .map(|raw| {
            FileType::parse(raw).ok_or_else(|| {
                ZcpError::new(
                    ErrorCode::InvalidParameter,
                    format!("Unknown file type: {raw}"),
                    "Use zerops.yml or import.yml",
                )
            })
        })
        .transpose()?;

    let result = validate::validate(
        &app.fs,
        args.content.as_deref(),
        args.file.as_deref(),
        file_type,
    )?;
    app.renderer().render_validate(&result)?;
    Ok(if result.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

//! Application service: reading manifests and validating them offline.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::LocalFs;
use crate::domain::error::{ErrorCode, ZcpError};
use crate::domain::validate::{FileType, ValidateResult, validate_content};

const INPUT_SUGGESTION: &str = "Use content for inline YAML or filePath for a file";

/// Manifest text from exactly one of inline `content` or `file_path`.
///
/// # Errors
///
/// `INVALID_USAGE` unless exactly one source is given, `FILE_NOT_FOUND`
/// when the file is missing or unreadable.
pub fn resolve_input(fs: &impl LocalFs, content: Option<&str>, file_path: Option<&str>) -> Result<String> {
    let content = content.filter(|c| !c.is_empty());
    let file_path = file_path.filter(|p| !p.is_empty());
    match (content, file_path) {
        (Some(_), Some(_)) => Err(ZcpError::new(
            ErrorCode::InvalidUsage,
            "provide either content or filePath, not both",
            INPUT_SUGGESTION,
        )
        .into()),
        (None, None) => Err(ZcpError::new(
            ErrorCode::InvalidUsage,
            "provide either content or filePath",
            INPUT_SUGGESTION,
        )
        .into()),
        (Some(content), None) => Ok(content.to_string()),
        (None, Some(path)) => read_manifest(fs, path),
    }
}

fn read_manifest(fs: &impl LocalFs, path: &str) -> Result<String> {
    let p = Path::new(path);
    if !fs.exists(p) {
        return Err(ZcpError::new(
            ErrorCode::FileNotFound,
            format!("file not found: {path}"),
            "Check the file path",
        )
        .into());
    }
    fs.read_to_string(p).map_err(|e| {
        ZcpError::new(
            ErrorCode::FileNotFound,
            format!("read file: {e}"),
            "Check file permissions",
        )
        .into()
    })
}

/// Validates a `zerops.yml` or `import.yml` given inline or by path.
///
/// # Errors
///
/// Input errors from [`resolve_input`], plus the syntax and
/// `IMPORT_HAS_PROJECT` errors of [`validate_content`].
pub fn validate(
    fs: &impl LocalFs,
    content: Option<&str>,
    file_path: Option<&str>,
    file_type: Option<FileType>,
) -> Result<ValidateResult> {
    let source = resolve_input(fs, content, file_path)?;
    let file = file_path.unwrap_or_default();
    Ok(validate_content(&source, file, file_type)?)
}

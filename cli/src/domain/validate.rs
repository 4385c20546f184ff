//! Offline structural validation of `zerops.yml` and `import.yml`.
//!
//! Pure functions over file content. Reading files and enforcing the
//! content/file-path exclusivity happen in the application layer.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::ImportService;
use crate::domain::error::{ErrorCode, ZcpError};

// ── Types ─────────────────────────────────────────────────────────────────────

/// Which schema a document is validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    #[serde(rename = "zerops.yml")]
    Zerops,
    #[serde(rename = "import.yml")]
    Import,
}

impl FileType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Zerops => "zerops.yml",
            Self::Import => "import.yml",
        }
    }

    /// Accepts `zerops.yml`/`import.yml` and their short forms.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "zerops.yml" | "zerops.yaml" | "zerops" => Some(Self::Zerops),
            "import.yml" | "import.yaml" | "import" => Some(Self::Import),
            _ => None,
        }
    }

    fn syntax_error_code(self) -> ErrorCode {
        match self {
            Self::Zerops => ErrorCode::InvalidZeropsYml,
            Self::Import => ErrorCode::InvalidImportYml,
        }
    }
}

/// A single structural problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub path: String,
    pub error: String,
    pub fix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateResult {
    pub valid: bool,
    pub file: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationIssue>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub info: Vec<String>,
}

impl ValidateResult {
    fn push_error(&mut self, path: &str, error: &str, fix: &str) {
        self.valid = false;
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            error: error.to_string(),
            fix: fix.to_string(),
        });
    }
}

// ── Detection ─────────────────────────────────────────────────────────────────

/// Picks the schema: a file name mentioning `import` wins, then the
/// top-level keys, then `zerops.yml`.
#[must_use]
pub fn detect_type(file_path: &str, content: &str) -> FileType {
    if file_path.to_ascii_lowercase().contains("import") {
        return FileType::Import;
    }
    match serde_yaml::from_str::<serde_yaml::Mapping>(content) {
        Ok(map) if map.contains_key("services") => FileType::Import,
        _ => FileType::Zerops,
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

/// Validates `content` against `explicit` or the detected schema.
///
/// `file` is echoed in the result (empty for inline content).
///
/// # Errors
///
/// Returns `INVALID_ZEROPS_YML`/`INVALID_IMPORT_YML` on YAML syntax errors and
/// `IMPORT_HAS_PROJECT` when an import manifest declares a project.
pub fn validate_content(
    content: &str,
    file: &str,
    explicit: Option<FileType>,
) -> Result<ValidateResult, ZcpError> {
    let file_type = explicit.unwrap_or_else(|| detect_type(file, content));

    let value: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| {
        ZcpError::new(
            file_type.syntax_error_code(),
            format!("Invalid YAML syntax: {e}"),
            "Fix the YAML syntax",
        )
    })?;
    // Empty documents parse as null; treat them as an empty mapping.
    let root = match value {
        serde_yaml::Value::Mapping(map) => map,
        _ => serde_yaml::Mapping::new(),
    };

    let mut result = ValidateResult {
        valid: true,
        file: file.to_string(),
        file_type,
        errors: Vec::new(),
        warnings: Vec::new(),
        info: Vec::new(),
    };

    match file_type {
        FileType::Import => validate_import(&root, &mut result)?,
        FileType::Zerops => validate_zerops(&root, &mut result),
    }
    Ok(result)
}

fn validate_import(root: &serde_yaml::Mapping, result: &mut ValidateResult) -> Result<(), ZcpError> {
    if root.contains_key("project") {
        return Err(import_has_project());
    }
    match root.get("services") {
        None => result.push_error(
            "services",
            "import.yml must contain a services: key",
            "Add a services: array with at least one service definition",
        ),
        Some(serde_yaml::Value::Sequence(items)) => {
            result.info.push(format!("{} service(s) defined", items.len()));
        }
        Some(_) => {}
    }
    Ok(())
}

fn validate_zerops(root: &serde_yaml::Mapping, result: &mut ValidateResult) {
    match root.get("zerops") {
        None => result.push_error(
            "zerops",
            "zerops.yml must contain a zerops: key",
            "Add a zerops: array with service configurations",
        ),
        Some(serde_yaml::Value::Sequence(items)) if items.is_empty() => result.push_error(
            "zerops",
            "zerops: array must not be empty",
            "Add at least one service configuration",
        ),
        Some(serde_yaml::Value::Sequence(items)) => {
            let setups: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("setup").and_then(serde_yaml::Value::as_str))
                .collect();
            if !setups.is_empty() {
                result.info.push(format!("setups: {}", setups.join(", ")));
            }
        }
        Some(_) => result.push_error(
            "zerops",
            "zerops: must be an array",
            "Use zerops: followed by array items (- setup: ...)",
        ),
    }
}

/// The error raised for import manifests carrying a `project:` section.
#[must_use]
pub fn import_has_project() -> ZcpError {
    ZcpError::new(
        ErrorCode::ImportHasProject,
        "import.yml must not contain a project: section",
        "Remove the project: section; projects are managed separately",
    )
}

// ── Import manifests ──────────────────────────────────────────────────────────

/// Parses an import manifest into its service entries.
///
/// # Errors
///
/// `INVALID_IMPORT_YML` for bad YAML or a missing `services:` list and
/// `IMPORT_HAS_PROJECT` when a project section is present.
pub fn parse_import_manifest(content: &str) -> Result<Vec<ImportService>, ZcpError> {
    let root: serde_yaml::Mapping = serde_yaml::from_str(content).map_err(|e| {
        ZcpError::new(
            ErrorCode::InvalidImportYml,
            format!("invalid YAML: {e}"),
            "Check YAML syntax",
        )
    })?;
    if root.contains_key("project") {
        return Err(import_has_project());
    }
    let Some(serde_yaml::Value::Sequence(items)) = root.get("services") else {
        return Err(ZcpError::new(
            ErrorCode::InvalidImportYml,
            "import.yml must contain a services: array",
            "Add a services: array with at least one service definition",
        ));
    };
    let text = |item: &serde_yaml::Value, key: &str| {
        item.get(key)
            .and_then(serde_yaml::Value::as_str)
            .map(str::to_string)
    };
    Ok(items
        .iter()
        .map(|item| ImportService {
            hostname: text(item, "hostname").unwrap_or_default(),
            type_name: text(item, "type").unwrap_or_default(),
            mode: text(item, "mode"),
        })
        .collect())
}

// ── Pre-deploy checks ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct ZeropsDoc {
    #[serde(default)]
    zerops: Vec<ZeropsEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct ZeropsEntry {
    #[serde(default)]
    setup: String,
    #[serde(default)]
    build: ZeropsBuild,
    #[serde(default)]
    run: ZeropsRun,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZeropsBuild {
    #[serde(default)]
    deploy_files: DeployFiles,
}

/// `deployFiles` may be a single path or a list of paths.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DeployFiles {
    One(String),
    Many(Vec<String>),
}

impl Default for DeployFiles {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl DeployFiles {
    fn paths(&self) -> Vec<&str> {
        match self {
            Self::One(p) => vec![p.as_str()],
            Self::Many(ps) => ps.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ZeropsRun {
    #[serde(default)]
    start: String,
    #[serde(default)]
    ports: Vec<serde_yaml::Value>,
}

/// Warnings for the `setup` entry matching `hostname`, checked before a deploy.
///
/// `location` names the file in the messages. Returns an empty list when
/// nothing looks wrong.
#[must_use]
pub fn deploy_warnings(content: &str, location: &str, hostname: &str) -> Vec<String> {
    let doc: ZeropsDoc = match serde_yaml::from_str(content) {
        Ok(doc) => doc,
        Err(e) => return vec![format!("zerops.yml invalid YAML: {e}")],
    };
    if doc.zerops.is_empty() {
        return vec!["zerops.yml has no setup entries under 'zerops:' key".to_string()];
    }
    let Some(entry) = doc.zerops.iter().find(|e| e.setup == hostname) else {
        return vec![format!(
            "no setup entry for hostname \"{hostname}\" in {location}"
        )];
    };

    let mut warnings = Vec::new();
    if entry.run.start.trim().is_empty() {
        warnings.push("run.start is empty: app will not start after deploy".to_string());
    }
    if entry.run.ports.is_empty() {
        warnings.push("run.ports is empty: no ports exposed, HTTP checks will fail".to_string());
    }
    let deploy_files = entry.build.deploy_files.paths();
    if deploy_files.is_empty() {
        warnings.push(
            "build.deployFiles is empty: nothing will be deployed to run container".to_string(),
        );
    } else if hostname.contains("dev") && !deploy_files.contains(&".") {
        warnings.push(
            "dev service should use deployFiles: [.] so source files persist across deploys for continued iteration"
                .to_string(),
        );
    }
    warnings
}

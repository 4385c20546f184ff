//! Output formatting module

pub mod human;
pub mod json;
pub mod progress;
pub mod styles;

use std::path::Path;

use anyhow::Result;
use console::Term;
use owo_colors::OwoColorize as _;
pub use human::HumanRenderer;
pub use json::JsonRenderer;
pub use styles::Styles;

use crate::application::services::mount::MountStatusResult;
use crate::domain::config::ZcpConfig;
use crate::domain::mount::MountResult;
use crate::domain::validate::ValidateResult;

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();

        Self {
            styles: Styles::new(use_colors),
            is_tty,
            quiet,
        }
    }

    /// Check if progress indicators should be shown.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.is_tty && !self.quiet
    }

    /// Print a success message prefixed with `✓`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.ok));
        }
    }

    /// Print a warning message prefixed with `⚠`. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// Print an error message prefixed with `✗` to stderr. Never suppressed.
    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", "✗".style(self.styles.error));
    }

    /// Print an info message prefixed with `ℹ`. Suppressed when `quiet`.
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "ℹ".style(self.styles.info));
        }
    }
}

/// Renders command results in the active output mode.
pub enum Renderer<'a> {
    Human(HumanRenderer<'a>),
    Json(JsonRenderer),
}

impl Renderer<'_> {
    /// # Errors
    ///
    /// JSON serialization failure.
    pub fn render_validate(&self, result: &ValidateResult) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_validate(result);
                Ok(())
            }
            Self::Json(_) => JsonRenderer::render(result),
        }
    }

    /// # Errors
    ///
    /// JSON serialization failure.
    pub fn render_preflight(&self, hostname: &str, warnings: &[String]) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_preflight(hostname, warnings);
                Ok(())
            }
            Self::Json(_) => JsonRenderer::render(&serde_json::json!({
                "hostname": hostname,
                "warnings": warnings,
            })),
        }
    }

    /// # Errors
    ///
    /// JSON serialization failure.
    pub fn render_context(&self, text: &str) -> Result<()> {
        match self {
            Self::Human(_) => {
                println!("{text}");
                Ok(())
            }
            Self::Json(_) => JsonRenderer::render(&serde_json::json!({ "context": text })),
        }
    }

    /// `loaded` is the session's knowledge summary, reported in JSON only.
    ///
    /// # Errors
    ///
    /// JSON serialization failure.
    pub fn render_knowledge(&self, text: &str, loaded: &str) -> Result<()> {
        match self {
            Self::Human(_) => {
                println!("{text}");
                Ok(())
            }
            Self::Json(_) => JsonRenderer::render(&serde_json::json!({
                "knowledge": text,
                "loaded": loaded,
            })),
        }
    }

    /// # Errors
    ///
    /// JSON serialization failure.
    pub fn render_mount(&self, result: &MountResult) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_mount(result);
                Ok(())
            }
            Self::Json(_) => JsonRenderer::render(result),
        }
    }

    /// # Errors
    ///
    /// JSON serialization failure.
    pub fn render_mount_status(&self, status: &MountStatusResult) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_mount_status(status);
                Ok(())
            }
            Self::Json(_) => JsonRenderer::render(status),
        }
    }

    /// # Errors
    ///
    /// JSON serialization failure.
    pub fn render_config(&self, config: &ZcpConfig, path: &Path) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_config(config, path);
                Ok(())
            }
            Self::Json(_) => JsonRenderer::render(config),
        }
    }

    /// # Errors
    ///
    /// JSON serialization failure.
    pub fn render_config_path(&self, path: &Path) -> Result<()> {
        match self {
            Self::Human(_) => {
                println!("{}", path.display());
                Ok(())
            }
            Self::Json(_) => {
                JsonRenderer::render(&serde_json::json!({ "path": path.display().to_string() }))
            }
        }
    }

    /// # Errors
    ///
    /// JSON serialization failure.
    pub fn render_version(&self, version: &str) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_version(version);
                Ok(())
            }
            Self::Json(_) => JsonRenderer::render(&serde_json::json!({ "version": version })),
        }
    }
}

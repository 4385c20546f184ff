//! Human-readable terminal renderer.

use std::path::Path;

use owo_colors::OwoColorize as _;

use crate::application::services::mount::MountStatusResult;
use crate::domain::config::{VALID_CONFIG_KEYS, ZcpConfig};
use crate::domain::mount::{MountResult, MountStatus};
use crate::domain::validate::ValidateResult;
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("zcp {version}");
    }

    /// Validation outcome: errors with their fixes, then warnings and info.
    pub fn render_validate(&self, result: &ValidateResult) {
        let label = if result.file.is_empty() {
            result.file_type.as_str().to_string()
        } else {
            format!("{} ({})", result.file, result.file_type.as_str())
        };
        if result.valid {
            self.ctx.success(&format!("{label} is valid"));
        } else {
            self.ctx.error(&format!("{label} is invalid"));
        }
        for issue in &result.errors {
            eprintln!(
                "    {} {}",
                format!("{}:", issue.path).style(self.ctx.styles.emphasis),
                issue.error
            );
            if !issue.fix.is_empty() {
                eprintln!("      {}", issue.fix.style(self.ctx.styles.muted));
            }
        }
        for warning in &result.warnings {
            self.ctx.warn(warning);
        }
        for info in &result.info {
            self.ctx.info(info);
        }
    }

    pub fn render_preflight(&self, hostname: &str, warnings: &[String]) {
        if warnings.is_empty() {
            self.ctx
                .success(&format!("zerops.yml is ready to deploy {hostname}"));
            return;
        }
        for warning in warnings {
            self.ctx.warn(warning);
        }
    }

    pub fn render_mount(&self, result: &MountResult) {
        match result.status {
            MountStatus::Mounted | MountStatus::AlreadyMounted | MountStatus::Unmounted => {
                self.ctx.success(&result.message);
            }
            MountStatus::NotMounted => self.ctx.info(&result.message),
        }
        if matches!(result.status, MountStatus::Mounted | MountStatus::AlreadyMounted)
            && !result.writable
        {
            self.ctx.warn("Mount is not writable");
        }
    }

    pub fn render_mount_status(&self, status: &MountStatusResult) {
        if status.mounts.is_empty() {
            self.ctx.info("No services given");
            return;
        }
        for m in &status.mounts {
            let state = match (m.mounted, m.writable) {
                (true, true) => "mounted".style(self.ctx.styles.ok).to_string(),
                (true, false) => "mounted (read-only)"
                    .style(self.ctx.styles.warning)
                    .to_string(),
                (false, _) => "not mounted".style(self.ctx.styles.muted).to_string(),
            };
            println!("  {:<16} {:<24} {state}", m.hostname, m.mount_path);
        }
    }

    /// Every setting with its effective value, then the environment that
    /// affects the CLI.
    pub fn render_config(&self, config: &ZcpConfig, path: &Path) {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.title)
        );
        println!();
        for key in VALID_CONFIG_KEYS {
            let value = config.get(key).unwrap_or_default();
            let value = if value.is_empty() { "(not set)".to_string() } else { value };
            println!("  {:<30} {value}", format!("{key}:"));
        }
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.emphasis));
        for var in ["ZCP_CONFIG", "RUST_LOG", "NO_COLOR"] {
            let shown = std::env::var(var).unwrap_or_else(|_| "(not set)".to_string());
            println!("    {:<18} {shown}", format!("{var}:"));
        }
    }
}

//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, OutputFlags};
use crate::commands;
use crate::infra::mounter::SshfsMounter;

/// Operations helper for Zerops projects
#[derive(Parser)]
#[command(
    name = "zcp",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a zerops.yml or import.yml
    Validate(commands::validate::ValidateArgs),

    /// Check zerops.yml before deploying a service
    Preflight(commands::preflight::PreflightArgs),

    /// Print the platform primer
    Context,

    /// Print the platform reference or a stack briefing
    Knowledge(commands::knowledge::KnowledgeArgs),

    /// Mount a service filesystem under /var/www
    Mount(commands::mount::MountArgs),

    /// Unmount a service filesystem
    Unmount(commands::mount::MountArgs),

    /// Show mount state of services
    Mounts(commands::mount::MountsArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Output flags, also needed to render a failure after `run` consumed
    /// the parsed arguments.
    #[must_use]
    pub fn output_flags(&self) -> OutputFlags {
        OutputFlags {
            no_color: self.no_color,
            quiet: self.quiet,
            json: self.json,
        }
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns the failing operation's error; `ZcpError` carries its code
    /// and suggestion through.
    pub async fn run(self) -> Result<ExitCode> {
        let app = AppContext::new(&self.output_flags());
        match self.command {
            Command::Validate(args) => commands::validate::run(&app, &args),
            Command::Preflight(args) => commands::preflight::run(&app, &args),
            Command::Context => commands::context::run(&app),
            Command::Knowledge(args) => commands::knowledge::run(&app, &args),
            Command::Mount(args) => {
                commands::mount::mount(&app, &SshfsMounter::system(), &args).await
            }
            Command::Unmount(args) => {
                commands::mount::unmount(&app, &SshfsMounter::system(), &args).await
            }
            Command::Mounts(args) => {
                commands::mount::status(&app, &SshfsMounter::system(), &args).await
            }
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => commands::version::run(&app),
        }
    }
}

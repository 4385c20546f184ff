//! `zcp config`: show and set configuration values.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::config_service;

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Set configuration value
    Set {
        /// Configuration key, e.g. poll.build.timeout
        key: String,
        /// Configuration value
        value: String,
    },
    /// Print the configuration file location
    Path,
}

/// Run the config command.
///
/// # Errors
///
/// Unknown keys, invalid values, or config file I/O failures.
pub fn run(app: &AppContext, cmd: ConfigCommand) -> Result<ExitCode> {
    match cmd {
        ConfigCommand::Show => {
            let config = config_service::load_config(&app.config_store)?;
            app.renderer()
                .render_config(&config, &app.config_store.path()?)?;
        }
        ConfigCommand::Set { key, value } => {
            let config = config_service::set_config_value(&app.config_store, &key, &value)?;
            if app.is_json() {
                app.renderer()
                    .render_config(&config, &app.config_store.path()?)?;
            } else {
                app.output.success(&format!("Set {key} = {value}"));
            }
        }
        ConfigCommand::Path => app.renderer().render_config_path(&app.config_store.path()?)?,
    }
    Ok(ExitCode::SUCCESS)
}

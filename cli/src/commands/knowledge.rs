//! `zcp knowledge`: the platform reference or a stack briefing.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::knowledge::{KnowledgeRequest, knowledge_offline};
use crate::application::services::session::Session;

#[derive(Args)]
pub struct KnowledgeArgs {
    /// Runtime type for a briefing (e.g. nodejs@22)
    #[arg(long)]
    pub runtime: Option<String>,

    /// Managed service types for a briefing, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub services: Vec<String>,

    /// Platform reference scope; only "infrastructure"
    #[arg(long)]
    pub scope: Option<String>,
}

/// Offline, so briefings carry no version check.
///
/// # Errors
///
/// `INVALID_PARAMETER` for no mode, both modes or an unknown scope; a
/// config file that cannot be parsed.
pub fn run(app: &AppContext, args: &KnowledgeArgs) -> Result<ExitCode> {
    let session = Session::load(&app.config_store)?;
    let text = knowledge_offline(
        &KnowledgeRequest {
            runtime: args.runtime.as_deref().unwrap_or_default(),
            services: &args.services,
            scope: args.scope.as_deref().unwrap_or_default(),
        },
        session.knowledge(),
    )?;
    app.renderer()
        .render_knowledge(&text, &session.knowledge().summary())?;
    Ok(ExitCode::SUCCESS)
}

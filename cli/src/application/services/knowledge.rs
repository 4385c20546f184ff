//! Application service: knowledge loading, recorded in the session tracker.

use anyhow::Result;
use zcp_common::ServiceStackType;

use crate::application::ports::PlatformClient;
use crate::application::services::catalog_cache::CatalogCache;
use crate::application::services::knowledge_tracker::KnowledgeTracker;
use crate::domain::knowledge::{
    KnowledgeMode, compose_briefing, infrastructure_reference, knowledge_mode,
};

/// Raw request fields. Exactly one of briefing (`runtime` and/or
/// `services`) or `scope` must be set.
#[derive(Debug, Clone, Copy, Default)]
pub struct KnowledgeRequest<'a> {
    pub runtime: &'a str,
    pub services: &'a [String],
    pub scope: &'a str,
}

impl<'a> KnowledgeRequest<'a> {
    fn mode(&self) -> Result<KnowledgeMode<'a>> {
        Ok(knowledge_mode(self.runtime, self.services, self.scope)?)
    }
}

fn answer(mode: KnowledgeMode<'_>, types: &[ServiceStackType], tracker: &KnowledgeTracker) -> String {
    match mode {
        KnowledgeMode::Scope => {
            tracker.record_scope();
            infrastructure_reference()
        }
        KnowledgeMode::Briefing { runtime, services } => {
            let briefing = compose_briefing(runtime, services, types);
            tracker.record_briefing(runtime, services);
            briefing
        }
    }
}

/// Scope reference or stack briefing. Briefings are checked against the
/// cached catalog, fetched only after the request is known to be valid.
///
/// # Errors
///
/// `INVALID_PARAMETER` for a request with no mode, both modes, or an
/// unknown scope. Nothing is recorded in that case.
pub async fn knowledge(
    client: &impl PlatformClient,
    cache: &CatalogCache,
    request: &KnowledgeRequest<'_>,
    tracker: &KnowledgeTracker,
) -> Result<String> {
    let mode = request.mode()?;
    let types = match mode {
        KnowledgeMode::Briefing { .. } => cache.get(client).await,
        KnowledgeMode::Scope => Default::default(),
    };
    Ok(answer(mode, &types, tracker))
}

/// [`knowledge`] without a platform connection: briefings carry no version
/// check.
///
/// # Errors
///
/// Same validation errors as [`knowledge`].
pub fn knowledge_offline(request: &KnowledgeRequest<'_>, tracker: &KnowledgeTracker) -> Result<String> {
    Ok(answer(request.mode()?, &[], tracker))
}

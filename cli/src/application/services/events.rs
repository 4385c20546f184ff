//! Application service: project activity timeline.

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::application::ports::PlatformClient;
use crate::domain::error::Canceled;
use crate::domain::timeline::{DEFAULT_EVENTS_LIMIT, EventsResult, build_timeline};

/// Merged timeline of processes and app versions, newest first.
///
/// The three fetches run concurrently. All of them complete before any
/// error is reported; the first error in fetch order wins and no partial
/// timeline is returned. Cancellation drops the in-flight fetches.
///
/// # Errors
///
/// The first failed fetch, or [`Canceled`].
pub async fn events(
    client: &impl PlatformClient,
    project_id: &str,
    service_hostname: &str,
    limit: usize,
    cancel: &CancellationToken,
) -> Result<EventsResult> {
    let limit = if limit == 0 { DEFAULT_EVENTS_LIMIT } else { limit };

    let fetched = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(Canceled.into()),
        fetched = async {
            tokio::join!(
                client.search_processes(project_id, limit),
                client.search_app_versions(project_id, limit),
                client.list_services(project_id),
            )
        } => fetched,
    };

    let (processes, app_versions, services) = fetched;
    let processes = processes?;
    let app_versions = app_versions?;
    let services = services?;
    debug!(
        processes = processes.len(),
        app_versions = app_versions.len(),
        "merging timeline"
    );

    Ok(build_timeline(
        project_id,
        &processes,
        &app_versions,
        &services,
        service_hostname,
        limit,
    ))
}

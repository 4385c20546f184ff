//! Project activity timeline.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use zcp_cli::application::services::events::events;
use zcp_cli::domain::error::{Canceled, is_canceled};
use zcp_cli::domain::timeline::EventType;
use zcp_common::{ProcessStatus, ServiceStackRef};

use crate::mocks::{FakePlatform, app_version, process, service};

fn platform() -> FakePlatform {
    let mut client = FakePlatform::with_services(vec![
        service("api", "s1", "nodejs@22", "ACTIVE"),
        service("db", "s2", "postgresql@16", "ACTIVE"),
    ]);

    let mut restart = process("p1", ProcessStatus::Finished);
    restart.action_name = "serviceStackRestart".to_string();
    restart.created = "2025-01-01T10:00:00Z".to_string();
    restart.service_stacks = vec![ServiceStackRef {
        id: "s2".to_string(),
        name: "db".to_string(),
    }];

    let mut build = app_version("av1", "s1", 1, "ACTIVE");
    build.created = "2025-01-01T11:00:00Z".to_string();

    client.processes = vec![restart];
    client.app_versions = vec![build];
    client
}

#[tokio::test]
async fn test_events_merges_sources_newest_first() {
    let client = platform();

    let result = events(&client, "proj-1", "", 0, &CancellationToken::new())
        .await
        .expect("events");

    assert_eq!(result.project_id, "proj-1");
    assert_eq!(result.events.len(), 2);
    assert_eq!(result.events[0].service, "api");
    assert_ne!(result.events[0].event_type, EventType::Process);
    assert_eq!(result.events[1].action, "restart");
    assert_eq!(result.events[1].service, "db");
    assert_eq!(result.summary.total, 2);
    assert_eq!(result.summary.processes, 1);
    assert_eq!(result.summary.deploys, 1);
}

#[tokio::test]
async fn test_events_default_limit_is_forwarded_to_searches() {
    let client = platform();

    events(&client, "proj-1", "", 0, &CancellationToken::new())
        .await
        .expect("events");

    assert_eq!(client.count("search_processes proj-1 50"), 1);
    assert_eq!(client.count("search_app_versions proj-1 50"), 1);
}

#[tokio::test]
async fn test_events_filters_by_hostname() {
    let client = platform();

    let result = events(&client, "proj-1", "db", 10, &CancellationToken::new())
        .await
        .expect("events");

    assert_eq!(result.events.len(), 1);
    assert_eq!(result.events[0].process_id, "p1");
}

#[tokio::test]
async fn test_events_first_error_in_fetch_order_wins() {
    let client = platform()
        .failing("search_app_versions", "FORBIDDEN", "app versions denied")
        .failing("list_services", "UNAVAILABLE", "services down");

    let err = events(&client, "proj-1", "", 10, &CancellationToken::new())
        .await
        .expect_err("error");

    assert_eq!(err.to_string(), "app versions denied");
    // Every fetch still ran to completion.
    assert_eq!(client.count("list_services"), 1);
    assert_eq!(client.count("search_processes"), 1);
}

#[tokio::test]
async fn test_events_canceled_before_start() {
    let client = platform();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = events(&client, "proj-1", "", 10, &cancel)
        .await
        .expect_err("canceled");

    assert!(err.downcast_ref::<Canceled>().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_events_fetches_run_concurrently() {
    let mut client = platform();
    client.fetch_delay = Some(Duration::from_secs(5));
    let started = Instant::now();

    let result = events(&client, "proj-1", "", 10, &CancellationToken::new())
        .await
        .expect("events");

    let elapsed = started.elapsed();
    assert_eq!(result.events.len(), 2);
    assert!(elapsed >= Duration::from_secs(5), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(10), "fetches ran in sequence: {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_events_cancel_while_fetching_returns_canceled() {
    let mut client = platform();
    client.fetch_delay = Some(Duration::from_secs(30));
    let cancel = CancellationToken::new();
    let started = Instant::now();

    let (result, ()) = tokio::join!(
        events(&client, "proj-1", "", 10, &cancel),
        async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            cancel.cancel();
        },
    );

    let err = result.expect_err("canceled");
    assert!(is_canceled(&err));
    assert!(started.elapsed() < Duration::from_secs(30));
    // The fetches were dropped before they could record a call.
    assert_eq!(client.count("search_processes"), 0);
}

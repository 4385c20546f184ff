//! Process and build polling with back-off.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use zcp_cli::application::services::poll::{Backoff, poll_build, poll_process};
use zcp_cli::domain::error::{Canceled, ErrorCode, error_code};
use zcp_common::ProcessStatus;

use crate::mocks::{FakePlatform, RecordingProgress, app_version, process};

fn with_process_rounds(statuses: &[ProcessStatus]) -> FakePlatform {
    let client = FakePlatform::default();
    *client.process_rounds.lock().expect("lock") =
        statuses.iter().map(|s| process("p1", *s)).collect();
    client
}

#[tokio::test(start_paused = true)]
async fn test_poll_process_returns_terminal_process() {
    let client = with_process_rounds(&[
        ProcessStatus::Pending,
        ProcessStatus::Running,
        ProcessStatus::Finished,
    ]);

    let done = poll_process(&client, "p1", Backoff::PROCESS, &CancellationToken::new(), None)
        .await
        .expect("poll");

    assert_eq!(done.status, ProcessStatus::Finished);
    assert_eq!(client.count("get_process"), 3);
}

#[tokio::test(start_paused = true)]
async fn test_poll_process_failed_status_is_a_result_not_an_error() {
    let client = with_process_rounds(&[ProcessStatus::Running, ProcessStatus::Failed]);

    let done = poll_process(&client, "p1", Backoff::PROCESS, &CancellationToken::new(), None)
        .await
        .expect("poll");

    assert_eq!(done.status, ProcessStatus::Failed);
}

#[tokio::test(start_paused = true)]
async fn test_poll_process_steps_up_interval_after_threshold() {
    let client = with_process_rounds(&[ProcessStatus::Running]);
    let backoff = Backoff {
        initial_interval: Duration::from_secs(1),
        step_up_interval: Duration::from_secs(10),
        step_up_after: Duration::from_secs(5),
        timeout: Duration::from_secs(40),
    };

    let start = tokio::time::Instant::now();
    let err = poll_process(&client, "p1", backoff, &CancellationToken::new(), None)
        .await
        .expect_err("never terminal");

    assert_eq!(error_code(&err), Some(ErrorCode::ApiTimeout));
    // Polls at t=0..=6 one second apart, then t=16, 26, 36 and 46 (past the timeout).
    assert_eq!(client.count("get_process"), 11);
    assert!(start.elapsed() >= backoff.timeout);
}

#[tokio::test(start_paused = true)]
async fn test_poll_process_timeout_names_process_and_duration() {
    let client = with_process_rounds(&[ProcessStatus::Pending]);

    let err = poll_process(&client, "p1", Backoff::PROCESS, &CancellationToken::new(), None)
        .await
        .expect_err("timeout");

    assert_eq!(error_code(&err), Some(ErrorCode::ApiTimeout));
    assert_eq!(err.to_string(), "Process p1 timed out after 10m");
}

#[tokio::test(start_paused = true)]
async fn test_poll_process_cancellation_is_distinct_from_timeout() {
    let client = with_process_rounds(&[ProcessStatus::Running]);
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(7)).await;
        trigger.cancel();
    });

    let err = poll_process(&client, "p1", Backoff::PROCESS, &cancel, None)
        .await
        .expect_err("canceled");

    assert!(err.downcast_ref::<Canceled>().is_some());
    assert_eq!(error_code(&err), None);
}

#[tokio::test]
async fn test_poll_process_already_canceled_makes_no_calls() {
    let client = with_process_rounds(&[ProcessStatus::Running]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = poll_process(&client, "p1", Backoff::PROCESS, &cancel, None)
        .await
        .expect_err("canceled");

    assert!(err.downcast_ref::<Canceled>().is_some());
    assert_eq!(client.count("get_process"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_poll_process_propagates_fetch_error() {
    let client = FakePlatform::default().failing("get_process", "PROCESS_NOT_FOUND", "gone");

    let err = poll_process(&client, "p1", Backoff::PROCESS, &CancellationToken::new(), None)
        .await
        .expect_err("fetch error");

    assert_eq!(err.to_string(), "gone");
}

#[tokio::test(start_paused = true)]
async fn test_poll_process_reports_progress_each_tick() {
    let client = with_process_rounds(&[ProcessStatus::Pending, ProcessStatus::Finished]);
    let progress = RecordingProgress::default();

    poll_process(
        &client,
        "p1",
        Backoff::PROCESS,
        &CancellationToken::new(),
        Some(&progress),
    )
    .await
    .expect("poll");

    let ticks = progress.ticks.lock().expect("lock").clone();
    assert_eq!(ticks, ["Process p1: PENDING", "Process p1: FINISHED"]);
}

#[tokio::test(start_paused = true)]
async fn test_poll_process_progress_tracks_share_of_timeout() {
    let client = with_process_rounds(&[
        ProcessStatus::Pending,
        ProcessStatus::Running,
        ProcessStatus::Finished,
    ]);
    let progress = RecordingProgress::default();

    poll_process(
        &client,
        "p1",
        Backoff::PROCESS,
        &CancellationToken::new(),
        Some(&progress),
    )
    .await
    .expect("poll");

    let percents = progress.percents.lock().expect("lock").clone();
    assert_eq!(percents.len(), 3);
    assert!(percents[0].abs() < f64::EPSILON);
    assert!(percents.windows(2).all(|w| w[0] < w[1]), "{percents:?}");
    assert!(percents.iter().all(|p| *p <= 100.0));
}

#[tokio::test(start_paused = true)]
async fn test_poll_build_waits_for_newest_version_of_service() {
    let client = FakePlatform::default();
    *client.build_rounds.lock().expect("lock") = vec![
        vec![
            app_version("old", "s1", 1, "ACTIVE"),
            app_version("new", "s1", 2, "BUILDING"),
            app_version("other", "s2", 9, "ACTIVE"),
        ],
        vec![
            app_version("old", "s1", 1, "ACTIVE"),
            app_version("new", "s1", 2, "BUILD_FAILED"),
        ],
    ]
    .into();

    let done = poll_build(
        &client,
        "proj-1",
        "s1",
        Backoff::BUILD,
        &CancellationToken::new(),
        None,
    )
    .await
    .expect("poll");

    assert_eq!(done.id, "new");
    assert_eq!(done.status, "BUILD_FAILED");
    assert_eq!(client.count("search_app_versions proj-1 10"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_poll_build_without_versions_keeps_waiting() {
    let client = FakePlatform::default();
    *client.build_rounds.lock().expect("lock") = vec![
        Vec::new(),
        vec![app_version("v1", "s1", 1, "BUILDING")],
        vec![app_version("v1", "s1", 1, "ACTIVE")],
    ]
    .into();
    let progress = RecordingProgress::default();

    let done = poll_build(
        &client,
        "proj-1",
        "s1",
        Backoff::BUILD,
        &CancellationToken::new(),
        Some(&progress),
    )
    .await
    .expect("poll");

    assert_eq!(done.status, "ACTIVE");
    let ticks = progress.ticks.lock().expect("lock").clone();
    assert_eq!(ticks[0], "Build s1: waiting");
    assert_eq!(ticks.len(), 3);
}

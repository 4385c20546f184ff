//! Application service: polling async platform work to completion.
//!
//! Both polls share one adaptive back-off: a short interval at first, a
//! longer one once `step_up_after` has elapsed, and a hard timeout. Every
//! iteration reports one progress tick; cancellation is honoured before each
//! API call and during each sleep.

use std::time::Duration;

use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use zcp_common::{AppVersionEvent, Process, is_build_terminal};

use crate::application::ports::{PlatformClient, ProgressReporter};
use crate::domain::config::BackoffSettings;
use crate::domain::error::{Canceled, ErrorCode, ZcpError};

/// How many recent app versions a build poll inspects per iteration.
pub const BUILD_EVENTS_WINDOW: usize = 10;

/// Status reported while no app version exists yet for the service.
pub const WAITING_STATUS: &str = "waiting";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial_interval: Duration,
    pub step_up_interval: Duration,
    pub step_up_after: Duration,
    pub timeout: Duration,
}

impl Backoff {
    pub const PROCESS: Self = Self {
        initial_interval: Duration::from_secs(2),
        step_up_interval: Duration::from_secs(5),
        step_up_after: Duration::from_secs(30),
        timeout: Duration::from_secs(600),
    };

    pub const BUILD: Self = Self {
        initial_interval: Duration::from_secs(3),
        step_up_interval: Duration::from_secs(10),
        step_up_after: Duration::from_secs(60),
        timeout: Duration::from_secs(900),
    };

    fn interval_after(&self, elapsed: Duration) -> Duration {
        if elapsed > self.step_up_after {
            self.step_up_interval
        } else {
            self.initial_interval
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn percent(&self, elapsed: Duration) -> f64 {
        if self.timeout.is_zero() {
            return 100.0;
        }
        (elapsed.as_secs_f64() / self.timeout.as_secs_f64() * 100.0).min(100.0)
    }
}

impl From<BackoffSettings> for Backoff {
    fn from(s: BackoffSettings) -> Self {
        Self {
            initial_interval: Duration::from_secs(s.initial_interval),
            step_up_interval: Duration::from_secs(s.step_up_interval),
            step_up_after: Duration::from_secs(s.step_up_after),
            timeout: Duration::from_secs(s.timeout),
        }
    }
}

/// Outcome of one poll iteration.
enum Tick<T> {
    Done(T),
    Pending(String),
}

/// Drives `fetch` until it yields a terminal value, the timeout elapses or
/// `cancel` fires.
async fn poll_until<T, F, Fut>(
    backoff: Backoff,
    cancel: &CancellationToken,
    progress: Option<&dyn ProgressReporter>,
    timeout_error: impl FnOnce() -> ZcpError,
    mut fetch: F,
) -> anyhow::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<(Tick<T>, String)>>,
{
    let start = Instant::now();
    loop {
        if cancel.is_cancelled() {
            return Err(Canceled.into());
        }
        let (tick, message) = fetch().await?;
        let elapsed = start.elapsed();
        if let Some(reporter) = progress {
            reporter.progress(&message, backoff.percent(elapsed), 100.0);
        }

        match tick {
            Tick::Done(value) => return Ok(value),
            Tick::Pending(status) => debug!(%status, ?elapsed, "poll pending"),
        }
        if elapsed > backoff.timeout {
            return Err(timeout_error().into());
        }

        tokio::select! {
            () = cancel.cancelled() => return Err(Canceled.into()),
            () = sleep(backoff.interval_after(elapsed)) => {}
        }
    }
}

fn format_timeout(d: Duration) -> String {
    let secs = d.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{secs}s")
    }
}

/// Polls a process until it reaches `FINISHED`, `FAILED` or `CANCELED`.
///
/// # Errors
///
/// `API_TIMEOUT` after `backoff.timeout`, [`Canceled`] on cancellation, or
/// the platform error of a failed fetch.
pub async fn poll_process(
    client: &impl PlatformClient,
    process_id: &str,
    backoff: Backoff,
    cancel: &CancellationToken,
    progress: Option<&dyn ProgressReporter>,
) -> anyhow::Result<Process> {
    poll_until(
        backoff,
        cancel,
        progress,
        || {
            ZcpError::new(
                ErrorCode::ApiTimeout,
                format!(
                    "Process {process_id} timed out after {}",
                    format_timeout(backoff.timeout)
                ),
                "Check the process status manually with zerops_process",
            )
        },
        move || async move {
            let process = client.get_process(process_id).await?;
            let message = format!("Process {process_id}: {}", process.status);
            let tick = if process.status.is_terminal() {
                Tick::Done(process)
            } else {
                Tick::Pending(process.status.to_string())
            };
            Ok::<_, anyhow::Error>((tick, message))
        },
    )
    .await
}

/// Latest app version of `service_id`: the one with the highest sequence.
#[must_use]
pub fn latest_app_version<'a>(
    events: &'a [AppVersionEvent],
    service_id: &str,
) -> Option<&'a AppVersionEvent> {
    events
        .iter()
        .filter(|e| e.service_stack_id == service_id)
        .max_by_key(|e| e.sequence)
}

/// Polls the newest app version of a service until its build is terminal
/// (`ACTIVE` or `BUILD_FAILED`).
///
/// # Errors
///
/// Same as [`poll_process`].
pub async fn poll_build(
    client: &impl PlatformClient,
    project_id: &str,
    service_id: &str,
    backoff: Backoff,
    cancel: &CancellationToken,
    progress: Option<&dyn ProgressReporter>,
) -> anyhow::Result<AppVersionEvent> {
    poll_until(
        backoff,
        cancel,
        progress,
        || {
            ZcpError::new(
                ErrorCode::ApiTimeout,
                format!(
                    "Build for service {service_id} timed out after {}",
                    format_timeout(backoff.timeout)
                ),
                "Check the build status manually with zerops_events",
            )
        },
        move || async move {
            let events = client
                .search_app_versions(project_id, BUILD_EVENTS_WINDOW)
                .await?;
            let Some(latest) = latest_app_version(&events, service_id) else {
                return Ok::<_, anyhow::Error>((
                    Tick::Pending(WAITING_STATUS.to_string()),
                    format!("Build {service_id}: {WAITING_STATUS}"),
                ));
            };
            let message = format!("Build {service_id}: {}", latest.status);
            let tick = if is_build_terminal(&latest.status) {
                Tick::Done(latest.clone())
            } else {
                Tick::Pending(latest.status.clone())
            };
            Ok::<_, anyhow::Error>((tick, message))
        },
    )
    .await
}

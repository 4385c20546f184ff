//! Lifecycle, scaling, storage and deletion.

use zcp_cli::application::services::manage::{
    LifecycleAction, SCALE_APPLIED_MESSAGE, delete, lifecycle, scale, storage,
};
use zcp_cli::domain::error::{ErrorCode, error_code};
use zcp_cli::domain::scale::ScaleParams;
use zcp_common::ProcessStatus;

use crate::mocks::{FakePlatform, process, service};

fn platform() -> FakePlatform {
    let mut api = service("api", "s1", "nodejs@22", "ACTIVE");
    api.mode = "HA".to_string();
    FakePlatform::with_services(vec![api, service("files", "s7", "shared-storage", "ACTIVE")])
}

#[tokio::test]
async fn test_lifecycle_dispatches_each_action() {
    let client = platform();

    for action in [
        LifecycleAction::Start,
        LifecycleAction::Stop,
        LifecycleAction::Restart,
        LifecycleAction::Reload,
    ] {
        lifecycle(&client, "proj-1", "api", action).await.expect("action");
    }

    let calls: Vec<String> = client
        .calls()
        .into_iter()
        .filter(|c| !c.starts_with("list_services"))
        .collect();
    assert_eq!(
        calls,
        ["start_service s1", "stop_service s1", "restart_service s1", "reload_service s1"]
    );
}

#[tokio::test]
async fn test_lifecycle_unknown_service() {
    let err = lifecycle(&platform(), "proj-1", "web", LifecycleAction::Start)
        .await
        .expect_err("unknown");

    assert_eq!(error_code(&err), Some(ErrorCode::ServiceNotFound));
}

#[tokio::test]
async fn test_scale_echoes_service_mode_and_reports_sync_apply() {
    let client = platform();
    let params = ScaleParams {
        min_ram: Some(1.0),
        max_ram: Some(4.0),
        ..ScaleParams::default()
    };

    let result = scale(&client, "proj-1", "api", &params).await.expect("scale");

    assert!(result.process.is_none());
    assert_eq!(result.message, SCALE_APPLIED_MESSAGE);
    assert_eq!(result.service_id, "s1");
    assert_eq!(client.count("set_autoscaling s1 HA"), 1);
}

#[tokio::test]
async fn test_scale_with_process_has_no_message() {
    let mut client = platform();
    client.scale_process = Some(process("p9", ProcessStatus::Pending));

    let result = scale(
        &client,
        "proj-1",
        "api",
        &ScaleParams {
            max_containers: Some(3),
            ..ScaleParams::default()
        },
    )
    .await
    .expect("scale");

    assert_eq!(result.process.map(|p| p.id), Some("p9".to_string()));
    assert!(result.message.is_empty());
}

#[tokio::test]
async fn test_scale_invalid_params_rejected_before_any_call() {
    let client = platform();

    let empty = scale(&client, "proj-1", "api", &ScaleParams::default())
        .await
        .expect_err("empty");
    let inverted = scale(
        &client,
        "proj-1",
        "api",
        &ScaleParams {
            min_cpu: Some(4),
            max_cpu: Some(2),
            ..ScaleParams::default()
        },
    )
    .await
    .expect_err("min > max");
    let mode = scale(
        &client,
        "proj-1",
        "api",
        &ScaleParams {
            cpu_mode: Some("TURBO".to_string()),
            ..ScaleParams::default()
        },
    )
    .await
    .expect_err("mode");

    for err in [&empty, &inverted, &mode] {
        assert_eq!(error_code(err), Some(ErrorCode::InvalidScaling));
    }
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_storage_connect_and_disconnect() {
    let client = platform();

    storage(&client, "proj-1", "api", "files", true).await.expect("connect");
    storage(&client, "proj-1", "api", "files", false).await.expect("disconnect");

    assert_eq!(client.count("connect_storage s1 s7"), 1);
    assert_eq!(client.count("disconnect_storage s1 s7"), 1);
}

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let client = platform();

    let err = delete(&client, "proj-1", "api", false).await.expect_err("confirm");

    assert_eq!(error_code(&err), Some(ErrorCode::ConfirmRequired));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_delete_requires_hostname() {
    let err = delete(&platform(), "proj-1", "", true).await.expect_err("hostname");

    assert_eq!(error_code(&err), Some(ErrorCode::ServiceRequired));
}

#[tokio::test]
async fn test_delete_confirmed_deletes_resolved_service() {
    let client = platform();

    let process = delete(&client, "proj-1", "api", true).await.expect("delete");

    assert_eq!(process.action_name, "serviceStackDelete");
    assert_eq!(client.count("delete_service s1"), 1);
}

//! Importing services from an import manifest.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use zcp_cli::application::services::catalog_cache::CatalogCache;
use zcp_cli::application::services::import::{ImportRequest, import};
use zcp_cli::domain::error::{Canceled, ErrorCode, error_code};
use zcp_common::{
    ImportResult, ImportedServiceStack, PlatformErrorInfo, ProcessStatus, ServiceStackType,
    ServiceStackTypeVersion,
};

use crate::mocks::{FakePlatform, MemFs, process, service};

const MANIFEST: &str = "services:\n  - hostname: api\n    type: nodejs@22\n  - hostname: db\n    type: postgresql@16\n";

fn request(content: &str) -> ImportRequest<'_> {
    ImportRequest {
        content: Some(content),
        file_path: None,
        dry_run: false,
        deleting_timeout: Duration::from_secs(60),
    }
}

fn catalog() -> Vec<ServiceStackType> {
    let stack = |name: &str, category: &str, version: &str| ServiceStackType {
        name: name.to_string(),
        category: category.to_string(),
        versions: vec![ServiceStackTypeVersion {
            name: version.to_string(),
            is_build: false,
            status: "ACTIVE".to_string(),
        }],
    };
    vec![
        stack("nodejs", "USER", "nodejs@22"),
        stack("postgresql", "STANDARD", "postgresql@16"),
    ]
}

fn imported() -> ImportResult {
    ImportResult {
        project_id: "proj-1".to_string(),
        project_name: "demo".to_string(),
        service_stacks: vec![
            ImportedServiceStack {
                id: "s1".to_string(),
                name: "api".to_string(),
                processes: vec![process("p1", ProcessStatus::Pending)],
                error: None,
            },
            ImportedServiceStack {
                id: "s2".to_string(),
                name: "db".to_string(),
                processes: Vec::new(),
                error: Some(PlatformErrorInfo {
                    code: "SERVICE_STACK_NAME_UNAVAILABLE".to_string(),
                    message: "hostname taken".to_string(),
                }),
            },
        ],
    }
}

#[tokio::test]
async fn test_import_flattens_processes_and_rejections() {
    let mut client = FakePlatform::default();
    client.import_result = imported();

    let out = import(&client, &MemFs::default(), None, "proj-1", &request(MANIFEST), &CancellationToken::new())
        .await
        .expect("import");

    assert_eq!(out.project_name, "demo");
    assert_eq!(out.processes.len(), 1);
    assert_eq!(out.processes[0].service, "api");
    assert_eq!(out.processes[0].service_id, "s1");
    assert_eq!(
        out.warnings,
        ["service \"db\": SERVICE_STACK_NAME_UNAVAILABLE: hostname taken"]
    );
}

#[tokio::test]
async fn test_import_dry_run_previews_without_platform_writes() {
    let client = FakePlatform::default();
    *client.catalog_rounds.lock().expect("lock") = vec![Ok(catalog())].into();
    let cache = CatalogCache::new(Duration::from_secs(60));

    let out = import(
        &client,
        &MemFs::default(),
        Some(&cache),
        "proj-1",
        &ImportRequest {
            dry_run: true,
            ..request(MANIFEST)
        },
        &CancellationToken::new(),
    )
    .await
    .expect("dry run");

    assert!(out.dry_run);
    assert_eq!(out.services.len(), 2);
    // postgresql is managed and the manifest omits `mode`.
    assert_eq!(out.warnings.len(), 1);
    assert!(out.warnings[0].contains("requires 'mode: NON_HA' or 'mode: HA'"));
    assert_eq!(client.count("import_services"), 0);
    assert_eq!(client.count("list_services"), 0);
}

#[tokio::test]
async fn test_import_rejects_project_section() {
    let client = FakePlatform::default();
    let manifest = "project:\n  name: demo\nservices:\n  - hostname: api\n    type: nodejs@22\n";

    let err = import(&client, &MemFs::default(), None, "proj-1", &request(manifest), &CancellationToken::new())
        .await
        .expect_err("project section");

    assert_eq!(error_code(&err), Some(ErrorCode::ImportHasProject));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_import_reads_manifest_from_file() {
    let mut client = FakePlatform::default();
    client.import_result = imported();
    let fs = MemFs::default().with_file("/work/import.yml", MANIFEST);

    let out = import(
        &client,
        &fs,
        None,
        "proj-1",
        &ImportRequest {
            content: None,
            file_path: Some("/work/import.yml"),
            ..request("")
        },
        &CancellationToken::new(),
    )
    .await
    .expect("import");

    assert_eq!(out.processes.len(), 1);
}

#[tokio::test]
async fn test_import_missing_file_is_file_not_found() {
    let err = import(
        &FakePlatform::default(),
        &MemFs::default(),
        None,
        "proj-1",
        &ImportRequest {
            content: None,
            file_path: Some("/nope.yml"),
            ..request("")
        },
        &CancellationToken::new(),
    )
    .await
    .expect_err("missing");

    assert_eq!(error_code(&err), Some(ErrorCode::FileNotFound));
}

#[tokio::test(start_paused = true)]
async fn test_import_waits_for_deleting_services() {
    let mut client = FakePlatform::default();
    client.import_result = imported();
    *client.listings.lock().expect("lock") = vec![
        vec![service("api", "old", "nodejs@22", "DELETING")],
        vec![service("api", "old", "nodejs@22", "DELETING")],
        vec![service("other", "s5", "nodejs@22", "DELETING")],
    ]
    .into();

    let start = tokio::time::Instant::now();
    import(&client, &MemFs::default(), None, "proj-1", &request(MANIFEST), &CancellationToken::new())
        .await
        .expect("import");

    assert_eq!(client.count("list_services"), 3);
    assert_eq!(start.elapsed(), Duration::from_secs(6));
    let calls = client.calls();
    assert_eq!(calls.last().map(String::as_str), Some("import_services proj-1"));
}

#[tokio::test(start_paused = true)]
async fn test_import_deleting_wait_times_out() {
    let client = FakePlatform::with_services(vec![service("db", "old", "postgresql@16", "DELETING")]);

    let err = import(
        &client,
        &MemFs::default(),
        None,
        "proj-1",
        &ImportRequest {
            deleting_timeout: Duration::from_secs(10),
            ..request(MANIFEST)
        },
        &CancellationToken::new(),
    )
    .await
    .expect_err("timeout");

    assert_eq!(error_code(&err), Some(ErrorCode::ApiTimeout));
    assert!(err.to_string().contains("[db]"));
    assert_eq!(client.count("import_services"), 0);
}

#[tokio::test(start_paused = true)]
async fn test_import_deleting_wait_honors_cancellation() {
    let client = FakePlatform::with_services(vec![service("api", "old", "nodejs@22", "DELETING")]);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(4)).await;
        trigger.cancel();
    });

    let err = import(&client, &MemFs::default(), None, "proj-1", &request(MANIFEST), &cancel)
        .await
        .expect_err("canceled");

    assert!(err.downcast_ref::<Canceled>().is_some());
}

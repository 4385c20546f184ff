//! Knowledge loading: mode routing, live version check and tracking.

use std::time::Duration;

use zcp_cli::application::services::catalog_cache::CatalogCache;
use zcp_cli::application::services::knowledge::{
    KnowledgeRequest, knowledge, knowledge_offline,
};
use zcp_cli::application::services::knowledge_tracker::KnowledgeTracker;
use zcp_cli::domain::error::{ErrorCode, error_code};
use zcp_common::{ServiceStackType, ServiceStackTypeVersion};

use crate::mocks::FakePlatform;

fn stack(name: &str, category: &str, versions: &[&str]) -> ServiceStackType {
    ServiceStackType {
        name: name.to_string(),
        category: category.to_string(),
        versions: versions
            .iter()
            .map(|v| ServiceStackTypeVersion {
                name: (*v).to_string(),
                is_build: false,
                status: "ACTIVE".to_string(),
            })
            .collect(),
    }
}

fn platform() -> FakePlatform {
    let client = FakePlatform::default();
    *client.catalog_rounds.lock().expect("lock") = vec![Ok(vec![
        stack("nodejs", "USER", &["nodejs@20", "nodejs@22"]),
        stack("postgresql", "STANDARD", &["postgresql@16"]),
    ])]
    .into();
    client
}

fn cache() -> CatalogCache {
    CatalogCache::new(Duration::from_secs(60))
}

#[tokio::test]
async fn test_knowledge_briefing_checks_versions_and_records() {
    let client = platform();
    let tracker = KnowledgeTracker::new();
    let services = vec!["postgresql@15".to_string()];

    let text = knowledge(
        &client,
        &cache(),
        &KnowledgeRequest {
            runtime: "nodejs@22",
            services: &services,
            ..KnowledgeRequest::default()
        },
        &tracker,
    )
    .await
    .expect("briefing");

    assert!(text.contains("- ✓ `nodejs@22`"), "{text}");
    assert!(text.contains("- ⚠ `postgresql@15` not found. Available: postgresql@16"));
    assert_eq!(tracker.summary(), "Briefing: nodejs@22+postgresql@15");
    assert!(!tracker.is_loaded());
}

#[tokio::test]
async fn test_knowledge_scope_records_without_catalog_fetch() {
    let client = platform();
    let tracker = KnowledgeTracker::new();

    let text = knowledge(
        &client,
        &cache(),
        &KnowledgeRequest {
            scope: "infrastructure",
            ..KnowledgeRequest::default()
        },
        &tracker,
    )
    .await
    .expect("scope");

    assert!(text.contains("## YAML Reference"));
    assert_eq!(tracker.summary(), "Scope: infrastructure");
    assert_eq!(client.count("list_service_stack_types"), 0);
}

#[tokio::test]
async fn test_knowledge_invalid_request_records_nothing() {
    let client = platform();
    let tracker = KnowledgeTracker::new();
    let services = vec!["valkey@7.2".to_string()];

    for request in [
        KnowledgeRequest::default(),
        KnowledgeRequest {
            scope: "database",
            ..KnowledgeRequest::default()
        },
        KnowledgeRequest {
            services: &services,
            scope: "infrastructure",
            ..KnowledgeRequest::default()
        },
    ] {
        let err = knowledge(&client, &cache(), &request, &tracker)
            .await
            .expect_err("invalid");
        assert_eq!(error_code(&err), Some(ErrorCode::InvalidParameter));
    }

    assert_eq!(tracker.summary(), "No knowledge loaded");
    assert_eq!(client.count("list_service_stack_types"), 0);
}

#[test]
fn test_knowledge_offline_completes_the_loaded_state() {
    let tracker = KnowledgeTracker::new();
    let services = vec!["postgresql@16".to_string()];

    let briefing = knowledge_offline(
        &KnowledgeRequest {
            runtime: "go@1",
            services: &services,
            ..KnowledgeRequest::default()
        },
        &tracker,
    )
    .expect("briefing");
    knowledge_offline(
        &KnowledgeRequest {
            scope: "infrastructure",
            ..KnowledgeRequest::default()
        },
        &tracker,
    )
    .expect("scope");

    assert!(!briefing.contains("## Version Check"));
    assert!(tracker.is_loaded());
}

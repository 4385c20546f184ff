//! Context document and knowledge tracking.

use std::time::Duration;

use zcp_cli::application::services::catalog_cache::CatalogCache;
use zcp_cli::application::services::context::context;
use zcp_cli::application::services::knowledge_tracker::KnowledgeTracker;
use zcp_cli::domain::context::PLATFORM_PRIMER;
use zcp_common::{ServiceStackType, ServiceStackTypeVersion};

use crate::mocks::FakePlatform;

#[tokio::test]
async fn test_context_without_client_is_primer() {
    assert_eq!(context(None::<(&FakePlatform, &CatalogCache)>).await, PLATFORM_PRIMER);
}

#[tokio::test]
async fn test_context_appends_live_catalog() {
    let client = FakePlatform::default();
    *client.catalog_rounds.lock().expect("lock") = vec![Ok(vec![ServiceStackType {
        name: "Bun".to_string(),
        category: "USER".to_string(),
        versions: vec![ServiceStackTypeVersion {
            name: "bun@1.2".to_string(),
            is_build: false,
            status: "ACTIVE".to_string(),
        }],
    }])]
    .into();
    let cache = CatalogCache::new(Duration::from_secs(60));

    let doc = context(Some((&client, &cache))).await;

    assert!(doc.starts_with(PLATFORM_PRIMER));
    assert!(doc.contains("bun@1.2"));
}

#[tokio::test]
async fn test_context_catalog_failure_falls_back_to_primer() {
    let client = FakePlatform::default();
    *client.catalog_rounds.lock().expect("lock") = vec![Err("unauthorized".to_string())].into();
    let cache = CatalogCache::new(Duration::from_secs(60));

    assert_eq!(context(Some((&client, &cache))).await, PLATFORM_PRIMER);
}

#[test]
fn test_knowledge_tracker_requires_briefing_and_scope() {
    let tracker = KnowledgeTracker::new();
    assert!(!tracker.is_loaded());
    assert_eq!(tracker.summary(), "No knowledge loaded");

    tracker.record_briefing("nodejs@22", &["postgresql@16", "valkey@7.2"]);
    assert!(!tracker.is_loaded());

    tracker.record_scope();
    assert!(tracker.is_loaded());
    assert_eq!(
        tracker.summary(),
        "Briefing: nodejs@22+postgresql@16,valkey@7.2 | Scope: infrastructure"
    );
}

#[test]
fn test_knowledge_tracker_is_shareable_across_threads() {
    let tracker = std::sync::Arc::new(KnowledgeTracker::new());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let tracker = std::sync::Arc::clone(&tracker);
            std::thread::spawn(move || tracker.record_briefing(&format!("go@{i}"), &[] as &[&str]))
        })
        .collect();
    for handle in handles {
        handle.join().expect("join");
    }

    assert_eq!(tracker.summary().matches("go@").count(), 4);
}

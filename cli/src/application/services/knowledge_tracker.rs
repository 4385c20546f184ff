//! Application service: which knowledge the agent has loaded this session.

use std::sync::{Mutex, PoisonError};

#[derive(Debug, Default)]
struct Loaded {
    /// `runtime+svc1,svc2` per briefing call.
    briefings: Vec<String>,
    scope: bool,
}

/// Session-wide record of briefing and scope loads. Safe to share across
/// concurrent operations.
#[derive(Debug, Default)]
pub struct KnowledgeTracker {
    inner: Mutex<Loaded>,
}

impl KnowledgeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Loaded> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_briefing<S: AsRef<str>>(&self, runtime: &str, services: &[S]) {
        let mut entry = runtime.to_string();
        if !services.is_empty() {
            entry.push('+');
            entry.push_str(
                &services
                    .iter()
                    .map(AsRef::as_ref)
                    .collect::<Vec<_>>()
                    .join(","),
            );
        }
        self.lock().briefings.push(entry);
    }

    pub fn record_scope(&self) {
        self.lock().scope = true;
    }

    /// Both a briefing and the scope were loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        let loaded = self.lock();
        !loaded.briefings.is_empty() && loaded.scope
    }

    #[must_use]
    pub fn summary(&self) -> String {
        let loaded = self.lock();
        let mut parts = Vec::new();
        if !loaded.briefings.is_empty() {
            parts.push(format!("Briefing: {}", loaded.briefings.join("; ")));
        }
        if loaded.scope {
            parts.push("Scope: infrastructure".to_string());
        }
        if parts.is_empty() {
            return "No knowledge loaded".to_string();
        }
        parts.join(" | ")
    }
}

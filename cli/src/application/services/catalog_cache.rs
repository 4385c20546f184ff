//! Application service: TTL cache over the live service-type catalog.
//!
//! Shared by every operation of a process. State sits behind a short-lived
//! `std::sync::Mutex`; refreshes are serialized by a separate async lock so
//! concurrent callers that find the entry expired wait for one refresh
//! instead of each hitting the platform.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};
use zcp_common::ServiceStackType;

use crate::application::ports::PlatformClient;

#[derive(Default)]
struct CacheState {
    types: Arc<Vec<ServiceStackType>>,
    fetched_at: Option<Instant>,
    /// Bumped after every refresh attempt, successful or not.
    generation: u64,
}

pub struct CatalogCache {
    ttl: Duration,
    state: Mutex<CacheState>,
    refresh: tokio::sync::Mutex<()>,
}

impl CatalogCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Mutex::new(CacheState::default()),
            refresh: tokio::sync::Mutex::new(()),
        }
    }

    /// Cached catalog, refreshed from `client` once the entry is older than
    /// the TTL.
    ///
    /// A failed refresh returns the previous payload (empty if there never
    /// was one) and leaves its timestamp alone, so the next call retries.
    pub async fn get(&self, client: &impl PlatformClient) -> Arc<Vec<ServiceStackType>> {
        let seen_generation = {
            let state = self.lock_state();
            if self.is_fresh(&state) {
                return Arc::clone(&state.types);
            }
            state.generation
        };

        let _refreshing = self.refresh.lock().await;
        {
            let state = self.lock_state();
            if state.generation != seen_generation {
                // Someone else refreshed while we waited.
                return Arc::clone(&state.types);
            }
        }

        debug!("refreshing service stack type catalog");
        let fetched = client.list_service_stack_types().await;

        let mut state = self.lock_state();
        state.generation += 1;
        match fetched {
            Ok(types) => {
                state.types = Arc::new(types);
                state.fetched_at = Some(Instant::now());
            }
            Err(e) => warn!(error = %e, "catalog refresh failed, serving cached catalog"),
        }
        Arc::clone(&state.types)
    }

    fn is_fresh(&self, state: &CacheState) -> bool {
        state
            .fetched_at
            .is_some_and(|at| at.elapsed() < self.ttl)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

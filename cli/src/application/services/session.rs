//! Application service: the per-process session built from loaded settings.
//!
//! A host loads the configuration once, builds a `Session`, and takes every
//! tunable (poll schedules, probe timeouts, deploy defaults, catalog TTL)
//! from it. The session also owns the two pieces of shared state: the
//! catalog cache and the knowledge tracker.

use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use crate::application::ports::ConfigStore;
use crate::application::services::catalog_cache::CatalogCache;
use crate::application::services::deploy::DeployContext;
use crate::application::services::knowledge_tracker::KnowledgeTracker;
use crate::application::services::poll::Backoff;
use crate::domain::config::{ProbeSettings, ZcpConfig};

pub struct Session {
    config: ZcpConfig,
    catalog: CatalogCache,
    knowledge: KnowledgeTracker,
}

impl Session {
    #[must_use]
    pub fn new(config: ZcpConfig) -> Self {
        let catalog = CatalogCache::new(Duration::from_secs(config.catalog.ttl));
        Self {
            config,
            catalog,
            knowledge: KnowledgeTracker::new(),
        }
    }

    /// # Errors
    ///
    /// The config file exists but cannot be read or parsed.
    pub fn load(store: &impl ConfigStore) -> Result<Self> {
        let config = store.load()?;
        debug!(region = %config.region, catalog_ttl = config.catalog.ttl, "session configured");
        Ok(Self::new(config))
    }

    #[must_use]
    pub fn config(&self) -> &ZcpConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    #[must_use]
    pub fn knowledge(&self) -> &KnowledgeTracker {
        &self.knowledge
    }

    /// Schedule for waiting on platform processes.
    #[must_use]
    pub fn process_backoff(&self) -> Backoff {
        Backoff::from(self.config.poll.process)
    }

    /// Schedule for waiting on builds.
    #[must_use]
    pub fn build_backoff(&self) -> Backoff {
        Backoff::from(self.config.poll.build)
    }

    #[must_use]
    pub fn probe_timeouts(&self) -> &ProbeSettings {
        &self.config.probe
    }

    /// Timeout for one remote or local deploy command.
    #[must_use]
    pub fn exec_timeout(&self) -> Duration {
        Duration::from_secs(self.config.deploy.exec_timeout)
    }

    /// Deploy settings for this session. The token is supplied by the host
    /// and never read from the config file.
    #[must_use]
    pub fn deploy_context(&self, token: impl Into<String>) -> DeployContext {
        DeployContext {
            token: token.into(),
            region: self.config.region.clone(),
            working_dir: self.config.deploy.working_dir.clone(),
        }
    }
}

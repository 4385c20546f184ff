//! Infrastructure implementation of the `ConfigStore` port.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use crate::application::ports::ConfigStore;
use crate::domain::config::ZcpConfig;

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV: &str = "ZCP_CONFIG";

/// `ZcpConfig` persisted as YAML.
///
/// The file lives at `$ZCP_CONFIG`, else `~/.zcp/config.yaml`, unless a
/// path is pinned with [`YamlConfigStore::at`].
#[derive(Debug, Default)]
pub struct YamlConfigStore {
    pinned: Option<PathBuf>,
}

impl YamlConfigStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            pinned: Some(path.into()),
        }
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<ZcpConfig> {
        let path = self.path()?;
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(ZcpConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(ZcpConfig::default());
        }
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    /// Writes through a temporary file in the same directory, so readers
    /// never see a half-written config.
    fn save(&self, config: &ZcpConfig) -> Result<()> {
        let path = self.path()?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), PathBuf::from);
        std::fs::create_dir_all(&dir).with_context(|| format!("cannot create {}", dir.display()))?;

        let content = serde_yaml::to_string(config).context("cannot serialize config")?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .with_context(|| format!("cannot create temporary file in {}", dir.display()))?;
        tmp.write_all(content.as_bytes())
            .context("cannot write temporary config")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("cannot set permissions on {}", tmp.path().display()))?;
        }
        tmp.persist(&path)
            .with_context(|| format!("cannot write {}", path.display()))?;
        Ok(())
    }

    fn path(&self) -> Result<PathBuf> {
        if let Some(p) = &self.pinned {
            return Ok(p.clone());
        }
        if let Ok(val) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(val));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".zcp").join("config.yaml"))
    }
}

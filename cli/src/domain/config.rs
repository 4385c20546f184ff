//! Configuration schema, defaults and validators.
//!
//! Pure functions only. No I/O, no async, no filesystem access.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "region",
    "catalog.ttl",
    "deploy.workingDir",
    "deploy.execTimeout",
    "probe.healthTimeout",
    "probe.statusTimeout",
    "poll.process.initialInterval",
    "poll.process.stepUpInterval",
    "poll.process.stepUpAfter",
    "poll.process.timeout",
    "poll.build.initialInterval",
    "poll.build.stepUpInterval",
    "poll.build.stepUpAfter",
    "poll.build.timeout",
];

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.zcp/config.yaml`.
///
/// Every field has a default so a partial or missing file is valid. Durations
/// are whole seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZcpConfig {
    pub region: String,
    pub poll: PollSettings,
    pub probe: ProbeSettings,
    pub catalog: CatalogSettings,
    pub deploy: DeploySettings,
}

impl Default for ZcpConfig {
    fn default() -> Self {
        Self {
            region: "prg1".to_string(),
            poll: PollSettings::default(),
            probe: ProbeSettings::default(),
            catalog: CatalogSettings::default(),
            deploy: DeploySettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    pub process: BackoffSettings,
    pub build: BackoffSettings,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            process: BackoffSettings::PROCESS,
            build: BackoffSettings::BUILD,
        }
    }
}

/// Back-off schedule in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackoffSettings {
    pub initial_interval: u64,
    pub step_up_interval: u64,
    pub step_up_after: u64,
    pub timeout: u64,
}

impl BackoffSettings {
    pub const PROCESS: Self = Self {
        initial_interval: 2,
        step_up_interval: 5,
        step_up_after: 30,
        timeout: 600,
    };
    pub const BUILD: Self = Self {
        initial_interval: 3,
        step_up_interval: 10,
        step_up_after: 60,
        timeout: 900,
    };
}

impl Default for BackoffSettings {
    fn default() -> Self {
        Self::PROCESS
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProbeSettings {
    pub health_timeout: u64,
    pub status_timeout: u64,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            health_timeout: 5,
            status_timeout: 10,
        }
    }
}

impl ProbeSettings {
    #[must_use]
    pub fn health(&self) -> Duration {
        Duration::from_secs(self.health_timeout)
    }

    #[must_use]
    pub fn status(&self) -> Duration {
        Duration::from_secs(self.status_timeout)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub ttl: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self { ttl: 3600 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeploySettings {
    pub working_dir: String,
    pub exec_timeout: u64,
}

impl Default for DeploySettings {
    fn default() -> Self {
        Self {
            working_dir: crate::domain::deploy::DEFAULT_WORKING_DIR.to_string(),
            exec_timeout: 300,
        }
    }
}

// ── Key access ───────────────────────────────────────────────────────────────

impl ZcpConfig {
    /// Current value of a dotted key, rendered as text.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "region" => self.region.clone(),
            "catalog.ttl" => self.catalog.ttl.to_string(),
            "deploy.workingDir" => self.deploy.working_dir.clone(),
            "deploy.execTimeout" => self.deploy.exec_timeout.to_string(),
            "probe.healthTimeout" => self.probe.health_timeout.to_string(),
            "probe.statusTimeout" => self.probe.status_timeout.to_string(),
            _ => {
                let (backoff, field) = self.backoff_field(key)?;
                field_of(backoff, field)?.to_string()
            }
        };
        Some(value)
    }

    /// Sets a dotted key. The pair must already have passed
    /// [`validate_config_key`] and [`validate_config_value`].
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown key or an unparseable number.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        match key {
            "region" => self.region = value.to_string(),
            "deploy.workingDir" => self.deploy.working_dir = value.to_string(),
            _ => {
                let secs: u64 = value.parse()?;
                match key {
                    "catalog.ttl" => self.catalog.ttl = secs,
                    "deploy.execTimeout" => self.deploy.exec_timeout = secs,
                    "probe.healthTimeout" => self.probe.health_timeout = secs,
                    "probe.statusTimeout" => self.probe.status_timeout = secs,
                    _ => {
                        let (scope, field) = key
                            .strip_prefix("poll.")
                            .and_then(|rest| rest.split_once('.'))
                            .ok_or_else(|| unknown_key(key))?;
                        let backoff = match scope {
                            "process" => &mut self.poll.process,
                            "build" => &mut self.poll.build,
                            _ => return Err(unknown_key(key).into()),
                        };
                        match field {
                            "initialInterval" => backoff.initial_interval = secs,
                            "stepUpInterval" => backoff.step_up_interval = secs,
                            "stepUpAfter" => backoff.step_up_after = secs,
                            "timeout" => backoff.timeout = secs,
                            _ => return Err(unknown_key(key).into()),
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn backoff_field<'a>(&self, key: &'a str) -> Option<(&BackoffSettings, &'a str)> {
        let (scope, field) = key.strip_prefix("poll.")?.split_once('.')?;
        match scope {
            "process" => Some((&self.poll.process, field)),
            "build" => Some((&self.poll.build, field)),
            _ => None,
        }
    }
}

fn field_of(backoff: &BackoffSettings, field: &str) -> Option<u64> {
    match field {
        "initialInterval" => Some(backoff.initial_interval),
        "stepUpInterval" => Some(backoff.step_up_interval),
        "stepUpAfter" => Some(backoff.step_up_after),
        "timeout" => Some(backoff.timeout),
        _ => None,
    }
}

fn unknown_key(key: &str) -> ConfigError {
    ConfigError::UnknownKey {
        key: key.to_string(),
        valid: VALID_CONFIG_KEYS.join(", "),
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(unknown_key(key).into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let invalid = |valid: &str| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        valid: valid.to_string(),
    };
    match key {
        "region" | "deploy.workingDir" if value.trim().is_empty() => {
            Err(invalid("any non-empty string").into())
        }
        "deploy.workingDir" if !value.starts_with('/') => Err(invalid("an absolute path").into()),
        "region" | "deploy.workingDir" => Ok(()),
        "catalog.ttl" => match value.parse::<u64>() {
            Ok(_) => Ok(()),
            Err(_) => Err(invalid("whole seconds, 0 or more").into()),
        },
        _ => match value.parse::<u64>() {
            Ok(n) if n > 0 => Ok(()),
            _ => Err(invalid("whole seconds, greater than 0").into()),
        },
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────

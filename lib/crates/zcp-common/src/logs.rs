use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Temporary credentials for the project log backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LogAccess {
    pub access_token: String,
    pub expiration: String,
    /// May carry an HTTP verb prefix, e.g. `"GET https://..."`.
    pub url: String,
    #[serde(default)]
    pub url_plain: String,
}

/// Query for the log backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFetchParams {
    pub service_id: String,
    /// `error`, `warning`, `info`, `debug` or `all`.
    pub severity: String,
    pub since: Option<DateTime<Utc>>,
    pub limit: usize,
    pub search: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub timestamp: String,
    pub severity: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub container: String,
}

use serde::{Deserialize, Serialize};

/// A service type offered by the platform, e.g. `"Node.js"` or `"PostgreSQL"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceStackType {
    pub name: String,
    /// `USER`, `STANDARD`, `BUILD`, `SHARED_STORAGE`, ...
    pub category: String,
    pub versions: Vec<ServiceStackTypeVersion>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStackTypeVersion {
    /// e.g. `"nodejs@22"`
    pub name: String,
    #[serde(default)]
    pub is_build: bool,
    /// `ACTIVE` or `DISABLED`.
    pub status: String,
}

impl ServiceStackTypeVersion {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == "ACTIVE"
    }
}

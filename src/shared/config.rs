use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8090";
const DEFAULT_PER_PAGE: u32 = 30;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Remote endpoint settings. Deserializable so the host application can
/// load it from its own settings store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: String,
    pub per_page: u32,
    /// Deadline applied to every gateway request. The transport default is
    /// environment-dependent, so the core always sets its own.
    pub request_timeout_secs: u64,
}

impl RemoteConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            per_page: DEFAULT_PER_PAGE,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

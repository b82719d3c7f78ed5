use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub prefs: PrefsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the stats API server
    pub base_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefsConfig {
    /// Path to the JSON file backing the preference store
    pub path: String,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let base_url = std::env::var("VANTAGE_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());

        let request_timeout_secs = std::env::var("VANTAGE_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .context("VANTAGE_REQUEST_TIMEOUT_SECS must be a positive integer")?;

        let prefs_path = std::env::var("VANTAGE_PREFS_PATH")
            .unwrap_or_else(|_| "./vantage_prefs.json".to_string());

        Ok(Self {
            api: ApiConfig {
                base_url,
                request_timeout_secs,
            },
            prefs: PrefsConfig { path: prefs_path },
        })
    }
}

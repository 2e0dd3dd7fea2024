//! Runner configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{RunnerError, RunnerResult};

/// Runner configuration, optionally read from a TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Base URL of the API under test
    pub base_url: String,

    /// Path to the endpoint fixture
    pub fixture: PathBuf,

    /// Print request and response bodies
    pub verbose: bool,

    /// Path of the readiness probe
    pub health_path: String,

    pub health_timeout_secs: u64,

    pub request_timeout_secs: u64,

    /// Shown when the health check blocks a full run
    pub start_hint: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            fixture: PathBuf::from("sample-requests.json"),
            verbose: false,
            health_path: "/health".to_string(),
            health_timeout_secs: 5,
            request_timeout_secs: 10,
            start_hint: "uvicorn main:app --reload".to_string(),
        }
    }
}

impl RunnerConfig {
    pub fn from_toml(content: &str) -> RunnerResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| RunnerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> RunnerResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RunnerError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> RunnerResult<()> {
        if self.base_url.is_empty() {
            return Err(RunnerError::Config("base_url must not be empty".to_string()));
        }
        if self.health_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(RunnerError::Config("timeouts must be at least one second".to_string()));
        }
        Ok(())
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

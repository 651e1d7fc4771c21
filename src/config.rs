//! Process configuration from environment variables

use crate::interview::DEFAULT_SERVICE_TIMEOUT;
use std::path::PathBuf;
use std::time::Duration;

/// Sentinel path selecting an ephemeral in-memory store
pub const IN_MEMORY: &str = ":memory:";

const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: String,
    pub port: u16,
    /// Upper bound on a single interviewer or analyzer call
    pub service_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = var("INTERVIEW_DB_PATH")
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| {
                let home = var("HOME").unwrap_or_else(|| "/tmp".to_string());
                format!("{home}/.interview-coach/interview.db")
            });

        let port = var("INTERVIEW_PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let service_timeout = var("INTERVIEW_SERVICE_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_SERVICE_TIMEOUT, Duration::from_secs);

        Self {
            db_path,
            port,
            service_timeout,
        }
    }

    pub fn in_memory(&self) -> bool {
        self.db_path == IN_MEMORY
    }

    /// Directory that must exist before a file-backed store can be opened
    pub fn db_dir(&self) -> Option<PathBuf> {
        if self.in_memory() {
            return None;
        }
        PathBuf::from(&self.db_path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
    }
}

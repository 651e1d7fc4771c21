//! Session lifecycle
//!
//! `active -> completed` is the only transition; `completed` is terminal.
//! These checks are pure so they can run before any write.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("Session is not active")]
    NotActive,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
        }
    }

    /// Parse a stored status. Anything other than `active` is treated as
    /// terminal so a corrupt row can never be reopened.
    pub fn parse(s: &str) -> Self {
        if s == "active" {
            SessionStatus::Active
        } else {
            SessionStatus::Completed
        }
    }

    /// Messages may only be submitted to an active session
    pub fn ensure_active(self) -> Result<(), LifecycleError> {
        match self {
            SessionStatus::Active => Ok(()),
            SessionStatus::Completed => Err(LifecycleError::NotActive),
        }
    }

    /// The state after ending the session
    pub fn complete(self) -> Result<SessionStatus, LifecycleError> {
        self.ensure_active()?;
        Ok(SessionStatus::Completed)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

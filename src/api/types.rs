//! API request and response types

use crate::interview::{FinalFeedback, InterviewRole};
use serde::{Deserialize, Serialize};

/// Request to start a new interview
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub role: String,
    /// Accepted for compatibility; only `active` is valid
    #[serde(default)]
    pub status: Option<String>,
}

/// Request to submit the candidate's answer
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

/// Response for ending a session
#[derive(Debug, Serialize)]
pub struct EndSessionResponse {
    pub success: bool,
    pub feedback: FinalFeedback,
}

/// Entry of the role picker
#[derive(Debug, Serialize)]
pub struct RoleInfo {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

impl From<InterviewRole> for RoleInfo {
    fn from(role: InterviewRole) -> Self {
        Self {
            id: role.id(),
            title: role.title(),
            description: role.description(),
        }
    }
}

/// Model information with metadata
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub id: String,
    pub provider: String,
    pub description: String,
    pub context_window: usize,
}

/// Response for model list
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    pub default: String,
    pub interview_model: String,
    pub analysis_model: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

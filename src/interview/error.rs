//! Errors surfaced by the interview core

use super::lifecycle::LifecycleError;
use crate::db::DbError;
use crate::llm::LlmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InterviewError {
    #[error("Session not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("{0}")]
    Validation(String),
    /// The interviewer or analyzer failed while producing a turn
    #[error("Service error: {0}")]
    Service(#[from] LlmError),
    /// Final feedback could not be produced; the session is still completed
    #[error("Feedback aggregation failed: {0}")]
    Aggregation(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

pub type InterviewResult<T> = Result<T, InterviewError>;

impl From<DbError> for InterviewError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::SessionNotFound(id) => InterviewError::NotFound(id),
            DbError::SessionNotActive(_) => {
                InterviewError::InvalidState(LifecycleError::NotActive.to_string())
            }
            DbError::Sqlite(e) => InterviewError::Storage(e.to_string()),
        }
    }
}

impl From<LifecycleError> for InterviewError {
    fn from(e: LifecycleError) -> Self {
        InterviewError::InvalidState(e.to_string())
    }
}

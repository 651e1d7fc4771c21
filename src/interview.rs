//! Interview core
//!
//! Session lifecycle, the turn orchestrator and the feedback aggregator.
//! `InterviewService` is generic over its collaborators; production wires
//! it to SQLite and the model registry.

mod aggregator;
mod error;
pub mod lifecycle;
mod locks;
mod orchestrator;
pub mod role;
pub mod traits;

#[cfg(test)]
mod proptests;
#[cfg(test)]
pub mod testing;

pub use aggregator::{FinalFeedback, PairFeedback};
pub use error::{InterviewError, InterviewResult};
pub use orchestrator::TurnOutcome;
pub use role::{InterviewRole, UnknownRole};
pub use traits::*;

use crate::db::{Database, Feedback, Message, Session, Speaker};
use crate::llm::LlmError;
use locks::SessionLocks;
use std::future::Future;
use std::time::Duration;

/// Default bound on a single collaborator call
pub const DEFAULT_SERVICE_TIMEOUT: Duration = Duration::from_secs(60);

/// Type alias for production service with concrete implementations
pub type ProductionService = InterviewService<Database, LlmInterviewer, LlmAnalyzer>;

pub struct InterviewService<S, I, A> {
    store: S,
    interviewer: I,
    analyzer: A,
    locks: SessionLocks,
    service_timeout: Duration,
}

impl<S, I, A> InterviewService<S, I, A>
where
    S: SessionStore,
    I: Interviewer,
    A: AnswerAnalyzer,
{
    pub fn new(store: S, interviewer: I, analyzer: A, service_timeout: Duration) -> Self {
        Self {
            store,
            interviewer,
            analyzer,
            locks: SessionLocks::new(),
            service_timeout,
        }
    }

    /// Create a session and persist the interviewer's opening question.
    ///
    /// If the opening question cannot be produced the session is removed
    /// again, so every stored session starts with an AI message.
    pub async fn start_session(&self, role: InterviewRole) -> InterviewResult<Session> {
        let session = self.store.create_session(role).await?;

        match self.persist_opening(&session).await {
            Ok(message) => {
                tracing::info!(
                    session_id = %session.id,
                    role = %role,
                    opening_len = message.content.len(),
                    "Session started"
                );
                Ok(session)
            }
            Err(e) => {
                tracing::warn!(session_id = %session.id, role = %role, error = %e, "Opening question failed");
                if let Err(cleanup) = self.store.delete_session(&session.id).await {
                    tracing::error!(session_id = %session.id, error = %cleanup, "Failed to discard session");
                }
                Err(e)
            }
        }
    }

    async fn persist_opening(&self, session: &Session) -> InterviewResult<Message> {
        let question = self
            .bounded(self.interviewer.opening_question(session.role))
            .await?;
        let message = self
            .store
            .add_message(&session.id, Speaker::Ai, &question)
            .await?;
        Ok(message)
    }

    pub async fn get_session(&self, id: &str) -> InterviewResult<Session> {
        self.store
            .get_session(id)
            .await?
            .ok_or_else(|| InterviewError::NotFound(id.to_string()))
    }

    /// All sessions, newest first
    pub async fn list_sessions(&self) -> InterviewResult<Vec<Session>> {
        Ok(self.store.list_sessions().await?)
    }

    /// Transcript in chronological order
    pub async fn get_messages(&self, session_id: &str) -> InterviewResult<Vec<Message>> {
        self.get_session(session_id).await?;
        Ok(self.store.get_messages(session_id).await?)
    }

    /// Per-turn feedback first, then the final summary
    pub async fn get_feedback(&self, session_id: &str) -> InterviewResult<Vec<Feedback>> {
        self.get_session(session_id).await?;
        Ok(self.store.get_feedback(session_id).await?)
    }

    /// Run a collaborator call under the configured deadline
    async fn bounded<T, F>(&self, call: F) -> Result<T, LlmError>
    where
        F: Future<Output = Result<T, LlmError>>,
    {
        tokio::time::timeout(self.service_timeout, call)
            .await
            .unwrap_or_else(|_| Err(LlmError::timeout(self.service_timeout)))
    }
}

//! Turn orchestrator
//!
//! Handles one candidate message: persist it, ask the interviewer for the
//! next turn, and on every second answer ask the analyzer for a critique.

use super::traits::{AnswerAnalyzer, Interviewer, SessionStore, Turn, TurnRole};
use super::{InterviewError, InterviewResult, InterviewService};
use crate::db::{Feedback, Message, Speaker};
use serde::Serialize;

/// Everything one submitted message produced
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    pub user_message: Message,
    pub ai_message: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
}

/// Per-turn feedback fires on the 2nd, 4th, 6th... answer.
///
/// `prior_user_count` is the number of user messages stored before the new
/// one, so the new answer is number `prior_user_count + 1`.
pub fn should_request_turn_feedback(prior_user_count: usize) -> bool {
    prior_user_count % 2 == 1
}

/// Map the stored transcript into the interviewer's history vocabulary
pub fn to_turns(messages: &[Message]) -> Vec<Turn> {
    messages
        .iter()
        .map(|m| Turn {
            role: match m.role {
                Speaker::Ai => TurnRole::Assistant,
                Speaker::User => TurnRole::User,
            },
            content: m.content.clone(),
        })
        .collect()
}

/// The nearest AI message before `index`, or `""` when there is none
pub fn question_for(messages: &[Message], index: usize) -> &str {
    messages
        .iter()
        .take(index)
        .rev()
        .find(|m| m.is_ai())
        .map_or("", |m| m.content.as_str())
}

impl<S, I, A> InterviewService<S, I, A>
where
    S: SessionStore,
    I: Interviewer,
    A: AnswerAnalyzer,
{
    /// Submit the candidate's answer and produce the interviewer's reply.
    ///
    /// The user message is stored before any collaborator call and is kept
    /// when a later step fails.
    pub async fn submit_user_message(
        &self,
        session_id: &str,
        content: &str,
    ) -> InterviewResult<TurnOutcome> {
        let _guard = self.locks.acquire(session_id).await;

        let session = self.get_session(session_id).await?;
        session.status.ensure_active()?;

        if content.trim().is_empty() {
            return Err(InterviewError::Validation(
                "Message content must not be empty".to_string(),
            ));
        }

        let prior_user_count = self.store.count_user_messages(session_id).await?;
        let user_message = self
            .store
            .add_message(session_id, Speaker::User, content)
            .await?;

        let transcript = self.store.get_messages(session_id).await?;
        let reply = self
            .bounded(self.interviewer.respond(session.role, &to_turns(&transcript)))
            .await
            .map_err(|e| {
                tracing::warn!(session_id, error = %e, "Interviewer reply failed");
                e
            })?;
        let ai_message = self
            .store
            .add_message(session_id, Speaker::Ai, &reply)
            .await?;

        let feedback = if should_request_turn_feedback(prior_user_count) {
            let index = transcript
                .iter()
                .position(|m| m.id == user_message.id)
                .unwrap_or(transcript.len());
            let question = question_for(&transcript, index);

            let analysis = self
                .bounded(self.analyzer.analyze(content, question, session.role))
                .await
                .map_err(|e| {
                    tracing::warn!(session_id, error = %e, "Turn analysis failed");
                    e
                })?;
            let stored = self
                .store
                .add_feedback(session_id, Some(&user_message.id), &analysis)
                .await?;
            tracing::info!(
                session_id,
                user_turn = prior_user_count + 1,
                score = stored.overall_score,
                "Per-turn feedback stored"
            );
            Some(stored)
        } else {
            None
        };

        Ok(TurnOutcome {
            user_message,
            ai_message,
            feedback,
        })
    }
}

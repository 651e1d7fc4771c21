//! Collaborator abstractions for the interview core
//!
//! The core only talks to storage and language models through these
//! traits, so tests can swap in the mocks from `testing`.

use super::role::InterviewRole;
use crate::db::{
    AnswerAnalysis, Database, DbResult, Feedback, Message, Session, Speaker,
};
use crate::llm::{LlmError, LlmMessage, LlmRequest, ModelRegistry};
use crate::prompts;
use async_trait::async_trait;
use std::sync::Arc;

/// Speaker vocabulary of the interviewer service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    Assistant,
    User,
}

/// One entry of the history handed to the interviewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

/// Conversation store used by the core
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_session(&self, role: InterviewRole) -> DbResult<Session>;
    async fn get_session(&self, id: &str) -> DbResult<Option<Session>>;
    async fn list_sessions(&self) -> DbResult<Vec<Session>>;
    /// Compare-and-set `active -> completed`
    async fn complete_session(&self, id: &str) -> DbResult<Session>;
    async fn delete_session(&self, id: &str) -> DbResult<()>;

    async fn add_message(&self, session_id: &str, role: Speaker, content: &str)
        -> DbResult<Message>;
    async fn get_messages(&self, session_id: &str) -> DbResult<Vec<Message>>;
    async fn count_user_messages(&self, session_id: &str) -> DbResult<usize>;

    async fn add_feedback(
        &self,
        session_id: &str,
        message_id: Option<&str>,
        analysis: &AnswerAnalysis,
    ) -> DbResult<Feedback>;
    async fn get_feedback(&self, session_id: &str) -> DbResult<Vec<Feedback>>;
}

/// Produces the interviewer's side of the conversation
#[async_trait]
pub trait Interviewer: Send + Sync {
    async fn opening_question(&self, role: InterviewRole) -> Result<String, LlmError>;

    /// Next interviewer turn given the full history, oldest first
    async fn respond(&self, role: InterviewRole, history: &[Turn]) -> Result<String, LlmError>;
}

/// Critiques a single answer
#[async_trait]
pub trait AnswerAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        answer: &str,
        question: &str,
        role: InterviewRole,
    ) -> Result<AnswerAnalysis, LlmError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: Interviewer + ?Sized> Interviewer for Arc<T> {
    async fn opening_question(&self, role: InterviewRole) -> Result<String, LlmError> {
        (**self).opening_question(role).await
    }

    async fn respond(&self, role: InterviewRole, history: &[Turn]) -> Result<String, LlmError> {
        (**self).respond(role, history).await
    }
}

#[async_trait]
impl<T: AnswerAnalyzer + ?Sized> AnswerAnalyzer for Arc<T> {
    async fn analyze(
        &self,
        answer: &str,
        question: &str,
        role: InterviewRole,
    ) -> Result<AnswerAnalysis, LlmError> {
        (**self).analyze(answer, question, role).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

#[async_trait]
impl SessionStore for Database {
    async fn create_session(&self, role: InterviewRole) -> DbResult<Session> {
        Database::create_session(self, role)
    }

    async fn get_session(&self, id: &str) -> DbResult<Option<Session>> {
        Database::get_session(self, id)
    }

    async fn list_sessions(&self) -> DbResult<Vec<Session>> {
        Database::list_sessions(self)
    }

    async fn complete_session(&self, id: &str) -> DbResult<Session> {
        Database::complete_session(self, id)
    }

    async fn delete_session(&self, id: &str) -> DbResult<()> {
        Database::delete_session(self, id)
    }

    async fn add_message(
        &self,
        session_id: &str,
        role: Speaker,
        content: &str,
    ) -> DbResult<Message> {
        Database::add_message(self, session_id, role, content)
    }

    async fn get_messages(&self, session_id: &str) -> DbResult<Vec<Message>> {
        Database::get_messages(self, session_id)
    }

    async fn count_user_messages(&self, session_id: &str) -> DbResult<usize> {
        Database::count_user_messages(self, session_id)
    }

    async fn add_feedback(
        &self,
        session_id: &str,
        message_id: Option<&str>,
        analysis: &AnswerAnalysis,
    ) -> DbResult<Feedback> {
        Database::add_feedback(self, session_id, message_id, analysis)
    }

    async fn get_feedback(&self, session_id: &str) -> DbResult<Vec<Feedback>> {
        Database::get_feedback(self, session_id)
    }
}

const OPENING_MAX_TOKENS: u32 = 300;
const REPLY_MAX_TOKENS: u32 = 500;

/// Interviewer backed by the registry's interview model
pub struct LlmInterviewer {
    registry: Arc<ModelRegistry>,
}

impl LlmInterviewer {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    async fn complete(&self, request: LlmRequest) -> Result<String, LlmError> {
        let llm = self
            .registry
            .interview()
            .ok_or_else(|| LlmError::unavailable("No interview model configured"))?;
        let response = llm.complete(&request).await?;
        Ok(response.text.trim().to_string())
    }
}

#[async_trait]
impl Interviewer for LlmInterviewer {
    async fn opening_question(&self, role: InterviewRole) -> Result<String, LlmError> {
        let request = LlmRequest::new(
            Some(prompts::interviewer_system_prompt(role.script())),
            vec![LlmMessage::user(prompts::OPENING_INSTRUCTION)],
        )
        .with_max_tokens(OPENING_MAX_TOKENS);

        let text = self.complete(request).await?;
        if text.is_empty() {
            return Ok(prompts::FALLBACK_OPENING_QUESTION.to_string());
        }
        Ok(text)
    }

    async fn respond(&self, role: InterviewRole, history: &[Turn]) -> Result<String, LlmError> {
        let messages = history
            .iter()
            .map(|turn| match turn.role {
                TurnRole::Assistant => LlmMessage::assistant(turn.content.as_str()),
                TurnRole::User => LlmMessage::user(turn.content.as_str()),
            })
            .collect();
        let request = LlmRequest::new(
            Some(prompts::interviewer_system_prompt(role.script())),
            messages,
        )
        .with_max_tokens(REPLY_MAX_TOKENS);

        let text = self.complete(request).await?;
        if text.is_empty() {
            return Ok(prompts::FALLBACK_REPLY.to_string());
        }
        Ok(text)
    }
}

/// Analyzer backed by the registry's analysis model
pub struct LlmAnalyzer {
    registry: Arc<ModelRegistry>,
}

impl LlmAnalyzer {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl AnswerAnalyzer for LlmAnalyzer {
    async fn analyze(
        &self,
        answer: &str,
        question: &str,
        role: InterviewRole,
    ) -> Result<AnswerAnalysis, LlmError> {
        let llm = self
            .registry
            .analysis()
            .ok_or_else(|| LlmError::unavailable("No analysis model configured"))?;

        let request = LlmRequest::new(
            Some(prompts::ANALYSIS_SYSTEM.to_string()),
            vec![LlmMessage::user(prompts::analysis_prompt(
                answer,
                question,
                &role.spoken_name(),
            ))],
        )
        .json();

        let response = llm.complete(&request).await?;
        prompts::parse_analysis(&response.text).map_err(LlmError::unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::testing::MockLlm;
    use crate::llm::{LlmErrorKind, MessageRole, ResponseFormat};

    #[tokio::test]
    async fn test_interviewer_maps_history_and_script() {
        let llm = Arc::new(MockLlm::new("mock"));
        llm.queue_text("  What motivates you?  ");
        let interviewer = LlmInterviewer::new(Arc::new(ModelRegistry::single(llm.clone())));

        let history = vec![
            Turn {
                role: TurnRole::Assistant,
                content: "Hi, introduce yourself".to_string(),
            },
            Turn {
                role: TurnRole::User,
                content: "I'm a teacher".to_string(),
            },
        ];
        let reply = interviewer
            .respond(InterviewRole::Teaching, &history)
            .await
            .unwrap();
        assert_eq!(reply, "What motivates you?");

        let requests = llm.recorded_requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert!(request
            .system
            .as_deref()
            .unwrap()
            .starts_with(prompts::TEACHING_SCRIPT));
        assert_eq!(request.messages[0].role, MessageRole::Assistant);
        assert_eq!(request.messages[1].role, MessageRole::User);
        assert_eq!(request.max_tokens, Some(REPLY_MAX_TOKENS));
    }

    #[tokio::test]
    async fn test_empty_output_uses_fallbacks() {
        let llm = Arc::new(MockLlm::new("mock"));
        llm.queue_text("");
        llm.queue_text("   ");
        let interviewer = LlmInterviewer::new(Arc::new(ModelRegistry::single(llm.clone())));

        let opening = interviewer
            .opening_question(InterviewRole::Sales)
            .await
            .unwrap();
        assert_eq!(opening, prompts::FALLBACK_OPENING_QUESTION);

        let reply = interviewer.respond(InterviewRole::Sales, &[]).await.unwrap();
        assert_eq!(reply, prompts::FALLBACK_REPLY);

        let requests = llm.recorded_requests();
        assert_eq!(requests[0].messages[0].content, prompts::OPENING_INSTRUCTION);
        assert_eq!(requests[0].max_tokens, Some(OPENING_MAX_TOKENS));
    }

    #[tokio::test]
    async fn test_analyzer_requests_json_and_parses() {
        let llm = Arc::new(MockLlm::new("mock"));
        llm.queue_text(r#"{"strengths":["clear"],"improvements":[],"suggestions":["use STAR"],"overallScore":4}"#);
        let analyzer = LlmAnalyzer::new(Arc::new(ModelRegistry::single(llm.clone())));

        let analysis = analyzer
            .analyze("I closed a big deal", "Tell me a win", InterviewRole::CustomerService)
            .await
            .unwrap();
        assert_eq!(analysis.strengths, vec!["clear"]);
        assert_eq!(analysis.overall_score, 4);

        let request = &llm.recorded_requests()[0];
        assert_eq!(request.format, ResponseFormat::Json);
        assert!(request.messages[0].content.contains("Role: customer service"));
    }

    #[tokio::test]
    async fn test_analyzer_rejects_unparseable_output() {
        let llm = Arc::new(MockLlm::new("mock"));
        llm.queue_text("Great answer, 5/5");
        let analyzer = LlmAnalyzer::new(Arc::new(ModelRegistry::single(llm)));

        let err = analyzer
            .analyze("a", "q", InterviewRole::Sales)
            .await
            .unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::Unknown);
    }

    #[tokio::test]
    async fn test_missing_model_is_unavailable() {
        let registry = Arc::new(ModelRegistry::new_empty());
        let err = LlmInterviewer::new(registry.clone())
            .opening_question(InterviewRole::Sales)
            .await
            .unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::Unavailable);

        let err = LlmAnalyzer::new(registry)
            .analyze("a", "q", InterviewRole::Sales)
            .await
            .unwrap_err();
        assert!(err.kind.is_unavailable());
    }

    #[tokio::test]
    async fn test_database_store_through_trait() {
        let db = Database::open_in_memory().unwrap();
        let store: &dyn SessionStore = &db;
        let session = store.create_session(InterviewRole::Healthcare).await.unwrap();
        store
            .add_message(&session.id, Speaker::Ai, "Welcome")
            .await
            .unwrap();
        assert_eq!(store.get_messages(&session.id).await.unwrap().len(), 1);
        assert_eq!(store.count_user_messages(&session.id).await.unwrap(), 0);
    }
}

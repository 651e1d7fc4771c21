//! Mock collaborators for testing
//!
//! Each mock serves queued results first and falls back to a fixed answer
//! once its queue is empty, recording every call it receives.

use super::traits::{AnswerAnalyzer, Interviewer, Turn};
use super::{InterviewRole, InterviewService, DEFAULT_SERVICE_TIMEOUT};
use crate::db::{AnswerAnalysis, Database, Message, Speaker};
use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService, ResponseFormat};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory service over the given mocks, plus a handle on its store
pub fn service(
    interviewer: Arc<MockInterviewer>,
    analyzer: Arc<MockAnalyzer>,
) -> (
    InterviewService<Database, Arc<MockInterviewer>, Arc<MockAnalyzer>>,
    Database,
) {
    let db = Database::open_in_memory().unwrap();
    let svc = InterviewService::new(db.clone(), interviewer, analyzer, DEFAULT_SERVICE_TIMEOUT);
    (svc, db)
}

/// Unstored message for exercising the pure helpers
pub fn message(role: Speaker, content: &str) -> Message {
    Message {
        id: uuid::Uuid::new_v4().to_string(),
        session_id: "test".to_string(),
        sequence_id: 0,
        role,
        content: content.to_string(),
        created_at: Utc::now(),
    }
}

// ============================================================================
// Mock Interviewer
// ============================================================================

pub struct MockInterviewer {
    openings: Mutex<VecDeque<Result<String, LlmError>>>,
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    delay: Option<Duration>,
    turn: AtomicUsize,
    /// History passed to every `respond` call
    histories: Mutex<Vec<Vec<Turn>>>,
}

impl MockInterviewer {
    pub fn new() -> Self {
        Self {
            openings: Mutex::new(VecDeque::new()),
            replies: Mutex::new(VecDeque::new()),
            delay: None,
            turn: AtomicUsize::new(0),
            histories: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering, so concurrent callers overlap
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queue_opening(&self, result: Result<String, LlmError>) {
        self.openings.lock().unwrap().push_back(result);
    }

    pub fn queue_reply(&self, result: Result<String, LlmError>) {
        self.replies.lock().unwrap().push_back(result);
    }

    pub fn histories(&self) -> Vec<Vec<Turn>> {
        self.histories.lock().unwrap().clone()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for MockInterviewer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Interviewer for MockInterviewer {
    async fn opening_question(&self, role: InterviewRole) -> Result<String, LlmError> {
        self.pause().await;
        let queued = self.openings.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| Ok(format!("Welcome to your {} interview.", role.title())))
    }

    async fn respond(&self, _role: InterviewRole, history: &[Turn]) -> Result<String, LlmError> {
        self.histories.lock().unwrap().push(history.to_vec());
        self.pause().await;
        let n = self.turn.fetch_add(1, Ordering::SeqCst) + 1;
        let queued = self.replies.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| Ok(format!("Follow-up question {n}")))
    }
}

// ============================================================================
// Mock Analyzer
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerCall {
    pub answer: String,
    pub question: String,
    pub role: InterviewRole,
}

pub struct MockAnalyzer {
    results: Mutex<VecDeque<Result<AnswerAnalysis, LlmError>>>,
    calls: Mutex<Vec<AnalyzerCall>>,
}

impl MockAnalyzer {
    pub fn new() -> Self {
        Self {
            results: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Analysis returned once the queue is empty
    pub fn default_analysis() -> AnswerAnalysis {
        AnswerAnalysis {
            strengths: vec!["clear".to_string()],
            improvements: vec!["more detail".to_string()],
            suggestions: vec!["use a concrete example".to_string()],
            overall_score: 3,
        }
    }

    pub fn queue(&self, result: Result<AnswerAnalysis, LlmError>) {
        self.results.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> Vec<AnalyzerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Default for MockAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnswerAnalyzer for MockAnalyzer {
    async fn analyze(
        &self,
        answer: &str,
        question: &str,
        role: InterviewRole,
    ) -> Result<AnswerAnalysis, LlmError> {
        self.calls.lock().unwrap().push(AnalyzerCall {
            answer: answer.to_string(),
            question: question.to_string(),
            role,
        });
        let queued = self.results.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| Ok(Self::default_analysis()))
    }
}

// ============================================================================
// Mock LLM
// ============================================================================

/// Model stand-in for exercising the production adapters
pub struct MockLlm {
    model_id: String,
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlm {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_text(&self, text: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(LlmResponse::from_text(text)));
    }

    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlm {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let queued = self.responses.lock().unwrap().pop_front();
        queued.unwrap_or_else(|| {
            let text = match request.format {
                ResponseFormat::Json => {
                    r#"{"strengths":["clear"],"improvements":["more depth"],"suggestions":["quantify results"],"overallScore":4}"#
                }
                ResponseFormat::Text => "Could you walk me through a specific example?",
            };
            Ok(LlmResponse::from_text(text))
        })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

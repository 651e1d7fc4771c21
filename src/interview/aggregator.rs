//! Feedback aggregator
//!
//! Ending a session re-analyzes every (question, answer) pair of the
//! transcript and reduces the results into one final summary. Strings are
//! ranked by exact-match frequency; near-duplicates are not merged.

use super::traits::{AnswerAnalyzer, Interviewer, SessionStore};
use super::{InterviewError, InterviewResult, InterviewRole, InterviewService};
use crate::db::{AnswerAnalysis, Message};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const TOP_STRENGTHS: usize = 3;
const TOP_IMPROVEMENTS: usize = 3;
const TOP_SUGGESTIONS: usize = 5;

/// Suggestion recorded for a pair the analyzer could not handle
pub const UNANALYZED_SUGGESTION: &str = "Could not analyze this response.";

/// One candidate answer and the question it responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QaPair<'a> {
    pub question: &'a str,
    pub answer: &'a str,
}

/// Critique of one pair in the final report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairFeedback {
    pub question: String,
    pub answer: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub suggestions: Vec<String>,
    pub overall_score: u8,
}

impl PairFeedback {
    fn analyzed(pair: QaPair<'_>, analysis: AnswerAnalysis) -> Self {
        Self {
            question: pair.question.to_string(),
            answer: pair.answer.to_string(),
            strengths: analysis.strengths,
            improvements: analysis.improvements,
            suggestions: analysis.suggestions,
            overall_score: analysis.overall_score,
        }
    }

    /// Placeholder that keeps one failed pair from sinking the batch
    fn unanalyzed(pair: QaPair<'_>) -> Self {
        Self {
            question: pair.question.to_string(),
            answer: pair.answer.to_string(),
            strengths: Vec::new(),
            improvements: Vec::new(),
            suggestions: vec![UNANALYZED_SUGGESTION.to_string()],
            overall_score: 0,
        }
    }
}

/// Session-level summary returned when an interview ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalFeedback {
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub suggestions: Vec<String>,
    pub overall_score: u8,
    pub detailed: Vec<PairFeedback>,
}

impl FinalFeedback {
    /// The part of the summary that is persisted
    pub fn summary(&self) -> AnswerAnalysis {
        AnswerAnalysis {
            strengths: self.strengths.clone(),
            improvements: self.improvements.clone(),
            suggestions: self.suggestions.clone(),
            overall_score: self.overall_score,
        }
    }
}

/// Pair every user message with the nearest AI message before it
pub fn pair_answers(messages: &[Message]) -> Vec<QaPair<'_>> {
    let mut pairs = Vec::new();
    let mut question = "";
    for m in messages {
        if m.is_user() {
            pairs.push(QaPair {
                question,
                answer: &m.content,
            });
        } else {
            question = &m.content;
        }
    }
    pairs
}

/// The `n` most frequent distinct strings, ties in first-seen order
pub fn top_n<'a, L>(lists: L, n: usize) -> Vec<String>
where
    L: IntoIterator<Item = &'a [String]>,
{
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for item in lists.into_iter().flatten() {
        let count = counts.entry(item.as_str()).or_insert(0);
        if *count == 0 {
            order.push(item.as_str());
        }
        *count += 1;
    }

    // Stable sort keeps first-seen order among equal counts
    order.sort_by(|a, b| counts[b].cmp(&counts[a]));
    order.into_iter().take(n).map(String::from).collect()
}

/// Mean score rounded half-up, 0 for no scores
pub fn mean_score(scores: &[u8]) -> u8 {
    if scores.is_empty() {
        return 0;
    }
    let sum: usize = scores.iter().map(|&s| usize::from(s)).sum();
    let n = scores.len();
    let rounded = (2 * sum + n) / (2 * n);
    u8::try_from(rounded).unwrap_or(u8::MAX)
}

/// Reduce per-pair critiques into the final summary
pub fn reduce(detailed: Vec<PairFeedback>) -> FinalFeedback {
    let strengths = top_n(detailed.iter().map(|p| p.strengths.as_slice()), TOP_STRENGTHS);
    let improvements = top_n(
        detailed.iter().map(|p| p.improvements.as_slice()),
        TOP_IMPROVEMENTS,
    );
    let suggestions = top_n(
        detailed.iter().map(|p| p.suggestions.as_slice()),
        TOP_SUGGESTIONS,
    );
    let scores: Vec<u8> = detailed.iter().map(|p| p.overall_score).collect();

    FinalFeedback {
        strengths,
        improvements,
        suggestions,
        overall_score: mean_score(&scores),
        detailed,
    }
}

impl<S, I, A> InterviewService<S, I, A>
where
    S: SessionStore,
    I: Interviewer,
    A: AnswerAnalyzer,
{
    /// Complete the session, then analyze the whole transcript.
    ///
    /// The status change commits first. If aggregation fails afterwards the
    /// session stays completed without a final feedback record.
    pub async fn end_session(&self, session_id: &str) -> InterviewResult<FinalFeedback> {
        let _guard = self.locks.acquire(session_id).await;

        let session = self.get_session(session_id).await?;
        session.status.complete()?;
        let session = self.store.complete_session(session_id).await?;
        tracing::info!(session_id, role = %session.role, "Session completed");

        self.aggregate(session_id, session.role).await
    }

    async fn aggregate(
        &self,
        session_id: &str,
        role: InterviewRole,
    ) -> InterviewResult<FinalFeedback> {
        let transcript = self
            .store
            .get_messages(session_id)
            .await
            .map_err(|e| InterviewError::Aggregation(e.to_string()))?;
        let pairs = pair_answers(&transcript);

        let mut detailed = Vec::with_capacity(pairs.len());
        for pair in &pairs {
            match self
                .bounded(self.analyzer.analyze(pair.answer, pair.question, role))
                .await
            {
                Ok(analysis) => detailed.push(PairFeedback::analyzed(*pair, analysis)),
                Err(e) if e.kind.is_unavailable() => {
                    tracing::error!(session_id, error = %e, "Analyzer unavailable, no final feedback");
                    return Err(InterviewError::Aggregation(e.to_string()));
                }
                Err(e) => {
                    tracing::warn!(session_id, error = %e, "Pair analysis failed, using placeholder");
                    detailed.push(PairFeedback::unanalyzed(*pair));
                }
            }
        }

        let report = reduce(detailed);
        self.store
            .add_feedback(session_id, None, &report.summary())
            .await
            .map_err(|e| InterviewError::Aggregation(e.to_string()))?;

        tracing::info!(
            session_id,
            pairs = pairs.len(),
            score = report.overall_score,
            "Final feedback stored"
        );
        Ok(report)
    }
}

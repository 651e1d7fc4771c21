//! Interviewer scripts and answer-analysis prompts
//!
//! The scripts are the system prompts for each role. The analysis prompt
//! asks the model for a JSON critique which `parse_analysis` turns into an
//! `AnswerAnalysis`.

use crate::db::AnswerAnalysis;
use serde_json::Value;

/// Shared conduct rules appended to every role script
const CONDUCT_RULES: &str = r#"
Conversation rules:
- Ask one question at a time and wait for the answer.
- If the candidate is confused, offer a hint or split the question into smaller parts.
- If the candidate drifts off-topic, steer back politely: "Let's return to the question."
- If an answer is vague, ask for a concrete example.
- If an answer is incorrect, do not say "that is wrong". Invite a second attempt; after two attempts give a short explanation and move on.
- Raise the difficulty after strong answers and lower it when the candidate struggles.
- Keep replies short enough to be read aloud. Do not reveal scores."#;

pub const SOFTWARE_ENGINEER_SCRIPT: &str = r"You are an experienced technical interviewer running a voice-based software engineering interview.

Interview flow:
1. Greet the candidate and ask them to introduce themselves. Note their experience level, tech stack, and strong and weak areas.
2. Ask one or two follow-up questions about their introduction.
3. Behavioral questions: teamwork, conflict, debugging approach, ownership, learning.
4. Technical questions from easy to hard: data structures, algorithms, reasoning about code, high-level system design, optimization.
5. Probe each technical answer with a deeper follow-up.

Seniors get architecture-level questions; juniors get fundamentals. Tone: warm, natural, structured.";

pub const PRODUCT_MANAGER_SCRIPT: &str = r"You are a senior product manager running a voice-based PM interview.

Interview flow:
1. Greeting and introduction.
2. Follow-ups on the introduction.
3. Behavioral questions: leadership, ambiguity, product ownership.
4. Product sense: metrics, prioritization, trade-offs, problem framing.
5. Strategy and situational questions, with follow-ups that test depth.

Encourage structured answers and frameworks. Tone: analytical and curious.";

pub const RETAIL_ASSOCIATE_SCRIPT: &str = r"You are a retail store manager interviewing a candidate for a retail associate position.

Interview flow:
1. Greeting and introduction.
2. Follow-ups on customer service experience.
3. Situational retail scenarios: busy shifts, returns, difficult customers.
4. Reliability, empathy, teamwork, and sales approach.

Tone: friendly and practical.";

pub const CUSTOMER_SERVICE_SCRIPT: &str = r"You are a customer service manager interviewing a candidate for a customer service representative role.

Interview flow: greeting, introduction, behavioral questions, customer scenarios, problem resolution, empathy, and handling upset customers.

Tone: supportive and scenario-based.";

pub const SALES_SCRIPT: &str = r"You are a sales director running a voice-based interview for a sales position.

Interview flow: greeting, introduction, follow-ups, behavioral questions, persuasion, objection handling, negotiation reasoning, pipeline management, and closing style.

Tone: direct and results-oriented.";

pub const HEALTHCARE_SCRIPT: &str = r"You are a healthcare administrator interviewing a candidate for a healthcare position.

Interview flow: greeting, introduction, follow-ups, medical ethics, patient care, emergency scenarios, teamwork in clinical settings, and staying professional under pressure.

Tone: empathetic but thorough.";

pub const TEACHING_SCRIPT: &str = r"You are a school principal interviewing a candidate for a teaching position.

Interview flow: greeting, introduction, follow-ups, pedagogy, classroom management, student conflict, lesson planning, assessment, and supporting diverse learners.

Tone: thoughtful and focused on student outcomes.";

/// Instruction sent as the only user turn when opening an interview
pub const OPENING_INSTRUCTION: &str =
    "Start the interview with a warm greeting and your first question.";

/// Used when the model returns an empty opening question
pub const FALLBACK_OPENING_QUESTION: &str =
    "Welcome! Let's begin with: Tell me about yourself and why you're interested in this role.";

/// Used when the model returns an empty interviewer reply
pub const FALLBACK_REPLY: &str = "I apologize, but I need you to repeat that.";

/// System instruction for the analysis call
pub const ANALYSIS_SYSTEM: &str =
    "You are an expert interview coach providing constructive feedback. Always respond with valid JSON.";

/// Score used when the model omits one
const DEFAULT_SCORE: u8 = 3;

/// Full system prompt for an interviewer turn
pub fn interviewer_system_prompt(script: &str) -> String {
    format!("{script}\n{CONDUCT_RULES}")
}

/// Build the analysis prompt for one answer
pub fn analysis_prompt(answer: &str, question: &str, role_name: &str) -> String {
    format!(
        r"As an expert interview coach, analyze this interview response:

Question: {question}
Role: {role_name}
Candidate's Response: {answer}

Provide constructive feedback in JSON format with:
- strengths: array of 2-3 specific strengths
- improvements: array of 2-3 areas for improvement
- suggestions: array of 2-3 actionable suggestions
- overallScore: rating from 1-5

Focus on communication clarity, relevance, depth of answer, and role-specific competencies."
    )
}

/// Parse the model's JSON critique.
///
/// Tolerates a surrounding markdown code fence. Missing lists become empty,
/// non-string list entries are dropped, and the score is rounded and clamped
/// into 1..=5 (3 when absent).
pub fn parse_analysis(text: &str) -> Result<AnswerAnalysis, String> {
    let body = strip_code_fence(text);
    let value: Value =
        serde_json::from_str(body).map_err(|e| format!("analysis is not valid JSON: {e}"))?;

    let Value::Object(obj) = value else {
        return Err("analysis is not a JSON object".to_string());
    };

    let score = obj
        .get("overallScore")
        .or_else(|| obj.get("overall_score"))
        .and_then(Value::as_f64)
        .map_or(DEFAULT_SCORE, clamp_score);

    Ok(AnswerAnalysis {
        strengths: string_list(obj.get("strengths")),
        improvements: string_list(obj.get("improvements")),
        suggestions: string_list(obj.get("suggestions")),
        overall_score: score,
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return DEFAULT_SCORE;
    }
    // clamped to 1..=5 before the cast
    raw.round().clamp(1.0, 5.0) as u8
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence line
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let text = r#"{"strengths":["clear"],"improvements":["depth"],"suggestions":["STAR"],"overallScore":4}"#;
        let analysis = parse_analysis(text).unwrap();
        assert_eq!(analysis.strengths, vec!["clear"]);
        assert_eq!(analysis.improvements, vec!["depth"]);
        assert_eq!(analysis.suggestions, vec!["STAR"]);
        assert_eq!(analysis.overall_score, 4);
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = "```json\n{\"strengths\": [\"concise\"], \"overallScore\": 5}\n```";
        let analysis = parse_analysis(text).unwrap();
        assert_eq!(analysis.strengths, vec!["concise"]);
        assert!(analysis.improvements.is_empty());
        assert_eq!(analysis.overall_score, 5);
    }

    #[test]
    fn test_score_is_rounded_and_clamped() {
        assert_eq!(parse_analysis(r#"{"overallScore": 3.6}"#).unwrap().overall_score, 4);
        assert_eq!(parse_analysis(r#"{"overallScore": 9}"#).unwrap().overall_score, 5);
        assert_eq!(parse_analysis(r#"{"overallScore": 0}"#).unwrap().overall_score, 1);
        assert_eq!(parse_analysis(r"{}").unwrap().overall_score, 3);
        assert_eq!(parse_analysis(r#"{"overall_score": 2}"#).unwrap().overall_score, 2);
    }

    #[test]
    fn test_non_string_entries_dropped() {
        let analysis = parse_analysis(r#"{"strengths": ["ok", 3, null, "  "]}"#).unwrap();
        assert_eq!(analysis.strengths, vec!["ok"]);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(parse_analysis("Great answer!").is_err());
        assert!(parse_analysis("[1, 2]").is_err());
    }

    #[test]
    fn test_analysis_prompt_mentions_inputs() {
        let prompt = analysis_prompt("I led the team", "Tell me about leadership", "sales");
        assert!(prompt.contains("Question: Tell me about leadership"));
        assert!(prompt.contains("Role: sales"));
        assert!(prompt.contains("Candidate's Response: I led the team"));
    }

    #[test]
    fn test_interviewer_prompt_includes_rules() {
        let prompt = interviewer_system_prompt(SALES_SCRIPT);
        assert!(prompt.starts_with("You are a sales director"));
        assert!(prompt.contains("Ask one question at a time"));
    }
}

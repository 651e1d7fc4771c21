//! Database module for the interview coach
//!
//! Provides persistence for sessions, their transcripts, and feedback.

mod schema;

pub use schema::*;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Session not found: {0}")]
    SessionNotFound(String),
    #[error("Session is not active: {0}")]
    SessionNotActive(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

const SESSION_COLUMNS: &str = "id, role, status, created_at, completed_at";
const MESSAGE_COLUMNS: &str = "message_id, session_id, sequence_id, role, content, created_at";
const FEEDBACK_COLUMNS: &str =
    "feedback_id, session_id, message_id, strengths, improvements, suggestions, overall_score, created_at";

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A poisoned lock means a panic mid-statement; SQLite rolled the
        // statement back, so the connection itself is still usable.
        self.conn
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Run raw SQL against the store, for simulating storage faults
    #[cfg(test)]
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.lock().execute_batch(sql)?;
        Ok(())
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.lock();
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Session Operations ====================

    /// Create a new active session
    pub fn create_session(&self, role: InterviewRole) -> DbResult<Session> {
        let conn = self.lock();
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO sessions (id, role, status, created_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, NULL)",
            params![id, role.id(), SessionStatus::Active.as_str(), format_datetime(now)],
        )?;

        Ok(Session {
            id,
            role,
            status: SessionStatus::Active,
            created_at: now,
            completed_at: None,
        })
    }

    /// Get session by ID
    pub fn get_session(&self, id: &str) -> DbResult<Option<Session>> {
        let conn = self.lock();
        let mut stmt =
            conn.prepare(&format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"))?;
        stmt.query_row(params![id], parse_session_row)
            .optional()
            .map_err(DbError::from)
    }

    /// List all sessions, newest first
    pub fn list_sessions(&self) -> DbResult<Vec<Session>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt.query_map([], parse_session_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Move a session from active to completed, stamping `completed_at`.
    ///
    /// The update only applies to an active row, so two racing callers
    /// cannot both complete the same session.
    pub fn complete_session(&self, id: &str) -> DbResult<Session> {
        let conn = self.lock();
        let now = Utc::now();

        let updated = conn.execute(
            "UPDATE sessions SET status = ?1, completed_at = ?2 WHERE id = ?3 AND status = ?4",
            params![
                SessionStatus::Completed.as_str(),
                format_datetime(now),
                id,
                SessionStatus::Active.as_str()
            ],
        )?;

        let mut stmt =
            conn.prepare(&format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"))?;
        let session = stmt
            .query_row(params![id], parse_session_row)
            .optional()?
            .ok_or_else(|| DbError::SessionNotFound(id.to_string()))?;

        if updated == 0 {
            return Err(DbError::SessionNotActive(id.to_string()));
        }
        Ok(session)
    }

    /// Delete a session and everything attached to it
    pub fn delete_session(&self, id: &str) -> DbResult<()> {
        let conn = self.lock();
        let deleted = conn.execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(DbError::SessionNotFound(id.to_string()));
        }
        Ok(())
    }

    // ==================== Message Operations ====================

    /// Append a message to a session's transcript
    pub fn add_message(&self, session_id: &str, role: Speaker, content: &str) -> DbResult<Message> {
        let conn = self.lock();
        let now = Utc::now();
        let message_id = uuid::Uuid::new_v4().to_string();

        let exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sessions WHERE id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(DbError::SessionNotFound(session_id.to_string()));
        }

        // Get next sequence ID
        let sequence_id: i64 = conn.query_row(
            "SELECT COALESCE(MAX(sequence_id), 0) + 1 FROM messages WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;

        conn.execute(
            "INSERT INTO messages (message_id, session_id, sequence_id, role, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                message_id,
                session_id,
                sequence_id,
                role.as_str(),
                content,
                format_datetime(now)
            ],
        )?;

        Ok(Message {
            id: message_id,
            session_id: session_id.to_string(),
            sequence_id,
            role,
            content: content.to_string(),
            created_at: now,
        })
    }

    /// Get the transcript of a session in chronological order
    pub fn get_messages(&self, session_id: &str) -> DbResult<Vec<Message>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages WHERE session_id = ?1 ORDER BY sequence_id ASC"
        ))?;
        let rows = stmt.query_map(params![session_id], parse_message_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Count the candidate's messages in a session
    pub fn count_user_messages(&self, session_id: &str) -> DbResult<usize> {
        let conn = self.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE session_id = ?1 AND role = ?2",
            params![session_id, Speaker::User.as_str()],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    // ==================== Feedback Operations ====================

    /// Store a feedback record. `message_id = None` stores the final summary.
    pub fn add_feedback(
        &self,
        session_id: &str,
        message_id: Option<&str>,
        analysis: &AnswerAnalysis,
    ) -> DbResult<Feedback> {
        let conn = self.lock();
        let now = Utc::now();
        let feedback_id = uuid::Uuid::new_v4().to_string();

        conn.execute(
            "INSERT INTO feedback (feedback_id, session_id, message_id, strengths, improvements, suggestions, overall_score, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                feedback_id,
                session_id,
                message_id,
                encode_list(&analysis.strengths),
                encode_list(&analysis.improvements),
                encode_list(&analysis.suggestions),
                analysis.overall_score,
                format_datetime(now),
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                DbError::SessionNotFound(session_id.to_string())
            }
            other => DbError::Sqlite(other),
        })?;

        Ok(Feedback {
            id: feedback_id,
            session_id: session_id.to_string(),
            message_id: message_id.map(String::from),
            strengths: analysis.strengths.clone(),
            improvements: analysis.improvements.clone(),
            suggestions: analysis.suggestions.clone(),
            overall_score: analysis.overall_score,
            created_at: now,
        })
    }

    /// Get a session's feedback: per-turn records first, then the final
    /// summary, each group in creation order.
    pub fn get_feedback(&self, session_id: &str) -> DbResult<Vec<Feedback>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE session_id = ?1
             ORDER BY (message_id IS NULL) ASC, seq ASC"
        ))?;
        let rows = stmt.query_map(params![session_id], parse_feedback_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Get the final (session-level) feedback record, if one was produced
    #[allow(dead_code)] // API completeness
    pub fn get_final_feedback(&self, session_id: &str) -> DbResult<Option<Feedback>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE session_id = ?1 AND message_id IS NULL
             ORDER BY seq ASC LIMIT 1"
        ))?;
        stmt.query_row(params![session_id], parse_feedback_row)
            .optional()
            .map_err(DbError::from)
    }
}

fn parse_session_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        role: InterviewRole::from_id_lossy(&row.get::<_, String>(1)?),
        status: SessionStatus::parse(&row.get::<_, String>(2)?),
        created_at: parse_datetime(&row.get::<_, String>(3)?),
        completed_at: row
            .get::<_, Option<String>>(4)?
            .map(|s| parse_datetime(&s)),
    })
}

fn parse_message_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let role_str: String = row.get(3)?;
    let role = Speaker::parse(&role_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown message role: {role_str}").into(),
        )
    })?;

    Ok(Message {
        id: row.get(0)?,
        session_id: row.get(1)?,
        sequence_id: row.get(2)?,
        role,
        content: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

fn parse_feedback_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Feedback> {
    Ok(Feedback {
        id: row.get(0)?,
        session_id: row.get(1)?,
        message_id: row.get(2)?,
        strengths: decode_list(&row.get::<_, String>(3)?),
        improvements: decode_list(&row.get::<_, String>(4)?),
        suggestions: decode_list(&row.get::<_, String>(5)?),
        overall_score: row.get(6)?,
        created_at: parse_datetime(&row.get::<_, String>(7)?),
    })
}

fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

fn decode_list(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}

fn format_datetime(dt: DateTime<Utc>) -> String {
    // Fixed-width timestamps keep lexical ORDER BY chronological
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(strength: &str, score: u8) -> AnswerAnalysis {
        AnswerAnalysis {
            strengths: vec![strength.to_string()],
            improvements: vec!["be specific".to_string()],
            suggestions: vec![],
            overall_score: score,
        }
    }

    #[test]
    fn test_create_and_get_session() {
        let db = Database::open_in_memory().unwrap();

        let session = db.create_session(InterviewRole::Sales).unwrap();
        assert_eq!(session.role, InterviewRole::Sales);
        assert_eq!(session.status, SessionStatus::Active);
        assert!(session.completed_at.is_none());

        let fetched = db.get_session(&session.id).unwrap().unwrap();
        assert_eq!(fetched.id, session.id);
        assert_eq!(fetched.role, InterviewRole::Sales);

        assert!(db.get_session("missing").unwrap().is_none());
    }

    #[test]
    fn test_list_sessions_newest_first() {
        let db = Database::open_in_memory().unwrap();

        let first = db.create_session(InterviewRole::Teaching).unwrap();
        let second = db.create_session(InterviewRole::Healthcare).unwrap();

        let sessions = db.list_sessions().unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, second.id);
        assert_eq!(sessions[1].id, first.id);
    }

    #[test]
    fn test_complete_session_only_once() {
        let db = Database::open_in_memory().unwrap();
        let session = db.create_session(InterviewRole::SoftwareEngineer).unwrap();

        let completed = db.complete_session(&session.id).unwrap();
        assert_eq!(completed.status, SessionStatus::Completed);
        assert!(completed.completed_at.is_some());

        assert!(matches!(
            db.complete_session(&session.id),
            Err(DbError::SessionNotActive(_))
        ));
        assert!(matches!(
            db.complete_session("missing"),
            Err(DbError::SessionNotFound(_))
        ));

        let fetched = db.get_session(&session.id).unwrap().unwrap();
        assert_eq!(fetched.completed_at, completed.completed_at);
    }

    #[test]
    fn test_add_and_get_messages() {
        let db = Database::open_in_memory().unwrap();
        let session = db.create_session(InterviewRole::Sales).unwrap();

        let msg1 = db.add_message(&session.id, Speaker::Ai, "Tell me about yourself").unwrap();
        let msg2 = db.add_message(&session.id, Speaker::User, "I sell things").unwrap();

        assert_eq!(msg1.sequence_id, 1);
        assert_eq!(msg2.sequence_id, 2);

        let messages = db.get_messages(&session.id).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Speaker::Ai);
        assert_eq!(messages[1].content, "I sell things");
        assert_eq!(db.count_user_messages(&session.id).unwrap(), 1);
    }

    #[test]
    fn test_add_message_unknown_session() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.add_message("missing", Speaker::User, "hello"),
            Err(DbError::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_feedback_ordering_per_turn_before_final() {
        let db = Database::open_in_memory().unwrap();
        let session = db.create_session(InterviewRole::Sales).unwrap();
        db.add_message(&session.id, Speaker::Ai, "Q1").unwrap();
        let a1 = db.add_message(&session.id, Speaker::User, "A1").unwrap();
        db.add_message(&session.id, Speaker::Ai, "Q2").unwrap();
        let a2 = db.add_message(&session.id, Speaker::User, "A2").unwrap();

        db.add_feedback(&session.id, Some(&a1.id), &analysis("first", 3)).unwrap();
        // A final record written before a later per-turn record still sorts last
        db.add_feedback(&session.id, None, &analysis("final", 4)).unwrap();
        db.add_feedback(&session.id, Some(&a2.id), &analysis("second", 5)).unwrap();

        let feedback = db.get_feedback(&session.id).unwrap();
        let labels: Vec<_> = feedback.iter().map(|f| f.strengths[0].as_str()).collect();
        assert_eq!(labels, vec!["first", "second", "final"]);
        assert!(feedback[2].is_final());

        let final_fb = db.get_final_feedback(&session.id).unwrap().unwrap();
        assert_eq!(final_fb.overall_score, 4);
        assert_eq!(final_fb.improvements, vec!["be specific".to_string()]);
    }

    #[test]
    fn test_delete_session_cascades() {
        let db = Database::open_in_memory().unwrap();
        let session = db.create_session(InterviewRole::Sales).unwrap();
        let msg = db.add_message(&session.id, Speaker::User, "hi").unwrap();
        db.add_feedback(&session.id, Some(&msg.id), &analysis("x", 2)).unwrap();

        db.delete_session(&session.id).unwrap();

        assert!(db.get_session(&session.id).unwrap().is_none());
        assert!(db.get_messages(&session.id).unwrap().is_empty());
        assert!(db.get_feedback(&session.id).unwrap().is_empty());
        assert!(matches!(
            db.delete_session(&session.id),
            Err(DbError::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_file_backed_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interview.db");

        let id = {
            let db = Database::open(&path).unwrap();
            let session = db.create_session(InterviewRole::ProductManager).unwrap();
            db.add_message(&session.id, Speaker::Ai, "Welcome").unwrap();
            session.id
        };

        let reopened = Database::open(&path).unwrap();
        let session = reopened.get_session(&id).unwrap().unwrap();
        assert_eq!(session.role, InterviewRole::ProductManager);
        assert_eq!(reopened.get_messages(&id).unwrap().len(), 1);
    }
}

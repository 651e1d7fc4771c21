//! HTTP request handlers

use super::types::{
    CreateSessionRequest, EndSessionResponse, ErrorResponse, ModelsResponse, RoleInfo,
    SendMessageRequest,
};
use super::AppState;
use crate::db::{Feedback, Message, Session, SessionStatus};
use crate::interview::{InterviewError, InterviewRole, TurnOutcome};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Sessions
        .route("/api/sessions", get(list_sessions).post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/end", post(end_session))
        // Transcript
        .route(
            "/api/sessions/:id/messages",
            get(get_messages).post(send_message),
        )
        .route("/api/sessions/:id/feedback", get(get_feedback))
        // Catalogue
        .route("/api/roles", get(list_roles))
        .route("/api/models", get(list_models))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Sessions
// ============================================================

async fn list_sessions(State(state): State<AppState>) -> Result<Json<Vec<Session>>, AppError> {
    Ok(Json(state.service.list_sessions().await?))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>, AppError> {
    Ok(Json(state.service.get_session(&id).await?))
}

async fn create_session(
    State(state): State<AppState>,
    body: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<Json<Session>, AppError> {
    let Json(req) = body?;
    let role: InterviewRole = req
        .role
        .parse()
        .map_err(|e: crate::interview::UnknownRole| AppError::BadRequest(e.to_string()))?;

    if let Some(status) = req.status.as_deref() {
        if status != SessionStatus::Active.as_str() {
            return Err(AppError::BadRequest(format!(
                "New sessions must be active, got: {status}"
            )));
        }
    }

    Ok(Json(state.service.start_session(role).await?))
}

async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EndSessionResponse>, AppError> {
    let feedback = state.service.end_session(&id).await?;
    Ok(Json(EndSessionResponse {
        success: true,
        feedback,
    }))
}

// ============================================================
// Transcript
// ============================================================

async fn get_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Message>>, AppError> {
    Ok(Json(state.service.get_messages(&id).await?))
}

async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<TurnOutcome>, AppError> {
    let Json(req) = body?;
    Ok(Json(
        state.service.submit_user_message(&id, &req.content).await?,
    ))
}

async fn get_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Feedback>>, AppError> {
    Ok(Json(state.service.get_feedback(&id).await?))
}

// ============================================================
// Catalogue
// ============================================================

async fn list_roles() -> Json<Vec<RoleInfo>> {
    Json(InterviewRole::ALL.into_iter().map(RoleInfo::from).collect())
}

async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    let registry = &state.llm_registry;
    Json(ModelsResponse {
        models: registry.available_model_info(),
        default: registry.default_model_id().to_string(),
        interview_model: registry.interview_model_id().to_string(),
        analysis_model: registry.analysis_model_id().to_string(),
    })
}

async fn get_version() -> &'static str {
    concat!("interview-coach ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<InterviewError> for AppError {
    fn from(e: InterviewError) -> Self {
        match e {
            InterviewError::NotFound(_) => AppError::NotFound(e.to_string()),
            InterviewError::InvalidState(_) | InterviewError::Validation(_) => {
                AppError::BadRequest(e.to_string())
            }
            InterviewError::Service(_)
            | InterviewError::Aggregation(_)
            | InterviewError::Storage(_) => {
                tracing::error!(error = %e, "Request failed");
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

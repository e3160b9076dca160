//! HTTP handlers for the REST API.
//!
//! Each handler parses and validates its input before any storage call,
//! invokes the repository, and shapes the response DTO. Error-to-status
//! mapping lives in [`AppError`].

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::dto::{
    AnswerResponse, CreateAnswerRequest, CreateQuestionRequest, HealthResponse,
    QuestionResponse, QuestionWithAnswersResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::models::{AnswerId, QuestionId};
use crate::validation::require_non_blank;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

/// Result type for handlers that create a resource.
pub type CreatedResult<T> = Result<(StatusCode, Json<T>), AppError>;

/// Decode the first JSON value of a body regardless of `Content-Type`.
///
/// Anything after that value is left unread.
fn decode_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    match serde_json::Deserializer::from_slice(body).into_iter::<T>().next() {
        Some(Ok(value)) => Ok(value),
        _ => Err(AppError::BadRequest("Invalid request body".into())),
    }
}

fn parse_question_id(raw: &str) -> Result<QuestionId, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid question ID".into()))
}

fn parse_answer_id(raw: &str) -> Result<AnswerId, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid answer ID".into()))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

// =============================================================================
// Questions
// =============================================================================

/// GET /questions/
///
/// List all questions. Answers are not loaded.
pub async fn list_questions(
    State(state): State<AppState>,
) -> HandlerResult<Vec<QuestionResponse>> {
    let questions = state.repository.list_questions().await?;
    Ok(Json(questions.into_iter().map(Into::into).collect()))
}

/// POST /questions/
///
/// Body: `{"text": "..."}`. Responds 201 with the stored question.
pub async fn create_question(
    State(state): State<AppState>,
    body: Bytes,
) -> CreatedResult<QuestionResponse> {
    let request: CreateQuestionRequest = decode_body(&body)?;
    require_non_blank("text", &request.text)?;

    let question = state.repository.create_question(&request.text).await?;
    info!(question_id = %question.id, "question created");

    Ok((StatusCode::CREATED, Json(question.into())))
}

/// GET /questions/{id}
///
/// The question with every answer currently attached to it.
pub async fn get_question(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> HandlerResult<QuestionWithAnswersResponse> {
    let id = parse_question_id(&raw_id)?;
    let question = state.repository.get_question_with_answers(id).await?;
    Ok(Json(question.into()))
}

/// DELETE /questions/{id}
///
/// Answers are removed by the storage cascade. Responds 204 whether or not
/// the question existed.
pub async fn delete_question(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_question_id(&raw_id)?;
    if !state.repository.delete_question(id).await? {
        debug!(question_id = %id, "delete requested for missing question");
    }
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Answers
// =============================================================================

/// POST /questions/{id}/answers/
///
/// Body: `{"user_id": "...", "text": "..."}`. The question must exist.
pub async fn create_answer(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> CreatedResult<AnswerResponse> {
    let question_id = parse_question_id(&raw_id)?;
    let request: CreateAnswerRequest = decode_body(&body)?;
    require_non_blank("user_id", &request.user_id)?;
    require_non_blank("text", &request.text)?;

    // NotFound here becomes 404; anything else is a 500.
    state.repository.get_question(question_id).await?;

    let answer = state
        .repository
        .create_answer(question_id, &request.user_id, &request.text)
        .await?;
    info!(answer_id = %answer.id, question_id = %question_id, "answer created");

    Ok((StatusCode::CREATED, Json(answer.into())))
}

/// GET /answers/{id}
pub async fn get_answer(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> HandlerResult<AnswerResponse> {
    let id = parse_answer_id(&raw_id)?;
    let answer = state.repository.get_answer(id).await?;
    Ok(Json(answer.into()))
}

/// DELETE /answers/{id}
///
/// Responds 204 whether or not the answer existed.
pub async fn delete_answer(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_answer_id(&raw_id)?;
    if !state.repository.delete_answer(id).await? {
        debug!(answer_id = %id, "delete requested for missing answer");
    }
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Prefix dispatch
// =============================================================================

/// Everything under `/questions/` past the collection itself.
///
/// A remainder ending in `/answers/` is the answer collection of the question
/// named by the part before it (POST only). Any other remainder is taken
/// whole as a question id (GET, DELETE), so `1/` or `1/x` fail to parse.
pub async fn question_subtree(
    method: Method,
    State(state): State<AppState>,
    Path(rest): Path<String>,
    body: Bytes,
) -> Response {
    if let Some(raw_id) = rest.strip_suffix("/answers/") {
        return match method {
            Method::POST => create_answer(State(state), Path(raw_id.to_string()), body)
                .await
                .into_response(),
            _ => AppError::MethodNotAllowed.into_response(),
        };
    }

    match method {
        Method::GET => get_question(State(state), Path(rest)).await.into_response(),
        Method::DELETE => delete_question(State(state), Path(rest)).await.into_response(),
        _ => AppError::MethodNotAllowed.into_response(),
    }
}

/// Everything under `/answers/`, the remainder taken whole as an answer id.
pub async fn answer_subtree(
    method: Method,
    State(state): State<AppState>,
    Path(rest): Path<String>,
) -> Response {
    dispatch_answer(method, state, rest).await
}

/// `/answers/` itself: an empty answer id.
pub async fn answer_root(method: Method, State(state): State<AppState>) -> Response {
    dispatch_answer(method, state, String::new()).await
}

async fn dispatch_answer(method: Method, state: AppState, raw_id: String) -> Response {
    match method {
        Method::GET => get_answer(State(state), Path(raw_id)).await.into_response(),
        Method::DELETE => delete_answer(State(state), Path(raw_id)).await.into_response(),
        _ => AppError::MethodNotAllowed.into_response(),
    }
}

/// `/questions` and `/answers` redirect to their slash-terminated form.
pub async fn add_trailing_slash(uri: Uri) -> Response {
    let location = match uri.query() {
        Some(query) => format!("{}/?{}", uri.path(), query),
        None => format!("{}/", uri.path()),
    };
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
}

// =============================================================================
// Fallbacks
// =============================================================================

/// Any path outside the route table.
pub async fn not_found() -> AppError {
    AppError::NotFound("Not Found".to_string())
}

/// A routed path hit with an unsupported method.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

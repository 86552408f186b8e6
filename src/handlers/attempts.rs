// src/handlers/attempts.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::attempt::{
        AttemptsQuery, FinalizeAttemptRequest, RecordAnswerRequest, StartAttemptRequest,
    },
    service::AttemptService,
};

/// Starts a new attempt for a user on an exam.
pub async fn start_attempt(
    State(service): State<AttemptService>,
    Json(payload): Json<StartAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = service
        .start_attempt(payload.user_id, payload.exam_id)
        .await?;

    Ok((StatusCode::CREATED, Json(attempt)))
}

/// Records one answer within an attempt. The correctness flag is computed
/// here, against the question's stored definition, and persisted with the
/// answer. A question can only be answered once per attempt.
pub async fn record_answer(
    State(service): State<AttemptService>,
    Path(attempt_id): Path<Uuid>,
    Json(payload): Json<RecordAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let answer = service
        .record_answer(attempt_id, payload.question_id, payload.answer)
        .await?;

    Ok((StatusCode::CREATED, Json(answer)))
}

/// Finalizes an attempt: scores every answered area, computes the global
/// score and marks the attempt completed. Terminal; a second call is a 409.
pub async fn finalize_attempt(
    State(service): State<AttemptService>,
    Path(attempt_id): Path<Uuid>,
    Json(payload): Json<FinalizeAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::Validation(validation_errors.to_string()));
    }

    let global_score = service
        .finalize(attempt_id, payload.elapsed_minutes)
        .await?;

    Ok(Json(serde_json::json!({
        "attempt_id": attempt_id,
        "global_score": global_score,
    })))
}

/// Lists a user's completed attempts on an exam, newest first.
pub async fn list_attempts(
    State(service): State<AttemptService>,
    Query(params): Query<AttemptsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = service
        .attempts_for_user(params.user_id, params.exam_id)
        .await?;

    Ok(Json(attempts))
}

/// Retrieves one attempt with its per-area score breakdown.
pub async fn get_attempt(
    State(service): State<AttemptService>,
    Path(attempt_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = service.attempt_detail(attempt_id).await?;
    Ok(Json(detail))
}

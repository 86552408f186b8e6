// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use uuid::Uuid;
use validator::Validate;

/// Represents the 'attempts' table in the database.
/// One user's single pass through an exam. `global_score` is NULL until the
/// attempt is finalized; the lifecycle service is the sole writer of the
/// score and completion fields.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Attempt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub exam_id: Uuid,
    pub completed: bool,
    pub elapsed_minutes: f64,

    /// Global score on the 0-500 scale, defined iff `completed`.
    pub global_score: Option<f64>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Raw answer payload as submitted by the client. A single string for
/// single-choice (option id), true/false and fill-in-blank (free text), or
/// an ordered list of option ids for matching-pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerPayload {
    Text(String),
    Pairs(Vec<String>),
}

/// Represents the 'submitted_answers' table. Immutable once written; the
/// correctness flag is computed once at submission time.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub id: Uuid,
    pub attempt_id: Uuid,
    pub question_id: Uuid,
    pub payload: Json<AnswerPayload>,
    pub is_correct: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'area_scores' table: the persisted 0-100 score for one
/// area within one attempt. Written exactly once, during finalization.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AreaScoreRecord {
    pub id: Uuid,
    pub attempt_id: Uuid,
    pub area_id: Uuid,
    pub score: f64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for starting an attempt.
#[derive(Debug, Deserialize)]
pub struct StartAttemptRequest {
    pub user_id: Uuid,
    pub exam_id: Uuid,
}

/// DTO for recording one answer within an attempt.
#[derive(Debug, Deserialize)]
pub struct RecordAnswerRequest {
    pub question_id: Uuid,
    pub answer: AnswerPayload,
}

/// DTO for finalizing an attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct FinalizeAttemptRequest {
    #[validate(range(min = 0.0, message = "Elapsed minutes cannot be negative."))]
    pub elapsed_minutes: f64,
}

/// Query parameters for listing a user's attempts on an exam.
#[derive(Debug, Deserialize)]
pub struct AttemptsQuery {
    pub user_id: Uuid,
    pub exam_id: Uuid,
}

/// Attempt detail with its per-area score breakdown, for the history view.
#[derive(Debug, Serialize)]
pub struct AttemptDetail {
    #[serde(flatten)]
    pub attempt: Attempt,
    pub area_scores: Vec<AreaScoreRecord>,
}

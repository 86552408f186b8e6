// src/store/mod.rs

pub mod memory;
pub mod postgres;

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        attempt::{AnswerPayload, AreaScoreRecord, Attempt, SubmittedAnswer},
        exam::{Exam, ExamTree, QuestionNode},
    },
};

pub use memory::MemoryStore;
pub use postgres::PgExamStore;

/// One submitted answer joined with its position in the exam hierarchy,
/// as the aggregation step consumes it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnswerContextRow {
    pub question_id: Uuid,
    pub item_id: Uuid,
    pub area_id: Uuid,
    pub weight: f64,
    pub is_correct: bool,
}

/// Persistence port for the attempt lifecycle and exam reads.
///
/// Constructed once at process start and injected into the service layer,
/// so tests can substitute the in-memory implementation for the Postgres
/// one.
#[async_trait]
pub trait ExamStore: Send + Sync {
    /// Active exams, newest first.
    async fn list_active_exams(&self) -> Result<Vec<Exam>, AppError>;

    async fn find_exam(&self, exam_id: Uuid) -> Result<Option<Exam>, AppError>;

    /// The full exam hierarchy: exam -> areas -> items -> questions ->
    /// options, each level ordered by position.
    async fn load_exam_tree(&self, exam_id: Uuid) -> Result<Option<ExamTree>, AppError>;

    async fn load_question(&self, question_id: Uuid) -> Result<Option<QuestionNode>, AppError>;

    async fn create_attempt(&self, user_id: Uuid, exam_id: Uuid) -> Result<Attempt, AppError>;

    async fn find_attempt(&self, attempt_id: Uuid) -> Result<Option<Attempt>, AppError>;

    /// Persists one answer with its precomputed correctness flag.
    /// A second answer for the same question within the attempt is a
    /// `Conflict` — answers are immutable once written.
    async fn insert_answer(
        &self,
        attempt_id: Uuid,
        question_id: Uuid,
        payload: &AnswerPayload,
        is_correct: bool,
    ) -> Result<SubmittedAnswer, AppError>;

    async fn answers_for_attempt(
        &self,
        attempt_id: Uuid,
    ) -> Result<Vec<AnswerContextRow>, AppError>;

    /// Configured weight per area of an exam.
    async fn area_weights(&self, exam_id: Uuid) -> Result<HashMap<Uuid, f64>, AppError>;

    /// Atomically writes the area score records and marks the attempt
    /// completed with its global score and elapsed time. All-or-nothing:
    /// an attempt that was already finalized is a `Conflict` and no area
    /// score rows survive.
    async fn finalize_attempt(
        &self,
        attempt_id: Uuid,
        elapsed_minutes: f64,
        global_score: f64,
        area_scores: &[(Uuid, f64)],
    ) -> Result<(), AppError>;

    /// Completed attempts of a user on an exam, newest first.
    async fn attempts_for_user(
        &self,
        user_id: Uuid,
        exam_id: Uuid,
    ) -> Result<Vec<Attempt>, AppError>;

    /// Area score records of an attempt, in area display order.
    async fn area_scores_for_attempt(
        &self,
        attempt_id: Uuid,
    ) -> Result<Vec<AreaScoreRecord>, AppError>;
}

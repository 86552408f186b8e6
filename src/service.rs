// src/service.rs

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::AppError,
    models::attempt::{AnswerPayload, Attempt, AttemptDetail, SubmittedAnswer},
    scoring::{self, EvaluatedAnswer},
    store::ExamStore,
};

/// Attempt lifecycle controller.
///
/// Orchestrates attempt creation, answer recording and finalization over
/// the persistence port. An attempt moves from in-progress to completed
/// exactly once; the store enforces the transition atomically.
#[derive(Clone)]
pub struct AttemptService {
    store: Arc<dyn ExamStore>,
}

impl AttemptService {
    pub fn new(store: Arc<dyn ExamStore>) -> Self {
        Self { store }
    }

    /// Creates a fresh in-progress attempt for a user on an exam.
    pub async fn start_attempt(&self, user_id: Uuid, exam_id: Uuid) -> Result<Attempt, AppError> {
        self.store
            .find_exam(exam_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Exam not found".to_string()))?;

        let attempt = self.store.create_attempt(user_id, exam_id).await?;
        tracing::info!(attempt_id = %attempt.id, exam_id = %exam_id, "Attempt started");
        Ok(attempt)
    }

    /// Evaluates one submitted answer against the question's stored
    /// definition and persists it with the computed correctness flag.
    pub async fn record_answer(
        &self,
        attempt_id: Uuid,
        question_id: Uuid,
        payload: AnswerPayload,
    ) -> Result<SubmittedAnswer, AppError> {
        let attempt = self
            .store
            .find_attempt(attempt_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Attempt not found".to_string()))?;

        if attempt.completed {
            return Err(AppError::Conflict(
                "Attempt already finalized".to_string(),
            ));
        }

        let question = self
            .store
            .load_question(question_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

        let is_correct = scoring::evaluate(&question, &payload)?;

        self.store
            .insert_answer(attempt_id, question_id, &payload, is_correct)
            .await
    }

    /// Scores the attempt from its recorded answers and marks it completed.
    ///
    /// Groups answers by area, writes one area score record per area that
    /// has answers, computes the weighted global score and atomically flips
    /// the attempt to completed. Returns the 0-500 global score.
    pub async fn finalize(&self, attempt_id: Uuid, elapsed_minutes: f64) -> Result<f64, AppError> {
        if !elapsed_minutes.is_finite() || elapsed_minutes < 0.0 {
            return Err(AppError::Validation(
                "Elapsed minutes must be a non-negative number".to_string(),
            ));
        }

        let attempt = self
            .store
            .find_attempt(attempt_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Attempt not found".to_string()))?;

        if attempt.completed {
            return Err(AppError::Conflict(
                "Attempt already finalized".to_string(),
            ));
        }

        let answers = self.store.answers_for_attempt(attempt_id).await?;

        let mut by_area: HashMap<Uuid, Vec<EvaluatedAnswer>> = HashMap::new();
        for row in answers {
            by_area.entry(row.area_id).or_default().push(EvaluatedAnswer {
                item_id: row.item_id,
                weight: row.weight,
                is_correct: row.is_correct,
            });
        }

        let area_scores: Vec<(Uuid, f64)> = by_area
            .iter()
            .map(|(area_id, answers)| (*area_id, scoring::score_area(answers)))
            .collect();

        let weights = self.store.area_weights(attempt.exam_id).await?;
        let global_score = scoring::score_global(&area_scores, &weights);

        self.store
            .finalize_attempt(attempt_id, elapsed_minutes, global_score, &area_scores)
            .await?;

        tracing::info!(
            attempt_id = %attempt_id,
            global_score,
            areas = area_scores.len(),
            "Attempt finalized"
        );

        Ok(global_score)
    }

    /// Completed attempts of a user on an exam, newest first.
    pub async fn attempts_for_user(
        &self,
        user_id: Uuid,
        exam_id: Uuid,
    ) -> Result<Vec<Attempt>, AppError> {
        self.store.attempts_for_user(user_id, exam_id).await
    }

    /// One attempt with its per-area score breakdown.
    pub async fn attempt_detail(&self, attempt_id: Uuid) -> Result<AttemptDetail, AppError> {
        let attempt = self
            .store
            .find_attempt(attempt_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Attempt not found".to_string()))?;

        let area_scores = self.store.area_scores_for_attempt(attempt_id).await?;

        Ok(AttemptDetail {
            attempt,
            area_scores,
        })
    }
}

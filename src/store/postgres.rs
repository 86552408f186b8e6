// src/store/postgres.rs

use std::collections::HashMap;

use async_trait::async_trait;
use futures::future::try_join_all;
use sqlx::{PgPool, types::Json};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        attempt::{AnswerPayload, AreaScoreRecord, Attempt, SubmittedAnswer},
        exam::{
            AnswerOption, Area, AreaNode, Exam, ExamTree, Item, ItemNode, Question, QuestionNode,
        },
    },
    store::{AnswerContextRow, ExamStore},
};

/// Postgres-backed implementation of the persistence port.
#[derive(Clone)]
pub struct PgExamStore {
    pool: PgPool,
}

impl PgExamStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads one area's items concurrently. The hierarchy reads are
    /// independent and read-only, so they can overlap freely.
    async fn load_area_node(&self, area: Area) -> Result<AreaNode, AppError> {
        let items: Vec<Item> = sqlx::query_as(
            "SELECT id, area_id, prompt, position FROM items WHERE area_id = $1 ORDER BY position",
        )
        .bind(area.id)
        .fetch_all(&self.pool)
        .await?;

        let items = try_join_all(items.into_iter().map(|item| self.load_item_node(item))).await?;

        Ok(AreaNode { area, items })
    }

    async fn load_item_node(&self, item: Item) -> Result<ItemNode, AppError> {
        let questions: Vec<Question> = sqlx::query_as(
            "SELECT id, item_id, prompt, question_type, weight, position
             FROM questions WHERE item_id = $1 ORDER BY position",
        )
        .bind(item.id)
        .fetch_all(&self.pool)
        .await?;

        let questions = try_join_all(
            questions
                .into_iter()
                .map(|question| self.load_question_node(question)),
        )
        .await?;

        Ok(ItemNode { item, questions })
    }

    async fn load_question_node(&self, question: Question) -> Result<QuestionNode, AppError> {
        let options: Vec<AnswerOption> = sqlx::query_as(
            "SELECT id, question_id, text, is_correct, position
             FROM answer_options WHERE question_id = $1 ORDER BY position",
        )
        .bind(question.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(QuestionNode { question, options })
    }
}

#[async_trait]
impl ExamStore for PgExamStore {
    async fn list_active_exams(&self) -> Result<Vec<Exam>, AppError> {
        let exams = sqlx::query_as(
            "SELECT id, name, description, duration_minutes, active, created_at, updated_at
             FROM exams WHERE active = TRUE ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(exams)
    }

    async fn find_exam(&self, exam_id: Uuid) -> Result<Option<Exam>, AppError> {
        let exam = sqlx::query_as(
            "SELECT id, name, description, duration_minutes, active, created_at, updated_at
             FROM exams WHERE id = $1",
        )
        .bind(exam_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(exam)
    }

    async fn load_exam_tree(&self, exam_id: Uuid) -> Result<Option<ExamTree>, AppError> {
        let Some(exam) = self.find_exam(exam_id).await? else {
            return Ok(None);
        };

        let areas: Vec<Area> = sqlx::query_as(
            "SELECT id, exam_id, name, position, weight
             FROM areas WHERE exam_id = $1 ORDER BY position",
        )
        .bind(exam_id)
        .fetch_all(&self.pool)
        .await?;

        let areas = try_join_all(areas.into_iter().map(|area| self.load_area_node(area))).await?;

        Ok(Some(ExamTree { exam, areas }))
    }

    async fn load_question(&self, question_id: Uuid) -> Result<Option<QuestionNode>, AppError> {
        let question: Option<Question> = sqlx::query_as(
            "SELECT id, item_id, prompt, question_type, weight, position
             FROM questions WHERE id = $1",
        )
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;

        match question {
            Some(question) => Ok(Some(self.load_question_node(question).await?)),
            None => Ok(None),
        }
    }

    async fn create_attempt(&self, user_id: Uuid, exam_id: Uuid) -> Result<Attempt, AppError> {
        let attempt = sqlx::query_as(
            "INSERT INTO attempts (user_id, exam_id)
             VALUES ($1, $2)
             RETURNING id, user_id, exam_id, completed, elapsed_minutes, global_score,
                       created_at, updated_at",
        )
        .bind(user_id)
        .bind(exam_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create attempt: {:?}", e);
            AppError::from(e)
        })?;

        Ok(attempt)
    }

    async fn find_attempt(&self, attempt_id: Uuid) -> Result<Option<Attempt>, AppError> {
        let attempt = sqlx::query_as(
            "SELECT id, user_id, exam_id, completed, elapsed_minutes, global_score,
                    created_at, updated_at
             FROM attempts WHERE id = $1",
        )
        .bind(attempt_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempt)
    }

    async fn insert_answer(
        &self,
        attempt_id: Uuid,
        question_id: Uuid,
        payload: &AnswerPayload,
        is_correct: bool,
    ) -> Result<SubmittedAnswer, AppError> {
        let answer = sqlx::query_as(
            "INSERT INTO submitted_answers (attempt_id, question_id, payload, is_correct)
             VALUES ($1, $2, $3, $4)
             RETURNING id, attempt_id, question_id, payload, is_correct, created_at",
        )
        .bind(attempt_id)
        .bind(question_id)
        .bind(Json(payload))
        .bind(is_correct)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.to_string().contains("unique constraint") || e.to_string().contains("23505") {
                AppError::Conflict("Question already answered in this attempt".to_string())
            } else {
                tracing::error!("Failed to insert answer: {:?}", e);
                AppError::from(e)
            }
        })?;

        Ok(answer)
    }

    async fn answers_for_attempt(
        &self,
        attempt_id: Uuid,
    ) -> Result<Vec<AnswerContextRow>, AppError> {
        let rows = sqlx::query_as(
            "SELECT sa.question_id, q.item_id, i.area_id, q.weight, sa.is_correct
             FROM submitted_answers sa
             JOIN questions q ON q.id = sa.question_id
             JOIN items i ON i.id = q.item_id
             WHERE sa.attempt_id = $1",
        )
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn area_weights(&self, exam_id: Uuid) -> Result<HashMap<Uuid, f64>, AppError> {
        let rows: Vec<(Uuid, f64)> =
            sqlx::query_as("SELECT id, weight FROM areas WHERE exam_id = $1")
                .bind(exam_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().collect())
    }

    async fn finalize_attempt(
        &self,
        attempt_id: Uuid,
        elapsed_minutes: f64,
        global_score: f64,
        area_scores: &[(Uuid, f64)],
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        // Check-and-set on the completed flag: a second finalize finds zero
        // matching rows and the whole transaction rolls back.
        let result = sqlx::query(
            "UPDATE attempts
             SET completed = TRUE, elapsed_minutes = $2, global_score = $3, updated_at = NOW()
             WHERE id = $1 AND completed = FALSE",
        )
        .bind(attempt_id)
        .bind(elapsed_minutes)
        .bind(global_score)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "Attempt already finalized".to_string(),
            ));
        }

        for (area_id, score) in area_scores {
            sqlx::query("INSERT INTO area_scores (attempt_id, area_id, score) VALUES ($1, $2, $3)")
                .bind(attempt_id)
                .bind(area_id)
                .bind(score)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit finalize transaction: {:?}", e);
            AppError::from(e)
        })?;

        Ok(())
    }

    async fn attempts_for_user(
        &self,
        user_id: Uuid,
        exam_id: Uuid,
    ) -> Result<Vec<Attempt>, AppError> {
        let attempts = sqlx::query_as(
            "SELECT id, user_id, exam_id, completed, elapsed_minutes, global_score,
                    created_at, updated_at
             FROM attempts
             WHERE user_id = $1 AND exam_id = $2 AND completed = TRUE
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(exam_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attempts)
    }

    async fn area_scores_for_attempt(
        &self,
        attempt_id: Uuid,
    ) -> Result<Vec<AreaScoreRecord>, AppError> {
        let records = sqlx::query_as(
            "SELECT s.id, s.attempt_id, s.area_id, s.score, s.created_at
             FROM area_scores s
             JOIN areas a ON a.id = s.area_id
             WHERE s.attempt_id = $1
             ORDER BY a.position",
        )
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

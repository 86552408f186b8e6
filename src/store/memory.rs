// src/store/memory.rs

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        attempt::{AnswerPayload, AreaScoreRecord, Attempt, SubmittedAnswer},
        exam::{Exam, ExamTree, QuestionNode},
    },
    store::{AnswerContextRow, ExamStore},
};

/// In-memory implementation of the persistence port, used by the test
/// suite and as a fixture for running the service without a database.
/// Exam trees are seeded up front; attempts and answers accumulate under
/// a single lock, which also stands in for transaction isolation.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    exams: Vec<ExamTree>,
    attempts: HashMap<Uuid, Attempt>,
    answers: Vec<SubmittedAnswer>,
    area_scores: Vec<AreaScoreRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one fully materialized exam tree.
    pub fn insert_exam(&self, tree: ExamTree) {
        self.inner.lock().unwrap().exams.push(tree);
    }
}

/// Locates a question and its owning item/area within the seeded trees.
fn find_question(inner: &Inner, question_id: Uuid) -> Option<(Uuid, Uuid, QuestionNode)> {
    for tree in &inner.exams {
        for area in &tree.areas {
            for item in &area.items {
                for question in &item.questions {
                    if question.question.id == question_id {
                        return Some((area.area.id, item.item.id, question.clone()));
                    }
                }
            }
        }
    }
    None
}

#[async_trait]
impl ExamStore for MemoryStore {
    async fn list_active_exams(&self) -> Result<Vec<Exam>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut exams: Vec<Exam> = inner
            .exams
            .iter()
            .filter(|t| t.exam.active)
            .map(|t| t.exam.clone())
            .collect();
        exams.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(exams)
    }

    async fn find_exam(&self, exam_id: Uuid) -> Result<Option<Exam>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .exams
            .iter()
            .find(|t| t.exam.id == exam_id)
            .map(|t| t.exam.clone()))
    }

    async fn load_exam_tree(&self, exam_id: Uuid) -> Result<Option<ExamTree>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.exams.iter().find(|t| t.exam.id == exam_id).cloned())
    }

    async fn load_question(&self, question_id: Uuid) -> Result<Option<QuestionNode>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(find_question(&inner, question_id).map(|(_, _, question)| question))
    }

    async fn create_attempt(&self, user_id: Uuid, exam_id: Uuid) -> Result<Attempt, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let attempt = Attempt {
            id: Uuid::new_v4(),
            user_id,
            exam_id,
            completed: false,
            elapsed_minutes: 0.0,
            global_score: None,
            created_at: Some(chrono::Utc::now()),
            updated_at: Some(chrono::Utc::now()),
        };
        inner.attempts.insert(attempt.id, attempt.clone());
        Ok(attempt)
    }

    async fn find_attempt(&self, attempt_id: Uuid) -> Result<Option<Attempt>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.attempts.get(&attempt_id).cloned())
    }

    async fn insert_answer(
        &self,
        attempt_id: Uuid,
        question_id: Uuid,
        payload: &AnswerPayload,
        is_correct: bool,
    ) -> Result<SubmittedAnswer, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let duplicate = inner
            .answers
            .iter()
            .any(|a| a.attempt_id == attempt_id && a.question_id == question_id);
        if duplicate {
            return Err(AppError::Conflict(
                "Question already answered in this attempt".to_string(),
            ));
        }

        let answer = SubmittedAnswer {
            id: Uuid::new_v4(),
            attempt_id,
            question_id,
            payload: Json(payload.clone()),
            is_correct,
            created_at: Some(chrono::Utc::now()),
        };
        inner.answers.push(answer.clone());
        Ok(answer)
    }

    async fn answers_for_attempt(
        &self,
        attempt_id: Uuid,
    ) -> Result<Vec<AnswerContextRow>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut rows = Vec::new();
        for answer in inner.answers.iter().filter(|a| a.attempt_id == attempt_id) {
            let (area_id, item_id, question) = find_question(&inner, answer.question_id)
                .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;
            rows.push(AnswerContextRow {
                question_id: answer.question_id,
                item_id,
                area_id,
                weight: question.question.weight,
                is_correct: answer.is_correct,
            });
        }
        Ok(rows)
    }

    async fn area_weights(&self, exam_id: Uuid) -> Result<HashMap<Uuid, f64>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .exams
            .iter()
            .find(|t| t.exam.id == exam_id)
            .map(|t| {
                t.areas
                    .iter()
                    .map(|a| (a.area.id, a.area.weight))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn finalize_attempt(
        &self,
        attempt_id: Uuid,
        elapsed_minutes: f64,
        global_score: f64,
        area_scores: &[(Uuid, f64)],
    ) -> Result<(), AppError> {
        let mut inner = self.inner.lock().unwrap();

        let attempt = inner
            .attempts
            .get_mut(&attempt_id)
            .ok_or_else(|| AppError::NotFound("Attempt not found".to_string()))?;
        if attempt.completed {
            return Err(AppError::Conflict(
                "Attempt already finalized".to_string(),
            ));
        }
        attempt.completed = true;
        attempt.elapsed_minutes = elapsed_minutes;
        attempt.global_score = Some(global_score);
        attempt.updated_at = Some(chrono::Utc::now());

        for (area_id, score) in area_scores {
            inner.area_scores.push(AreaScoreRecord {
                id: Uuid::new_v4(),
                attempt_id,
                area_id: *area_id,
                score: *score,
                created_at: Some(chrono::Utc::now()),
            });
        }

        Ok(())
    }

    async fn attempts_for_user(
        &self,
        user_id: Uuid,
        exam_id: Uuid,
    ) -> Result<Vec<Attempt>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut attempts: Vec<Attempt> = inner
            .attempts
            .values()
            .filter(|a| a.user_id == user_id && a.exam_id == exam_id && a.completed)
            .cloned()
            .collect();
        attempts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(attempts)
    }

    async fn area_scores_for_attempt(
        &self,
        attempt_id: Uuid,
    ) -> Result<Vec<AreaScoreRecord>, AppError> {
        let inner = self.inner.lock().unwrap();

        // Area display order, mirroring the SQL join on areas.position.
        let mut order: HashMap<Uuid, i32> = HashMap::new();
        for tree in &inner.exams {
            for area in &tree.areas {
                order.insert(area.area.id, area.area.position);
            }
        }

        let mut records: Vec<AreaScoreRecord> = inner
            .area_scores
            .iter()
            .filter(|s| s.attempt_id == attempt_id)
            .cloned()
            .collect();
        records.sort_by_key(|s| order.get(&s.area_id).copied().unwrap_or(i32::MAX));
        Ok(records)
    }
}

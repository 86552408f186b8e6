// src/handlers/exams.rs

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{error::AppError, models::exam::PublicExamTree, store::ExamStore};

/// Lists the active exams, newest first.
pub async fn list_exams(
    State(store): State<Arc<dyn ExamStore>>,
) -> Result<impl IntoResponse, AppError> {
    let exams = store.list_active_exams().await?;
    Ok(Json(exams))
}

/// Retrieves the full exam hierarchy for the exam-taking client.
/// Option correctness flags are stripped; answers are evaluated server-side.
pub async fn get_exam(
    State(store): State<Arc<dyn ExamStore>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let tree = store
        .load_exam_tree(id)
        .await?
        .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    Ok(Json(PublicExamTree::from(tree)))
}

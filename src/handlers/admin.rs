// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::exam::QuestionType,
    utils::html::clean_html,
};

/// DTO for creating an exam.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateExamRequest {
    #[validate(length(min = 1, max = 200, message = "Name length must be between 1 and 200 characters."))]
    pub name: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Duration must be at least one minute."))]
    pub duration_minutes: i32,
    pub active: Option<bool>,
}

/// Creates a new exam template.
/// Role enforcement for the /api/admin routes happens upstream.
pub async fn create_exam(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::Validation(validation_errors.to_string()));
    }

    let description = clean_html(&payload.description.unwrap_or_default());

    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO exams (name, description, duration_minutes, active)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(payload.name)
    .bind(description)
    .bind(payload.duration_minutes)
    .bind(payload.active.unwrap_or(true))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create exam: {:?}", e);
        AppError::from(e)
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// DTO for updating an exam. Fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateExamRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub active: Option<bool>,
}

/// Updates an exam by ID.
pub async fn update_exam(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.name.is_none()
        && payload.description.is_none()
        && payload.duration_minutes.is_none()
        && payload.active.is_none()
    {
        return Ok(StatusCode::OK);
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE exams SET ");
    let mut separated = builder.separated(", ");

    if let Some(name) = payload.name {
        separated.push("name = ");
        separated.push_bind_unseparated(name);
    }

    if let Some(description) = payload.description {
        separated.push("description = ");
        separated.push_bind_unseparated(clean_html(&description));
    }

    if let Some(duration_minutes) = payload.duration_minutes {
        separated.push("duration_minutes = ");
        separated.push_bind_unseparated(duration_minutes);
    }

    if let Some(active) = payload.active {
        separated.push("active = ");
        separated.push_bind_unseparated(active);
    }

    separated.push("updated_at = NOW()");

    builder.push(" WHERE id = ");
    builder.push_bind(id);

    let result = builder.build().execute(&pool).await.map_err(|e| {
        tracing::error!("Failed to update exam: {:?}", e);
        AppError::from(e)
    })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Exam not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Deletes an exam by ID. Areas, items, questions, options and attempts
/// cascade in the database.
pub async fn delete_exam(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM exams WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete exam: {:?}", e);
            AppError::from(e)
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Exam not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// DTO for creating an area within an exam.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAreaRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub position: Option<i32>,
    #[validate(range(min = 0.0, message = "Weight cannot be negative."))]
    pub weight: Option<f64>,
}

/// Creates a new area under an exam.
pub async fn create_area(
    State(pool): State<PgPool>,
    Path(exam_id): Path<Uuid>,
    Json(payload): Json<CreateAreaRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::Validation(validation_errors.to_string()));
    }

    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM exams WHERE id = $1")
        .bind(exam_id)
        .fetch_optional(&pool)
        .await?;
    exists.ok_or(AppError::NotFound("Exam not found".to_string()))?;

    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO areas (exam_id, name, position, weight)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(exam_id)
    .bind(payload.name)
    .bind(payload.position.unwrap_or(0))
    .bind(payload.weight.unwrap_or(1.0))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create area: {:?}", e);
        AppError::from(e)
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// DTO for creating an item within an area.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateItemRequest {
    #[validate(length(max = 5000))]
    pub prompt: Option<String>,
    pub position: Option<i32>,
}

/// Creates a new item under an area.
pub async fn create_item(
    State(pool): State<PgPool>,
    Path(area_id): Path<Uuid>,
    Json(payload): Json<CreateItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::Validation(validation_errors.to_string()));
    }

    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM areas WHERE id = $1")
        .bind(area_id)
        .fetch_optional(&pool)
        .await?;
    exists.ok_or(AppError::NotFound("Area not found".to_string()))?;

    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO items (area_id, prompt, position)
         VALUES ($1, $2, $3)
         RETURNING id",
    )
    .bind(area_id)
    .bind(clean_html(&payload.prompt.unwrap_or_default()))
    .bind(payload.position.unwrap_or(0))
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create item: {:?}", e);
        AppError::from(e)
    })?;

    Ok((StatusCode::CREATED, Json(serde_json::json!({"id": id}))))
}

/// DTO for one option of a new question.
#[derive(Debug, Deserialize)]
pub struct NewOptionRequest {
    pub text: String,
    pub is_correct: bool,
    pub position: Option<i32>,
}

/// DTO for creating a question with its options.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 5000))]
    pub prompt: String,
    pub question_type: QuestionType,
    #[validate(range(min = 0.0, message = "Weight cannot be negative."))]
    pub weight: Option<f64>,
    pub position: Option<i32>,
    pub options: Vec<NewOptionRequest>,
}

/// Creates a new question with its options under an item, in one
/// transaction. The option set must be consistent with the question type:
/// a matching question needs at least one correct option, every other type
/// exactly one.
pub async fn create_question(
    State(pool): State<PgPool>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::Validation(validation_errors.to_string()));
    }

    if payload.options.is_empty() {
        return Err(AppError::Validation(
            "A question needs at least one option".to_string(),
        ));
    }
    if payload.options.iter().any(|o| o.text.trim().is_empty()) {
        return Err(AppError::Validation(
            "Option text cannot be empty".to_string(),
        ));
    }

    let correct_count = payload.options.iter().filter(|o| o.is_correct).count();
    match payload.question_type {
        QuestionType::MatchingPairs => {
            if correct_count == 0 {
                return Err(AppError::Validation(
                    "A matching question needs at least one correct option".to_string(),
                ));
            }
        }
        _ => {
            if correct_count != 1 {
                return Err(AppError::Validation(
                    "This question type needs exactly one correct option".to_string(),
                ));
            }
        }
    }

    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM items WHERE id = $1")
        .bind(item_id)
        .fetch_optional(&pool)
        .await?;
    exists.ok_or(AppError::NotFound("Item not found".to_string()))?;

    let mut tx = pool.begin().await?;

    let (question_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO questions (item_id, prompt, question_type, weight, position)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind(item_id)
    .bind(clean_html(&payload.prompt))
    .bind(payload.question_type)
    .bind(payload.weight.unwrap_or(1.0))
    .bind(payload.position.unwrap_or(0))
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create question: {:?}", e);
        AppError::from(e)
    })?;

    for (index, option) in payload.options.into_iter().enumerate() {
        sqlx::query(
            "INSERT INTO answer_options (question_id, text, is_correct, position)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(question_id)
        .bind(option.text)
        .bind(option.is_correct)
        .bind(option.position.unwrap_or(index as i32))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create option: {:?}", e);
            AppError::from(e)
        })?;
    }

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"id": question_id})),
    ))
}

/// Deletes a question by ID. Its options and submitted answers cascade.
pub async fn delete_question(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete question: {:?}", e);
            AppError::from(e)
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

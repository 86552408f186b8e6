// src/models/exam.rs

use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Question type tag. Closed set: each variant has its own correctness rule
/// in the scoring module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "question_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    TrueFalse,
    FillInBlank,
    MatchingPairs,
}

/// Represents the 'exams' table in the database.
/// An exam ("simulacro") is an immutable, timed template of weighted areas.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Exam {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub duration_minutes: i32,
    pub active: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'areas' table. A weighted subject grouping within an exam.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Area {
    pub id: Uuid,
    pub exam_id: Uuid,
    pub name: String,
    pub position: i32,
    pub weight: f64,
}

/// Represents the 'items' table. A scoring unit within an area; its score is
/// always normalized to [0,1] no matter how many questions it contains.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub area_id: Uuid,

    /// Shared stem text displayed above the item's questions.
    pub prompt: String,
    pub position: i32,
}

/// Represents the 'questions' table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub item_id: Uuid,
    pub prompt: String,
    pub question_type: QuestionType,
    pub weight: f64,
    pub position: i32,
}

/// Represents the 'answer_options' table. Options flagged `is_correct`
/// define the accepted answer(s) for their question.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: Uuid,
    pub question_id: Uuid,
    pub text: String,
    pub is_correct: bool,
    pub position: i32,
}

/// A question together with its options, ordered by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionNode {
    #[serde(flatten)]
    pub question: Question,
    pub options: Vec<AnswerOption>,
}

/// An item together with its questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemNode {
    #[serde(flatten)]
    pub item: Item,
    pub questions: Vec<QuestionNode>,
}

/// An area together with its items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaNode {
    #[serde(flatten)]
    pub area: Area,
    pub items: Vec<ItemNode>,
}

/// The fully materialized exam hierarchy: exam -> areas -> items ->
/// questions -> options. Assembled by the store; the scoring functions only
/// ever see already-loaded trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamTree {
    #[serde(flatten)]
    pub exam: Exam,
    pub areas: Vec<AreaNode>,
}

/// DTO for sending an option to the exam-taking client (excludes the
/// correctness flag — answers are evaluated server-side).
#[derive(Debug, Serialize)]
pub struct PublicOption {
    pub id: Uuid,
    pub text: String,
    pub position: i32,
}

/// DTO for sending a question to the exam-taking client.
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: Uuid,
    pub prompt: String,
    pub question_type: QuestionType,
    pub weight: f64,
    pub position: i32,
    pub options: Vec<PublicOption>,
}

#[derive(Debug, Serialize)]
pub struct PublicItem {
    pub id: Uuid,
    pub prompt: String,
    pub position: i32,
    pub questions: Vec<PublicQuestion>,
}

#[derive(Debug, Serialize)]
pub struct PublicArea {
    pub id: Uuid,
    pub name: String,
    pub position: i32,
    pub weight: f64,
    pub items: Vec<PublicItem>,
}

/// DTO for the full exam tree as served to clients.
#[derive(Debug, Serialize)]
pub struct PublicExamTree {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub duration_minutes: i32,
    pub areas: Vec<PublicArea>,
}

impl From<ExamTree> for PublicExamTree {
    fn from(tree: ExamTree) -> Self {
        PublicExamTree {
            id: tree.exam.id,
            name: tree.exam.name,
            description: tree.exam.description,
            duration_minutes: tree.exam.duration_minutes,
            areas: tree
                .areas
                .into_iter()
                .map(|area| PublicArea {
                    id: area.area.id,
                    name: area.area.name,
                    position: area.area.position,
                    weight: area.area.weight,
                    items: area
                        .items
                        .into_iter()
                        .map(|item| PublicItem {
                            id: item.item.id,
                            prompt: item.item.prompt,
                            position: item.item.position,
                            questions: item
                                .questions
                                .into_iter()
                                .map(|q| PublicQuestion {
                                    id: q.question.id,
                                    prompt: q.question.prompt,
                                    question_type: q.question.question_type,
                                    weight: q.question.weight,
                                    position: q.question.position,
                                    options: q
                                        .options
                                        .into_iter()
                                        .map(|o| PublicOption {
                                            id: o.id,
                                            text: o.text,
                                            position: o.position,
                                        })
                                        .collect(),
                                })
                                .collect(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

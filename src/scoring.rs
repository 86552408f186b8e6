// src/scoring.rs

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        attempt::AnswerPayload,
        exam::{QuestionNode, QuestionType},
    },
};

/// One evaluated answer, reduced to what the aggregators need: which item it
/// belongs to, the question weight, and whether it was correct.
#[derive(Debug, Clone)]
pub struct EvaluatedAnswer {
    pub item_id: Uuid,
    pub weight: f64,
    pub is_correct: bool,
}

/// Decides whether a submitted answer is correct for the given question.
///
/// Pure function of its two inputs. A payload whose shape does not match the
/// question type is a `Validation` error; a question with no option flagged
/// correct evaluates to incorrect rather than failing.
pub fn evaluate(question: &QuestionNode, payload: &AnswerPayload) -> Result<bool, AppError> {
    match question.question.question_type {
        // Correct iff the submitted option id equals the id of the unique
        // option flagged correct.
        QuestionType::SingleChoice => {
            let submitted = expect_text(payload)?;
            Ok(correct_option(question)
                .map(|o| o.id.to_string() == submitted)
                .unwrap_or(false))
        }

        // Exact, case-sensitive match against the correct option's text.
        QuestionType::TrueFalse => {
            let submitted = expect_text(payload)?;
            Ok(correct_option(question)
                .map(|o| o.text == submitted)
                .unwrap_or(false))
        }

        // Whitespace-trimmed, lowercased match against the correct option's
        // text under the same normalization.
        QuestionType::FillInBlank => {
            let submitted = normalize(expect_text(payload)?);
            Ok(correct_option(question)
                .map(|o| normalize(&o.text) == submitted)
                .unwrap_or(false))
        }

        // The submitted sequence of option ids must reproduce ALL options
        // flagged correct, in their stored order. Any reordering, omission
        // or addition is incorrect.
        QuestionType::MatchingPairs => {
            let submitted = expect_pairs(payload)?;
            let correct: Vec<String> = question
                .options
                .iter()
                .filter(|o| o.is_correct)
                .map(|o| o.id.to_string())
                .collect();
            Ok(submitted == &correct[..])
        }
    }
}

/// Computes the 0-100 score for one area from its evaluated answers,
/// rounded to one decimal place.
///
/// Answers are grouped by item; each item scores Σ(weight × correct) /
/// Σ(weight) over the answers present, so unanswered questions are simply
/// absent from both sums. An item whose weights sum to zero scores 0, as
/// does an area with no answered items. A fully answered, all-wrong item
/// still counts as a 0 in the average.
pub fn score_area(answers: &[EvaluatedAnswer]) -> f64 {
    // (Σ weight*correct, Σ weight) per item
    let mut by_item: HashMap<Uuid, (f64, f64)> = HashMap::new();
    for answer in answers {
        let entry = by_item.entry(answer.item_id).or_insert((0.0, 0.0));
        if answer.is_correct {
            entry.0 += answer.weight;
        }
        entry.1 += answer.weight;
    }

    if by_item.is_empty() {
        return 0.0;
    }

    let item_score_sum: f64 = by_item
        .values()
        .map(|(earned, total)| if *total > 0.0 { earned / total } else { 0.0 })
        .sum();

    round1(item_score_sum / by_item.len() as f64 * 100.0)
}

/// Computes the 0-500 global score from per-area scores and the areas'
/// configured weights, rounded to one decimal place.
///
/// Areas without a score record are excluded from both sums — they do not
/// drag the average toward zero. A weight missing from the map defaults to
/// 1.0; if the weights sum to zero the global score is 0.
pub fn score_global(area_scores: &[(Uuid, f64)], area_weights: &HashMap<Uuid, f64>) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;

    for (area_id, score) in area_scores {
        let weight = area_weights.get(area_id).copied().unwrap_or(1.0);
        weighted_sum += score * weight;
        weight_sum += weight;
    }

    if weight_sum > 0.0 {
        round1(weighted_sum / weight_sum * 5.0)
    } else {
        0.0
    }
}

fn expect_text(payload: &AnswerPayload) -> Result<&str, AppError> {
    match payload {
        AnswerPayload::Text(text) => Ok(text),
        AnswerPayload::Pairs(_) => Err(AppError::Validation(
            "This question type expects a single answer string".to_string(),
        )),
    }
}

fn expect_pairs(payload: &AnswerPayload) -> Result<&[String], AppError> {
    match payload {
        AnswerPayload::Pairs(pairs) => Ok(pairs),
        AnswerPayload::Text(_) => Err(AppError::Validation(
            "This question type expects an ordered list of option ids".to_string(),
        )),
    }
}

fn correct_option(question: &QuestionNode) -> Option<&crate::models::exam::AnswerOption> {
    question.options.iter().find(|o| o.is_correct)
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

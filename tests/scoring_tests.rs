// tests/scoring_tests.rs
//
// Properties of the pure scoring functions: answer evaluation per question
// type, item/area aggregation and the weighted global score.

use std::collections::HashMap;

use ecaes_backend::error::AppError;
use ecaes_backend::models::attempt::AnswerPayload;
use ecaes_backend::models::exam::{AnswerOption, Question, QuestionNode, QuestionType};
use ecaes_backend::scoring::{EvaluatedAnswer, evaluate, score_area, score_global};
use uuid::Uuid;

fn option(question_id: Uuid, text: &str, is_correct: bool, position: i32) -> AnswerOption {
    AnswerOption {
        id: Uuid::new_v4(),
        question_id,
        text: text.to_string(),
        is_correct,
        position,
    }
}

fn question(question_type: QuestionType, options: Vec<(&str, bool)>) -> QuestionNode {
    let id = Uuid::new_v4();
    let options = options
        .into_iter()
        .enumerate()
        .map(|(i, (text, is_correct))| option(id, text, is_correct, i as i32))
        .collect();

    QuestionNode {
        question: Question {
            id,
            item_id: Uuid::new_v4(),
            prompt: "prompt".to_string(),
            question_type,
            weight: 1.0,
            position: 0,
        },
        options,
    }
}

fn answer(item_id: Uuid, weight: f64, is_correct: bool) -> EvaluatedAnswer {
    EvaluatedAnswer {
        item_id,
        weight,
        is_correct,
    }
}

fn text(s: &str) -> AnswerPayload {
    AnswerPayload::Text(s.to_string())
}

#[test]
fn single_choice_matches_on_correct_option_id() {
    let q = question(
        QuestionType::SingleChoice,
        vec![("A", false), ("B", true), ("C", false)],
    );
    let correct_id = q.options[1].id.to_string();
    let wrong_id = q.options[0].id.to_string();

    assert!(evaluate(&q, &text(&correct_id)).unwrap());
    assert!(!evaluate(&q, &text(&wrong_id)).unwrap());
    // Option text is not an accepted answer for single choice
    assert!(!evaluate(&q, &text("B")).unwrap());
}

#[test]
fn true_false_is_case_sensitive_text_match() {
    let q = question(QuestionType::TrueFalse, vec![("True", true), ("False", false)]);

    assert!(evaluate(&q, &text("True")).unwrap());
    assert!(!evaluate(&q, &text("true")).unwrap());
    assert!(!evaluate(&q, &text("False")).unwrap());
}

#[test]
fn fill_in_blank_trims_and_lowercases() {
    let q = question(QuestionType::FillInBlank, vec![("Paris", true)]);

    assert!(evaluate(&q, &text("Paris")).unwrap());
    assert!(evaluate(&q, &text("  Paris ")).unwrap());
    assert!(evaluate(&q, &text("paris")).unwrap());
    assert!(evaluate(&q, &text("PARIS")).unwrap());
    assert!(!evaluate(&q, &text("London")).unwrap());
}

#[test]
fn matching_pairs_requires_exact_sequence() {
    let q = question(
        QuestionType::MatchingPairs,
        vec![("1-a", true), ("2-b", true), ("distractor", false)],
    );
    let first = q.options[0].id.to_string();
    let second = q.options[1].id.to_string();
    let distractor = q.options[2].id.to_string();

    let in_order = AnswerPayload::Pairs(vec![first.clone(), second.clone()]);
    assert!(evaluate(&q, &in_order).unwrap());

    // Reordering is incorrect
    let reversed = AnswerPayload::Pairs(vec![second.clone(), first.clone()]);
    assert!(!evaluate(&q, &reversed).unwrap());

    // Omission is incorrect
    let partial = AnswerPayload::Pairs(vec![first.clone()]);
    assert!(!evaluate(&q, &partial).unwrap());

    // Addition is incorrect
    let extra = AnswerPayload::Pairs(vec![first, second, distractor]);
    assert!(!evaluate(&q, &extra).unwrap());
}

#[test]
fn mismatched_payload_shape_is_a_validation_error() {
    let single = question(QuestionType::SingleChoice, vec![("A", true)]);
    let matching = question(QuestionType::MatchingPairs, vec![("1-a", true)]);

    let pairs = AnswerPayload::Pairs(vec!["x".to_string()]);
    assert!(matches!(
        evaluate(&single, &pairs),
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        evaluate(&matching, &text("x")),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn question_without_correct_option_evaluates_incorrect() {
    let q = question(QuestionType::SingleChoice, vec![("A", false), ("B", false)]);
    let some_id = q.options[0].id.to_string();

    assert!(!evaluate(&q, &text(&some_id)).unwrap());
}

#[test]
fn area_score_matches_worked_example() {
    // Item A: one question, weight 1, correct           -> 1.0
    // Item B: weights 1 and 3, only the weight-1 correct -> 1/4 = 0.25
    // Area: ((1.0 + 0.25) / 2) * 100 = 62.5
    let item_a = Uuid::new_v4();
    let item_b = Uuid::new_v4();
    let answers = vec![
        answer(item_a, 1.0, true),
        answer(item_b, 1.0, true),
        answer(item_b, 3.0, false),
    ];

    assert_eq!(score_area(&answers), 62.5);
}

#[test]
fn area_score_is_order_independent() {
    let item_a = Uuid::new_v4();
    let item_b = Uuid::new_v4();
    let forward = vec![
        answer(item_a, 1.0, true),
        answer(item_b, 1.0, true),
        answer(item_b, 3.0, false),
    ];
    let mut shuffled = forward.clone();
    shuffled.reverse();

    assert_eq!(score_area(&forward), score_area(&shuffled));
}

#[test]
fn all_wrong_item_counts_as_zero_not_excluded() {
    // Item A perfect, item B fully answered and fully wrong:
    // ((1.0 + 0.0) / 2) * 100 = 50.0, not 100.0
    let item_a = Uuid::new_v4();
    let item_b = Uuid::new_v4();
    let answers = vec![
        answer(item_a, 1.0, true),
        answer(item_b, 1.0, false),
        answer(item_b, 2.0, false),
    ];

    assert_eq!(score_area(&answers), 50.0);
}

#[test]
fn zero_weight_item_scores_zero() {
    let item = Uuid::new_v4();
    let answers = vec![answer(item, 0.0, true), answer(item, 0.0, true)];

    assert_eq!(score_area(&answers), 0.0);
}

#[test]
fn area_score_of_no_answers_is_zero() {
    assert_eq!(score_area(&[]), 0.0);
}

#[test]
fn area_score_stays_in_range() {
    let item_a = Uuid::new_v4();
    let item_b = Uuid::new_v4();
    let answers = vec![
        answer(item_a, 2.5, true),
        answer(item_a, 0.5, false),
        answer(item_b, 1.0, true),
        answer(item_b, 4.0, true),
    ];

    let score = score_area(&answers);
    assert!((0.0..=100.0).contains(&score));
}

#[test]
fn global_score_matches_worked_example() {
    // ((62.5 * 1 + 80.0 * 2) / 3) * 5 = 370.8 after rounding
    let area_a = Uuid::new_v4();
    let area_b = Uuid::new_v4();
    let scores = vec![(area_a, 62.5), (area_b, 80.0)];
    let weights = HashMap::from([(area_a, 1.0), (area_b, 2.0)]);

    assert_eq!(score_global(&scores, &weights), 370.8);
}

#[test]
fn global_score_defaults_missing_weight_to_one() {
    let area_a = Uuid::new_v4();
    let area_b = Uuid::new_v4();
    let scores = vec![(area_a, 100.0), (area_b, 50.0)];
    // area_b has no configured weight
    let weights = HashMap::from([(area_a, 1.0)]);

    assert_eq!(score_global(&scores, &weights), 375.0);
}

#[test]
fn global_score_with_all_zero_weights_is_zero() {
    let area = Uuid::new_v4();
    let scores = vec![(area, 90.0)];
    let weights = HashMap::from([(area, 0.0)]);

    assert_eq!(score_global(&scores, &weights), 0.0);
}

#[test]
fn global_score_of_no_areas_is_zero() {
    assert_eq!(score_global(&[], &HashMap::new()), 0.0);
}

#[test]
fn perfect_attempt_reaches_five_hundred() {
    let area_a = Uuid::new_v4();
    let area_b = Uuid::new_v4();
    let scores = vec![(area_a, 100.0), (area_b, 100.0)];
    let weights = HashMap::from([(area_a, 1.0), (area_b, 3.0)]);

    assert_eq!(score_global(&scores, &weights), 500.0);
}

#[test]
fn scores_round_to_one_decimal() {
    // Three equal items, one correct: (1/3) * 100 = 33.333... -> 33.3
    let item_a = Uuid::new_v4();
    let item_b = Uuid::new_v4();
    let item_c = Uuid::new_v4();
    let answers = vec![
        answer(item_a, 1.0, true),
        answer(item_b, 1.0, false),
        answer(item_c, 1.0, false),
    ];

    assert_eq!(score_area(&answers), 33.3);
}

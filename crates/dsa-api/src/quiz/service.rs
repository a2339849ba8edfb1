use std::collections::HashSet;

use dsa_core::QuestionKey;
use dsa_db::models::{PublicQuestion, QuizQuestion};
use rand::seq::SliceRandom;

use crate::error::ApiError;

/// Draw up to `count` distinct questions at random, answers stripped.
pub fn sample_questions(questions: &[QuizQuestion], count: usize) -> Vec<PublicQuestion> {
    let mut rng = rand::thread_rng();
    questions
        .choose_multiple(&mut rng, count.min(questions.len()))
        .map(QuizQuestion::public)
        .collect()
}

/// The answer keys an attempt is graded against.
///
/// With `served` ids, only those bank questions count (every id must exist).
/// Without, the whole bank counts.
pub fn canonical_keys(
    bank: &[QuizQuestion],
    served: Option<&[String]>,
) -> Result<Vec<QuestionKey>, ApiError> {
    let Some(served) = served else {
        return Ok(bank.iter().map(QuizQuestion::key).collect());
    };

    let wanted: HashSet<&str> = served.iter().map(String::as_str).collect();
    let keys: Vec<QuestionKey> = bank
        .iter()
        .filter(|q| wanted.contains(q.id.as_str()))
        .map(QuizQuestion::key)
        .collect();

    if keys.len() != wanted.len() {
        return Err(ApiError::Validation(
            "questionIds contains questions that are not part of this quiz".to_string(),
        ));
    }
    Ok(keys)
}

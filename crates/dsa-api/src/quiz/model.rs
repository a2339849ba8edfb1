use dsa_core::{CooldownStatus, SubmittedAnswer, TopicBreakdown, WeakTopic};
use dsa_db::models::{PublicQuestion, QuizResult};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuery {
    pub roadmap_id: String,
    pub quiz_id: String,
    /// Overrides the configured sample size
    pub count: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptsQuery {
    pub roadmap_id: Option<String>,
}

/// A sampled quiz ready to be taken
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub roadmap_id: String,
    pub quiz_id: String,
    pub quiz_name: String,
    pub is_card_test: bool,
    pub time_limit_seconds: Option<i32>,
    pub passing_score: i32,
    pub total_available: usize,
    pub questions: Vec<PublicQuestion>,
    pub cooldown: CooldownStatus,
    pub next_attempt_number: i32,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizRequest {
    #[validate(length(min = 1, max = 100))]
    pub roadmap_id: String,
    #[validate(length(min = 1, max = 100))]
    pub quiz_id: String,
    /// Ids of the questions that were served; the whole bank when absent
    #[validate(custom(function = validate_question_ids))]
    pub question_ids: Option<Vec<String>>,
    #[validate(length(max = 500))]
    pub answers: Vec<SubmittedAnswer>,
    /// Seconds spent on the attempt
    #[validate(range(min = 0, max = 86_400))]
    pub time_taken: i32,
    /// Advisory only; the quiz bank decides whether a quiz is a card test
    #[serde(default)]
    pub is_card_test: Option<bool>,
}

fn validate_question_ids(ids: &[String]) -> Result<(), ValidationError> {
    if ids.is_empty() {
        return Err(ValidationError::new("question_ids_cannot_be_empty"));
    }
    if ids.len() > 500 {
        return Err(ValidationError::new("too_many_question_ids"));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQuizResponse {
    pub result: QuizResult,
    pub passing_score: i32,
    pub breakdown: Vec<TopicBreakdown>,
    pub weak_topics: Vec<WeakTopic>,
    /// Cooldown that now applies to this quiz
    pub cooldown: CooldownStatus,
    /// Whether this attempt opened the roadmap through its card test
    pub roadmap_unlocked: bool,
}

/// One attempt with its per-topic analysis
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptDetail {
    #[serde(flatten)]
    pub result: QuizResult,
    pub breakdown: Vec<TopicBreakdown>,
    pub weak_topics: Vec<WeakTopic>,
}

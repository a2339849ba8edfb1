use std::collections::HashSet;

use dsa_core::{DEFAULT_PASSING_SCORE, normalization::answers_match};
use dsa_db::models::{
    DashboardCounts, MasterYear, NodeInput, NoteAttachment, QuizBankInput, QuizQuestion,
    RoadmapInput, Subtopic,
};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Lowercase letters, digits and single dashes, e.g. `linked-lists-2`
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 100
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn validate_slug(value: &str) -> Result<(), ValidationError> {
    if is_valid_slug(value) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_slug"))
    }
}

fn validate_slug_list(values: &[String]) -> Result<(), ValidationError> {
    if values.iter().all(|v| is_valid_slug(v)) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_slug"))
    }
}

fn validate_subtopics(subtopics: &[Subtopic]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for subtopic in subtopics {
        if subtopic.id.trim().is_empty() || subtopic.title.trim().is_empty() {
            return Err(ValidationError::new("subtopic_missing_id_or_title"));
        }
        if !seen.insert(subtopic.id.as_str()) {
            return Err(ValidationError::new("duplicate_subtopic_id"));
        }
    }
    Ok(())
}

fn validate_questions(questions: &[QuizQuestion]) -> Result<(), ValidationError> {
    if questions.is_empty() {
        return Err(ValidationError::new("questions_cannot_be_empty"));
    }
    let mut seen = HashSet::new();
    for question in questions {
        if question.id.trim().is_empty() || question.question.trim().is_empty() {
            return Err(ValidationError::new("question_missing_id_or_text"));
        }
        if !seen.insert(question.id.as_str()) {
            return Err(ValidationError::new("duplicate_question_id"));
        }
        if question.topic.trim().is_empty() {
            return Err(ValidationError::new("question_missing_topic"));
        }
        // Multiple choice questions must offer their own answer
        if !question.options.is_empty()
            && !question
                .options
                .iter()
                .any(|o| answers_match(o, &question.correct_answer))
        {
            return Err(ValidationError::new("correct_answer_not_in_options"));
        }
        if question.correct_answer.trim().is_empty() {
            return Err(ValidationError::new("correct_answer_cannot_be_empty"));
        }
    }
    Ok(())
}

fn validate_years(years: &[MasterYear]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for year in years {
        if !seen.insert(year.year) {
            return Err(ValidationError::new("duplicate_year"));
        }
        validate_slug_list(&year.roadmaps)?;
    }
    Ok(())
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapPayload {
    #[validate(custom(function = validate_slug))]
    pub slug: String,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 10_000))]
    pub description: String,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub difficulty: Option<String>,
    #[validate(range(min = 1, max = 520))]
    pub estimated_weeks: Option<i32>,
    #[validate(length(max = 255))]
    pub icon: Option<String>,
    #[validate(length(max = 50))]
    pub color: Option<String>,
    #[serde(default)]
    #[validate(custom(function = validate_slug_list))]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub outcomes: Vec<String>,
    #[serde(default)]
    pub target_roles: Vec<String>,
    #[serde(default, rename = "order")]
    pub sort_order: i32,
    #[serde(default)]
    pub notes_attachments: Vec<NoteAttachment>,
    #[serde(default)]
    pub published: bool,
    #[validate(range(min = 0, max = 100))]
    pub passing_score: Option<i32>,
}

impl RoadmapPayload {
    pub fn into_input(self) -> RoadmapInput {
        RoadmapInput {
            slug: self.slug,
            title: self.title,
            description: self.description,
            category: self.category,
            difficulty: self.difficulty,
            estimated_weeks: self.estimated_weeks,
            icon: self.icon,
            color: self.color,
            prerequisites: self.prerequisites,
            outcomes: self.outcomes,
            target_roles: self.target_roles,
            sort_order: self.sort_order,
            notes_attachments: self.notes_attachments,
            published: self.published,
            passing_score: self.passing_score.unwrap_or(DEFAULT_PASSING_SCORE),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NodePayload {
    #[serde(rename = "id")]
    #[validate(custom(function = validate_slug))]
    pub node_id: String,
    #[validate(range(min = 1, max = 520))]
    pub week_number: i32,
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 10_000))]
    pub description: String,
    #[serde(default)]
    #[validate(custom(function = validate_subtopics))]
    pub subtopics: Vec<Subtopic>,
    #[serde(default)]
    #[validate(custom(function = validate_slug_list))]
    pub prerequisites: Vec<String>,
    #[validate(range(min = 0, max = 1000))]
    pub estimated_hours: Option<i32>,
}

impl NodePayload {
    pub fn into_input(self) -> NodeInput {
        NodeInput {
            node_id: self.node_id,
            week_number: self.week_number,
            title: self.title,
            description: self.description,
            subtopics: self.subtopics,
            prerequisites: self.prerequisites,
            estimated_hours: self.estimated_hours,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuizBankPayload {
    #[validate(custom(function = validate_slug))]
    pub roadmap_id: String,
    #[validate(custom(function = validate_slug))]
    pub quiz_id: String,
    #[validate(length(min = 1, max = 255))]
    pub quiz_name: String,
    #[serde(default)]
    pub is_card_test: bool,
    #[validate(range(min = 1, max = 86_400))]
    pub time_limit_seconds: Option<i32>,
    #[validate(custom(function = validate_questions))]
    pub questions: Vec<QuizQuestion>,
}

impl QuizBankPayload {
    pub fn into_input(self) -> QuizBankInput {
        QuizBankInput {
            roadmap_slug: self.roadmap_id,
            quiz_id: self.quiz_id,
            quiz_name: self.quiz_name,
            is_card_test: self.is_card_test,
            time_limit_seconds: self.time_limit_seconds,
            questions: self.questions,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizBankQuery {
    pub roadmap_id: String,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MasterRoadmapPayload {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 10_000))]
    pub description: String,
    #[serde(default)]
    #[validate(custom(function = validate_years))]
    pub years: Vec<MasterYear>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(flatten)]
    pub counts: DashboardCounts,
    /// Share of passed attempts, 0-100
    pub pass_rate: i32,
}

impl From<DashboardCounts> for DashboardStats {
    fn from(counts: DashboardCounts) -> Self {
        let pass_rate = if counts.total_attempts > 0 {
            (counts.passed_attempts as f64 / counts.total_attempts as f64 * 100.0).round() as i32
        } else {
            0
        };
        Self { counts, pass_rate }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(id: &str, options: &[&str], answer: &str) -> QuizQuestion {
        QuizQuestion {
            id: id.to_string(),
            question: "What is the complexity of binary search?".to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer: answer.to_string(),
            topic: "searching".to_string(),
            difficulty: None,
            resources: Vec::new(),
        }
    }

    #[test]
    fn test_slug_rules() {
        assert!(is_valid_slug("arrays"));
        assert!(is_valid_slug("linked-lists-2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Arrays"));
        assert!(!is_valid_slug("-arrays"));
        assert!(!is_valid_slug("arrays--basics"));
        assert!(!is_valid_slug("arrays basics"));
    }

    #[test]
    fn test_roadmap_payload_defaults() {
        let payload: RoadmapPayload = serde_json::from_value(json!({
            "slug": "graphs",
            "title": "Graphs",
        }))
        .unwrap();

        assert!(payload.validate().is_ok());
        let input = payload.into_input();
        assert_eq!(input.passing_score, DEFAULT_PASSING_SCORE);
        assert!(!input.published);
        assert!(input.prerequisites.is_empty());
    }

    #[test]
    fn test_roadmap_payload_rejects_bad_values() {
        let payload: RoadmapPayload = serde_json::from_value(json!({
            "slug": "Graphs!",
            "title": "",
            "passingScore": 140,
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("slug"));
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("passing_score"));
    }

    #[test]
    fn test_node_payload_rejects_duplicate_subtopics() {
        let payload: NodePayload = serde_json::from_value(json!({
            "id": "week-1",
            "weekNumber": 1,
            "title": "Arrays",
            "subtopics": [
                { "id": "two-pointers", "title": "Two pointers" },
                { "id": "two-pointers", "title": "Again" },
            ],
        }))
        .unwrap();

        assert!(payload.validate().is_err());
    }

    #[test]
    fn test_questions_must_offer_their_answer() {
        assert!(validate_questions(&[question("q1", &["O(n)", "O(log n)"], "o(log n)")]).is_ok());
        assert!(validate_questions(&[question("q1", &["O(n)", "O(1)"], "O(log n)")]).is_err());
        assert!(validate_questions(&[question("q1", &[], "log n")]).is_ok());
        assert!(validate_questions(&[]).is_err());
        assert!(
            validate_questions(&[question("q1", &[], "a"), question("q1", &[], "b")]).is_err()
        );
    }

    #[test]
    fn test_years_must_be_unique() {
        let year = |n| MasterYear {
            year: n,
            title: format!("Year {n}"),
            roadmaps: vec!["arrays".to_string()],
        };
        assert!(validate_years(&[year(1), year(2)]).is_ok());
        assert!(validate_years(&[year(1), year(1)]).is_err());
    }

    #[test]
    fn test_pass_rate() {
        let stats = DashboardStats::from(DashboardCounts {
            total_users: 3,
            total_roadmaps: 2,
            published_roadmaps: 1,
            total_attempts: 3,
            passed_attempts: 2,
            active_learners: 2,
        });
        assert_eq!(stats.pass_rate, 67);
    }
}

use chrono::{DateTime, Utc};
use dsa_core::{CardProgressImpact, GradedAnswer, NodeOutline, NodeProgress, QuestionKey};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;

/// A link to learning material
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub title: String,
    pub url: String,
    /// Free-form kind such as "video", "article" or "practice"
    #[serde(default)]
    pub kind: Option<String>,
}

/// A subtopic inside a roadmap node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtopic {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

/// A downloadable notes file attached to a roadmap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteAttachment {
    pub title: String,
    pub url: String,
}

/// Denormalized counters kept on the roadmap row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapStats {
    pub followers: i32,
    pub total_nodes: i32,
}

/// Roadmap model - a named learning path made of weekly nodes
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Roadmap {
    pub id: Uuid,
    /// Unique, URL-safe identifier referenced by nodes, progress and quizzes
    pub slug: String,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub estimated_weeks: Option<i32>,
    pub icon: Option<String>,
    pub color: Option<String>,
    /// Slugs of roadmaps that must be completed first
    pub prerequisites: Vec<String>,
    pub outcomes: Vec<String>,
    pub target_roles: Vec<String>,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub notes_attachments: Json<Vec<NoteAttachment>>,
    pub published: bool,
    /// Pass mark for regular quizzes on this roadmap (card tests use a fixed mark)
    pub passing_score: i32,
    #[sqlx(flatten)]
    pub stats: RoadmapStats,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields an admin provides when creating or replacing a roadmap
#[derive(Debug, Clone)]
pub struct RoadmapInput {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub estimated_weeks: Option<i32>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub prerequisites: Vec<String>,
    pub outcomes: Vec<String>,
    pub target_roles: Vec<String>,
    pub sort_order: i32,
    pub notes_attachments: Vec<NoteAttachment>,
    pub published: bool,
    pub passing_score: i32,
}

/// Roadmap node - one week of a roadmap
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapNode {
    #[serde(rename = "roadmapId")]
    pub roadmap_slug: String,
    #[serde(rename = "id")]
    pub node_id: String,
    pub week_number: i32,
    pub title: String,
    pub description: String,
    pub subtopics: Json<Vec<Subtopic>>,
    /// Ids of nodes in the same roadmap that must be completed first
    pub prerequisites: Vec<String>,
    pub estimated_hours: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoadmapNode {
    /// The shape progress computation works on
    pub fn outline(&self) -> NodeOutline {
        NodeOutline {
            id: self.node_id.clone(),
            prerequisites: self.prerequisites.clone(),
            subtopic_ids: self.subtopics.iter().map(|s| s.id.clone()).collect(),
        }
    }
}

/// Fields an admin provides when creating or replacing a node
#[derive(Debug, Clone)]
pub struct NodeInput {
    pub node_id: String,
    pub week_number: i32,
    pub title: String,
    pub description: String,
    pub subtopics: Vec<Subtopic>,
    pub prerequisites: Vec<String>,
    pub estimated_hours: Option<i32>,
}

/// A user's progress on one roadmap
/// Unique on (user_id, roadmap_slug)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserRoadmapProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "roadmapId")]
    pub roadmap_slug: String,
    pub nodes_progress: Json<Vec<NodeProgress>>,
    /// Derived from `nodes_progress`, rewritten on every mutation
    pub overall_progress: i32,
    pub unlocked_via_card_test: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// A quiz question as stored in the bank, including its answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub topic: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub resources: Vec<String>,
}

impl QuizQuestion {
    pub fn key(&self) -> QuestionKey {
        QuestionKey {
            id: self.id.clone(),
            correct_answer: self.correct_answer.clone(),
            topic: self.topic.clone(),
            resources: self.resources.clone(),
        }
    }

    /// Strip the answer before sending the question to a learner
    pub fn public(&self) -> PublicQuestion {
        PublicQuestion {
            id: self.id.clone(),
            question: self.question.clone(),
            options: self.options.clone(),
            topic: self.topic.clone(),
            difficulty: self.difficulty.clone(),
        }
    }
}

/// Question without its answer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    pub topic: String,
    pub difficulty: Option<String>,
}

/// A question set belonging to a roadmap
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuizBankEntry {
    pub id: Uuid,
    #[serde(rename = "roadmapId")]
    pub roadmap_slug: String,
    pub quiz_id: String,
    pub quiz_name: String,
    pub is_card_test: bool,
    pub time_limit_seconds: Option<i32>,
    pub questions: Json<Vec<QuizQuestion>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields an admin provides when creating or replacing a quiz bank entry
#[derive(Debug, Clone)]
pub struct QuizBankInput {
    pub roadmap_slug: String,
    pub quiz_id: String,
    pub quiz_name: String,
    pub is_card_test: bool,
    pub time_limit_seconds: Option<i32>,
    pub questions: Vec<QuizQuestion>,
}

/// One graded quiz attempt
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "roadmapId")]
    pub roadmap_slug: String,
    pub quiz_id: String,
    pub attempt_number: i32,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: i32,
    pub passed: bool,
    /// Seconds
    pub time_taken: i32,
    pub completed_at: DateTime<Utc>,
    pub answers: Json<Vec<GradedAnswer>>,
    pub is_card_test: bool,
    pub card_progress_impact: Option<Json<CardProgressImpact>>,
}

/// Attempt listing row, without the per-question answers
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuizResultSummary {
    pub id: Uuid,
    #[serde(rename = "roadmapId")]
    pub roadmap_slug: String,
    pub quiz_id: String,
    pub attempt_number: i32,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: i32,
    pub passed: bool,
    pub time_taken: i32,
    pub completed_at: DateTime<Utc>,
    pub is_card_test: bool,
}

/// Insert struct for QuizResult
#[derive(Debug, Clone)]
pub struct QuizResultInsert {
    pub user_id: Uuid,
    pub roadmap_slug: String,
    pub quiz_id: String,
    pub attempt_number: i32,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: i32,
    pub passed: bool,
    pub time_taken: i32,
    pub answers: Vec<GradedAnswer>,
    pub is_card_test: bool,
    pub card_progress_impact: Option<CardProgressImpact>,
}

/// Newest attempt on a quiz, used for cooldown and attempt numbering
#[derive(Debug, Clone, FromRow)]
pub struct LastAttempt {
    pub max_attempt_number: Option<i32>,
    pub last_completed_at: Option<DateTime<Utc>>,
}

/// One year of a master roadmap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterYear {
    pub year: i32,
    pub title: String,
    /// Roadmap slugs in display order
    pub roadmaps: Vec<String>,
}

/// Year-by-year grouping of roadmaps
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MasterRoadmap {
    pub master_id: String,
    pub title: String,
    pub description: String,
    pub years: Json<Vec<MasterYear>>,
    pub updated_at: DateTime<Utc>,
}

/// Platform user as known to this service
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Entry of a user's activity feed
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// "quiz_attempt" or "progress"
    pub kind: String,
    #[serde(rename = "roadmapId")]
    pub roadmap_slug: String,
    pub roadmap_title: String,
    pub detail: String,
    pub percentage: i32,
    pub passed: Option<bool>,
    pub occurred_at: DateTime<Utc>,
}

/// Counters for the admin dashboard
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCounts {
    pub total_users: i64,
    pub total_roadmaps: i64,
    pub published_roadmaps: i64,
    pub total_attempts: i64,
    pub passed_attempts: i64,
    pub active_learners: i64,
}

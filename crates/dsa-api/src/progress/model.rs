use chrono::{DateTime, Utc};
use dsa_core::NodeView;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapQuery {
    pub roadmap_id: String,
}

/// Toggle one subtopic, or a whole node when `subtopic_id` is absent
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressRequest {
    #[validate(length(min = 1, max = 100))]
    pub roadmap_id: String,
    #[validate(length(min = 1, max = 100))]
    pub node_id: String,
    #[validate(length(min = 1, max = 100))]
    pub subtopic_id: Option<String>,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrerequisiteProgress {
    pub roadmap_id: String,
    pub progress: i32,
    pub completed: bool,
}

/// Roadmap-level gate as seen by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapUnlock {
    pub unlocked: bool,
    pub unlocked_via_card_test: bool,
    /// Mean completion of the prerequisite roadmaps
    pub card_progress: i32,
    pub prerequisites: Vec<PrerequisiteProgress>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub roadmap_id: String,
    /// False until the user first records progress
    pub started: bool,
    pub overall_progress: i32,
    pub is_completed: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub nodes: Vec<NodeView>,
    pub unlock: RoadmapUnlock,
}

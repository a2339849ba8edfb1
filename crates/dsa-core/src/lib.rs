//! Core learning logic for the DSA roadmap platform.
//!
//! This crate holds the pure parts of the platform: quiz attempt grading,
//! attempt cooldowns, roadmap progress aggregation and unlock rules. It does
//! no I/O; the database and HTTP crates feed it plain values and persist
//! whatever it returns.

pub mod cooldown;
pub mod normalization;
pub mod progress;
pub mod scoring;
pub mod unlock;

pub use cooldown::{COOLDOWN_SECONDS, CooldownStatus, cooldown_status, next_attempt_number};
pub use progress::{NodeOutline, NodeProgress, NodeStatus, NodeView, ProgressError};
pub use scoring::{
    AttemptScore, CARD_TEST_PASSING_SCORE, DEFAULT_PASSING_SCORE, GradedAnswer, QuestionKey,
    SubmittedAnswer, TopicBreakdown, WeakTopic, grade_attempt, pass_threshold,
};
pub use unlock::CardProgressImpact;

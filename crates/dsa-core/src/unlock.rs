//! Roadmap-level unlock rules and card tests.
//!
//! Roadmaps list other roadmaps as prerequisites. A roadmap opens once all of
//! them are complete, or immediately once the user passes its card test.

use serde::{Deserialize, Serialize};

use crate::progress::is_complete;

/// Before/after card progress recorded with a card test attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardProgressImpact {
    pub before: i32,
    pub after: i32,
}

/// Whether a roadmap is open for a user.
///
/// `prerequisite_progress` holds the user's overall progress on each
/// prerequisite roadmap (missing progress counts as 0).
pub fn is_roadmap_unlocked(prerequisite_progress: &[i32], unlocked_via_card_test: bool) -> bool {
    unlocked_via_card_test || prerequisite_progress.iter().all(|p| is_complete(*p))
}

/// Unlock progress of a roadmap card: the mean completion of its prerequisites.
pub fn card_progress(prerequisite_progress: &[i32]) -> i32 {
    if prerequisite_progress.is_empty() {
        return 100;
    }
    let sum: i32 = prerequisite_progress.iter().map(|p| (*p).clamp(0, 100)).sum();
    (f64::from(sum) / prerequisite_progress.len() as f64).round() as i32
}

/// Card progress before and after a card test attempt.
pub const fn card_progress_impact(before: i32, passed: bool) -> CardProgressImpact {
    CardProgressImpact {
        before,
        after: if passed { 100 } else { before },
    }
}

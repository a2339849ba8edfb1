//! Retake cooldown for quiz attempts.
//!
//! After an attempt completes, the same quiz cannot be retaken for
//! [`COOLDOWN_SECONDS`]. The window is always measured from the most recent
//! attempt's `completed_at`.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Cooldown length in seconds (1 hour).
pub const COOLDOWN_SECONDS: i64 = 3600;

/// Where a user stands relative to the cooldown window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownStatus {
    pub active: bool,
    pub available_at: Option<DateTime<Utc>>,
    pub remaining_seconds: i64,
}

fn cooldown_duration() -> Duration {
    Duration::seconds(COOLDOWN_SECONDS)
}

/// Compute the cooldown status given the last attempt's completion time.
pub fn cooldown_status(last_completed_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> CooldownStatus {
    let Some(last) = last_completed_at else {
        return CooldownStatus {
            active: false,
            available_at: None,
            remaining_seconds: 0,
        };
    };

    let available_at = last + cooldown_duration();
    let remaining = (available_at - now).num_seconds().max(0);

    CooldownStatus {
        active: now < available_at,
        available_at: Some(available_at),
        remaining_seconds: remaining,
    }
}

/// Attempt numbers start at 1 and increase by one per attempt.
pub const fn next_attempt_number(previous_max: Option<i32>) -> i32 {
    match previous_max {
        Some(n) => n + 1,
        None => 1,
    }
}

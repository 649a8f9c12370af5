// src/engine/twin.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::mastery::{MASTERY_MAX, MasteryProfile};

pub const TWIN_MASTERY_BOOST: i32 = 20;
pub const TWIN_HOURS_MULTIPLIER: f64 = 1.25;
pub const TWIN_MAX_WEEKLY_HOURS: f64 = 40.0;

/// Habits suggested with every twin, in display order.
pub const MICRO_HABITS: [&str; 5] = [
    "Review notes for 15 minutes daily",
    "Complete practice problems 3x per week",
    "Use Pomodoro technique (25min focus, 5min break)",
    "Weekly subject review sessions",
    "Create flashcards for difficult concepts",
];

/// The "virtual twin": an aspirational snapshot of a student.
///
/// Never merged; regenerating replaces the previous snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwinTarget {
    pub target_weekly_hours: f64,
    pub target_mastery: MasteryProfile,
    pub micro_habits: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Builds a twin from the student's current mastery and weekly study hours.
pub fn generate_twin(
    mastery: &MasteryProfile,
    weekly_hours: f64,
    generated_at: DateTime<Utc>,
) -> TwinTarget {
    let mut target_mastery = MasteryProfile::default();
    for (subject, value) in mastery.iter() {
        target_mastery.set(subject, (value + TWIN_MASTERY_BOOST).min(MASTERY_MAX));
    }

    TwinTarget {
        target_weekly_hours: target_weekly_hours(weekly_hours),
        target_mastery,
        micro_habits: MICRO_HABITS.iter().map(|habit| habit.to_string()).collect(),
        generated_at,
    }
}

fn target_weekly_hours(weekly_hours: f64) -> f64 {
    (weekly_hours.max(0.0) * TWIN_HOURS_MULTIPLIER).min(TWIN_MAX_WEEKLY_HOURS)
}

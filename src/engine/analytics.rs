// src/engine/analytics.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::mastery::Subject;

/// How many of the newest quizzes count as "recent".
pub const RECENT_QUIZ_WINDOW: usize = 5;

/// A completed quiz reduced to what the progress view needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredQuiz {
    pub subject: Subject,
    pub score: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectAverage {
    pub avg: i32,
    pub count: usize,
}

/// Quiz performance summary shown to teachers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub recent_avg_score: i32,
    pub recent_quiz_count: usize,
    pub overall_average: i32,
    pub overall_quiz_count: usize,
    /// Always holds every subject, with zeros where no quiz exists.
    pub subject_averages: BTreeMap<Subject, SubjectAverage>,
}

/// Summarizes completed quizzes. `quizzes` must be ordered newest first.
pub fn summarize(quizzes: &[ScoredQuiz]) -> ProgressSummary {
    let recent: Vec<i32> = quizzes
        .iter()
        .take(RECENT_QUIZ_WINDOW)
        .map(|q| q.score)
        .collect();
    let all: Vec<i32> = quizzes.iter().map(|q| q.score).collect();

    let subject_averages = Subject::ALL
        .into_iter()
        .map(|subject| {
            let scores: Vec<i32> = quizzes
                .iter()
                .filter(|q| q.subject == subject)
                .map(|q| q.score)
                .collect();
            let average = SubjectAverage {
                avg: rounded_average(&scores),
                count: scores.len(),
            };
            (subject, average)
        })
        .collect();

    ProgressSummary {
        recent_avg_score: rounded_average(&recent),
        recent_quiz_count: recent.len(),
        overall_average: rounded_average(&all),
        overall_quiz_count: all.len(),
        subject_averages,
    }
}

/// Mean rounded half up; 0 for no scores.
pub fn rounded_average(scores: &[i32]) -> i32 {
    if scores.is_empty() {
        return 0;
    }
    let sum: i64 = scores.iter().map(|&s| i64::from(s)).sum();
    let count = scores.len() as i64;
    (2 * sum + count).div_euclid(2 * count) as i32
}

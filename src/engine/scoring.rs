// src/engine/scoring.rs

use serde::{Deserialize, Serialize};

/// Number of options every multiple-choice question carries.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// A multiple-choice question in canonical form.
///
/// Older stored quizzes spell the fields `question` and `correctAnswer`;
/// deserialization goes through [`StoredQuestion`] so both shapes land here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredQuestion")]
pub struct QuizQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: i32,
}

/// Storage-boundary shape of a question.
// TODO: drop the aliases once the legacy quiz rows are rewritten to the current field names.
#[derive(Deserialize)]
struct StoredQuestion {
    #[serde(alias = "question")]
    prompt: String,
    options: Vec<String>,
    #[serde(alias = "correctIndex", alias = "correctAnswer")]
    correct_index: i32,
}

impl From<StoredQuestion> for QuizQuestion {
    fn from(stored: StoredQuestion) -> Self {
        Self {
            prompt: stored.prompt,
            options: stored.options,
            correct_index: stored.correct_index,
        }
    }
}

/// Result of grading one quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizScore {
    /// Percentage in 0..=100, rounded half up.
    pub score: i32,
    pub correct: usize,
    pub total: usize,
}

/// Grades `answers` against `questions` position by position.
///
/// Missing answers never match and surplus answers are ignored.
/// An empty quiz scores 0.
pub fn score_quiz(questions: &[QuizQuestion], answers: &[Option<i32>]) -> QuizScore {
    let correct = questions
        .iter()
        .zip(answers.iter().chain(std::iter::repeat(&None)))
        .filter(|(question, answer)| **answer == Some(question.correct_index))
        .count();
    let total = questions.len();

    QuizScore {
        score: percentage(correct, total),
        correct,
        total,
    }
}

/// `round(part / whole * 100)` in integer arithmetic; 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> i32 {
    if whole == 0 {
        return 0;
    }
    ((200 * part + whole) / (2 * whole)) as i32
}

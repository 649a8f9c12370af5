// src/models/quiz.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

use crate::engine::{MasteryAdjustment, QuizQuestion, Subject};

pub const QUIZ_COLUMNS: &str =
    "id, student_id, subject, questions, answers, score, time_spent, completed_at, created_at";

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Quiz {
    pub id: i64,
    pub student_id: i64,
    #[sqlx(try_from = "String")]
    pub subject: Subject,
    /// Legacy rows are normalized while decoding (see `QuizQuestion`).
    pub questions: Json<Vec<QuizQuestion>>,
    /// Parallel to `questions`; `null` marks an unanswered question.
    pub answers: Json<Vec<Option<i32>>>,
    pub score: i32,
    /// Seconds the student spent, as reported by the client.
    pub time_spent: Option<i32>,
    /// Set exactly once, on submission.
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Quiz {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Question as sent to clients. The answer key is only included once the quiz is completed.
#[derive(Debug, Serialize)]
pub struct QuizQuestionView {
    pub prompt: String,
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_index: Option<i32>,
}

/// DTO for returning a quiz.
#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub id: i64,
    pub student_id: i64,
    pub subject: Subject,
    pub questions: Vec<QuizQuestionView>,
    pub answers: Vec<Option<i32>>,
    pub score: i32,
    pub time_spent: Option<i32>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Quiz> for QuizResponse {
    fn from(quiz: Quiz) -> Self {
        let reveal = quiz.is_completed();
        let questions = quiz
            .questions
            .0
            .into_iter()
            .map(|q| QuizQuestionView {
                prompt: q.prompt,
                options: q.options,
                correct_index: reveal.then_some(q.correct_index),
            })
            .collect();

        Self {
            id: quiz.id,
            student_id: quiz.student_id,
            subject: quiz.subject,
            questions,
            answers: quiz.answers.0,
            score: quiz.score,
            time_spent: quiz.time_spent,
            completed_at: quiz.completed_at,
            created_at: quiz.created_at,
        }
    }
}

/// DTO for requesting a new quiz.
#[derive(Debug, Deserialize)]
pub struct GenerateQuizRequest {
    pub subject: Subject,
}

/// Query parameters for listing quizzes.
#[derive(Debug, Deserialize)]
pub struct QuizListParams {
    pub subject: Option<Subject>,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitQuizRequest {
    /// Selected option per question, in question order. `null` for skipped questions.
    pub answers: Vec<Option<i32>>,
    #[validate(range(min = 0, max = 86400))]
    pub time_spent: Option<i32>,
}

/// Result of a submission: the grade and the mastery change it caused.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitQuizResponse {
    pub score: i32,
    pub correct: usize,
    pub total: usize,
    pub mastery: MasteryAdjustment,
}

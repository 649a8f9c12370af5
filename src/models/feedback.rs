// src/models/feedback.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub const FEEDBACK_COLUMNS: &str =
    "id, teacher_id, student_id, classroom_id, message, is_read, created_at";

/// Represents the 'feedback' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    pub teacher_id: i64,
    pub student_id: i64,
    pub classroom_id: i64,
    /// Sanitized HTML.
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// DTO for a teacher leaving feedback.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFeedbackRequest {
    pub student_id: i64,
    pub classroom_id: i64,
    #[validate(length(
        min = 1,
        max = 2000,
        message = "Feedback must be between 1 and 2000 characters."
    ))]
    pub message: String,
}

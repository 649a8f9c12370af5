// src/models/teacher.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

pub const TEACHER_COLUMNS: &str = "id, user_id, name, school, created_at";

/// Represents the 'teachers' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Teacher {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub school: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// DTO for creating or replacing a teacher profile.
#[derive(Debug, Deserialize, Validate)]
pub struct TeacherProfileRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name length must be between 1 and 100 characters."
    ))]
    pub name: String,
    #[validate(length(max = 200))]
    pub school: Option<String>,
}

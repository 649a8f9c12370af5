// src/models/classroom.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::engine::{MasteryProfile, analytics::ProgressSummary};

use super::student::Student;

pub const CLASSROOM_COLUMNS: &str =
    "id, teacher_id, name, code, description, is_active, created_at";

/// Represents the 'classrooms' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Classroom {
    pub id: i64,
    pub teacher_id: i64,
    pub name: String,
    /// Six-character join code, unique across classrooms.
    pub code: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A teacher's classroom with its enrollment count.
#[derive(Debug, Serialize, FromRow)]
pub struct ClassroomWithCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub classroom: Classroom,
    pub student_count: i64,
}

/// A classroom as seen by an enrolled student.
#[derive(Debug, Serialize, FromRow)]
pub struct JoinedClassroom {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub teacher_name: String,
    pub joined_at: DateTime<Utc>,
}

/// An enrolled student plus the analytics teachers see.
#[derive(Debug, Serialize)]
pub struct ClassroomStudent {
    #[serde(flatten)]
    pub student: Student,
    pub joined_at: DateTime<Utc>,
    pub progress: StudentProgress,
}

#[derive(Debug, Serialize)]
pub struct StudentProgress {
    #[serde(flatten)]
    pub summary: ProgressSummary,
    pub mastery: MasteryProfile,
}

/// DTO for creating a classroom.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClassroomRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Classroom name length must be between 1 and 100 characters."
    ))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// DTO for joining a classroom by code.
#[derive(Debug, Deserialize, Validate)]
pub struct JoinClassroomRequest {
    #[validate(length(min = 1, max = 16))]
    pub code: String,
}

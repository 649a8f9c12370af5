// src/models/student.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use validator::Validate;

use crate::engine::{MasteryProfile, Subject, TwinTarget};

/// Column list matching [`Student`], for `SELECT`/`RETURNING` clauses.
pub const STUDENT_COLUMNS: &str =
    "id, user_id, name, grade, weekly_study_hours, mastery, twin_data, created_at";

/// Represents the 'students' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,

    /// External identity of the owning user (JWT `sub`).
    pub user_id: String,

    pub name: String,

    /// School grade, 6-12.
    pub grade: i32,

    pub weekly_study_hours: f64,

    /// Stored as JSONB; every subject key is always present.
    pub mastery: Json<MasteryProfile>,

    /// Latest virtual twin, if one was generated.
    pub twin_data: Option<Json<TwinTarget>>,

    pub created_at: DateTime<Utc>,
}

/// DTO for creating a student profile.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudentRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name length must be between 1 and 100 characters."
    ))]
    pub name: String,
    #[validate(range(min = 6, max = 12, message = "Grade must be between 6 and 12."))]
    pub grade: i32,
    #[validate(range(min = 0.0, max = 168.0, message = "Weekly hours must be between 0 and 168."))]
    pub weekly_study_hours: f64,
    #[validate(custom(function = validate_mastery))]
    pub mastery: MasteryProfile,
}

/// DTO for updating a student profile. Absent fields stay unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStudentRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(range(min = 6, max = 12))]
    pub grade: Option<i32>,
    #[validate(range(min = 0.0, max = 168.0))]
    pub weekly_study_hours: Option<f64>,
    pub mastery: Option<MasteryProfile>,
}

/// DTO for applying a score to one subject without a stored quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct MasteryUpdateRequest {
    pub subject: Subject,
    #[validate(range(min = 0, max = 100))]
    pub score: i32,
}

pub fn validate_mastery(mastery: &MasteryProfile) -> Result<(), validator::ValidationError> {
    mastery
        .validate()
        .map_err(|_| validator::ValidationError::new("mastery_out_of_range"))
}

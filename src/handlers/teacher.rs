// src/handlers/teacher.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::{AppError, is_unique_violation},
    models::teacher::{TEACHER_COLUMNS, Teacher, TeacherProfileRequest},
    utils::{html::required_trimmed, jwt::Claims},
};

/// Loads the teacher profile owned by the authenticated user.
pub(crate) async fn find_teacher(pool: &PgPool, user_id: &str) -> Result<Teacher, AppError> {
    let sql = format!("SELECT {} FROM teachers WHERE user_id = $1", TEACHER_COLUMNS);

    sqlx::query_as::<_, Teacher>(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Teacher profile not found".to_string()))
}

fn normalized_school(school: Option<String>) -> Option<String> {
    school
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Creates the teacher profile for the current user.
pub async fn create_profile(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<TeacherProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    let name = required_trimmed(&payload.name, "Name")?;

    let sql = format!(
        "INSERT INTO teachers (user_id, name, school) VALUES ($1, $2, $3) RETURNING {}",
        TEACHER_COLUMNS
    );

    let teacher = sqlx::query_as::<_, Teacher>(&sql)
        .bind(&claims.sub)
        .bind(name)
        .bind(normalized_school(payload.school))
        .fetch_one(&pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Teacher profile already exists".to_string())
            } else {
                tracing::error!("Failed to create teacher profile: {:?}", e);
                AppError::from(e)
            }
        })?;

    tracing::info!("Created teacher profile {} for user {}", teacher.id, claims.sub);

    Ok((StatusCode::CREATED, Json(teacher)))
}

/// Returns the current user's teacher profile.
pub async fn get_profile(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(find_teacher(&pool, &claims.sub).await?))
}

/// Replaces name and school of the current user's teacher profile.
pub async fn update_profile(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<TeacherProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let name = required_trimmed(&payload.name, "Name")?;

    let sql = format!(
        "UPDATE teachers SET name = $2, school = $3 WHERE user_id = $1 RETURNING {}",
        TEACHER_COLUMNS
    );

    let teacher = sqlx::query_as::<_, Teacher>(&sql)
        .bind(&claims.sub)
        .bind(name)
        .bind(normalized_school(payload.school))
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Teacher profile not found".to_string()))?;

    Ok(Json(teacher))
}

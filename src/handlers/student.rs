// src/handlers/student.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use validator::Validate;

use crate::{
    engine::{MasteryAdjustment, MasteryProfile, Subject, generate_twin},
    error::{AppError, is_unique_violation},
    models::student::{
        CreateStudentRequest, MasteryUpdateRequest, STUDENT_COLUMNS, Student,
        UpdateStudentRequest,
    },
    utils::{html::required_trimmed, jwt::Claims},
};

/// Loads the student profile owned by the authenticated user.
pub(crate) async fn find_student(pool: &PgPool, user_id: &str) -> Result<Student, AppError> {
    let sql = format!("SELECT {} FROM students WHERE user_id = $1", STUDENT_COLUMNS);

    sqlx::query_as::<_, Student>(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch student profile: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?
        .ok_or(AppError::NotFound("Student profile not found".to_string()))
}

/// Applies a score to one subject of a student's mastery inside `conn`'s transaction.
///
/// The student row is locked for the read-modify-write so concurrent
/// submissions cannot lose an update.
pub(crate) async fn apply_score(
    conn: &mut PgConnection,
    student_id: i64,
    subject: Subject,
    score: i32,
) -> Result<MasteryAdjustment, AppError> {
    let (sqlx::types::Json(mut mastery),): (sqlx::types::Json<MasteryProfile>,) =
        sqlx::query_as("SELECT mastery FROM students WHERE id = $1 FOR UPDATE")
            .bind(student_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or(AppError::NotFound("Student profile not found".to_string()))?;

    let adjustment = mastery.apply_score(subject, score);

    sqlx::query("UPDATE students SET mastery = $1 WHERE id = $2")
        .bind(sqlx::types::Json(mastery))
        .bind(student_id)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update mastery: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok(adjustment)
}

/// Creates the student profile for the current user.
/// Returns 201 Created, or 409 if the user already has one.
pub async fn create_profile(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    let name = required_trimmed(&payload.name, "Name")?;

    let sql = format!(
        r#"
        INSERT INTO students (user_id, name, grade, weekly_study_hours, mastery)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {}
        "#,
        STUDENT_COLUMNS
    );

    let student = sqlx::query_as::<_, Student>(&sql)
        .bind(&claims.sub)
        .bind(name)
        .bind(payload.grade)
        .bind(payload.weekly_study_hours)
        .bind(sqlx::types::Json(payload.mastery))
        .fetch_one(&pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Student profile already exists".to_string())
            } else {
                tracing::error!("Failed to create student profile: {:?}", e);
                AppError::from(e)
            }
        })?;

    tracing::info!("Created student profile {} for user {}", student.id, claims.sub);

    Ok((StatusCode::CREATED, Json(student)))
}

/// Returns the current user's student profile.
pub async fn get_profile(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let student = find_student(&pool, &claims.sub).await?;
    Ok(Json(student))
}

/// Partially updates the current user's student profile.
pub async fn update_profile(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    if let Some(mastery) = &payload.mastery {
        mastery.validate()?;
    }
    let name = payload
        .name
        .as_deref()
        .map(|name| required_trimmed(name, "Name"))
        .transpose()?;

    let sql = format!(
        r#"
        UPDATE students SET
            name = COALESCE($2, name),
            grade = COALESCE($3, grade),
            weekly_study_hours = COALESCE($4, weekly_study_hours),
            mastery = COALESCE($5, mastery)
        WHERE user_id = $1
        RETURNING {}
        "#,
        STUDENT_COLUMNS
    );

    let student = sqlx::query_as::<_, Student>(&sql)
        .bind(&claims.sub)
        .bind(name)
        .bind(payload.grade)
        .bind(payload.weekly_study_hours)
        .bind(payload.mastery.map(sqlx::types::Json))
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Student profile not found".to_string()))?;

    Ok(Json(student))
}

/// Regenerates the student's virtual twin, replacing any previous one.
pub async fn create_twin(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let student = find_student(&pool, &claims.sub).await?;

    let twin = generate_twin(&student.mastery, student.weekly_study_hours, Utc::now());

    sqlx::query("UPDATE students SET twin_data = $1 WHERE id = $2")
        .bind(sqlx::types::Json(&twin))
        .bind(student.id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to store twin: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    tracing::info!(
        "Generated twin for student {} (target {:.1}h/week)",
        student.id,
        twin.target_weekly_hours
    );

    Ok(Json(twin))
}

/// Applies a score to one subject directly (no stored quiz involved).
pub async fn update_mastery(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<MasteryUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let student = find_student(&pool, &claims.sub).await?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let adjustment = apply_score(&mut *tx, student.id, payload.subject, payload.score).await?;

    tx.commit()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(adjustment))
}

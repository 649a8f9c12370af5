// src/handlers/feedback.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::{classroom::find_owned_classroom, student::find_student, teacher::find_teacher},
    models::feedback::{CreateFeedbackRequest, FEEDBACK_COLUMNS, Feedback},
    utils::{html::clean_required, jwt::Claims},
};

/// Leaves feedback for a student of one of the teacher's classrooms.
pub async fn add_feedback(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateFeedbackRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let message = clean_required(&payload.message, "Feedback message")?;

    let teacher = find_teacher(&pool, &claims.sub).await?;
    let classroom = find_owned_classroom(&pool, payload.classroom_id, teacher.id).await?;

    let enrolled: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM classroom_students WHERE classroom_id = $1 AND student_id = $2)",
    )
    .bind(classroom.id)
    .bind(payload.student_id)
    .fetch_one(&pool)
    .await?;

    if !enrolled {
        return Err(AppError::NotFound(
            "Student is not enrolled in this classroom".to_string(),
        ));
    }

    let sql = format!(
        r#"
        INSERT INTO feedback (teacher_id, student_id, classroom_id, message)
        VALUES ($1, $2, $3, $4)
        RETURNING {}
        "#,
        FEEDBACK_COLUMNS
    );

    let feedback = sqlx::query_as::<_, Feedback>(&sql)
        .bind(teacher.id)
        .bind(payload.student_id)
        .bind(classroom.id)
        .bind(message)
        .fetch_one(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert feedback: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok((StatusCode::CREATED, Json(feedback)))
}

/// Lists feedback addressed to the current student, newest first.
pub async fn list_feedback(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let student = find_student(&pool, &claims.sub).await?;

    let sql = format!(
        "SELECT {} FROM feedback WHERE student_id = $1 ORDER BY created_at DESC, id DESC",
        FEEDBACK_COLUMNS
    );

    let feedback = sqlx::query_as::<_, Feedback>(&sql)
        .bind(student.id)
        .fetch_all(&pool)
        .await?;

    Ok(Json(feedback))
}

/// Marks one feedback entry as read. Idempotent.
pub async fn mark_feedback_read(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(feedback_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let student = find_student(&pool, &claims.sub).await?;

    let (owner_id, is_read): (i64, bool) =
        sqlx::query_as("SELECT student_id, is_read FROM feedback WHERE id = $1")
            .bind(feedback_id)
            .fetch_optional(&pool)
            .await?
            .ok_or(AppError::NotFound("Feedback not found".to_string()))?;

    if owner_id != student.id {
        return Err(AppError::Forbidden(
            "Feedback belongs to another student".to_string(),
        ));
    }

    if !is_read {
        sqlx::query("UPDATE feedback SET is_read = TRUE WHERE id = $1")
            .bind(feedback_id)
            .execute(&pool)
            .await?;
    }

    Ok(Json(serde_json::json!({ "id": feedback_id, "is_read": true })))
}

// src/handlers/classroom.rs

use std::collections::HashMap;

use async_trait::async_trait;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    engine::{
        RngSource, Subject,
        analytics::{ScoredQuiz, summarize},
        classroom_code::{CodeRegistry, generate_unique_code, normalize_code},
    },
    error::{AppError, is_unique_violation},
    handlers::{student::find_student, teacher::find_teacher},
    models::{
        classroom::{
            CLASSROOM_COLUMNS, Classroom, ClassroomStudent, ClassroomWithCount,
            CreateClassroomRequest, JoinClassroomRequest, JoinedClassroom, StudentProgress,
        },
        student::Student,
    },
    utils::{
        html::{clean_html, clean_required},
        jwt::Claims,
    },
};

/// Classroom codes already stored in the database.
struct StoredClassroomCodes<'a> {
    pool: &'a PgPool,
}

#[async_trait]
impl<'a> CodeRegistry for StoredClassroomCodes<'a> {
    type Error = AppError;

    async fn is_taken(&self, code: &str) -> Result<bool, AppError> {
        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM classrooms WHERE code = $1)")
                .bind(code)
                .fetch_one(self.pool)
                .await?;
        Ok(taken)
    }
}

/// Loads a classroom only if `teacher_id` owns it.
pub(crate) async fn find_owned_classroom(
    pool: &PgPool,
    classroom_id: i64,
    teacher_id: i64,
) -> Result<Classroom, AppError> {
    let sql = format!(
        "SELECT {} FROM classrooms WHERE id = $1 AND teacher_id = $2",
        CLASSROOM_COLUMNS
    );

    sqlx::query_as::<_, Classroom>(&sql)
        .bind(classroom_id)
        .bind(teacher_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound(
            "Classroom not found or unauthorized".to_string(),
        ))
}

/// Creates a classroom with a freshly generated join code.
/// Teacher only.
pub async fn create_classroom(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateClassroomRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    let name = clean_required(&payload.name, "Classroom name")?;

    let teacher = find_teacher(&pool, &claims.sub).await?;

    let mut rng = RngSource::from_entropy();
    let code = generate_unique_code(
        &mut rng,
        &StoredClassroomCodes { pool: &pool },
        config.classroom_code_max_attempts,
    )
    .await?;

    let description = payload
        .description
        .as_deref()
        .map(clean_html)
        .filter(|d| !d.is_empty());

    let sql = format!(
        r#"
        INSERT INTO classrooms (teacher_id, name, code, description)
        VALUES ($1, $2, $3, $4)
        RETURNING {}
        "#,
        CLASSROOM_COLUMNS
    );

    let classroom = sqlx::query_as::<_, Classroom>(&sql)
        .bind(teacher.id)
        .bind(&name)
        .bind(&code)
        .bind(description)
        .fetch_one(&pool)
        .await
        .map_err(|e| {
            // Another request grabbed the same code between the check and the insert.
            if is_unique_violation(&e) {
                AppError::Conflict("Classroom code collision, please retry".to_string())
            } else {
                tracing::error!("Failed to create classroom: {:?}", e);
                AppError::from(e)
            }
        })?;

    tracing::info!(
        "Teacher {} created classroom {} with code {}",
        teacher.id,
        classroom.id,
        classroom.code
    );

    Ok((StatusCode::CREATED, Json(classroom)))
}

/// Lists the current teacher's classrooms with enrollment counts.
pub async fn list_classrooms(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let teacher = find_teacher(&pool, &claims.sub).await?;

    let classrooms = sqlx::query_as::<_, ClassroomWithCount>(
        r#"
        SELECT
            c.id, c.teacher_id, c.name, c.code, c.description, c.is_active, c.created_at,
            COUNT(cs.id) AS student_count
        FROM classrooms c
        LEFT JOIN classroom_students cs ON cs.classroom_id = c.id
        WHERE c.teacher_id = $1
        GROUP BY c.id
        ORDER BY c.created_at DESC
        "#,
    )
    .bind(teacher.id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list classrooms: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(classrooms))
}

#[derive(sqlx::FromRow)]
struct EnrolledStudent {
    #[sqlx(flatten)]
    student: Student,
    joined_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct QuizScoreRow {
    student_id: i64,
    #[sqlx(try_from = "String")]
    subject: Subject,
    score: i32,
}

/// Lists the students of a classroom with their progress analytics.
/// Teacher only; the classroom must belong to the caller.
pub async fn list_classroom_students(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(classroom_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let teacher = find_teacher(&pool, &claims.sub).await?;
    let classroom = find_owned_classroom(&pool, classroom_id, teacher.id).await?;

    let enrolled = sqlx::query_as::<_, EnrolledStudent>(
        r#"
        SELECT
            s.id, s.user_id, s.name, s.grade, s.weekly_study_hours,
            s.mastery, s.twin_data, s.created_at,
            cs.joined_at
        FROM classroom_students cs
        JOIN students s ON s.id = cs.student_id
        WHERE cs.classroom_id = $1
        ORDER BY cs.joined_at ASC
        "#,
    )
    .bind(classroom.id)
    .fetch_all(&pool)
    .await?;

    let student_ids: Vec<i64> = enrolled.iter().map(|e| e.student.id).collect();

    // Newest first, so the analytics window sees the latest attempts.
    let scores = sqlx::query_as::<_, QuizScoreRow>(
        r#"
        SELECT student_id, subject, score
        FROM quizzes
        WHERE student_id = ANY($1) AND completed_at IS NOT NULL
        ORDER BY completed_at DESC, id DESC
        "#,
    )
    .bind(&student_ids)
    .fetch_all(&pool)
    .await?;

    let mut by_student: HashMap<i64, Vec<ScoredQuiz>> = HashMap::new();
    for row in scores {
        by_student.entry(row.student_id).or_default().push(ScoredQuiz {
            subject: row.subject,
            score: row.score,
        });
    }

    let students: Vec<ClassroomStudent> = enrolled
        .into_iter()
        .map(|e| {
            let history = by_student.remove(&e.student.id).unwrap_or_default();
            let progress = StudentProgress {
                summary: summarize(&history),
                mastery: e.student.mastery.0,
            };
            ClassroomStudent {
                student: e.student,
                joined_at: e.joined_at,
                progress,
            }
        })
        .collect();

    Ok(Json(students))
}

/// Joins the current student to the classroom with the given code.
pub async fn join_classroom(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<JoinClassroomRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let invalid_code = || AppError::NotFound("Invalid classroom code".to_string());

    let Some(code) = normalize_code(&payload.code) else {
        tracing::warn!("Rejected malformed classroom code from user {}", claims.sub);
        return Err(invalid_code());
    };

    let student = find_student(&pool, &claims.sub).await?;

    let sql = format!("SELECT {} FROM classrooms WHERE code = $1", CLASSROOM_COLUMNS);
    let classroom = sqlx::query_as::<_, Classroom>(&sql)
        .bind(&code)
        .fetch_optional(&pool)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(|| {
            tracing::warn!("Student {} tried unknown or inactive code {}", student.id, code);
            invalid_code()
        })?;

    let joined_at: DateTime<Utc> = sqlx::query_scalar(
        r#"
        INSERT INTO classroom_students (classroom_id, student_id)
        VALUES ($1, $2)
        RETURNING joined_at
        "#,
    )
    .bind(classroom.id)
    .bind(student.id)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("Already joined this classroom".to_string())
        } else {
            tracing::error!("Failed to join classroom: {:?}", e);
            AppError::from(e)
        }
    })?;

    tracing::info!("Student {} joined classroom {}", student.id, classroom.id);

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "classroom_id": classroom.id,
            "name": classroom.name,
            "joined_at": joined_at,
        })),
    ))
}

/// Lists the classrooms the current student has joined.
pub async fn list_joined_classrooms(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let student = find_student(&pool, &claims.sub).await?;

    let classrooms = sqlx::query_as::<_, JoinedClassroom>(
        r#"
        SELECT
            c.id, c.name, c.code, c.description, c.is_active,
            t.name AS teacher_name,
            cs.joined_at
        FROM classroom_students cs
        JOIN classrooms c ON c.id = cs.classroom_id
        JOIN teachers t ON t.id = c.teacher_id
        WHERE cs.student_id = $1
        ORDER BY cs.joined_at DESC
        "#,
    )
    .bind(student.id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(classrooms))
}

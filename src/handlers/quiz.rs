// src/handlers/quiz.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    engine::{QuestionBank, RngSource, score_quiz},
    error::AppError,
    handlers::{
        student::{apply_score, find_student},
        teacher::find_teacher,
    },
    models::quiz::{
        GenerateQuizRequest, QUIZ_COLUMNS, Quiz, QuizListParams, QuizResponse,
        SubmitQuizRequest, SubmitQuizResponse,
    },
    utils::jwt::Claims,
};

/// Generates a quiz for the requested subject from the question bank.
///
/// The answer key stays in the database; the response hides `correct_index`.
pub async fn generate_quiz(
    State(pool): State<PgPool>,
    State(bank): State<Arc<QuestionBank>>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<GenerateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let student = find_student(&pool, &claims.sub).await?;

    let mut rng = RngSource::from_entropy();
    let questions = bank.draw(req.subject, config.quiz_question_count, &mut rng);

    let sql = format!(
        r#"
        INSERT INTO quizzes (student_id, subject, questions)
        VALUES ($1, $2, $3)
        RETURNING {}
        "#,
        QUIZ_COLUMNS
    );

    let quiz = sqlx::query_as::<_, Quiz>(&sql)
        .bind(student.id)
        .bind(req.subject.as_str())
        .bind(sqlx::types::Json(&questions))
        .fetch_one(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create quiz: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    Ok((StatusCode::CREATED, Json(QuizResponse::from(quiz))))
}

/// Lists the current student's quizzes, newest first, optionally for one subject.
pub async fn list_quizzes(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<QuizListParams>,
) -> Result<impl IntoResponse, AppError> {
    let student = find_student(&pool, &claims.sub).await?;

    let sql = format!(
        r#"
        SELECT {}
        FROM quizzes
        WHERE student_id = $1
          AND ($2::TEXT IS NULL OR subject = $2)
        ORDER BY created_at DESC, id DESC
        "#,
        QUIZ_COLUMNS
    );

    let quizzes = sqlx::query_as::<_, Quiz>(&sql)
        .bind(student.id)
        .bind(params.subject.map(|s| s.as_str()))
        .fetch_all(&pool)
        .await?;

    let quizzes: Vec<QuizResponse> = quizzes.into_iter().map(QuizResponse::from).collect();

    Ok(Json(quizzes))
}

/// Retrieves a single quiz.
///
/// * Students may only read their own quizzes.
/// * Teachers may read quizzes of students enrolled in one of their classrooms.
pub async fn get_quiz(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let sql = format!("SELECT {} FROM quizzes WHERE id = $1", QUIZ_COLUMNS);
    let quiz = sqlx::query_as::<_, Quiz>(&sql)
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    if claims.is_student() {
        let student = find_student(&pool, &claims.sub).await?;
        if quiz.student_id != student.id {
            return Err(AppError::Forbidden("Not your quiz".to_string()));
        }
    } else if claims.is_teacher() {
        let teacher = find_teacher(&pool, &claims.sub).await?;
        let teaches_student: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1
                FROM classroom_students cs
                JOIN classrooms c ON c.id = cs.classroom_id
                WHERE cs.student_id = $1 AND c.teacher_id = $2
            )
            "#,
        )
        .bind(quiz.student_id)
        .bind(teacher.id)
        .fetch_one(&pool)
        .await?;

        if !teaches_student {
            return Err(AppError::Forbidden(
                "Student is not in any of your classrooms".to_string(),
            ));
        }
    } else {
        return Err(AppError::Forbidden("Unsupported role".to_string()));
    }

    Ok(Json(QuizResponse::from(quiz)))
}

/// Submits answers for a quiz.
///
/// * Scores the answers against the stored questions.
/// * Stores answers, score and completion time (once; resubmission is 409).
/// * Adjusts the student's mastery for the quiz subject.
///
/// Both writes share one transaction.
pub async fn submit_quiz(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let student = find_student(&pool, &claims.sub).await?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    let sql = format!("SELECT {} FROM quizzes WHERE id = $1 FOR UPDATE", QUIZ_COLUMNS);
    let quiz = sqlx::query_as::<_, Quiz>(&sql)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    if quiz.student_id != student.id {
        return Err(AppError::Forbidden("Not your quiz".to_string()));
    }
    if quiz.is_completed() {
        return Err(AppError::Conflict("Quiz already submitted".to_string()));
    }
    if req.answers.len() > quiz.questions.len() {
        return Err(AppError::BadRequest(format!(
            "Got {} answers for {} questions",
            req.answers.len(),
            quiz.questions.len()
        )));
    }

    let result = score_quiz(&quiz.questions, &req.answers);

    sqlx::query(
        r#"
        UPDATE quizzes
        SET answers = $1, score = $2, time_spent = $3, completed_at = CURRENT_TIMESTAMP
        WHERE id = $4 AND completed_at IS NULL
        "#,
    )
    .bind(sqlx::types::Json(&req.answers))
    .bind(result.score)
    .bind(req.time_spent)
    .bind(quiz.id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!("Failed to store quiz submission: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let mastery = apply_score(&mut *tx, student.id, quiz.subject, result.score).await?;

    tx.commit()
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    tracing::info!(
        "Student {} submitted quiz {} ({}): {}/{} correct, score {}, mastery {} -> {}",
        student.id,
        quiz.id,
        quiz.subject,
        result.correct,
        result.total,
        result.score,
        mastery.previous,
        mastery.new_mastery
    );

    Ok(Json(SubmitQuizResponse {
        score: result.score,
        correct: result.correct,
        total: result.total,
        mastery,
    }))
}

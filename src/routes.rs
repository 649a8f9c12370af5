// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{classroom, feedback, quiz, student, teacher},
    state::AppState,
    utils::jwt::{auth_middleware, student_middleware, teacher_middleware},
};

/// Assembles the main application router.
///
/// * Every route requires a valid bearer token.
/// * `/api/students` is student-only, `/api/teachers` teacher-only.
/// * `/api/quizzes` is student-only except `GET /{id}`, which teachers may use too.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let student_routes = Router::new()
        .route(
            "/profile",
            post(student::create_profile)
                .get(student::get_profile)
                .put(student::update_profile),
        )
        .route("/twin", post(student::create_twin))
        .route("/mastery", post(student::update_mastery))
        .route("/classrooms", get(classroom::list_joined_classrooms))
        .route("/classrooms/join", post(classroom::join_classroom))
        .route("/feedback", get(feedback::list_feedback))
        .route("/feedback/{id}/read", post(feedback::mark_feedback_read))
        .route_layer(middleware::from_fn(student_middleware));

    let quiz_routes = Router::new()
        .route("/{id}", get(quiz::get_quiz))
        .merge(
            Router::new()
                .route("/", post(quiz::generate_quiz).get(quiz::list_quizzes))
                .route("/{id}/submit", post(quiz::submit_quiz))
                .route_layer(middleware::from_fn(student_middleware)),
        );

    let teacher_routes = Router::new()
        .route(
            "/profile",
            post(teacher::create_profile)
                .get(teacher::get_profile)
                .put(teacher::update_profile),
        )
        .route(
            "/classrooms",
            post(classroom::create_classroom).get(classroom::list_classrooms),
        )
        .route(
            "/classrooms/{id}/students",
            get(classroom::list_classroom_students),
        )
        .route("/feedback", post(feedback::add_feedback))
        .route_layer(middleware::from_fn(teacher_middleware));

    let api = Router::new()
        .nest("/api/students", student_routes)
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/teachers", teacher_routes)
        // Runs before the role checks above; unmatched paths still fall through to 404.
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    api.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    )
    .with_state(state)
}

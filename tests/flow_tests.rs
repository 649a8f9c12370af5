// tests/flow_tests.rs
//
// End-to-end flows against a real Postgres. They run whenever `DATABASE_URL`
// is set and return early otherwise.

mod common;

use common::{spawn_app_with_db, token_for, unique_user};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use sqlx::{PgPool, types::Json};
use study_twin::{
    engine::QuizQuestion,
    utils::jwt::{ROLE_STUDENT, ROLE_TEACHER},
};

async fn create_student(client: &Client, address: &str, token: &str) -> Value {
    let response = client
        .post(format!("{}/api/students/profile", address))
        .bearer_auth(token)
        .json(&json!({
            "name": "Ana",
            "grade": 8,
            "weekly_study_hours": 10.0,
            "mastery": {
                "math": 50, "science": 60, "english": 70, "history": 40, "foreign_language": 90
            }
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

async fn create_teacher_with_classroom(client: &Client, address: &str, token: &str) -> Value {
    let response = client
        .post(format!("{}/api/teachers/profile", address))
        .bearer_auth(token)
        .json(&json!({ "name": "Mr. Silva", "school": "  Escola Central  " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let teacher: Value = response.json().await.unwrap();
    assert_eq!(teacher["school"], "Escola Central");

    let response = client
        .post(format!("{}/api/teachers/classrooms", address))
        .bearer_auth(token)
        .json(&json!({ "name": "8th Grade A", "description": "<b>Morning</b> group" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    response.json().await.unwrap()
}

/// Reads the stored answer key, which the API never reveals before submission.
async fn answer_key(pool: &PgPool, quiz_id: i64) -> Vec<i32> {
    let (Json(questions),): (Json<Vec<QuizQuestion>>,) =
        sqlx::query_as("SELECT questions FROM quizzes WHERE id = $1")
            .bind(quiz_id)
            .fetch_one(pool)
            .await
            .unwrap();
    questions.iter().map(|q| q.correct_index).collect()
}

#[tokio::test]
async fn test_student_profile_lifecycle() {
    let Some((address, _pool)) = spawn_app_with_db().await else {
        return;
    };
    let client = Client::new();
    let token = token_for(&unique_user("student"), ROLE_STUDENT);

    let response = client
        .get(format!("{}/api/students/profile", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let student = create_student(&client, &address, &token).await;
    assert_eq!(student["mastery"]["math"], 50);
    assert!(student["twin_data"].is_null());

    // Second profile for the same user
    let response = client
        .post(format!("{}/api/students/profile", address))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Ana",
            "grade": 8,
            "weekly_study_hours": 10.0,
            "mastery": {
                "math": 50, "science": 50, "english": 50, "history": 50, "foreign_language": 50
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Partial update keeps untouched fields
    let response = client
        .put(format!("{}/api/students/profile", address))
        .bearer_auth(&token)
        .json(&json!({ "grade": 9 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["grade"], 9);
    assert_eq!(updated["name"], "Ana");
    assert_eq!(updated["weekly_study_hours"], 10.0);
}

#[tokio::test]
async fn test_quiz_submission_updates_mastery_once() {
    let Some((address, pool)) = spawn_app_with_db().await else {
        return;
    };
    let client = Client::new();
    let token = token_for(&unique_user("student"), ROLE_STUDENT);
    create_student(&client, &address, &token).await;

    let response = client
        .post(format!("{}/api/quizzes", address))
        .bearer_auth(&token)
        .json(&json!({ "subject": "math" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let quiz: Value = response.json().await.unwrap();
    let quiz_id = quiz["id"].as_i64().unwrap();

    let questions = quiz["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 5);
    for question in questions {
        assert_eq!(question["options"].as_array().unwrap().len(), 4);
        assert!(question.get("correct_index").is_none());
    }

    let answers = answer_key(&pool, quiz_id).await;

    let response = client
        .post(format!("{}/api/quizzes/{}/submit", address, quiz_id))
        .bearer_auth(&token)
        .json(&json!({ "answers": answers, "time_spent": 120 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let result: Value = response.json().await.unwrap();
    assert_eq!(result["score"], 100);
    assert_eq!(result["correct"], 5);
    assert_eq!(result["mastery"]["previous"], 50);
    assert_eq!(result["mastery"]["new_mastery"], 58);
    assert_eq!(result["mastery"]["delta"], 8);

    // Resubmission must not move mastery again
    let response = client
        .post(format!("{}/api/quizzes/{}/submit", address, quiz_id))
        .bearer_auth(&token)
        .json(&json!({ "answers": answers }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client
        .get(format!("{}/api/students/profile", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let student: Value = response.json().await.unwrap();
    assert_eq!(student["mastery"]["math"], 58);
    assert_eq!(student["mastery"]["science"], 60);

    // Completed quizzes reveal the answer key
    let response = client
        .get(format!("{}/api/quizzes/{}", address, quiz_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let completed: Value = response.json().await.unwrap();
    assert_eq!(completed["score"], 100);
    assert_eq!(completed["time_spent"], 120);
    assert!(completed["questions"][0]["correct_index"].is_number());

    // Another student cannot read it
    let other = token_for(&unique_user("student"), ROLE_STUDENT);
    create_student(&client, &address, &other).await;
    let response = client
        .get(format!("{}/api/quizzes/{}", address, quiz_id))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .get(format!("{}/api/quizzes?subject=math", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let listed: Vec<Value> = response.json().await.unwrap();
    assert_eq!(listed.len(), 1);

    let response = client
        .get(format!("{}/api/quizzes?subject=history", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let listed: Vec<Value> = response.json().await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_direct_mastery_update_and_twin_regeneration() {
    let Some((address, _pool)) = spawn_app_with_db().await else {
        return;
    };
    let client = Client::new();
    let token = token_for(&unique_user("student"), ROLE_STUDENT);
    create_student(&client, &address, &token).await;

    let response = client
        .post(format!("{}/api/students/mastery", address))
        .bearer_auth(&token)
        .json(&json!({ "subject": "math", "score": 30 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let adjustment: Value = response.json().await.unwrap();
    assert_eq!(adjustment["new_mastery"], 45);
    assert_eq!(adjustment["delta"], -5);

    let response = client
        .post(format!("{}/api/students/twin", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let twin: Value = response.json().await.unwrap();
    assert_eq!(twin["target_weekly_hours"], 12.5);
    assert_eq!(twin["target_mastery"]["math"], 65);
    assert_eq!(twin["target_mastery"]["foreign_language"], 100);
    assert_eq!(twin["micro_habits"].as_array().unwrap().len(), 5);

    let response = client
        .get(format!("{}/api/students/profile", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let student: Value = response.json().await.unwrap();
    assert_eq!(student["twin_data"], twin);

    // Regenerating after a mastery change replaces the stored snapshot
    let response = client
        .post(format!("{}/api/students/mastery", address))
        .bearer_auth(&token)
        .json(&json!({ "subject": "math", "score": 95 }))
        .send()
        .await
        .unwrap();
    let adjustment: Value = response.json().await.unwrap();
    assert_eq!(adjustment["new_mastery"], 53);

    let response = client
        .put(format!("{}/api/students/profile", address))
        .bearer_auth(&token)
        .json(&json!({ "weekly_study_hours": 36.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .post(format!("{}/api/students/twin", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let regenerated: Value = response.json().await.unwrap();
    assert_eq!(regenerated["target_mastery"]["math"], 73);
    assert_eq!(regenerated["target_weekly_hours"], 40.0);

    let response = client
        .get(format!("{}/api/students/profile", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let student: Value = response.json().await.unwrap();
    assert_eq!(student["twin_data"], regenerated);
    assert_ne!(student["twin_data"], twin);
}

#[tokio::test]
async fn test_classroom_feedback_and_analytics() {
    let Some((address, pool)) = spawn_app_with_db().await else {
        return;
    };
    let client = Client::new();

    let teacher_token = token_for(&unique_user("teacher"), ROLE_TEACHER);
    let student_token = token_for(&unique_user("student"), ROLE_STUDENT);

    let classroom = create_teacher_with_classroom(&client, &address, &teacher_token).await;
    let classroom_id = classroom["id"].as_i64().unwrap();
    let code = classroom["code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 6);
    assert!(!classroom["description"].as_str().unwrap().contains("<script"));

    let student = create_student(&client, &address, &student_token).await;
    let student_id = student["id"].as_i64().unwrap();

    // Codes are matched case-insensitively, ignoring surrounding whitespace
    let response = client
        .post(format!("{}/api/students/classrooms/join", address))
        .bearer_auth(&student_token)
        .json(&json!({ "code": format!("  {}  ", code.to_lowercase()) }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .post(format!("{}/api/students/classrooms/join", address))
        .bearer_auth(&student_token)
        .json(&json!({ "code": code }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client
        .get(format!("{}/api/students/classrooms", address))
        .bearer_auth(&student_token)
        .send()
        .await
        .unwrap();
    let joined: Vec<Value> = response.json().await.unwrap();
    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0]["teacher_name"], "Mr. Silva");

    // One completed quiz and one left open
    let mut quiz_ids = Vec::new();
    for _ in 0..2 {
        let response = client
            .post(format!("{}/api/quizzes", address))
            .bearer_auth(&student_token)
            .json(&json!({ "subject": "science" }))
            .send()
            .await
            .unwrap();
        let quiz: Value = response.json().await.unwrap();
        quiz_ids.push(quiz["id"].as_i64().unwrap());
    }
    let answers = answer_key(&pool, quiz_ids[0]).await;
    let response = client
        .post(format!("{}/api/quizzes/{}/submit", address, quiz_ids[0]))
        .bearer_auth(&student_token)
        .json(&json!({ "answers": answers }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Teachers may read quizzes of their students
    let response = client
        .get(format!("{}/api/quizzes/{}", address, quiz_ids[0]))
        .bearer_auth(&teacher_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("{}/api/teachers/classrooms", address))
        .bearer_auth(&teacher_token)
        .send()
        .await
        .unwrap();
    let classrooms: Vec<Value> = response.json().await.unwrap();
    assert_eq!(classrooms.len(), 1);
    assert_eq!(classrooms[0]["student_count"], 1);

    let response = client
        .get(format!(
            "{}/api/teachers/classrooms/{}/students",
            address, classroom_id
        ))
        .bearer_auth(&teacher_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let students: Vec<Value> = response.json().await.unwrap();
    assert_eq!(students.len(), 1);
    let progress = &students[0]["progress"];
    assert_eq!(progress["recent_quiz_count"], 1);
    assert_eq!(progress["recent_avg_score"], 100);
    assert_eq!(progress["overall_quiz_count"], 1);
    assert_eq!(progress["subject_averages"]["science"]["avg"], 100);
    assert_eq!(progress["mastery"]["science"], 68);

    // Another teacher sees nothing of this classroom
    let stranger_token = token_for(&unique_user("teacher"), ROLE_TEACHER);
    create_teacher_with_classroom(&client, &address, &stranger_token).await;
    let response = client
        .get(format!(
            "{}/api/teachers/classrooms/{}/students",
            address, classroom_id
        ))
        .bearer_auth(&stranger_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .post(format!("{}/api/teachers/feedback", address))
        .bearer_auth(&teacher_token)
        .json(&json!({
            "student_id": student_id,
            "classroom_id": classroom_id,
            "message": "Great work!<script>alert(1)</script>"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let feedback: Value = response.json().await.unwrap();
    assert_eq!(feedback["message"], "Great work!");
    assert_eq!(feedback["is_read"], false);
    let feedback_id = feedback["id"].as_i64().unwrap();

    let response = client
        .get(format!("{}/api/students/feedback", address))
        .bearer_auth(&student_token)
        .send()
        .await
        .unwrap();
    let inbox: Vec<Value> = response.json().await.unwrap();
    assert_eq!(inbox.len(), 1);

    for _ in 0..2 {
        let response = client
            .post(format!(
                "{}/api/students/feedback/{}/read",
                address, feedback_id
            ))
            .bearer_auth(&student_token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let is_read: bool = sqlx::query_scalar("SELECT is_read FROM feedback WHERE id = $1")
        .bind(feedback_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(is_read);
}

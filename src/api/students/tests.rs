use crate::repositories;
use crate::test_support::{self, call};
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn individual_title_is_closed_once_the_student_joins_a_group() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.state.db();
    let course = test_support::insert_course(db, "Computer Science").await;
    let year = test_support::insert_year(db, "4").await;
    let (user, student) = test_support::insert_student(db, "S100", Some(course.id), Some(year.id)).await;
    let token = test_support::bearer_token(user.id, ctx.state.settings());

    let (status, body) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/students/me/title",
        Some(&token),
        Some(json!({"project_title": "  Solar Drying  "})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["project_title"], "Solar Drying");

    let group = test_support::insert_group(db, "Group 1", course.id, year.id, &[student.id]).await;

    let (status, _) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/students/me/title",
        Some(&token),
        Some(json!({"project_title": "Wind Power"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let stored = repositories::students::find_by_id(db, student.id).await.expect("query").expect("student");
    assert_eq!(stored.project_title.as_deref(), Some("Solar Drying"));

    let (status, profile) = call(&ctx.app, Method::GET, "/api/v1/students/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["reg_number"], "S100");
    assert_eq!(profile["is_in_group"], true);
    assert_eq!(profile["is_group_leader"], true);
    assert_eq!(profile["group_id"], group.id);
}

#[tokio::test]
async fn supervisor_views_report_missing_assignments() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let (user, _) = test_support::insert_student(ctx.state.db(), "S101", None, None).await;
    let token = test_support::bearer_token(user.id, ctx.state.settings());

    let (status, body) =
        call(&ctx.app, Method::GET, "/api/v1/students/me/supervisor", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "No supervisor assigned");

    let (status, body) =
        call(&ctx.app, Method::GET, "/api/v1/students/me/group-supervisor", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "You are not in a group");
}

#[tokio::test]
async fn admin_lists_students_and_cohorts() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.state.db();
    let admin = test_support::insert_admin(db, "chief").await;
    let token = test_support::bearer_token(admin.id, ctx.state.settings());
    let course = test_support::insert_course(db, "Engineering").await;
    let year = test_support::insert_year(db, "3").await;
    for reg in ["E1", "E2", "E3"] {
        test_support::insert_student(db, reg, Some(course.id), Some(year.id)).await;
    }
    let (student_user, _) = test_support::insert_student(db, "E4", None, None).await;

    let (status, page) =
        call(&ctx.app, Method::GET, "/api/v1/students?limit=2", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK, "response: {page}");
    assert_eq!(page["total_count"], 4);
    assert_eq!(page["items"].as_array().map(Vec::len), Some(2));

    let (status, cohorts) =
        call(&ctx.app, Method::GET, "/api/v1/students/grouped", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cohorts[0]["course_id"], course.id);
    assert_eq!(cohorts[0]["students"].as_array().map(Vec::len), Some(3));

    let student_token = test_support::bearer_token(student_user.id, ctx.state.settings());
    let (status, _) = call(&ctx.app, Method::GET, "/api/v1/students", Some(&student_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

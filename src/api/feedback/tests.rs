use crate::repositories;
use crate::test_support::{self, call};
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn only_the_assigned_supervisor_gives_feedback() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.state.db();
    let sup1 = test_support::insert_supervisor(db, "sup1").await;
    let sup2 = test_support::insert_supervisor(db, "sup2").await;
    let course = test_support::insert_course(db, "Computer Science").await;
    let year = test_support::insert_year(db, "4").await;
    let (user, student) = test_support::insert_student(db, "F1", Some(course.id), Some(year.id)).await;
    let group = test_support::insert_group(db, "Group 1", course.id, year.id, &[student.id]).await;
    repositories::students::set_supervisor(db, student.id, sup1.id).await.expect("assign");
    repositories::groups::set_supervisor(db, group.id, sup1.id).await.expect("assign");

    let sup1_token = test_support::bearer_token(sup1.id, ctx.state.settings());
    let sup2_token = test_support::bearer_token(sup2.id, ctx.state.settings());

    let (status, _) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/feedback",
        Some(&sup2_token),
        Some(json!({"owner_type": "student", "owner_id": student.id, "content": "Tighten chapter 2"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/feedback",
        Some(&sup1_token),
        Some(json!({"owner_type": "student", "owner_id": student.id + 100, "content": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, given) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/feedback",
        Some(&sup1_token),
        Some(json!({"owner_type": "student", "owner_id": student.id, "content": "Tighten chapter 2"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "response: {given}");
    assert_eq!(given["owner_name"], "Student F1");

    let (status, given) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/feedback",
        Some(&sup1_token),
        Some(json!({"owner_type": "projectgroup", "owner_id": group.id, "content": "Good demo"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "response: {given}");
    assert_eq!(given["owner_type"], "group");
    assert_eq!(given["owner_name"], "Group 1");

    let student_token = test_support::bearer_token(user.id, ctx.state.settings());
    let (status, mine) = call(&ctx.app, Method::GET, "/api/v1/feedback/mine", Some(&student_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().map(Vec::len), Some(2));

    let (status, listed) = call(&ctx.app, Method::GET, "/api/v1/feedback/given", Some(&sup2_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(0));
}

use crate::repositories;
use crate::test_support::{self, call};
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn reassignment_requires_confirmation_then_notifies_once() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.state.db();
    let admin = test_support::insert_admin(db, "chief").await;
    let token = test_support::bearer_token(admin.id, ctx.state.settings());
    let sup1 = test_support::insert_supervisor(db, "sup1").await;
    let sup2 = test_support::insert_supervisor(db, "sup2").await;
    let (_, student) = test_support::insert_student(db, "S100", None, None).await;

    let (status, body) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/supervision/students",
        Some(&token),
        Some(json!({"reg_number": "S100", "supervisor_id": sup1.id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["changed"], true);
    assert!(body["previous_supervisor_id"].is_null());

    let (status, body) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/supervision/students",
        Some(&token),
        Some(json!({"reg_number": "S100", "supervisor_id": sup2.id})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["requires_confirmation"], true);
    let stored = repositories::students::find_by_id(db, student.id).await.expect("query").expect("student");
    assert_eq!(stored.supervisor_id, Some(sup1.id));

    let (status, body) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/supervision/students",
        Some(&token),
        Some(json!({"reg_number": "S100", "supervisor_id": sup2.id, "force": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["previous_supervisor_id"], sup1.id);
    assert_eq!(body["supervisor_id"], sup2.id);

    let (status, body) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/supervision/students",
        Some(&token),
        Some(json!({"reg_number": "S100", "supervisor_id": sup2.id, "force": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], false);

    assert_eq!(repositories::notifications::count(db, sup1.id, false).await.expect("count"), 1);
    assert_eq!(repositories::notifications::count(db, sup2.id, false).await.expect("count"), 1);
}

#[tokio::test]
async fn grouped_students_are_assigned_through_their_group() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.state.db();
    let admin = test_support::insert_admin(db, "chief").await;
    let token = test_support::bearer_token(admin.id, ctx.state.settings());
    let sup1 = test_support::insert_supervisor(db, "sup1").await;
    let course = test_support::insert_course(db, "Computer Science").await;
    let year = test_support::insert_year(db, "4").await;
    let (_, student) = test_support::insert_student(db, "G1", Some(course.id), Some(year.id)).await;
    let group = test_support::insert_group(db, "Group 1", course.id, year.id, &[student.id]).await;

    let (status, _) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/supervision/students",
        Some(&token),
        Some(json!({"reg_number": "G1", "supervisor_id": sup1.id})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/supervision/groups",
        Some(&token),
        Some(json!({"group_id": group.id, "supervisor_id": sup1.id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["changed"], true);

    let (status, _) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/supervision/groups",
        Some(&token),
        Some(json!({"group_id": group.id, "supervisor_id": admin.id, "force": true})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let supervisor_token = test_support::bearer_token(sup1.id, ctx.state.settings());
    let (status, _) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/supervision/groups",
        Some(&supervisor_token),
        Some(json!({"group_id": group.id, "supervisor_id": sup1.id})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

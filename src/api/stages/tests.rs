use crate::core::time::primitive_now_utc;
use crate::db::types::MilestoneStatus;
use crate::repositories;
use crate::services::ownership::OwnerRef;
use crate::test_support::{self, call};
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn admins_manage_stages_with_unique_names() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.state.db();
    let admin = test_support::insert_admin(db, "chief").await;
    let token = test_support::bearer_token(admin.id, ctx.state.settings());
    let (student_user, _) = test_support::insert_student(db, "S100", None, None).await;
    let student_token = test_support::bearer_token(student_user.id, ctx.state.settings());

    let (status, created) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/stages",
        Some(&token),
        Some(json!({"name": " Proposal ", "description": "Topic and scope"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    assert_eq!(created["name"], "Proposal");

    let (status, _) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/stages",
        Some(&token),
        Some(json!({"name": "Proposal"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/stages",
        Some(&student_token),
        Some(json!({"name": "Defence"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, listed) = call(&ctx.app, Method::GET, "/api/v1/stages", Some(&student_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let uri = format!("/api/v1/stages/{}", created["id"]);
    let (status, _) = call(&ctx.app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&ctx.app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stages_in_use_cannot_be_deleted() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.state.db();
    let admin = test_support::insert_admin(db, "chief").await;
    let sup1 = test_support::insert_supervisor(db, "sup1").await;
    let (_, student) = test_support::insert_student(db, "S100", None, None).await;
    let stage = repositories::stages::create(db, "Proposal", None).await.expect("stage");
    let now = primitive_now_utc();
    repositories::milestones::create(
        db,
        repositories::milestones::CreateMilestone {
            owner: OwnerRef::Student(student.id),
            supervisor_id: sup1.id,
            stage_id: stage.id,
            title: "Draft",
            status: MilestoneStatus::Pending,
            completion_date: None,
            remarks: None,
            created_at: now,
        },
    )
    .await
    .expect("milestone");

    let token = test_support::bearer_token(admin.id, ctx.state.settings());
    let uri = format!("/api/v1/stages/{}", stage.id);
    let (status, _) = call(&ctx.app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

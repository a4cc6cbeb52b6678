use crate::repositories;
use crate::test_support::{self, call};
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn milestones_target_exactly_one_owner_with_a_known_stage() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.state.db();
    let sup1 = test_support::insert_supervisor(db, "sup1").await;
    let (_, student) = test_support::insert_student(db, "S100", None, None).await;
    let stage = repositories::stages::create(db, "Proposal", None).await.expect("stage");
    let token = test_support::bearer_token(sup1.id, ctx.state.settings());

    let (status, _) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/milestones",
        Some(&token),
        Some(json!({"stage_id": stage.id, "title": "Draft"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/milestones",
        Some(&token),
        Some(json!({"student_id": student.id, "group_id": 1, "stage_id": stage.id, "title": "Draft"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/milestones",
        Some(&token),
        Some(json!({"student_id": student.id, "stage_id": stage.id + 100, "title": "Draft"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid stage ID");

    let (status, _) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/milestones",
        Some(&token),
        Some(json!({"student_id": student.id + 100, "stage_id": stage.id, "title": "Draft"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, created) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/milestones",
        Some(&token),
        Some(json!({
            "student_id": student.id,
            "stage_id": stage.id,
            "title": "Draft",
            "completion_date": "2025-05-30"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    assert_eq!(created["status"], "Pending");
    assert_eq!(created["completion_date"], "2025-05-30");
    assert_eq!(created["supervisor_id"], sup1.id);
}

#[tokio::test]
async fn group_milestones_belong_to_the_group_supervisor() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.state.db();
    let sup1 = test_support::insert_supervisor(db, "sup1").await;
    let sup2 = test_support::insert_supervisor(db, "sup2").await;
    let admin = test_support::insert_admin(db, "admin").await;
    let course = test_support::insert_course(db, "Computer Science").await;
    let year = test_support::insert_year(db, "4").await;
    let (member_user, member) =
        test_support::insert_student(db, "G1", Some(course.id), Some(year.id)).await;
    let group = test_support::insert_group(db, "Group 1", course.id, year.id, &[member.id]).await;
    repositories::groups::set_supervisor(db, group.id, sup1.id).await.expect("assign");
    let stage = repositories::stages::create(db, "Implementation", None).await.expect("stage");
    let payload = json!({"group_id": group.id, "stage_id": stage.id, "title": "Prototype"});

    let other_token = test_support::bearer_token(sup2.id, ctx.state.settings());
    let (status, _) =
        call(&ctx.app, Method::POST, "/api/v1/milestones", Some(&other_token), Some(payload.clone()))
            .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let token = test_support::bearer_token(sup1.id, ctx.state.settings());
    let (status, created) =
        call(&ctx.app, Method::POST, "/api/v1/milestones", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    let uri = format!("/api/v1/milestones/{}", created["id"]);

    let (status, _) = call(
        &ctx.app,
        Method::PATCH,
        &uri,
        Some(&other_token),
        Some(json!({"status": "Completed"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin_token = test_support::bearer_token(admin.id, ctx.state.settings());
    let (status, _) = call(
        &ctx.app,
        Method::PATCH,
        &uri,
        Some(&admin_token),
        Some(json!({"status": "Completed"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) =
        call(&ctx.app, Method::PATCH, &uri, Some(&token), Some(json!({"status": "Done"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = call(
        &ctx.app,
        Method::PUT,
        &uri,
        Some(&token),
        Some(json!({"status": "In Progress", "remarks": "Demo next week"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {updated}");
    assert_eq!(updated["status"], "In Progress");
    assert_eq!(updated["title"], "Prototype");
    assert_eq!(updated["remarks"], "Demo next week");

    let (status, cleared) =
        call(&ctx.app, Method::PATCH, &uri, Some(&token), Some(json!({"remarks": ""}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(cleared["remarks"].is_null());
    assert_eq!(cleared["status"], "In Progress");

    let member_token = test_support::bearer_token(member_user.id, ctx.state.settings());
    let (status, mine) =
        call(&ctx.app, Method::GET, "/api/v1/milestones/mine", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().map(Vec::len), Some(1));
    assert_eq!(mine[0]["group_id"], group.id);
}

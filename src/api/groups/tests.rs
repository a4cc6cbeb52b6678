use crate::test_support::{self, call};
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn auto_partition_chunks_the_cohort_in_order() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.state.db();
    let course = test_support::insert_course(db, "Computer Science").await;
    let year = test_support::insert_year(db, "4").await;
    let (user, _) = test_support::insert_student(db, "A1", Some(course.id), Some(year.id)).await;
    for reg in ["A2", "A3", "A4", "A5"] {
        test_support::insert_student(db, reg, Some(course.id), Some(year.id)).await;
    }
    let token = test_support::bearer_token(user.id, ctx.state.settings());

    let (status, body) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/groups/auto",
        Some(&token),
        Some(json!({"course_id": course.id, "year_id": year.id, "group_size": 2, "base_name": "Team"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["group_names"], json!(["Team 1", "Team 2", "Team 3"]));
    let sizes: Vec<usize> = body["groups"]
        .as_array()
        .expect("groups")
        .iter()
        .map(|group| group["members"].as_array().map(Vec::len).unwrap_or(0))
        .collect();
    assert_eq!(sizes, vec![2, 2, 1]);

    let (status, _) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/groups/auto",
        Some(&token),
        Some(json!({"course_id": course.id, "year_id": 9999})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn manual_groups_keep_membership_exclusive() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.state.db();
    let admin = test_support::insert_admin(db, "chief").await;
    let token = test_support::bearer_token(admin.id, ctx.state.settings());
    let course = test_support::insert_course(db, "Computer Science").await;
    let year = test_support::insert_year(db, "4").await;
    let (_, first) = test_support::insert_student(db, "M1", Some(course.id), Some(year.id)).await;
    let (_, second) = test_support::insert_student(db, "M2", Some(course.id), Some(year.id)).await;

    let (status, group) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/groups",
        Some(&token),
        Some(json!({
            "name": "Alpha",
            "course_id": course.id,
            "year_id": year.id,
            "member_ids": [first.id, second.id]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "response: {group}");
    let group_id = group["id"].as_i64().expect("group id");

    let (status, body) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/groups",
        Some(&token),
        Some(json!({
            "name": "Beta",
            "course_id": course.id,
            "year_id": year.id,
            "member_ids": [second.id]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "response: {body}");

    let (status, _) = call(
        &ctx.app,
        Method::PUT,
        &format!("/api/v1/groups/{group_id}/leader"),
        Some(&token),
        Some(json!({"student_id": 424242})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(
        &ctx.app,
        Method::PUT,
        &format!("/api/v1/groups/{group_id}/leader"),
        Some(&token),
        Some(json!({"student_id": second.id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["leader_id"], second.id);

    let (status, body) = call(
        &ctx.app,
        Method::PATCH,
        &format!("/api/v1/groups/{group_id}"),
        Some(&token),
        Some(json!({"member_ids": [first.id]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert!(body["leader_id"].is_null());

    let (status, _) =
        call(&ctx.app, Method::DELETE, &format!("/api/v1/groups/{group_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) =
        call(&ctx.app, Method::GET, &format!("/api/v1/groups/{group_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_the_leader_registers_the_group_title() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.state.db();
    let course = test_support::insert_course(db, "Computer Science").await;
    let year = test_support::insert_year(db, "4").await;
    let (leader_user, leader) =
        test_support::insert_student(db, "L1", Some(course.id), Some(year.id)).await;
    let (member_user, member) =
        test_support::insert_student(db, "L2", Some(course.id), Some(year.id)).await;
    test_support::insert_group(db, "Group 1", course.id, year.id, &[leader.id, member.id]).await;

    let member_token = test_support::bearer_token(member_user.id, ctx.state.settings());
    let (status, _) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/groups/mine/title",
        Some(&member_token),
        Some(json!({"project_title": "Hijacked"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let leader_token = test_support::bearer_token(leader_user.id, ctx.state.settings());
    let (status, body) = call(
        &ctx.app,
        Method::POST,
        "/api/v1/groups/mine/title",
        Some(&leader_token),
        Some(json!({"project_title": "Smart Irrigation"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {body}");
    assert_eq!(body["project_title"], "Smart Irrigation");

    let (status, mine) = call(&ctx.app, Method::GET, "/api/v1/groups/mine", Some(&member_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine["project_title"], "Smart Irrigation");
}

#[tokio::test]
async fn concurrent_group_writes_cannot_share_a_student() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.state.db();
    let admin = test_support::insert_admin(db, "chief").await;
    let token = test_support::bearer_token(admin.id, ctx.state.settings());
    let course = test_support::insert_course(db, "Computer Science").await;
    let year = test_support::insert_year(db, "4").await;
    let (_, shared) = test_support::insert_student(db, "C1", Some(course.id), Some(year.id)).await;
    let (_, left) = test_support::insert_student(db, "C2", Some(course.id), Some(year.id)).await;
    let (_, right) = test_support::insert_student(db, "C3", Some(course.id), Some(year.id)).await;

    let body = |name: &str, other: i64| {
        json!({
            "name": name,
            "course_id": course.id,
            "year_id": year.id,
            "member_ids": [shared.id, other]
        })
    };
    let ((first, _), (second, _)) = tokio::join!(
        call(&ctx.app, Method::POST, "/api/v1/groups", Some(&token), Some(body("Left", left.id))),
        call(&ctx.app, Method::POST, "/api/v1/groups", Some(&token), Some(body("Right", right.id))),
    );

    let mut statuses = [first.as_u16(), second.as_u16()];
    statuses.sort_unstable();
    assert_eq!(statuses, [201, 409]);

    let memberships: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM project_group_members WHERE student_id = $1")
            .bind(shared.id)
            .fetch_one(db)
            .await
            .expect("count memberships");
    assert_eq!(memberships, 1);
}

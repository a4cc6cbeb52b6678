use super::parse_file_type;
use crate::api::errors::ApiError;
use crate::core::time::primitive_now_utc;
use crate::db::models::FileEntry;
use crate::db::types::FileType;
use crate::repositories;
use crate::services::ownership::OwnerRef;
use crate::test_support::{self, call};
use axum::http::{Method, StatusCode};
use serde_json::json;
use sqlx::PgPool;

async fn insert_entry(pool: &PgPool, owner: OwnerRef, version: i32) -> Result<FileEntry, sqlx::Error> {
    repositories::file_repository::create(
        pool,
        repositories::file_repository::CreateFileEntry {
            owner,
            file_key: "repository/student/1/abc/report.pdf",
            file_name: "report.pdf",
            file_type: FileType::Document,
            description: "Final report",
            size_bytes: 3,
            checksum: "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
            version,
            year: Some("2025"),
            uploaded_at: primitive_now_utc(),
        },
    )
    .await
}

#[test]
fn file_types_accept_wire_spellings() {
    assert_eq!(parse_file_type("document").ok(), Some(FileType::Document));
    assert_eq!(parse_file_type(" Source_Code ").ok(), Some(FileType::SourceCode));
    assert!(parse_file_type("image").is_err());
}

#[tokio::test]
async fn owner_patch_must_name_exactly_one_owner() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.state.db();
    let admin = test_support::insert_admin(db, "chief").await;
    let token = test_support::bearer_token(admin.id, ctx.state.settings());
    let course = test_support::insert_course(db, "Computer Science").await;
    let year = test_support::insert_year(db, "4").await;
    let (_, student) = test_support::insert_student(db, "R1", Some(course.id), Some(year.id)).await;
    let group = test_support::insert_group(db, "Group 1", course.id, year.id, &[student.id]).await;
    let entry = insert_entry(db, OwnerRef::Student(student.id), 1).await.expect("entry");
    let uri = format!("/api/v1/repository/{}", entry.id);

    for owner in [json!({"student_id": student.id, "group_id": group.id}), json!({})] {
        let (status, body) = call(
            &ctx.app,
            Method::PATCH,
            &uri,
            Some(&token),
            Some(json!({"description": "changed", "owner": owner})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
    }
    let unchanged = repositories::file_repository::find_by_id(db, entry.id)
        .await
        .expect("load")
        .expect("entry");
    assert_eq!(unchanged.description, "Final report");
    assert_eq!(unchanged.student_id, Some(student.id));

    let (status, _) = call(
        &ctx.app,
        Method::PATCH,
        &uri,
        Some(&token),
        Some(json!({"owner": {"group_id": group.id + 100}})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, moved) = call(
        &ctx.app,
        Method::PATCH,
        &uri,
        Some(&token),
        Some(json!({"owner": {"group_id": group.id}, "year": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "response: {moved}");
    assert!(moved["student_id"].is_null());
    assert_eq!(moved["group_id"], group.id);
    assert!(moved["year"].is_null());
    assert_eq!(moved["description"], "Final report");

    let (student_user, _) = test_support::insert_student(db, "R2", None, None).await;
    let student_token = test_support::bearer_token(student_user.id, ctx.state.settings());
    let (status, _) =
        call(&ctx.app, Method::PATCH, &uri, Some(&student_token), Some(json!({"description": "x"})))
            .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn versions_are_unique_per_owner_and_file() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.state.db();
    let (_, student) = test_support::insert_student(db, "R1", None, None).await;
    let owner = OwnerRef::Student(student.id);
    insert_entry(db, owner, 1).await.expect("first version");

    let next = repositories::file_repository::next_version(db, owner, FileType::Document, "report.pdf")
        .await
        .expect("next version");
    assert_eq!(next, 2);
    let other_type =
        repositories::file_repository::next_version(db, owner, FileType::SourceCode, "report.pdf")
            .await
            .expect("next version");
    assert_eq!(other_type, 1);

    let err = insert_entry(db, owner, 1).await.expect_err("duplicate version");
    assert!(matches!(ApiError::from_db(err, "Failed to record file"), ApiError::Conflict(_)));
    insert_entry(db, owner, next).await.expect("second version");
}

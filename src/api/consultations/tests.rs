use crate::repositories;
use crate::test_support::{self, call};
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn consultations_are_decided_once_by_their_supervisor() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.state.db();
    let sup1 = test_support::insert_supervisor(db, "sup1").await;
    let sup2 = test_support::insert_supervisor(db, "sup2").await;
    let (user, student) = test_support::insert_student(db, "S100", None, None).await;
    let token = test_support::bearer_token(user.id, ctx.state.settings());
    let payload = json!({"topic": "Methodology", "proposed_date": "2025-03-04T12:00:00+03:00"});

    let (status, _) =
        call(&ctx.app, Method::POST, "/api/v1/consultations", Some(&token), Some(payload.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    repositories::students::set_supervisor(db, student.id, sup1.id).await.expect("assign");

    let (status, booked) =
        call(&ctx.app, Method::POST, "/api/v1/consultations", Some(&token), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED, "response: {booked}");
    assert_eq!(booked["status"], "Pending");
    assert_eq!(booked["proposed_date"], "2025-03-04T09:00:00Z");
    let id = booked["id"].as_i64().expect("id");
    let uri = format!("/api/v1/consultations/{id}");

    let other_token = test_support::bearer_token(sup2.id, ctx.state.settings());
    let (status, _) =
        call(&ctx.app, Method::PATCH, &uri, Some(&other_token), Some(json!({"status": "Approved"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let sup_token = test_support::bearer_token(sup1.id, ctx.state.settings());
    let (status, pending) = call(
        &ctx.app,
        Method::GET,
        "/api/v1/consultations/supervised?status=Pending",
        Some(&sup_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending.as_array().map(Vec::len), Some(1));

    let (status, decided) =
        call(&ctx.app, Method::PATCH, &uri, Some(&sup_token), Some(json!({"status": "Approved"}))).await;
    assert_eq!(status, StatusCode::OK, "response: {decided}");
    assert_eq!(decided["status"], "Approved");

    let (status, _) =
        call(&ctx.app, Method::PATCH, &uri, Some(&sup_token), Some(json!({"status": "Rejected"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, mine) = call(&ctx.app, Method::GET, "/api/v1/consultations/mine", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine[0]["status"], "Approved");
}

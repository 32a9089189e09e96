//! HTTP-level tests for wizard sessions: reducer actions, persistence and
//! step navigation.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_session, get, get_auth, post_empty, post_json, token_for, update_field};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

#[sqlx::test(migrations = "../../db/migrations")]
async fn new_session_is_empty_at_first_step(pool: PgPool) {
    let test = common::build_test_app(pool);
    let response = post_empty(test.app(), "/api/v1/wizard-sessions").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["current_step"], 1);
    assert_eq!(json["data"]["step"], "age");
    assert_eq!(json["data"]["status"], "in_progress");
    assert_eq!(json["data"]["data"]["characters"], json!([]));
    assert!(json["data"]["data"]["theme"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_field_is_persisted(pool: PgPool) {
    let test = common::build_test_app(pool);
    let id = create_session(test.app()).await;

    update_field(test.app(), &id, "theme", "Adventure").await;

    let json = body_json(get(test.app(), &format!("/api/v1/wizard-sessions/{id}")).await).await;
    assert_eq!(json["data"]["data"]["theme"], "Adventure");
    assert_eq!(json["data"]["persisted"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_field_is_rejected(pool: PgPool) {
    let test = common::build_test_app(pool);
    let id = create_session(test.app()).await;

    let response = post_json(
        test.app(),
        &format!("/api/v1/wizard-sessions/{id}/actions"),
        json!({ "type": "UPDATE_FIELD", "field": "favourite_colour", "value": "red" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn character_lifecycle(pool: PgPool) {
    let test = common::build_test_app(pool);
    let id = create_session(test.app()).await;
    let uri = format!("/api/v1/wizard-sessions/{id}/actions");
    let character_id = Uuid::new_v4();

    let response = post_json(
        test.app(),
        &uri,
        json!({ "type": "ADD_CHARACTER", "character": { "id": character_id, "name": "Rex", "relation": "pet" } }),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["data"]["characters"][0]["name"], "Rex");

    let response = post_json(
        test.app(),
        &uri,
        json!({ "type": "UPDATE_CHARACTER", "id": character_id, "character": { "name": "Rexy", "relation": "pet" } }),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["data"]["characters"][0]["name"], "Rexy");

    let response = post_json(
        test.app(),
        &uri,
        json!({ "type": "REMOVE_CHARACTER", "id": character_id }),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["data"]["characters"], json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reset_returns_initial_record(pool: PgPool) {
    let test = common::build_test_app(pool);
    let id = create_session(test.app()).await;
    update_field(test.app(), &id, "child_name", "Mia").await;
    update_field(test.app(), &id, "style", "Watercolor").await;

    let initial = body_json(post_empty(test.app(), "/api/v1/wizard-sessions").await).await;

    let response = post_json(
        test.app(),
        &format!("/api/v1/wizard-sessions/{id}/actions"),
        json!({ "type": "RESET_WIZARD" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["data"], initial["data"]["data"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn preview_set_by_action_is_not_stored(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let id = create_session(test.app()).await;

    let response = post_json(
        test.app(),
        &format!("/api/v1/wizard-sessions/{id}/actions"),
        json!({ "type": "UPDATE_FIELD", "field": "child_photo_preview", "value": "data:image/png;base64,AAAA" }),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["data"]["child_photo"]["preview"], "data:image/png;base64,AAAA");

    let stored: (serde_json::Value,) = sqlx::query_as("SELECT data FROM wizard_sessions WHERE id = $1")
        .bind(id.parse::<Uuid>().unwrap())
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(!stored.0.to_string().contains("data:image"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn navigation_moves_one_step_within_range(pool: PgPool) {
    let test = common::build_test_app(pool);
    let id = create_session(test.app()).await;

    let response = post_empty(test.app(), &format!("/api/v1/wizard-sessions/{id}/go-back")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_empty(test.app(), &format!("/api/v1/wizard-sessions/{id}/advance")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["current_step"], 2);
    assert_eq!(json["data"]["step"], "theme");

    let response = post_empty(test.app(), &format!("/api/v1/wizard-sessions/{id}/go-back")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["current_step"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cannot_advance_past_checkout(pool: PgPool) {
    let test = common::build_test_app(pool);
    let id = create_session(test.app()).await;
    let uri = format!("/api/v1/wizard-sessions/{id}/advance");

    for _ in 1..8 {
        assert_eq!(post_empty(test.app(), &uri).await.status(), StatusCode::OK);
    }
    assert_eq!(post_empty(test.app(), &uri).await.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_session_returns_404(pool: PgPool) {
    let test = common::build_test_app(pool);
    let response = get(test.app(), &format!("/api/v1/wizard-sessions/{}", Uuid::new_v4())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn owned_session_is_private(pool: PgPool) {
    let test = common::build_test_app(pool);
    let owner = Uuid::new_v4();
    let token = token_for(owner, "owner@example.com");

    let response = common::post_json_auth(test.app(), "/api/v1/wizard-sessions", json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let id = json["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(json["data"]["user_id"], owner.to_string());

    let uri = format!("/api/v1/wizard-sessions/{id}");
    assert_eq!(get(test.app(), &uri).await.status(), StatusCode::FORBIDDEN);
    assert_eq!(get_auth(test.app(), &uri, &token).await.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_token_is_rejected_even_where_optional(pool: PgPool) {
    let test = common::build_test_app(pool);
    let response = get_auth(test.app(), &format!("/api/v1/wizard-sessions/{}", Uuid::new_v4()), "garbage").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

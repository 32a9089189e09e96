//! HTTP-level tests for claiming an order after sign-in.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, checkout_completed_event, create_session, fill_wizard, post_empty, post_json,
    post_json_auth, post_stripe_event, token_for,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

async fn placed_order(test: &common::TestApp) -> String {
    let id = create_session(test.app()).await;
    fill_wizard(test, &id, Some("Test@Example.com")).await;
    let response = post_empty(test.app(), &format!("/api/v1/wizard-sessions/{id}/checkout")).await;
    body_json(response).await["data"]["session_id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_links_order_to_account(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let session_id = placed_order(&test).await;
    let user_id = Uuid::new_v4();
    let token = token_for(user_id, "test@example.com");

    let response = post_json_auth(
        test.app(),
        "/api/v1/orders/claim",
        json!({ "session_id": session_id }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["user_id"], user_id.to_string());

    // Claiming again is a no-op.
    let response = post_json_auth(
        test.app(),
        "/api/v1/orders/claim",
        json!({ "session_id": session_id }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let owner: (Option<Uuid>,) = sqlx::query_as("SELECT user_id FROM storybooks")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(owner.0, Some(user_id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn different_email_is_forbidden(pool: PgPool) {
    let test = common::build_test_app(pool);
    let session_id = placed_order(&test).await;
    let token = token_for(Uuid::new_v4(), "someone@example.com");

    let response = post_json_auth(
        test.app(),
        "/api/v1/orders/claim",
        json!({ "session_id": session_id }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_account_conflicts(pool: PgPool) {
    let test = common::build_test_app(pool);
    let session_id = placed_order(&test).await;

    let first = token_for(Uuid::new_v4(), "test@example.com");
    let second = token_for(Uuid::new_v4(), "test@example.com");
    let body = json!({ "session_id": session_id });

    let response = post_json_auth(test.app(), "/api/v1/orders/claim", body.clone(), &first).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = post_json_auth(test.app(), "/api/v1/orders/claim", body, &second).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_session_is_404(pool: PgPool) {
    let test = common::build_test_app(pool);
    let token = token_for(Uuid::new_v4(), "test@example.com");
    let response = post_json_auth(
        test.app(),
        "/api/v1/orders/claim",
        json!({ "session_id": "cs_missing" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_requires_sign_in(pool: PgPool) {
    let test = common::build_test_app(pool);
    let response = post_json(
        test.app(),
        "/api/v1/orders/claim",
        json!({ "session_id": "cs_any" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_before_payment_still_forwards_order(pool: PgPool) {
    let test = common::build_test_app(pool.clone());
    let session_id = placed_order(&test).await;
    let user_id = Uuid::new_v4();
    let token = token_for(user_id, "test@example.com");

    // The success page can claim before Stripe's webhook arrives.
    let response = post_json_auth(
        test.app(),
        "/api/v1/orders/claim",
        json!({ "session_id": session_id }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "pending_payment");

    let response =
        post_stripe_event(test.app(), checkout_completed_event(&session_id, json!({}))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "processed");
    assert_eq!(test.forwarder.count(), 1);

    let row: (Option<Uuid>, String) = sqlx::query_as("SELECT user_id, status FROM storybooks")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row.0, Some(user_id));
    assert_eq!(row.1, "payment_received");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_after_payment_marks_claimed(pool: PgPool) {
    let test = common::build_test_app(pool);
    let session_id = placed_order(&test).await;
    post_stripe_event(test.app(), checkout_completed_event(&session_id, json!({}))).await;

    let token = token_for(Uuid::new_v4(), "test@example.com");
    let response = post_json_auth(
        test.app(),
        "/api/v1/orders/claim",
        json!({ "session_id": session_id }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "claimed_by_user");
    assert_eq!(test.forwarder.count(), 1);
}

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tokio::sync::Notify;
use tower::ServiceExt;
use uuid::Uuid;

use storybook_api::auth::jwt::{generate_access_token, JwtConfig, AUTHENTICATED_AUDIENCE};
use storybook_api::config::{AutomationConfig, ServerConfig, StorageConfig, StripeConfig};
use storybook_api::router::build_app_router;
use storybook_api::state::AppState;
use storybook_core::webhook_signature::{signature_header, SIGNATURE_HEADER};
use storybook_integrations::{
    CheckoutRequest, CheckoutSession, ForwardError, ForwardedOrder, ObjectStore, OrderForwarder,
    PaymentError, PaymentGateway, StorageError,
};

pub const STRIPE_WEBHOOK_SECRET: &str = "whsec_test_secret";
pub const AUTOMATION_SECRET: &str = "automation-test-secret";

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Records checkout requests and hands out sequential session ids.
#[derive(Default)]
pub struct FakeGateway {
    pub requests: Mutex<Vec<CheckoutRequest>>,
    pub fail: AtomicBool,
}

impl FakeGateway {
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PaymentError::Api {
                status: 500,
                message: "stripe is down".into(),
            });
        }
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        let session_id = format!("cs_test_{}", requests.len());
        Ok(CheckoutSession {
            url: format!("https://checkout.stripe.test/pay/{session_id}"),
            session_id,
        })
    }
}

/// Records forwarded orders; can be switched to fail.
#[derive(Default)]
pub struct FakeForwarder {
    pub forwarded: Mutex<Vec<ForwardedOrder>>,
    pub fail: AtomicBool,
}

impl FakeForwarder {
    pub fn count(&self) -> usize {
        self.forwarded.lock().unwrap().len()
    }
}

#[async_trait]
impl OrderForwarder for FakeForwarder {
    async fn forward(&self, order: &ForwardedOrder) -> Result<(), ForwardError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ForwardError::HttpStatus(503));
        }
        self.forwarded.lock().unwrap().push(order.clone());
        Ok(())
    }
}

/// In-memory object store.
///
/// With `hold` set, `put` signals `entered` and then waits for `release`,
/// so a test can act while an upload is in flight.
#[derive(Default)]
pub struct MemoryStore {
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
    pub fail: AtomicBool,
    pub hold: AtomicBool,
    pub entered: Notify,
    pub release: Notify,
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, path: &str, bytes: &[u8], _content_type: &str) -> Result<(), StorageError> {
        if self.hold.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("http://storage.test/images/{path}")
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-jwt-secret-that-is-long-enough".to_string(),
            audience: AUTHENTICATED_AUDIENCE.to_string(),
        },
        stripe: StripeConfig {
            secret_key: "sk_test".to_string(),
            webhook_secret: STRIPE_WEBHOOK_SECRET.to_string(),
            price_id: "price_test".to_string(),
            success_url: "http://localhost:5173/success".to_string(),
            cancel_url: "http://localhost:5173/create".to_string(),
        },
        automation: AutomationConfig {
            webhook_url: "http://automation.test/webhook".to_string(),
            secret: Some(AUTOMATION_SECRET.to_string()),
        },
        storage: StorageConfig {
            root: std::env::temp_dir().to_string_lossy().into_owned(),
            public_base_url: "http://storage.test".to_string(),
        },
    }
}

/// The application plus handles on its fakes.
pub struct TestApp {
    pub router: Router,
    pub gateway: Arc<FakeGateway>,
    pub forwarder: Arc<FakeForwarder>,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router (same middleware stack as production)
/// backed by the given pool and fresh fakes.
pub fn build_test_app(pool: PgPool) -> TestApp {
    build_test_app_with(pool, test_config())
}

/// Like [`build_test_app`] with a caller-supplied configuration.
pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> TestApp {
    let gateway = Arc::new(FakeGateway::default());
    let forwarder = Arc::new(FakeForwarder::default());
    let store = Arc::new(MemoryStore::default());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        payments: gateway.clone(),
        forwarder: forwarder.clone(),
        storage: store.clone(),
    };

    TestApp {
        router: build_app_router(state, &config),
        gateway,
        forwarder,
        store,
    }
}

/// Sign an access token the way the auth service would.
pub fn token_for(user_id: Uuid, email: &str) -> String {
    generate_access_token(user_id, Some(email), 3600, &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    json_request(app, Method::POST, uri, body, None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    json_request(app, Method::POST, uri, body, Some(token)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    json_request(app, Method::PUT, uri, body, Some(token)).await
}

async fn json_request(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

/// POST a multipart form with one `file` part and optional text parts.
pub async fn post_photo(
    app: Router,
    uri: &str,
    content_type: &str,
    bytes: &[u8],
    fields: &[(&str, &str)],
) -> Response<Body> {
    const BOUNDARY: &str = "storybook-test-boundary";

    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"photo\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

/// POST a Stripe event signed with the test webhook secret.
pub async fn post_stripe_event(app: Router, event: serde_json::Value) -> Response<Body> {
    let payload = event.to_string();
    let header = signature_header(
        STRIPE_WEBHOOK_SECRET,
        chrono::Utc::now().timestamp(),
        payload.as_bytes(),
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/webhooks/stripe")
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, header)
        .body(Body::from(payload))
        .unwrap();
    send(app, request).await
}

/// A `checkout.session.completed` event for `session_id`.
pub fn checkout_completed_event(session_id: &str, metadata: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "id": format!("evt_{session_id}"),
        "type": "checkout.session.completed",
        "data": { "object": {
            "id": session_id,
            "customer_email": "test@example.com",
            "metadata": metadata,
        }}
    })
}

// ---------------------------------------------------------------------------
// Wizard helpers
// ---------------------------------------------------------------------------

/// Create an anonymous wizard session and return its id.
pub async fn create_session(app: Router) -> String {
    let response = post_empty(app, "/api/v1/wizard-sessions").await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

pub async fn update_field(app: Router, session_id: &str, field: &str, value: &str) {
    let response = post_json(
        app,
        &format!("/api/v1/wizard-sessions/{session_id}/actions"),
        serde_json::json!({ "type": "UPDATE_FIELD", "field": field, "value": value }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK, "{field}");
}

/// Fill every required field and upload a child photo.
pub async fn fill_wizard(test: &TestApp, session_id: &str, email: Option<&str>) {
    let mut fields = vec![
        ("age_category", "3-5"),
        ("theme", "Adventure"),
        ("subject", "Dragons"),
        ("message", "Courage"),
        ("style", "Watercolor"),
        ("child_name", "Mia"),
    ];
    if let Some(email) = email {
        fields.push(("email", email));
    }
    for (field, value) in fields {
        update_field(test.app(), session_id, field, value).await;
    }

    let response = post_photo(
        test.app(),
        &format!("/api/v1/wizard-sessions/{session_id}/photo"),
        "image/png",
        b"\x89PNG fake image bytes",
        &[],
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
}

//! Stripe Checkout client and webhook payload types.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

/// Base URL of the Stripe REST API.
pub const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// The only webhook event the service acts on.
pub const CHECKOUT_COMPLETED_EVENT: &str = "checkout.session.completed";

/// HTTP request timeout for a single Stripe call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Stripe answered with a non-2xx status.
    #[error("Stripe returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// Stripe created a session without a redirect URL.
    #[error("Checkout session {0} has no redirect URL")]
    MissingUrl(String),
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// What the service asks the payment provider for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub customer_email: String,
    pub metadata: Vec<(String, String)>,
}

/// A created checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub session_id: String,
    pub url: String,
}

/// Creates hosted checkout sessions.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;
}

/// [`PaymentGateway`] backed by the Stripe Checkout API.
pub struct StripeGateway {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
    price_id: String,
    success_url: String,
    cancel_url: String,
}

impl StripeGateway {
    pub fn new(
        secret_key: String,
        price_id: String,
        success_url: String,
        cancel_url: String,
    ) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_base: STRIPE_API_BASE.to_string(),
            secret_key,
            price_id,
            success_url,
            cancel_url,
        })
    }

    /// Point the client at another API base (a local mock server).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Form fields for `POST /v1/checkout/sessions`.
    fn session_form(&self, request: &CheckoutRequest) -> Vec<(String, String)> {
        let mut form = vec![
            ("mode".to_string(), "payment".to_string()),
            ("line_items[0][price]".to_string(), self.price_id.clone()),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("customer_email".to_string(), request.customer_email.clone()),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
        ];
        form.extend(
            request
                .metadata
                .iter()
                .map(|(key, value)| (format!("metadata[{key}]"), value.clone())),
        );
        form
    }
}

#[derive(Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&self.session_form(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or(body);
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let session: SessionResponse = response.json().await?;
        let url = session
            .url
            .ok_or_else(|| PaymentError::MissingUrl(session.id.clone()))?;

        tracing::debug!(session_id = %session.id, "Stripe checkout session created");
        Ok(CheckoutSession {
            session_id: session.id,
            url,
        })
    }
}

// ---------------------------------------------------------------------------
// Webhook payloads
// ---------------------------------------------------------------------------

/// Envelope of a Stripe webhook event. Only the fields the service reads.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

/// The checkout session object carried by `checkout.session.completed`.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletedCheckoutSession {
    pub id: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
}

impl CompletedCheckoutSession {
    /// Email Stripe collected, preferring the one the session was created with.
    pub fn email(&self) -> Option<&str> {
        self.customer_email
            .as_deref()
            .or_else(|| self.customer_details.as_ref()?.email.as_deref())
    }
}

impl StripeEvent {
    pub fn is_checkout_completed(&self) -> bool {
        self.event_type == CHECKOUT_COMPLETED_EVENT
    }

    /// Decode the event object as a checkout session.
    pub fn checkout_session(&self) -> Result<CompletedCheckoutSession, serde_json::Error> {
        CompletedCheckoutSession::deserialize(&self.data.object)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> StripeGateway {
        StripeGateway::new(
            "sk_test_123".into(),
            "price_123".into(),
            "https://example.com/success?session_id={CHECKOUT_SESSION_ID}".into(),
            "https://example.com/create".into(),
        )
        .unwrap()
    }

    #[test]
    fn form_carries_price_email_and_metadata() {
        let form = gateway().session_form(&CheckoutRequest {
            customer_email: "test@example.com".into(),
            metadata: vec![("theme".into(), "Adventure".into())],
        });
        let get = |k: &str| form.iter().find(|(key, _)| key == k).map(|(_, v)| v.as_str());

        assert_eq!(get("mode"), Some("payment"));
        assert_eq!(get("line_items[0][price]"), Some("price_123"));
        assert_eq!(get("customer_email"), Some("test@example.com"));
        assert_eq!(get("metadata[theme]"), Some("Adventure"));
    }

    #[test]
    fn completed_session_event_decodes() {
        let event: StripeEvent = serde_json::from_value(serde_json::json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": { "object": {
                "id": "cs_test_1",
                "customer_email": null,
                "customer_details": { "email": "buyer@example.com" },
                "metadata": { "theme": "Adventure" }
            }}
        }))
        .unwrap();

        assert!(event.is_checkout_completed());
        let session = event.checkout_session().unwrap();
        assert_eq!(session.id, "cs_test_1");
        assert_eq!(session.email(), Some("buyer@example.com"));
        assert_eq!(session.metadata["theme"], "Adventure");
    }

    #[test]
    fn other_event_types_are_not_checkout_completed() {
        let event: StripeEvent = serde_json::from_value(serde_json::json!({
            "id": "evt_2",
            "type": "payment_intent.created",
            "data": { "object": {} }
        }))
        .unwrap();
        assert!(!event.is_checkout_completed());
    }

    #[test]
    fn payment_error_display_api() {
        let err = PaymentError::Api {
            status: 400,
            message: "No such price".into(),
        };
        assert_eq!(err.to_string(), "Stripe returned HTTP 400: No such price");
    }
}

//! Forwarding of paid orders to the story-generation automation.
//!
//! [`HttpForwarder`] POSTs a JSON-encoded [`ForwardedOrder`] to the configured
//! automation webhook. There is a single attempt and no queue: a failure is
//! returned to the Stripe webhook handler, which answers non-2xx so Stripe
//! redelivers the event.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

/// Header carrying the shared secret on outbound and callback requests.
pub const AUTOMATION_SECRET_HEADER: &str = "x-automation-secret";

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The automation endpoint returned a non-2xx status code.
    #[error("Automation webhook returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Flattened order sent to the automation: storybook fields, public photo
/// URLs and characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardedOrder {
    pub storybook_id: Uuid,
    pub stripe_session_id: String,
    pub email: String,
    pub child_name: String,
    pub child_gender: Option<String>,
    pub age_category: String,
    pub theme: String,
    pub subject: String,
    pub message: String,
    pub style: String,
    pub custom_note: Option<String>,
    pub child_photo_url: Option<String>,
    pub characters: Vec<ForwardedCharacter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardedCharacter {
    pub name: String,
    pub relation: Option<String>,
    pub gender: Option<String>,
    pub photo_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Forwarder
// ---------------------------------------------------------------------------

/// Hands a paid order to the story-generation automation.
#[async_trait]
pub trait OrderForwarder: Send + Sync {
    async fn forward(&self, order: &ForwardedOrder) -> Result<(), ForwardError>;
}

/// [`OrderForwarder`] that POSTs JSON to a webhook URL.
pub struct HttpForwarder {
    client: reqwest::Client,
    url: String,
    secret: Option<String>,
}

impl HttpForwarder {
    /// Create a forwarder with a pre-configured HTTP client.
    ///
    /// When `secret` is set it is sent in [`AUTOMATION_SECRET_HEADER`].
    pub fn new(url: String, secret: Option<String>) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url,
            secret,
        })
    }
}

#[async_trait]
impl OrderForwarder for HttpForwarder {
    async fn forward(&self, order: &ForwardedOrder) -> Result<(), ForwardError> {
        let mut request = self.client.post(&self.url).json(order);
        if let Some(secret) = &self.secret {
            request = request.header(AUTOMATION_SECRET_HEADER, secret);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ForwardError::HttpStatus(response.status().as_u16()));
        }

        tracing::info!(
            storybook_id = %order.storybook_id,
            url = %self.url,
            "Order forwarded to automation"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_does_not_fail() {
        assert!(HttpForwarder::new("http://localhost:5678/webhook".into(), None).is_ok());
    }

    #[test]
    fn forward_error_display_http_status() {
        let err = ForwardError::HttpStatus(502);
        assert_eq!(err.to_string(), "Automation webhook returned HTTP 502");
    }

    #[test]
    fn forward_error_display_request() {
        let req_err = reqwest::Client::new().get("://bad").build().unwrap_err();
        let err = ForwardError::Request(req_err);
        assert!(err.to_string().contains("HTTP request failed"));
    }

    #[test]
    fn payload_serializes_flat() {
        let order = ForwardedOrder {
            storybook_id: Uuid::nil(),
            stripe_session_id: "cs_test_1".into(),
            email: "test@example.com".into(),
            child_name: "Mia".into(),
            child_gender: None,
            age_category: "3-5".into(),
            theme: "Adventure".into(),
            subject: "Dragons".into(),
            message: "Courage".into(),
            style: "Watercolor".into(),
            custom_note: None,
            child_photo_url: Some("http://localhost/images/children/a.png".into()),
            characters: vec![ForwardedCharacter {
                name: "Rex".into(),
                relation: Some("pet".into()),
                gender: None,
                photo_url: None,
            }],
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["theme"], "Adventure");
        assert_eq!(json["characters"][0]["name"], "Rex");
        assert!(json["child_photo_url"].as_str().unwrap().ends_with("a.png"));
    }
}

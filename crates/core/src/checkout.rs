//! Checkout validation and the order fields carried through payment.
//!
//! [`validate_for_checkout`] turns a filled-in [`WizardData`] into an
//! [`OrderDetails`] (or explains what is missing) before any remote call is
//! made. The same fields travel as Stripe session metadata so the payment
//! webhook can rebuild the order if the checkout-time insert never happened.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::error::CoreError;
use crate::wizard::WizardData;

/// Stripe rejects metadata values longer than this.
const METADATA_VALUE_MAX_CHARS: usize = 500;

/// Metadata key carrying the originating wizard session.
pub const METADATA_WIZARD_SESSION: &str = "wizard_session_id";

/// A character as it will be inserted alongside the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCharacter {
    pub name: String,
    pub relation: Option<String>,
    pub gender: Option<String>,
    pub photo_path: Option<String>,
}

/// Validated order fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub child_name: String,
    pub child_gender: Option<String>,
    pub age_category: String,
    pub theme: String,
    pub subject: String,
    pub message: String,
    pub style: String,
    pub custom_note: Option<String>,
    pub child_photo_path: String,
    pub email: String,
    pub characters: Vec<OrderCharacter>,
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Check that the wizard is ready for payment.
///
/// - Every required field must be non-blank (400 listing the missing ones).
/// - The email must be well-formed.
/// - No photo may still be uploading (409).
///
/// Characters without a name are skipped rather than rejected.
pub fn validate_for_checkout(data: &WizardData) -> Result<OrderDetails, CoreError> {
    let required = [
        ("child_name", &data.child_name),
        ("age_category", &data.age_category),
        ("theme", &data.theme),
        ("subject", &data.subject),
        ("message", &data.message),
        ("style", &data.style),
        ("email", &data.email),
        ("child_photo", &data.child_photo.path),
    ];

    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, value)| present(*value).is_none())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(CoreError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    if data.has_pending_upload() {
        return Err(CoreError::Conflict(
            "Photos are still uploading. Please wait a moment and try again".to_string(),
        ));
    }

    let email = present(&data.email).unwrap_or_default();
    if !email.validate_email() {
        return Err(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        )));
    }

    let characters = data
        .characters
        .iter()
        .filter_map(|c| {
            Some(OrderCharacter {
                name: present(&c.name)?,
                relation: present(&c.relation),
                gender: present(&c.gender),
                photo_path: c.photo.path.clone(),
            })
        })
        .collect();

    Ok(OrderDetails {
        child_name: present(&data.child_name).unwrap_or_default(),
        child_gender: present(&data.child_gender),
        age_category: present(&data.age_category).unwrap_or_default(),
        theme: present(&data.theme).unwrap_or_default(),
        subject: present(&data.subject).unwrap_or_default(),
        message: present(&data.message).unwrap_or_default(),
        style: present(&data.style).unwrap_or_default(),
        custom_note: present(&data.custom_note),
        child_photo_path: present(&data.child_photo.path).unwrap_or_default(),
        email,
        characters,
    })
}

impl OrderDetails {
    /// Flatten the order into Stripe session metadata (characters excluded).
    pub fn to_metadata(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = vec![
            ("child_name", Some(&self.child_name)),
            ("child_gender", self.child_gender.as_ref()),
            ("age_category", Some(&self.age_category)),
            ("theme", Some(&self.theme)),
            ("subject", Some(&self.subject)),
            ("message", Some(&self.message)),
            ("style", Some(&self.style)),
            ("custom_note", self.custom_note.as_ref()),
            ("child_photo_path", Some(&self.child_photo_path)),
            ("email", Some(&self.email)),
        ]
        .into_iter()
        .filter_map(|(k, v)| {
            v.map(|v| {
                (
                    k.to_string(),
                    v.chars().take(METADATA_VALUE_MAX_CHARS).collect::<String>(),
                )
            })
        })
        .collect();
        pairs.sort();
        pairs
    }

    /// Rebuild an order from session metadata.
    ///
    /// `fallback_email` is the customer email Stripe collected, used when the
    /// metadata has none. Missing text fields become empty strings; the row is
    /// recorded rather than dropped because the customer has already paid.
    pub fn from_metadata(
        metadata: &HashMap<String, String>,
        fallback_email: Option<&str>,
    ) -> Result<Self, CoreError> {
        let text = |key: &str| metadata.get(key).map(|v| v.trim().to_string());
        let opt = |key: &str| text(key).filter(|v| !v.is_empty());

        let email = opt("email")
            .or_else(|| fallback_email.map(str::to_string))
            .ok_or_else(|| {
                CoreError::Validation("Checkout session carries no customer email".to_string())
            })?;

        Ok(Self {
            child_name: text("child_name").unwrap_or_default(),
            child_gender: opt("child_gender"),
            age_category: text("age_category").unwrap_or_default(),
            theme: text("theme").unwrap_or_default(),
            subject: text("subject").unwrap_or_default(),
            message: text("message").unwrap_or_default(),
            style: text("style").unwrap_or_default(),
            custom_note: opt("custom_note"),
            child_photo_path: text("child_photo_path").unwrap_or_default(),
            email,
            characters: Vec::new(),
        })
    }
}

/// Normalize an email for ownership comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

//! Storybook order status values.
//!
//! The `status` column is free text; transitions between values are not
//! enforced anywhere. [`StorybookStatus`] names the values the service writes
//! itself and is used for comparisons, never to reject a stored row.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorybookStatus {
    Draft,
    PendingPayment,
    PaymentReceived,
    ClaimedByUser,
    Done,
    Error,
}

impl StorybookStatus {
    /// Every status the service knows about.
    pub const ALL: [StorybookStatus; 6] = [
        Self::Draft,
        Self::PendingPayment,
        Self::PaymentReceived,
        Self::ClaimedByUser,
        Self::Done,
        Self::Error,
    ];

    /// Parse a status string from the database. Unknown values yield `None`.
    pub fn from_str_db(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingPayment => "pending_payment",
            Self::PaymentReceived => "payment_received",
            Self::ClaimedByUser => "claimed_by_user",
            Self::Done => "done",
            Self::Error => "error",
        }
    }
}

/// Statuses that mean the payment webhook has not been handled yet.
pub const UNPAID_STATUSES: &[&str] = &["draft", "pending_payment"];

/// Whether a stored status means the order is still waiting for payment.
///
/// Anything else (including values this service does not know) is treated as
/// already processed so a webhook redelivery never reprocesses it.
pub fn is_awaiting_payment(status: &str) -> bool {
    UNPAID_STATUSES.contains(&status)
}

// ---------------------------------------------------------------------------
// Generation result
// ---------------------------------------------------------------------------

/// Outcome reported by the story-generation automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationOutcome {
    Done,
    Error,
}

impl GenerationOutcome {
    /// The storybook status written for this outcome.
    pub fn status(self) -> StorybookStatus {
        match self {
            Self::Done => StorybookStatus::Done,
            Self::Error => StorybookStatus::Error,
        }
    }
}

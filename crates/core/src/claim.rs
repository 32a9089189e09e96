//! Rules for attaching a paid, email-identified order to a user account.

use crate::checkout::normalize_email;
use crate::error::CoreError;
use crate::types::DbId;

/// What the claim endpoint should do with an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimDecision {
    /// The caller already owns the order; nothing to write.
    AlreadyOwned,
    /// The order is unowned and its email matches; assign it.
    Assign,
}

/// Decide whether `user_id` (authenticated as `user_email`) may claim an order.
///
/// - The order email must match the account email (case-insensitive).
/// - An order owned by someone else cannot be claimed.
pub fn evaluate_claim(
    order_email: &str,
    order_owner: Option<DbId>,
    user_id: DbId,
    user_email: &str,
) -> Result<ClaimDecision, CoreError> {
    if normalize_email(order_email) != normalize_email(user_email) {
        return Err(CoreError::Forbidden(
            "This order was placed with a different email address".to_string(),
        ));
    }

    match order_owner {
        Some(owner) if owner == user_id => Ok(ClaimDecision::AlreadyOwned),
        Some(_) => Err(CoreError::Conflict(
            "This order is already linked to another account".to_string(),
        )),
        None => Ok(ClaimDecision::Assign),
    }
}

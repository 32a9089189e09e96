//! Stripe webhook signature verification.
//!
//! The `Stripe-Signature` header has the form `t=<unix>,v1=<hex>[,v1=...]`.
//! Each `v1` value is the HMAC-SHA256 of `"{t}.{raw_body}"` keyed with the
//! endpoint's signing secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::CoreError;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed event before it is rejected as a replay.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Header name Stripe sends the signature in.
pub const SIGNATURE_HEADER: &str = "stripe-signature";

fn invalid(reason: &str) -> CoreError {
    CoreError::Validation(format!("Invalid webhook signature: {reason}"))
}

/// Compute the hex `v1` signature for a payload.
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Build a complete header value, as Stripe would send it.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    format!("t={timestamp},v1={}", compute_signature(secret, timestamp, payload))
}

/// Verify a signature header against the raw request body.
///
/// `now` is the current Unix time; events older (or newer) than
/// `tolerance_secs` are rejected.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
    tolerance_secs: i64,
) -> Result<(), CoreError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| invalid("missing timestamp"))?;
    if signatures.is_empty() {
        return Err(invalid("no v1 signature"));
    }
    // abs_diff cannot overflow on an attacker-chosen `t`.
    if now.abs_diff(timestamp) > tolerance_secs.unsigned_abs() {
        return Err(invalid("timestamp outside tolerance"));
    }

    let expected = compute_signature(secret, timestamp, payload);
    let matched = signatures
        .iter()
        .any(|sig| bool::from(expected.as_bytes().ct_eq(sig.as_bytes())));

    if matched {
        Ok(())
    } else {
        Err(invalid("signature mismatch"))
    }
}

/// Compare a presented shared secret with the configured one in constant time.
pub fn secrets_match(presented: &str, expected: &str) -> bool {
    !expected.is_empty() && bool::from(presented.as_bytes().ct_eq(expected.as_bytes()))
}

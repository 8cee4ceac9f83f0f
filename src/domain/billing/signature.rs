//! Webhook signature verification.
//!
//! Both payment providers sign their callbacks with HMAC-SHA512 keyed by a
//! shared secret and send the digest as lowercase hex in a request header.
//! Paystack signs the raw body bytes; NOWPayments signs the body
//! re-serialized with its object keys sorted (see [`canonical_json`]).

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Number, Value};
use sha2::Sha512;
use subtle::ConstantTimeEq;

use super::webhook_errors::WebhookError;

type HmacSha512 = Hmac<Sha512>;

/// Verifier for HMAC-SHA512 hex webhook signatures.
pub struct WebhookSignatureVerifier {
    secret: SecretString,
}

impl WebhookSignatureVerifier {
    /// Creates a new verifier with the given signing secret.
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Computes the lowercase hex HMAC-SHA512 of `payload`.
    pub fn sign(&self, payload: &[u8]) -> String {
        let mut mac = HmacSha512::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    /// Verifies `signature` against the digest of `payload`.
    ///
    /// The comparison runs over the full hex string without an early exit.
    ///
    /// # Errors
    ///
    /// - `MissingSignature` - header value is empty
    /// - `InvalidSignature` - digest mismatch
    pub fn verify(
        &self,
        payload: &[u8],
        signature: &str,
        header_name: &'static str,
    ) -> Result<(), WebhookError> {
        let provided = signature.trim();
        if provided.is_empty() {
            return Err(WebhookError::MissingSignature(header_name));
        }

        let expected = self.sign(payload);
        if !constant_time_compare(expected.as_bytes(), provided.as_bytes()) {
            return Err(WebhookError::InvalidSignature);
        }

        Ok(())
    }
}

/// Re-serializes a JSON document with object keys sorted at every depth.
///
/// Numbers follow `JSON.stringify`: a whole-valued float such as `10.0` or
/// `1e3` is written as `10` or `1000`.
///
/// # Errors
///
/// Returns `WebhookError::ParseError` if the payload is not valid JSON.
pub fn canonical_json(payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
    let value: Value =
        serde_json::from_slice(payload).map_err(|e| WebhookError::ParseError(e.to_string()))?;
    serde_json::to_vec(&sort_keys(value)).map_err(|e| WebhookError::ParseError(e.to_string()))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (key, inner) in entries {
                sorted.insert(key, sort_keys(inner));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        Value::Number(n) => Value::Number(js_number(n)),
        other => other,
    }
}

fn js_number(n: Number) -> Number {
    let Some(f) = n.as_f64().filter(|_| n.is_f64()) else {
        return n;
    };
    if f.fract() != 0.0 || f.abs() >= 1e21 {
        return n;
    }
    // Whole values outside the 64-bit integer range keep their float form.
    if f >= 0.0 && f < u64::MAX as f64 {
        Number::from(f as u64)
    } else if f < 0.0 && f >= i64::MIN as f64 {
        Number::from(f as i64)
    } else {
        n
    }
}

/// Performs constant-time comparison of two byte slices.
///
/// Length is not secret: a length mismatch returns early.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

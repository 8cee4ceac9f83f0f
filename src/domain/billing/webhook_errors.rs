//! Webhook error types for payment provider callbacks.
//!
//! Defines every failure a webhook delivery can hit, with HTTP status code
//! mapping and retryability semantics. Providers retry on 5xx only, so the
//! mapping decides whether a delivery is re-sent.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signing secret is not configured; the request is never authenticated.
    #[error("Webhook secret not configured: {0}")]
    MissingSecret(&'static str),

    /// Signature header absent or empty.
    #[error("Missing signature header: {0}")]
    MissingSignature(&'static str),

    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Failed to parse the webhook payload.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The upgrade targeted a user with no subscriber account.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// Returns true if the provider should re-deliver this webhook.
    ///
    /// A missing account may be a signup that has not landed yet; a missing
    /// secret gets picked up once configuration is fixed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::MissingSecret(_)
                | WebhookError::AccountNotFound(_)
                | WebhookError::Database(_)
        )
    }

    /// Maps the error to an appropriate HTTP status code.
    ///
    /// - 4xx: bad or forged request, provider does not retry
    /// - 5xx: server-side failure, provider retries
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature(_)
            | WebhookError::InvalidSignature
            | WebhookError::ParseError(_) => StatusCode::BAD_REQUEST,

            WebhookError::MissingSecret(_)
            | WebhookError::AccountNotFound(_)
            | WebhookError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════
    // Error Display Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn invalid_signature_displays_correctly() {
        let err = WebhookError::InvalidSignature;
        assert_eq!(format!("{}", err), "Invalid signature");
    }

    #[test]
    fn missing_secret_displays_setting_name() {
        let err = WebhookError::MissingSecret("PAYSTACK_SECRET_KEY");
        assert_eq!(
            format!("{}", err),
            "Webhook secret not configured: PAYSTACK_SECRET_KEY"
        );
    }

    #[test]
    fn missing_signature_displays_header_name() {
        let err = WebhookError::MissingSignature("x-paystack-signature");
        assert_eq!(
            format!("{}", err),
            "Missing signature header: x-paystack-signature"
        );
    }

    #[test]
    fn account_not_found_displays_user() {
        let err = WebhookError::AccountNotFound("u1".to_string());
        assert_eq!(format!("{}", err), "Account not found: u1");
    }

    // ══════════════════════════════════════════════════════════════
    // Retryability Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn server_side_failures_are_retryable() {
        assert!(WebhookError::Database("connection reset".to_string()).is_retryable());
        assert!(WebhookError::AccountNotFound("u1".to_string()).is_retryable());
        assert!(WebhookError::MissingSecret("PAYSTACK_SECRET_KEY").is_retryable());
    }

    #[test]
    fn request_failures_are_not_retryable() {
        assert!(!WebhookError::InvalidSignature.is_retryable());
        assert!(!WebhookError::MissingSignature("x-paystack-signature").is_retryable());
        assert!(!WebhookError::ParseError("bad json".to_string()).is_retryable());
    }

    // ══════════════════════════════════════════════════════════════
    // Status Code Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn signature_failures_return_bad_request() {
        assert_eq!(
            WebhookError::InvalidSignature.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebhookError::MissingSignature("x-nowpayments-sig").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn parse_error_returns_bad_request() {
        let err = WebhookError::ParseError("syntax error".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_secret_returns_internal_error() {
        let err = WebhookError::MissingSecret("NOWPAYMENTS_IPN_SECRET");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn write_failures_return_internal_error() {
        assert_eq!(
            WebhookError::Database("timeout".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            WebhookError::AccountNotFound("u1".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn every_retryable_error_is_a_server_error() {
        let errors = [
            WebhookError::MissingSecret("X"),
            WebhookError::MissingSignature("y"),
            WebhookError::InvalidSignature,
            WebhookError::ParseError("p".to_string()),
            WebhookError::AccountNotFound("u".to_string()),
            WebhookError::Database("d".to_string()),
        ];
        for err in errors {
            assert_eq!(err.is_retryable(), err.status_code().is_server_error());
        }
    }
}

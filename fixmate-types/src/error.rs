//! Error types for the payment backend.

use crate::domain::currency::UnknownCurrency;
use crate::ports::GatewayError;

/// Domain-level errors (lifecycle and input rule violations).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Booking is already completed")]
    AlreadyCompleted,

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// The intent was charged in a currency payments are not recorded in.
    #[error(transparent)]
    UnsupportedCurrency(#[from] UnknownCurrency),
}

/// Document store errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Store request failed: {0}")]
    Http(String),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Store authentication failed: {0}")]
    Auth(String),

    #[error("Malformed document: {0}")]
    Decode(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The processor has not marked the intent as succeeded. Carries the
    /// processor's literal status string.
    #[error("Payment not successful: {0}")]
    PaymentNotSucceeded(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::NotFound(what),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_lists_every_field() {
        let err = DomainError::MissingFields(vec!["bookingId", "amount"]);
        assert_eq!(err.to_string(), "Missing required fields: bookingId, amount");
    }

    #[test]
    fn test_unsupported_currency_is_a_bad_request() {
        let err: AppError = DomainError::from(UnknownCurrency("jpy".into())).into();
        assert!(matches!(err, AppError::BadRequest(ref msg) if msg.starts_with("Unknown currency: jpy")));
    }

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let err: AppError = StoreError::NotFound("bookings/B1".into()).into();
        assert!(matches!(err, AppError::NotFound(ref what) if what == "bookings/B1"));
    }

    #[test]
    fn test_gateway_error_surfaces_raw_message() {
        let err: AppError = GatewayError::Api {
            status: 400,
            message: "Amount must be at least 50 cents".into(),
        }
        .into();
        assert!(matches!(err, AppError::Internal(ref msg) if msg == "Amount must be at least 50 cents"));
    }
}

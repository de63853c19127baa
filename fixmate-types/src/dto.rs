//! Data Transfer Objects (DTOs) for requests and responses.
//!
//! Request fields are optional on the wire so that missing values can be
//! reported as one 400 naming every absent field, instead of a decode error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{BookingId, BookingStatus, PaymentId, PaymentStatus};
use crate::error::DomainError;

// ─────────────────────────────────────────────────────────────────────────────
// Presence checks
// ─────────────────────────────────────────────────────────────────────────────

/// Collects the names of absent fields. Empty strings count as absent.
#[derive(Default)]
struct Presence {
    missing: Vec<&'static str>,
}

impl Presence {
    fn text(&mut self, name: &'static str, value: Option<String>) -> String {
        match value {
            Some(v) if !v.is_empty() => v,
            _ => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    fn amount(&mut self, name: &'static str, value: Option<f64>) -> f64 {
        value.unwrap_or_else(|| {
            self.missing.push(name);
            0.0
        })
    }

    fn finish<T>(self, value: T) -> Result<T, DomainError> {
        if self.missing.is_empty() {
            Ok(value)
        } else {
            Err(DomainError::MissingFields(self.missing))
        }
    }
}

/// A validated charge against a booking, shared by the card and cash flows.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingCharge {
    pub booking_id: BookingId,
    /// Amount in the major currency unit
    pub amount: f64,
    pub customer_id: String,
    pub provider_id: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Card payment DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a payment intent for a booking.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentRequest {
    #[schema(example = "B1")]
    pub booking_id: Option<String>,
    /// Amount in the major currency unit
    #[schema(example = 408.00)]
    pub amount: Option<f64>,
    #[schema(example = "C1")]
    pub customer_id: Option<String>,
    #[schema(example = "P1")]
    pub provider_id: Option<String>,
}

impl CreateIntentRequest {
    /// Checks that every field is present.
    pub fn validate(self) -> Result<BookingCharge, DomainError> {
        let mut p = Presence::default();
        let charge = BookingCharge {
            booking_id: BookingId::new(p.text("bookingId", self.booking_id)),
            amount: p.amount("amount", self.amount),
            customer_id: p.text("customerId", self.customer_id),
            provider_id: p.text("providerId", self.provider_id),
        };
        p.finish(charge)
    }
}

/// Response after creating a payment intent.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentResponse {
    /// Secret the paying client uses to confirm the intent
    #[schema(example = "pi_3Nx_secret_xyz")]
    pub client_secret: String,
    #[schema(example = "pi_3Nx")]
    pub payment_intent_id: String,
    #[schema(example = "pk_test_abc")]
    pub publishable_key: String,
}

/// Request to record a card payment whose intent has succeeded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    #[schema(example = "pi_3Nx")]
    pub payment_intent_id: Option<String>,
    #[schema(example = "B1")]
    pub booking_id: Option<String>,
}

impl ConfirmPaymentRequest {
    /// Checks that both fields are present. Returns `(intent id, booking id)`.
    pub fn validate(self) -> Result<(String, BookingId), DomainError> {
        let mut p = Presence::default();
        let intent_id = p.text("paymentIntentId", self.payment_intent_id);
        let booking_id = BookingId::new(p.text("bookingId", self.booking_id));
        p.finish((intent_id, booking_id))
    }
}

/// Response after confirming a card payment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentResponse {
    pub success: bool,
    #[schema(example = "Payment confirmed successfully")]
    pub message: String,
    #[schema(value_type = String, example = "COMPLETED")]
    pub payment_status: PaymentStatus,
    #[schema(value_type = String, example = "COMPLETED")]
    pub booking_status: BookingStatus,
}

// ─────────────────────────────────────────────────────────────────────────────
// Cash payment DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to record a cash payment for a booking.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashPaymentRequest {
    #[schema(example = "B1")]
    pub booking_id: Option<String>,
    /// Amount in the major currency unit
    #[schema(example = 408.00)]
    pub amount: Option<f64>,
    #[schema(example = "C1")]
    pub customer_id: Option<String>,
    #[schema(example = "P1")]
    pub provider_id: Option<String>,
}

impl CashPaymentRequest {
    /// Checks that every field is present. The amount is not range-checked.
    pub fn validate(self) -> Result<BookingCharge, DomainError> {
        CreateIntentRequest {
            booking_id: self.booking_id,
            amount: self.amount,
            customer_id: self.customer_id,
            provider_id: self.provider_id,
        }
        .validate()
    }
}

/// Response after recording a cash payment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashPaymentResponse {
    pub success: bool,
    #[schema(example = "Cash payment recorded successfully")]
    pub message: String,
    #[schema(value_type = String)]
    pub payment_id: PaymentId,
    #[schema(value_type = String, example = "COMPLETED")]
    pub booking_status: BookingStatus,
}

// ─────────────────────────────────────────────────────────────────────────────
// Legacy DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request for the legacy intent route. The amount is already in the
/// smallest currency unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LegacyIntentRequest {
    #[schema(example = 5000)]
    pub amount: Option<i64>,
    #[schema(example = "U1")]
    pub user_id: Option<String>,
}

/// Response for the legacy intent route.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LegacyIntentResponse {
    pub client_secret: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Health
// ─────────────────────────────────────────────────────────────────────────────

/// Health check payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "OK")]
    pub status: String,
    pub message: String,
    #[schema(value_type = String, example = "2024-01-01T00:00:00Z")]
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_intent_request_reads_camel_case() {
        let req: CreateIntentRequest = serde_json::from_value(serde_json::json!({
            "bookingId": "B1",
            "amount": 408.00,
            "customerId": "C1",
            "providerId": "P1"
        }))
        .unwrap();

        let charge = req.validate().unwrap();

        assert_eq!(charge.booking_id, BookingId::new("B1"));
        assert_eq!(charge.amount, 408.0);
    }

    #[test]
    fn test_validate_reports_every_missing_field() {
        let req: CreateIntentRequest = serde_json::from_value(serde_json::json!({
            "bookingId": "",
            "customerId": "C1",
            "providerId": null
        }))
        .unwrap();

        let err = req.validate().unwrap_err();

        assert_eq!(
            err,
            DomainError::MissingFields(vec!["bookingId", "amount", "providerId"])
        );
    }

    #[test]
    fn test_cash_validation_accepts_zero_amount() {
        let req = CashPaymentRequest {
            booking_id: Some("B1".into()),
            amount: Some(0.0),
            customer_id: Some("C1".into()),
            provider_id: Some("P1".into()),
        };

        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_confirm_validation() {
        let req = ConfirmPaymentRequest {
            payment_intent_id: Some("pi_1".into()),
            booking_id: None,
        };

        assert_eq!(
            req.validate().unwrap_err(),
            DomainError::MissingFields(vec!["bookingId"])
        );
    }

    #[test]
    fn test_confirm_response_shape() {
        let resp = ConfirmPaymentResponse {
            success: true,
            message: "ok".into(),
            payment_status: PaymentStatus::Completed,
            booking_status: BookingStatus::Completed,
        };

        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["paymentStatus"], "COMPLETED");
        assert_eq!(json["bookingStatus"], "COMPLETED");
    }
}

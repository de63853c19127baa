//! Payment record domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::booking::BookingId;
use super::currency::Currency;
use super::intent::PaymentIntent;
use crate::error::DomainError;

/// Store-generated identifier of a Payment record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status of a payment, also mirrored into `pricing.paymentStatus`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    #[serde(other)]
    Unrecognized,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Unrecognized => "UNRECOGNIZED",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Card,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "CARD",
            PaymentMethod::Cash => "CASH",
        }
    }
}

/// A payment attempt, appended once to the `payments` collection.
///
/// Records start PENDING and are flipped to COMPLETED by the settlement
/// commit that also completes the booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<BookingId>,
    /// Amount in the major currency unit
    pub amount: f64,
    pub currency: Currency,
    pub status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
    /// Set only by the legacy intent route
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a pending card payment from a succeeded intent.
    ///
    /// Customer and provider are taken from the intent's correlation metadata.
    /// Fails if the intent was charged in a currency this backend does not
    /// record payments in.
    pub fn card(booking_id: BookingId, intent: &PaymentIntent) -> Result<Self, DomainError> {
        let currency = intent.charged_currency()?;
        Ok(Self {
            booking_id: Some(booking_id),
            amount: currency.to_major_units(intent.amount),
            currency,
            status: PaymentStatus::Pending,
            method: Some(PaymentMethod::Card),
            customer_id: intent.metadata.customer_id.clone(),
            provider_id: intent.metadata.provider_id.clone(),
            payment_intent_id: Some(intent.id.clone()),
            user_id: None,
            created_at: Utc::now(),
        })
    }

    /// Creates a pending cash payment asserted by the caller.
    pub fn cash(
        booking_id: BookingId,
        amount: f64,
        currency: Currency,
        customer_id: String,
        provider_id: String,
    ) -> Self {
        Self {
            booking_id: Some(booking_id),
            amount,
            currency,
            status: PaymentStatus::Pending,
            method: Some(PaymentMethod::Cash),
            customer_id: Some(customer_id),
            provider_id: Some(provider_id),
            payment_intent_id: None,
            user_id: None,
            created_at: Utc::now(),
        }
    }

    /// Creates the pending record written by the legacy intent route.
    pub fn legacy(user_id: Option<String>, currency: Currency, intent: &PaymentIntent) -> Self {
        Self {
            booking_id: None,
            amount: currency.to_major_units(intent.amount),
            currency,
            status: PaymentStatus::Pending,
            method: None,
            customer_id: None,
            provider_id: None,
            payment_intent_id: Some(intent.id.clone()),
            user_id,
            created_at: Utc::now(),
        }
    }
}

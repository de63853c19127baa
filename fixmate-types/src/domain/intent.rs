//! Payment intent model, owned by the payment processor.

use serde::{Deserialize, Serialize};

use super::currency::{Currency, UnknownCurrency};

/// Processor-defined intent status.
///
/// Statuses this backend does not know are kept verbatim in `Other`, so an
/// intent never fails to decode because the processor added a state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    Other(String),
}

impl IntentStatus {
    pub fn is_succeeded(&self) -> bool {
        matches!(self, IntentStatus::Succeeded)
    }

    /// The literal status string as reported by the processor.
    pub fn as_str(&self) -> &str {
        match self {
            IntentStatus::RequiresPaymentMethod => "requires_payment_method",
            IntentStatus::RequiresConfirmation => "requires_confirmation",
            IntentStatus::RequiresAction => "requires_action",
            IntentStatus::Processing => "processing",
            IntentStatus::RequiresCapture => "requires_capture",
            IntentStatus::Canceled => "canceled",
            IntentStatus::Succeeded => "succeeded",
            IntentStatus::Other(status) => status.as_str(),
        }
    }
}

impl From<String> for IntentStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "requires_payment_method" => IntentStatus::RequiresPaymentMethod,
            "requires_confirmation" => IntentStatus::RequiresConfirmation,
            "requires_action" => IntentStatus::RequiresAction,
            "processing" => IntentStatus::Processing,
            "requires_capture" => IntentStatus::RequiresCapture,
            "canceled" => IntentStatus::Canceled,
            "succeeded" => IntentStatus::Succeeded,
            _ => IntentStatus::Other(status),
        }
    }
}

impl From<IntentStatus> for String {
    fn from(status: IntentStatus) -> Self {
        match status {
            IntentStatus::Other(status) => status,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Correlation metadata attached to an intent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}

impl IntentMetadata {
    /// Key/value pairs in the order they are sent to the processor.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("bookingId", self.booking_id.as_deref()),
            ("customerId", self.customer_id.as_deref()),
            ("providerId", self.provider_id.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
    }
}

/// A processor-side payment intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Amount in the smallest currency unit
    pub amount: i64,
    /// Lowercase ISO code as reported by the processor
    pub currency: String,
    pub status: IntentStatus,
    /// Opaque token handed to the paying client
    pub client_secret: Option<String>,
    #[serde(default)]
    pub metadata: IntentMetadata,
}

impl PaymentIntent {
    /// The intent's currency, if it is one payments can be recorded in.
    pub fn charged_currency(&self) -> Result<Currency, UnknownCurrency> {
        self.currency.parse()
    }
}

/// Parameters for creating a new intent.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPaymentIntent {
    /// Amount in the smallest currency unit
    pub amount: i64,
    pub currency: Currency,
    pub metadata: IntentMetadata,
    /// Let the processor pick eligible payment methods
    pub automatic_payment_methods: bool,
}

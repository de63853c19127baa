//! Payment processor port.
//!
//! Implementations can be HTTP clients for a real processor, in-memory
//! simulators, etc.

use crate::domain::{NewPaymentIntent, PaymentIntent};

/// Error type for payment processor operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Payment processor unreachable: {0}")]
    Http(String),

    /// Error reported by the processor itself. Displays the processor's
    /// message unchanged.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Unexpected processor response: {0}")]
    Decode(String),
}

/// Port trait for the payment processor.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    /// Creates a payment intent.
    async fn create_intent(&self, req: NewPaymentIntent) -> Result<PaymentIntent, GatewayError>;

    /// Reads the current state of an intent. Never changes it.
    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, GatewayError>;
}

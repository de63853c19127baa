//! # FixMate Adapters
//!
//! Outbound adapters for the payment backend:
//! - `stripe` - REST client for the payment processor (`PaymentGateway`)
//! - `firestore` - REST client for the document store (`BookingStore`)
//! - `memory` - In-memory processor and store for development and tests
//!
//! `Gateway` and `Store` wrap the concrete adapters so the binary can pick
//! a backend at runtime while the service stays generic.

use async_trait::async_trait;
use fixmate_types::{
    Booking, BookingId, BookingStore, GatewayError, NewPaymentIntent, Payment, PaymentGateway,
    PaymentId, PaymentIntent, Settlement, StoreError,
};

pub mod firestore;
pub mod memory;
pub mod stripe;

#[cfg(test)]
mod testing;

pub use firestore::{Credentials, FirestoreStore, ServiceAccountKey};
pub use memory::{InMemoryGateway, InMemoryStore};
pub use stripe::StripeGateway;

/// Payment processor selected at startup.
pub enum Gateway {
    Stripe(StripeGateway),
    Memory(InMemoryGateway),
}

/// Document store selected at startup.
pub enum Store {
    Firestore(FirestoreStore),
    Memory(InMemoryStore),
}

// ─────────────────────────────────────────────────────────────────────────────
// Delegation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentGateway for Gateway {
    async fn create_intent(&self, req: NewPaymentIntent) -> Result<PaymentIntent, GatewayError> {
        match self {
            Gateway::Stripe(inner) => inner.create_intent(req).await,
            Gateway::Memory(inner) => inner.create_intent(req).await,
        }
    }

    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, GatewayError> {
        match self {
            Gateway::Stripe(inner) => inner.retrieve_intent(id).await,
            Gateway::Memory(inner) => inner.retrieve_intent(id).await,
        }
    }
}

#[async_trait]
impl BookingStore for Store {
    async fn get_booking(&self, id: &BookingId) -> Result<Option<Booking>, StoreError> {
        match self {
            Store::Firestore(inner) => inner.get_booking(id).await,
            Store::Memory(inner) => inner.get_booking(id).await,
        }
    }

    async fn append_payment(&self, payment: &Payment) -> Result<PaymentId, StoreError> {
        match self {
            Store::Firestore(inner) => inner.append_payment(payment).await,
            Store::Memory(inner) => inner.append_payment(payment).await,
        }
    }

    async fn settle(&self, settlement: Settlement) -> Result<(), StoreError> {
        match self {
            Store::Firestore(inner) => inner.settle(settlement).await,
            Store::Memory(inner) => inner.settle(settlement).await,
        }
    }
}

//! Booking store port.
//!
//! Adapters (Firestore, in-memory) implement this trait over the
//! `bookings` and `payments` collections.

use chrono::{DateTime, Utc};

use crate::domain::{Booking, BookingId, Payment, PaymentId};
use crate::error::StoreError;

/// Marks a booking COMPLETED as part of a settlement.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingCompletion {
    pub booking_id: BookingId,
    pub completed_at: DateTime<Utc>,
}

/// One atomic commit that flips a pending payment to COMPLETED and,
/// optionally, completes its booking.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub payment_id: PaymentId,
    pub booking: Option<BookingCompletion>,
}

/// The store port for booking and payment documents.
///
/// `settle` MUST apply all of its writes or none of them. Writing the
/// payment as PENDING first and settling afterwards means a failure in
/// between never leaves a COMPLETED booking without a COMPLETED payment.
#[async_trait::async_trait]
pub trait BookingStore: Send + Sync + 'static {
    /// Gets a booking by ID.
    async fn get_booking(&self, id: &BookingId) -> Result<Option<Booking>, StoreError>;

    /// Appends a payment record and returns its generated ID.
    async fn append_payment(&self, payment: &Payment) -> Result<PaymentId, StoreError>;

    /// Atomically applies a settlement.
    ///
    /// Fails with `StoreError::NotFound` if the payment or the booking to
    /// complete does not exist.
    async fn settle(&self, settlement: Settlement) -> Result<(), StoreError>;
}

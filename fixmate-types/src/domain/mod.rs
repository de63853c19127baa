//! Domain models for the payment backend.

pub mod booking;
pub mod currency;
pub mod intent;
pub mod payment;

pub use booking::{Booking, BookingId, BookingStatus, Pricing};
pub use currency::Currency;
pub use intent::{IntentMetadata, IntentStatus, NewPaymentIntent, PaymentIntent};
pub use payment::{Payment, PaymentId, PaymentMethod, PaymentStatus};

//! # FixMate Types
//!
//! Domain types and port traits for the FixMate payment backend.
//! This crate has ZERO external IO dependencies - only data structures,
//! lifecycle rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Booking, Payment, PaymentIntent, Currency)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain, store and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Booking, BookingId, BookingStatus, Currency, IntentMetadata, IntentStatus, NewPaymentIntent,
    Payment, PaymentId, PaymentIntent, PaymentMethod, PaymentStatus, Pricing,
};
pub use dto::*;
pub use error::{AppError, DomainError, StoreError};
pub use ports::{BookingCompletion, BookingStore, GatewayError, PaymentGateway, Settlement};

//! # FixMate Hex
//!
//! Application service layer and HTTP adapter for the payment backend.
//!
//! ## Architecture
//!
//! - `service/` - Application service (orchestrates gateway and store calls)
//! - `inbound/` - HTTP adapter (Axum server)
//! - `openapi/` - OpenAPI document served at `/api-docs/openapi.json`
//!
//! The service is generic over `G: PaymentGateway` and `S: BookingStore`,
//! allowing different adapters to be injected.

pub mod inbound;
pub mod openapi;
pub mod service;


pub use service::{PaymentService, PaymentSettings};

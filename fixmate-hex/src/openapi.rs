//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use fixmate_types::dto::{
    CashPaymentRequest, CashPaymentResponse, ConfirmPaymentRequest, ConfirmPaymentResponse,
    CreateIntentRequest, CreateIntentResponse, HealthResponse, LegacyIntentRequest,
    LegacyIntentResponse,
};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Service banner
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Plain text banner", body = String, content_type = "text/plain")
    )
)]
async fn root() {}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
async fn health() {}

/// Legacy payment intent creation (amount in smallest unit, USD)
#[utoipa::path(
    post,
    path = "/create-payment-intent",
    tag = "payments",
    request_body = LegacyIntentRequest,
    responses(
        (status = 200, description = "Intent created", body = LegacyIntentResponse),
        (status = 400, description = "Missing amount"),
        (status = 500, description = "Processor or store failure")
    )
)]
async fn legacy_create_intent() {}

/// Create a payment intent for a booking
#[utoipa::path(
    post,
    path = "/api/payments/create-intent",
    tag = "payments",
    request_body = CreateIntentRequest,
    responses(
        (status = 200, description = "Intent created", body = CreateIntentResponse),
        (status = 400, description = "Missing required fields"),
        (status = 500, description = "Processor failure")
    )
)]
async fn create_intent() {}

/// Record a card payment whose intent has succeeded
#[utoipa::path(
    post,
    path = "/api/payments/confirm",
    tag = "payments",
    request_body = ConfirmPaymentRequest,
    responses(
        (status = 200, description = "Payment recorded and booking completed", body = ConfirmPaymentResponse),
        (status = 400, description = "Missing fields, or the intent has not succeeded",
            example = json!({"error": "Payment not successful", "code": 400, "status": "requires_payment_method"})),
        (status = 404, description = "Booking not found"),
        (status = 500, description = "Processor or store failure")
    )
)]
async fn confirm_payment() {}

/// Record a cash payment
#[utoipa::path(
    post,
    path = "/api/payments/cash",
    tag = "payments",
    request_body = CashPaymentRequest,
    responses(
        (status = 200, description = "Cash payment recorded", body = CashPaymentResponse),
        (status = 400, description = "Missing required fields"),
        (status = 404, description = "Booking not found"),
        (status = 500, description = "Store failure")
    )
)]
async fn cash_payment() {}

/// OpenAPI documentation for the FixMate payment backend.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "FixMate Payment Backend API",
        version = "1.0.0",
        description = "Creates payment intents, records card and cash payments, and completes bookings.",
        license(name = "MIT"),
    ),
    paths(
        root,
        health,
        legacy_create_intent,
        create_intent,
        confirm_payment,
        cash_payment,
    ),
    components(
        schemas(
            HealthResponse,
            LegacyIntentRequest,
            LegacyIntentResponse,
            CreateIntentRequest,
            CreateIntentResponse,
            ConfirmPaymentRequest,
            ConfirmPaymentResponse,
            CashPaymentRequest,
            CashPaymentResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "payments", description = "Card and cash payment operations"),
    )
)]
pub struct ApiDoc;

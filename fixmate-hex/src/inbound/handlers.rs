//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use utoipa::OpenApi;

use fixmate_types::{
    AppError, BookingStore, CashPaymentRequest, ConfirmPaymentRequest, CreateIntentRequest,
    HealthResponse, LegacyIntentRequest, PaymentGateway,
};

use crate::PaymentService;
use crate::openapi::ApiDoc;

/// Plain text banner served at `/`.
pub const BANNER: &str = "FixMate Payment Backend Running";

/// Application state shared across handlers.
pub struct AppState<G: PaymentGateway, S: BookingStore> {
    pub service: PaymentService<G, S>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(AppError::BadRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::PaymentNotSucceeded(_) => {
                (StatusCode::BAD_REQUEST, "Payment not successful".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let mut body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });
        if let AppError::PaymentNotSucceeded(intent_status) = &self.0 {
            body["status"] = serde_json::Value::String(intent_status.clone());
        }

        (status, Json(body)).into_response()
    }
}

/// Root banner.
pub async fn root() -> &'static str {
    BANNER
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "OK".into(),
        message: "FixMate payment backend is healthy".into(),
        timestamp: Utc::now(),
    })
}

/// OpenAPI document.
pub async fn openapi() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Create a payment intent for a booking.
#[tracing::instrument(skip(state, payload))]
pub async fn create_intent<G: PaymentGateway, S: BookingStore>(
    State(state): State<Arc<AppState<G, S>>>,
    payload: Result<Json<CreateIntentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let resp = state.service.create_intent(req).await?;
    Ok(Json(resp))
}

/// Record a card payment whose intent has succeeded.
#[tracing::instrument(skip(state, payload))]
pub async fn confirm_payment<G: PaymentGateway, S: BookingStore>(
    State(state): State<Arc<AppState<G, S>>>,
    payload: Result<Json<ConfirmPaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let resp = state.service.confirm_payment(req).await?;
    Ok(Json(resp))
}

/// Record a cash payment.
#[tracing::instrument(skip(state, payload))]
pub async fn cash_payment<G: PaymentGateway, S: BookingStore>(
    State(state): State<Arc<AppState<G, S>>>,
    payload: Result<Json<CashPaymentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let resp = state.service.record_cash_payment(req).await?;
    Ok(Json(resp))
}

/// Legacy intent creation for the first app release.
#[tracing::instrument(skip(state, payload))]
pub async fn legacy_create_intent<G: PaymentGateway, S: BookingStore>(
    State(state): State<Arc<AppState<G, S>>>,
    payload: Result<Json<LegacyIntentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let resp = state.service.create_legacy_intent(req).await?;
    Ok(Json(resp))
}

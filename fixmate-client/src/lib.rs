//! # FixMate Client SDK
//!
//! A typed Rust client for the FixMate payment API.

use fixmate_types::{
    CashPaymentRequest, CashPaymentResponse, ConfirmPaymentRequest, ConfirmPaymentResponse,
    CreateIntentRequest, CreateIntentResponse, HealthResponse, LegacyIntentRequest,
    LegacyIntentResponse,
};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// FixMate payment API client.
pub struct FixMateClient {
    base_url: String,
    http: Client,
}

impl FixMateClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Fetches the health report.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.get("/health").await
    }

    /// Creates a payment intent for a booking. `amount` is in the major unit.
    pub async fn create_intent(
        &self,
        booking_id: &str,
        amount: f64,
        customer_id: &str,
        provider_id: &str,
    ) -> Result<CreateIntentResponse, ClientError> {
        let req = CreateIntentRequest {
            booking_id: Some(booking_id.to_string()),
            amount: Some(amount),
            customer_id: Some(customer_id.to_string()),
            provider_id: Some(provider_id.to_string()),
        };
        self.post("/api/payments/create-intent", &req).await
    }

    /// Records a card payment once its intent has succeeded.
    pub async fn confirm_payment(
        &self,
        payment_intent_id: &str,
        booking_id: &str,
    ) -> Result<ConfirmPaymentResponse, ClientError> {
        let req = ConfirmPaymentRequest {
            payment_intent_id: Some(payment_intent_id.to_string()),
            booking_id: Some(booking_id.to_string()),
        };
        self.post("/api/payments/confirm", &req).await
    }

    /// Records a cash payment for a booking.
    pub async fn record_cash_payment(
        &self,
        booking_id: &str,
        amount: f64,
        customer_id: &str,
        provider_id: &str,
    ) -> Result<CashPaymentResponse, ClientError> {
        let req = CashPaymentRequest {
            booking_id: Some(booking_id.to_string()),
            amount: Some(amount),
            customer_id: Some(customer_id.to_string()),
            provider_id: Some(provider_id.to_string()),
        };
        self.post("/api/payments/cash", &req).await
    }

    /// Creates an intent through the legacy route. `amount` is in the
    /// smallest currency unit.
    pub async fn create_legacy_intent(
        &self,
        amount: i64,
        user_id: Option<String>,
    ) -> Result<LegacyIntentResponse, ClientError> {
        let req = LegacyIntentRequest {
            amount: Some(amount),
            user_id,
        };
        self.post("/create-payment-intent", &req).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

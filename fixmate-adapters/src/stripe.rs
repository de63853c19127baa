//! Stripe payment processor adapter.
//!
//! Talks to the `/v1/payment_intents` REST endpoints with form-encoded
//! bodies, authenticating with the secret key.

use std::time::Duration;

use async_trait::async_trait;
use fixmate_types::{GatewayError, NewPaymentIntent, PaymentGateway, PaymentIntent};
use serde::Deserialize;
use tracing::instrument;

/// Default public API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.stripe.com";

pub struct StripeGateway {
    base_url: String,
    secret_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

impl StripeGateway {
    /// Creates a gateway with a request timeout.
    pub fn new(
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
            client,
        })
    }

    /// Form fields for a create call.
    fn create_form(req: &NewPaymentIntent) -> Vec<(String, String)> {
        let mut form = vec![
            ("amount".to_string(), req.amount.to_string()),
            ("currency".to_string(), req.currency.code().to_string()),
        ];
        if req.automatic_payment_methods {
            form.push((
                "automatic_payment_methods[enabled]".to_string(),
                "true".to_string(),
            ));
        }
        for (key, value) in req.metadata.entries() {
            form.push((format!("metadata[{key}]"), value.to_string()));
        }
        form
    }

    async fn read_intent(resp: reqwest::Response) -> Result<PaymentIntent, GatewayError> {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        if status.is_success() {
            let value: serde_json::Value =
                serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))?;
            if let Some(kind) = value
                .get("object")
                .and_then(|v| v.as_str())
                .filter(|kind| *kind != "payment_intent")
            {
                return Err(GatewayError::Decode(format!(
                    "expected a payment_intent, got a {kind}"
                )));
            }
            serde_json::from_value(value).map_err(|e| GatewayError::Decode(e.to_string()))
        } else {
            Err(api_error(status.as_u16(), &body))
        }
    }
}

/// Checks that `id` looks like a processor object id (`[A-Za-z0-9_]+`).
///
/// The id becomes a URL path segment; anything else could address a
/// different resource with the secret key. Rejected ids get the same error
/// the processor returns for an unknown intent.
fn intent_path_segment(id: &str) -> Result<String, GatewayError> {
    let valid = !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(GatewayError::Api {
            status: 404,
            message: format!("No such payment_intent: '{id}'"),
        });
    }
    Ok(urlencoding::encode(id).into_owned())
}

/// Builds an API error from a non-2xx body, keeping the processor's message.
fn api_error(status: u16, body: &str) -> GatewayError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => error
            .message
            .or(error.kind)
            .unwrap_or_else(|| format!("HTTP {status}")),
        Err(_) => body.chars().take(200).collect(),
    };
    GatewayError::Api { status, message }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip(self, req), fields(amount = req.amount, currency = %req.currency))]
    async fn create_intent(&self, req: NewPaymentIntent) -> Result<PaymentIntent, GatewayError> {
        let resp = self
            .client
            .post(format!("{}/v1/payment_intents", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&Self::create_form(&req))
            .send()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        Self::read_intent(resp).await
    }

    #[instrument(skip(self))]
    async fn retrieve_intent(&self, id: &str) -> Result<PaymentIntent, GatewayError> {
        let segment = intent_path_segment(id)?;
        let resp = self
            .client
            .get(format!("{}/v1/payment_intents/{}", self.base_url, segment))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        Self::read_intent(resp).await
    }
}

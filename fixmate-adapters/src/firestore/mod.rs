//! Firestore document store adapter.
//!
//! Uses the REST API: documents are read with `GET`, payments are appended
//! with `POST` to the collection (store-generated IDs), and settlements go
//! through a single `documents:commit` so both writes land or neither does.

mod auth;
pub mod value;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::instrument;

use fixmate_types::{
    Booking, BookingCompletion, BookingId, BookingStore, Payment, PaymentId, PaymentStatus,
    Settlement, StoreError,
};

pub use auth::{Credentials, ServiceAccountKey, TokenSource};

/// Default public API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";

pub const BOOKINGS: &str = "bookings";
pub const PAYMENTS: &str = "payments";

pub struct FirestoreStore {
    base_url: String,
    project_id: String,
    client: reqwest::Client,
    credentials: Credentials,
}

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirestoreStore {
    pub fn new(
        base_url: impl Into<String>,
        project_id: impl Into<String>,
        client: reqwest::Client,
        credentials: Credentials,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            client,
            credentials,
        }
    }

    /// Builds a store authenticated with a service account.
    pub fn with_service_account(
        base_url: impl Into<String>,
        key: ServiceAccountKey,
    ) -> Result<Self, StoreError> {
        let client = reqwest::Client::new();
        let project_id = key.project_id.clone();
        let credentials = Credentials::service_account(key, client.clone())?;
        Ok(Self::new(base_url, project_id, client, credentials))
    }

    /// Resource name of the database's document root.
    fn root_name(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.root_name(), collection, id)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path)
    }

    /// URL of a single document, with the ID percent-encoded as one segment.
    fn document_url(&self, collection: &str, id: &str) -> String {
        self.url(&format!(
            "{}/{}/{}",
            self.root_name(),
            collection,
            urlencoding::encode(id)
        ))
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let token = self.credentials.bearer().await?;
        let resp = req
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| StoreError::Http(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|env| env.error.message)
            .unwrap_or(body);

        if status == reqwest::StatusCode::NOT_FOUND {
            Err(StoreError::NotFound(message))
        } else {
            Err(StoreError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    /// Write that flips a payment to COMPLETED. The payment must exist.
    fn payment_write(&self, payment_id: &PaymentId) -> Value {
        json!({
            "update": {
                "name": self.document_name(PAYMENTS, payment_id.as_str()),
                "fields": { "status": value::string(PaymentStatus::Completed.as_str()) }
            },
            "updateMask": { "fieldPaths": ["status"] },
            "currentDocument": { "exists": true }
        })
    }

    /// Partial update completing a booking. The booking must exist.
    fn booking_write(&self, completion: &BookingCompletion) -> Value {
        let completed = value::string(PaymentStatus::Completed.as_str());
        json!({
            "update": {
                "name": self.document_name(BOOKINGS, completion.booking_id.as_str()),
                "fields": {
                    "status": value::string(fixmate_types::BookingStatus::Completed.as_str()),
                    "pricing": { "mapValue": { "fields": { "paymentStatus": completed } } },
                    "updatedAt": value::timestamp(completion.completed_at)
                }
            },
            "updateMask": { "fieldPaths": ["status", "pricing.paymentStatus", "updatedAt"] },
            "currentDocument": { "exists": true }
        })
    }

    fn commit_body(&self, settlement: &Settlement) -> Value {
        let mut writes = vec![self.payment_write(&settlement.payment_id)];
        if let Some(completion) = &settlement.booking {
            writes.push(self.booking_write(completion));
        }
        json!({ "writes": writes })
    }
}

/// Whether `id` can name a document: non-empty, at most 1500 bytes, no `/`,
/// not `.` or `..`, and not of the reserved form `__*__`.
fn is_document_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 1500
        && !id.contains('/')
        && id != "."
        && id != ".."
        && !(id.len() >= 4 && id.starts_with("__") && id.ends_with("__"))
}

/// Encodes a payment as document fields, storing `createdAt` as a timestamp.
fn payment_fields(payment: &Payment) -> Result<Value, StoreError> {
    let plain = serde_json::to_value(payment).map_err(|e| StoreError::Decode(e.to_string()))?;
    let Value::Object(map) = plain else {
        return Err(StoreError::Decode("payment did not serialize to an object".into()));
    };

    let mut fields = value::encode_fields(&map);
    fields["createdAt"] = value::timestamp(payment.created_at);
    Ok(fields)
}

/// Decodes a booking document, taking the ID from the resource name.
fn booking_from_document(doc: Document) -> Result<Booking, StoreError> {
    let mut plain = value::decode_fields(&doc.fields)?;
    let id = doc.name.rsplit('/').next().unwrap_or_default().to_string();
    plain["id"] = Value::String(id);
    serde_json::from_value(plain).map_err(|e| StoreError::Decode(e.to_string()))
}

#[async_trait]
impl BookingStore for FirestoreStore {
    #[instrument(skip(self), fields(booking_id = %id))]
    async fn get_booking(&self, id: &BookingId) -> Result<Option<Booking>, StoreError> {
        if !is_document_id(id.as_str()) {
            tracing::debug!("Not a valid document ID, no such booking");
            return Ok(None);
        }
        let url = self.document_url(BOOKINGS, id.as_str());

        let resp = match self.send(self.client.get(url)).await {
            Ok(resp) => resp,
            Err(StoreError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let doc: Document = resp
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        booking_from_document(doc).map(Some)
    }

    #[instrument(skip(self, payment), fields(booking_id = ?payment.booking_id))]
    async fn append_payment(&self, payment: &Payment) -> Result<PaymentId, StoreError> {
        let url = self.url(&format!("{}/{}", self.root_name(), PAYMENTS));
        let body = json!({ "fields": payment_fields(payment)? });

        let doc: Document = self
            .send(self.client.post(url).json(&body))
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;

        let id = doc.name.rsplit('/').next().unwrap_or_default();
        tracing::debug!(payment_id = id, "Payment document created");
        Ok(PaymentId::new(id))
    }

    #[instrument(skip(self, settlement), fields(payment_id = %settlement.payment_id))]
    async fn settle(&self, settlement: Settlement) -> Result<(), StoreError> {
        if !is_document_id(settlement.payment_id.as_str()) {
            return Err(StoreError::NotFound(format!("{PAYMENTS}/{}", settlement.payment_id)));
        }
        if let Some(completion) = settlement
            .booking
            .as_ref()
            .filter(|c| !is_document_id(c.booking_id.as_str()))
        {
            return Err(StoreError::NotFound(format!("{BOOKINGS}/{}", completion.booking_id)));
        }

        let url = format!("{}:commit", self.url(&self.root_name()));
        self.send(self.client.post(url).json(&self.commit_body(&settlement)))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json, Router,
        extract::{Path, State},
        http::StatusCode,
        routing::{get, post},
    };
    use chrono::{DateTime, Utc};
    use fixmate_types::{BookingStatus, Currency};

    use super::*;
    use crate::testing::spawn_server;

    type Commits = Arc<Mutex<Vec<Value>>>;

    const ROOT: &str = "/v1/projects/fixmate-dev/databases/(default)/documents";

    fn store(base_url: String) -> FirestoreStore {
        FirestoreStore::new(
            base_url,
            "fixmate-dev",
            reqwest::Client::new(),
            Credentials::Static("owner".into()),
        )
    }

    fn at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    async fn fake_firestore() -> (String, Commits) {
        let commits: Commits = Arc::default();

        async fn get_booking(Path(id): Path<String>) -> (StatusCode, Json<Value>) {
            if id == "B1" {
                (
                    StatusCode::OK,
                    Json(json!({
                        "name": "projects/fixmate-dev/databases/(default)/documents/bookings/B1",
                        "fields": {
                            "status": { "stringValue": "PENDING" },
                            "pricing": { "mapValue": { "fields": {
                                "paymentStatus": { "stringValue": "PENDING" }
                            } } }
                        }
                    })),
                )
            } else {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": { "code": 404, "message": "Document not found", "status": "NOT_FOUND" } })),
                )
            }
        }

        async fn add_payment(Json(body): Json<Value>) -> Json<Value> {
            assert_eq!(body["fields"]["method"], json!({ "stringValue": "CASH" }));
            Json(json!({
                "name": "projects/fixmate-dev/databases/(default)/documents/payments/AutoId123",
                "fields": body["fields"]
            }))
        }

        async fn commit(State(commits): State<Commits>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
            let missing = body["writes"]
                .as_array()
                .into_iter()
                .flatten()
                .any(|w| w["update"]["name"].as_str().is_some_and(|n| n.ends_with("/bookings/GONE")));
            if missing {
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({ "error": { "code": 404, "message": "No document to update", "status": "NOT_FOUND" } })),
                );
            }
            commits.lock().unwrap().push(body);
            (StatusCode::OK, Json(json!({ "commitTime": "2024-05-01T10:00:00Z" })))
        }

        let app = Router::new()
            .route(&format!("{ROOT}/bookings/{{id}}"), get(get_booking))
            .route(&format!("{ROOT}/payments"), post(add_payment))
            .route(&format!("{ROOT}:commit"), post(commit))
            .with_state(commits.clone());

        (spawn_server(app).await, commits)
    }

    #[test]
    fn test_payment_fields_use_typed_values() {
        let mut payment = Payment::cash(BookingId::new("B1"), 1500.0, Currency::LKR, "C1".into(), "P1".into());
        payment.created_at = at();

        let fields = payment_fields(&payment).unwrap();

        assert_eq!(fields["amount"], json!({ "doubleValue": 1500.0 }));
        assert_eq!(fields["status"], json!({ "stringValue": "PENDING" }));
        assert_eq!(fields["createdAt"], json!({ "timestampValue": "2024-05-01T10:00:00.000000Z" }));
    }

    #[test]
    fn test_commit_body_without_booking_has_one_write() {
        let store = store("http://unused".into());

        let body = store.commit_body(&Settlement {
            payment_id: PaymentId::new("pay1"),
            booking: None,
        });

        let writes = body["writes"].as_array().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(
            writes[0]["update"]["name"],
            "projects/fixmate-dev/databases/(default)/documents/payments/pay1"
        );
        assert_eq!(writes[0]["currentDocument"]["exists"], true);
    }

    #[test]
    fn test_booking_write_masks_only_lifecycle_fields() {
        let store = store("http://unused".into());

        let write = store.booking_write(&BookingCompletion {
            booking_id: BookingId::new("B1"),
            completed_at: at(),
        });

        assert_eq!(
            write["updateMask"]["fieldPaths"],
            json!(["status", "pricing.paymentStatus", "updatedAt"])
        );
        assert_eq!(write["update"]["fields"]["status"], json!({ "stringValue": "COMPLETED" }));
    }

    #[tokio::test]
    async fn test_get_booking_decodes_document() {
        let (base_url, _) = fake_firestore().await;

        let booking = store(base_url).get_booking(&BookingId::new("B1")).await.unwrap().unwrap();

        assert_eq!(booking.id, BookingId::new("B1"));
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.pricing.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_get_missing_booking_is_none() {
        let (base_url, _) = fake_firestore().await;

        let booking = store(base_url).get_booking(&BookingId::new("nope")).await.unwrap();

        assert!(booking.is_none());
    }

    #[tokio::test]
    async fn test_append_payment_returns_generated_id() {
        let (base_url, _) = fake_firestore().await;
        let payment = Payment::cash(BookingId::new("B1"), 1500.0, Currency::LKR, "C1".into(), "P1".into());

        let id = store(base_url).append_payment(&payment).await.unwrap();

        assert_eq!(id, PaymentId::new("AutoId123"));
    }

    #[tokio::test]
    async fn test_settle_commits_both_writes_together() {
        let (base_url, commits) = fake_firestore().await;

        store(base_url)
            .settle(Settlement {
                payment_id: PaymentId::new("AutoId123"),
                booking: Some(BookingCompletion {
                    booking_id: BookingId::new("B1"),
                    completed_at: at(),
                }),
            })
            .await
            .unwrap();

        let commits = commits.lock().unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0]["writes"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_settle_missing_booking_is_not_found() {
        let (base_url, commits) = fake_firestore().await;

        let result = store(base_url)
            .settle(Settlement {
                payment_id: PaymentId::new("AutoId123"),
                booking: Some(BookingCompletion {
                    booking_id: BookingId::new("GONE"),
                    completed_at: at(),
                }),
            })
            .await;

        assert!(matches!(result, Err(StoreError::NotFound(msg)) if msg == "No document to update"));
        assert!(commits.lock().unwrap().is_empty());
    }

    #[test]
    fn test_document_ids() {
        assert!(is_document_id("B1"));
        assert!(is_document_id("booking with spaces?"));
        for id in ["", ".", "..", "../payments/AutoId123", "a/b", "__reserved__"] {
            assert!(!is_document_id(id), "accepted {id:?}");
        }
    }

    #[test]
    fn test_document_url_encodes_the_id_as_one_segment() {
        let store = store("http://localhost".into());

        assert_eq!(
            store.document_url(BOOKINGS, "a b?c#d"),
            "http://localhost/v1/projects/fixmate-dev/databases/(default)/documents/bookings/a%20b%3Fc%23d"
        );
    }

    #[tokio::test]
    async fn test_get_booking_with_path_id_is_none() {
        let (base_url, _) = fake_firestore().await;

        let booking = store(base_url)
            .get_booking(&BookingId::new("../payments/AutoId123"))
            .await
            .unwrap();

        assert!(booking.is_none());
    }

    #[tokio::test]
    async fn test_settle_with_path_booking_id_writes_nothing() {
        let (base_url, commits) = fake_firestore().await;

        let result = store(base_url)
            .settle(Settlement {
                payment_id: PaymentId::new("AutoId123"),
                booking: Some(BookingCompletion {
                    booking_id: BookingId::new("../payments/AutoId123"),
                    completed_at: at(),
                }),
            })
            .await;

        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert!(commits.lock().unwrap().is_empty());
    }

    #[test]
    fn test_booking_document_with_epoch_millis_and_null_pricing() {
        let doc: Document = serde_json::from_value(json!({
            "name": "projects/fixmate-dev/databases/(default)/documents/bookings/B7",
            "fields": {
                "status": { "stringValue": "PENDING" },
                "pricing": { "nullValue": null },
                "updatedAt": { "integerValue": "1714557600000" }
            }
        }))
        .unwrap();

        let booking = booking_from_document(doc).unwrap();

        assert_eq!(booking.id, BookingId::new("B7"));
        assert_eq!(booking.pricing.payment_status, PaymentStatus::Pending);
        assert_eq!(booking.updated_at, Some(at()));
    }

    #[test]
    fn test_booking_document_with_null_payment_status() {
        let doc: Document = serde_json::from_value(json!({
            "name": "projects/fixmate-dev/databases/(default)/documents/bookings/B8",
            "fields": {
                "status": { "stringValue": "COMPLETED" },
                "pricing": { "mapValue": { "fields": { "paymentStatus": { "nullValue": null } } } }
            }
        }))
        .unwrap();

        let booking = booking_from_document(doc).unwrap();

        assert_eq!(booking.status, BookingStatus::Completed);
        assert_eq!(booking.pricing.payment_status, PaymentStatus::Pending);
    }
}

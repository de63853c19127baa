//! HTTP-level tests for the payment routes.
//!
//! Drive the full router (CORS, tracing, JSON rejection handling) against
//! the in-memory processor and store.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use fixmate_adapters::{InMemoryGateway, InMemoryStore};
use fixmate_hex::{PaymentService, PaymentSettings, inbound::HttpServer};
use fixmate_types::{Booking, BookingId, BookingStatus, Currency, IntentStatus, PaymentMethod};

struct Harness {
    app: Router,
    gateway: InMemoryGateway,
    store: InMemoryStore,
}

fn harness() -> Harness {
    let gateway = InMemoryGateway::new();
    let store = InMemoryStore::new();
    store.insert_booking(Booking::pending("B1"));

    let settings = PaymentSettings {
        currency: Currency::LKR,
        publishable_key: "pk_test_123".into(),
    };
    let service = PaymentService::new(gateway.clone(), store.clone(), settings);

    Harness {
        app: HttpServer::new(service).router(),
        gateway,
        store,
    }
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

async fn create_intent(app: &Router) -> String {
    let (status, body) = send(
        app,
        post(
            "/api/payments/create-intent",
            json!({ "bookingId": "B1", "amount": 408.00, "customerId": "C1", "providerId": "P1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["paymentIntentId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_root_banner() {
    let h = harness();
    let response = h
        .app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"FixMate Payment Backend Running");
}

#[tokio::test]
async fn test_health() {
    let h = harness();
    let (status, body) = send(
        &h.app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let h = harness();
    let (status, body) = send(
        &h.app,
        Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/payments/confirm"].is_object());
}

#[tokio::test]
async fn test_create_intent_returns_secret_and_publishable_key() {
    let h = harness();
    let (status, body) = send(
        &h.app,
        post(
            "/api/payments/create-intent",
            json!({ "bookingId": "B1", "amount": 408.00, "customerId": "C1", "providerId": "P1" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["publishableKey"], "pk_test_123");
    assert!(body["clientSecret"].as_str().unwrap().contains("_secret_"));

    let created = h.gateway.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].amount, 40800);
    assert_eq!(created[0].currency, Currency::LKR);
    assert_eq!(created[0].metadata.booking_id.as_deref(), Some("B1"));
}

#[tokio::test]
async fn test_create_intent_missing_fields_is_400() {
    let h = harness();
    let (status, body) = send(
        &h.app,
        post("/api/payments/create-intent", json!({ "bookingId": "B1", "amount": 10 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields: customerId, providerId");
    assert_eq!(body["code"], 400);
    assert!(h.gateway.created().is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let h = harness();
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/payments/create-intent")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&h.app, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_confirm_succeeded_intent_completes_booking() {
    let h = harness();
    let intent_id = create_intent(&h.app).await;
    h.gateway.set_status(&intent_id, IntentStatus::Succeeded);

    let (status, body) = send(
        &h.app,
        post(
            "/api/payments/confirm",
            json!({ "paymentIntentId": intent_id, "bookingId": "B1" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["paymentStatus"], "COMPLETED");
    assert_eq!(body["bookingStatus"], "COMPLETED");

    let booking = h.store.booking(&BookingId::new("B1")).unwrap();
    assert_eq!(booking.status, BookingStatus::Completed);
    let payments = h.store.payments_for(&BookingId::new("B1"));
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].1.amount, 408.0);
    assert_eq!(payments[0].1.method, Some(PaymentMethod::Card));
}

#[tokio::test]
async fn test_confirm_unpaid_intent_is_400_with_status() {
    let h = harness();
    let intent_id = create_intent(&h.app).await;

    let (status, body) = send(
        &h.app,
        post(
            "/api/payments/confirm",
            json!({ "paymentIntentId": intent_id, "bookingId": "B1" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Payment not successful");
    assert_eq!(body["status"], "requires_payment_method");
    assert!(h.store.payments().is_empty());
    assert_eq!(
        h.store.booking(&BookingId::new("B1")).unwrap().status,
        BookingStatus::Pending
    );
}

#[tokio::test]
async fn test_confirm_intent_in_new_processor_state_echoes_it() {
    let h = harness();
    let intent_id = create_intent(&h.app).await;
    h.gateway
        .set_status(&intent_id, IntentStatus::Other("blocked".into()));

    let (status, body) = send(
        &h.app,
        post(
            "/api/payments/confirm",
            json!({ "paymentIntentId": intent_id, "bookingId": "B1" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "blocked");
    assert!(h.store.payments().is_empty());
}

#[tokio::test]
async fn test_confirm_twice_writes_once() {
    let h = harness();
    let intent_id = create_intent(&h.app).await;
    h.gateway.set_status(&intent_id, IntentStatus::Succeeded);
    let body = json!({ "paymentIntentId": intent_id, "bookingId": "B1" });

    let (first, _) = send(&h.app, post("/api/payments/confirm", body.clone())).await;
    let (second, resp) = send(&h.app, post("/api/payments/confirm", body)).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(resp["message"], "Booking already completed");
    assert_eq!(h.store.payments().len(), 1);
}

#[tokio::test]
async fn test_confirm_unknown_intent_is_500() {
    let h = harness();

    let (status, body) = send(
        &h.app,
        post(
            "/api/payments/confirm",
            json!({ "paymentIntentId": "pi_missing", "bookingId": "B1" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "No such payment_intent: 'pi_missing'");
}

#[tokio::test]
async fn test_cash_payment_completes_booking() {
    let h = harness();

    let (status, body) = send(
        &h.app,
        post(
            "/api/payments/cash",
            json!({ "bookingId": "B1", "amount": 1500, "customerId": "C1", "providerId": "P1" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["bookingStatus"], "COMPLETED");
    assert!(body["paymentId"].is_string());

    let payments = h.store.payments_for(&BookingId::new("B1"));
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].1.method, Some(PaymentMethod::Cash));
    assert_eq!(payments[0].1.amount, 1500.0);
}

#[tokio::test]
async fn test_cash_payment_for_unknown_booking_is_404() {
    let h = harness();

    let (status, _) = send(
        &h.app,
        post(
            "/api/payments/cash",
            json!({ "bookingId": "nope", "amount": 1500, "customerId": "C1", "providerId": "P1" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(h.store.payments().is_empty());
}

#[tokio::test]
async fn test_legacy_intent_uses_minor_units_as_given() {
    let h = harness();

    let (status, body) = send(
        &h.app,
        post("/create-payment-intent", json!({ "amount": 5000, "userId": "U1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["clientSecret"].is_string());

    let created = h.gateway.created();
    assert_eq!(created[0].amount, 5000);
    assert_eq!(created[0].currency, Currency::USD);

    let payments = h.store.payments();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].1.user_id.as_deref(), Some("U1"));
    assert_eq!(payments[0].1.amount, 50.0);
}

//! Client example walking a booking through card and cash payment flows
//! against an in-process server backed by the in-memory adapters.
//!
//! Run with: cargo run -p fixmate-app --example client_example

use std::net::SocketAddr;

use fixmate_adapters::{InMemoryGateway, InMemoryStore};
use fixmate_client::FixMateClient;
use fixmate_hex::{PaymentService, PaymentSettings, inbound::HttpServer};
use fixmate_types::{Booking, Currency, IntentStatus};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt().with_env_filter("info").init();

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;

    // Two pending bookings: one paid by card, one in cash
    let gateway = InMemoryGateway::new();
    let store = InMemoryStore::new();
    store.insert_booking(Booking::pending("B1"));
    store.insert_booking(Booking::pending("B2"));

    let settings = PaymentSettings {
        currency: Currency::LKR,
        publishable_key: "pk_test_demo".into(),
    };
    let service = PaymentService::new(gateway.clone(), store.clone(), settings);
    let router = HttpServer::new(service).router();

    println!("🚀 Starting server on {addr}...");
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            eprintln!("server error: {e}");
        }
    });

    let client = FixMateClient::new(format!("http://{addr}"));

    // ─────────────────────────────────────────────────────────────────────────
    // Demo: card payment
    // ─────────────────────────────────────────────────────────────────────────

    let health = client.health().await?;
    println!("✅ Server health: {}", health.status);

    let intent = client.create_intent("B1", 408.00, "C1", "P1").await?;
    println!("✅ Created intent {} for LKR 408.00", intent.payment_intent_id);

    // Confirming before the customer pays is refused
    let early = client.confirm_payment(&intent.payment_intent_id, "B1").await;
    println!("✅ Early confirm refused: {}", early.unwrap_err());

    // The customer completes payment in the app
    gateway.set_status(&intent.payment_intent_id, IntentStatus::Succeeded);

    let confirmed = client.confirm_payment(&intent.payment_intent_id, "B1").await?;
    println!(
        "✅ {} (payment={}, booking={})",
        confirmed.message, confirmed.payment_status.as_str(), confirmed.booking_status
    );

    // ─────────────────────────────────────────────────────────────────────────
    // Demo: cash payment
    // ─────────────────────────────────────────────────────────────────────────

    let cash = client.record_cash_payment("B2", 1500.0, "C2", "P1").await?;
    println!("✅ {} (payment id={})", cash.message, cash.payment_id);

    println!("\n📋 Stored payments:");
    for (id, payment) in store.payments() {
        println!(
            "   - {id}: {} {:.2} {}",
            payment.currency, payment.amount, payment.status.as_str()
        );
    }

    println!("\n🎉 Example completed successfully!");

    Ok(())
}

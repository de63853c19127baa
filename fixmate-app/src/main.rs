//! # FixMate Payment Backend
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Build the processor and store adapters
//! - Create the payment service
//! - Start the HTTP server

mod config;

use std::time::Duration;

use opentelemetry::global;
use opentelemetry_sdk::{metrics::SdkMeterProvider, propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fixmate_adapters::{
    FirestoreStore, Gateway, InMemoryGateway, InMemoryStore, Store, StripeGateway,
};
use fixmate_hex::{PaymentService, PaymentSettings, inbound::HttpServer};
use fixmate_types::Booking;

use config::{Backend, Config};

/// Timeout for each call to the payment processor.
const GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

struct Telemetry {
    tracer_provider: sdktrace::SdkTracerProvider,
    meter_provider: SdkMeterProvider,
}

impl Telemetry {
    fn shutdown(self) {
        let _ = self.tracer_provider.shutdown();
        let _ = self.meter_provider.shutdown();
    }
}

/// Installs OTLP trace and metric exporters. The endpoint is read by the
/// exporters from `OTEL_EXPORTER_OTLP_ENDPOINT`.
fn init_telemetry() -> anyhow::Result<(sdktrace::Tracer, Telemetry)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporters with batch processing (non-blocking)
    let span_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;
    let tracer_provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(span_exporter)
        .build();
    global::set_tracer_provider(tracer_provider.clone());

    let metric_exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_tonic()
        .build()?;
    let meter_provider = SdkMeterProvider::builder()
        .with_periodic_exporter(metric_exporter)
        .build();
    global::set_meter_provider(meter_provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((
        tracer_provider.tracer("fixmate-payments"),
        Telemetry {
            tracer_provider,
            meter_provider,
        },
    ))
}

fn build_adapters(backend: Backend) -> anyhow::Result<(Gateway, Store)> {
    match backend {
        Backend::Live(live) => {
            let gateway = StripeGateway::new(
                live.stripe_api_base,
                live.stripe_secret_key,
                GATEWAY_TIMEOUT,
            )?;
            let store =
                FirestoreStore::with_service_account(live.firestore_api_base, live.service_account)?;
            Ok((Gateway::Stripe(gateway), Store::Firestore(store)))
        }
        Backend::Memory { seed_bookings } => {
            tracing::warn!("Using in-memory processor and store; nothing is persisted");
            let store = InMemoryStore::new();
            for id in seed_bookings {
                store.insert_booking(Booking::pending(id));
            }
            Ok((
                Gateway::Memory(InMemoryGateway::auto_succeeding()),
                Store::Memory(store),
            ))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize OpenTelemetry only when a collector is configured
    let (telemetry_layer, telemetry) = match config.otlp_endpoint {
        Some(_) => {
            let (tracer, telemetry) = init_telemetry()?;
            (
                Some(tracing_opentelemetry::layer().with_tracer(tracer)),
                Some(telemetry),
            )
        }
        None => (None, None),
    };

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fixmate_app=debug,fixmate_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry_layer)
        .init();

    tracing::info!("Starting FixMate payment backend on port {}", config.port);
    tracing::info!("Charging bookings in {}", config.currency);

    let (gateway, store) = build_adapters(config.backend)?;

    // Create the payment service
    let settings = PaymentSettings {
        currency: config.currency,
        publishable_key: config.publishable_key,
    };
    let service = PaymentService::new(gateway, store, settings);

    // Create and run the HTTP server
    let server = HttpServer::new(service);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces and metrics are flushed before exit
    if let Some(telemetry) = telemetry {
        telemetry.shutdown();
    }
    Ok(())
}

//! Configuration loading from environment.

use std::env;

use anyhow::{Context, anyhow};
use fixmate_adapters::{ServiceAccountKey, firestore, stripe};
use fixmate_types::Currency;

/// Application configuration.
#[derive(Debug)]
pub struct Config {
    pub port: u16,
    pub currency: Currency,
    pub publishable_key: String,
    pub backend: Backend,
    pub otlp_endpoint: Option<String>,
}

/// Which processor and store the server talks to.
#[derive(Debug)]
pub enum Backend {
    Live(LiveConfig),
    /// In-process fakes. Intents succeed as soon as they are created.
    Memory { seed_bookings: Vec<String> },
}

#[derive(Debug)]
pub struct LiveConfig {
    pub stripe_secret_key: String,
    pub stripe_api_base: String,
    pub service_account: ServiceAccountKey,
    pub firestore_api_base: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("PORT must be a port number")?;

        let currency = var("PAYMENT_CURRENCY")
            .unwrap_or_else(|| "lkr".to_string())
            .parse()?;

        let backend = match var("FIXMATE_BACKEND").as_deref().unwrap_or("live") {
            "live" => Backend::Live(LiveConfig::from_lookup(&var)?),
            "memory" => Backend::Memory {
                seed_bookings: var("SEED_BOOKINGS")
                    .unwrap_or_default()
                    .split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect(),
            },
            other => return Err(anyhow!("FIXMATE_BACKEND must be 'live' or 'memory', got '{other}'")),
        };

        let publishable_key = match (&backend, var("STRIPE_PUBLISHABLE_KEY")) {
            (_, Some(key)) => key,
            (Backend::Memory { .. }, None) => String::new(),
            (Backend::Live(_), None) => {
                return Err(anyhow!("STRIPE_PUBLISHABLE_KEY environment variable is required"));
            }
        };

        Ok(Self {
            port,
            currency,
            publishable_key,
            backend,
            otlp_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.is_empty()),
        })
    }
}

impl LiveConfig {
    fn from_lookup(var: &impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let stripe_secret_key = var("STRIPE_SECRET_KEY")
            .ok_or_else(|| anyhow!("STRIPE_SECRET_KEY environment variable is required"))?;

        let blob = var("FIREBASE_SERVICE_ACCOUNT")
            .ok_or_else(|| anyhow!("FIREBASE_SERVICE_ACCOUNT environment variable is required"))?;
        let service_account = ServiceAccountKey::from_json(&blob)?;

        Ok(Self {
            stripe_secret_key,
            stripe_api_base: var("STRIPE_API_BASE")
                .unwrap_or_else(|| stripe::DEFAULT_BASE_URL.to_string()),
            service_account,
            firestore_api_base: var("FIRESTORE_API_BASE")
                .unwrap_or_else(|| firestore::DEFAULT_BASE_URL.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_memory_backend_defaults() {
        let config = load(&[("FIXMATE_BACKEND", "memory"), ("SEED_BOOKINGS", "B1, B2,")]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.currency, Currency::LKR);
        assert!(config.otlp_endpoint.is_none());
        assert!(matches!(
            config.backend,
            Backend::Memory { ref seed_bookings } if seed_bookings == &["B1", "B2"]
        ));
    }

    #[test]
    fn test_live_backend_requires_secrets() {
        let err = load(&[("STRIPE_PUBLISHABLE_KEY", "pk_test")]).unwrap_err();

        assert!(err.to_string().contains("STRIPE_SECRET_KEY"));
    }

    #[test]
    fn test_live_backend_reads_service_account() {
        let blob = r#"{"project_id":"fixmate-dev","client_email":"svc@fixmate-dev.iam.gserviceaccount.com","private_key":"pem"}"#;
        let config = load(&[
            ("STRIPE_SECRET_KEY", "sk_test"),
            ("STRIPE_PUBLISHABLE_KEY", "pk_test"),
            ("FIREBASE_SERVICE_ACCOUNT", blob),
            ("PAYMENT_CURRENCY", "USD"),
        ])
        .unwrap();

        assert_eq!(config.currency, Currency::USD);
        let Backend::Live(live) = config.backend else {
            panic!("expected live backend");
        };
        assert_eq!(live.service_account.project_id, "fixmate-dev");
        assert_eq!(live.stripe_api_base, "https://api.stripe.com");
        assert_eq!(live.firestore_api_base, "https://firestore.googleapis.com");
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(load(&[("FIXMATE_BACKEND", "sqlite")]).is_err());
    }

    #[test]
    fn test_bad_currency_is_rejected() {
        assert!(load(&[("FIXMATE_BACKEND", "memory"), ("PAYMENT_CURRENCY", "xyz")]).is_err());
    }
}

//! FixMate CLI
//!
//! Command-line interface for the FixMate payment API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use fixmate_client::FixMateClient;

#[derive(Parser)]
#[command(name = "fixmate")]
#[command(author, version, about = "FixMate payment API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the payment API
    #[arg(long, env = "FIXMATE_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Payment intent operations
    Intent {
        #[command(subcommand)]
        action: IntentCommands,
    },
    /// Record payments against bookings
    Payment {
        #[command(subcommand)]
        action: PaymentCommands,
    },
    /// Check API health
    Health,
}

#[derive(Subcommand)]
enum IntentCommands {
    /// Create an intent for a booking
    Create {
        #[arg(long)]
        booking: String,
        /// Amount in the major currency unit, e.g. 408.00
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        customer: String,
        #[arg(long)]
        provider: String,
    },
    /// Create an intent through the legacy route
    Legacy {
        /// Amount in the smallest currency unit, e.g. 5000
        #[arg(long)]
        amount: i64,
        #[arg(long)]
        user: Option<String>,
    },
}

#[derive(Subcommand)]
enum PaymentCommands {
    /// Record a card payment whose intent has succeeded
    Confirm {
        /// Payment intent ID (pi_...)
        #[arg(long)]
        intent: String,
        #[arg(long)]
        booking: String,
    },
    /// Record a cash payment
    Cash {
        #[arg(long)]
        booking: String,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        customer: String,
        #[arg(long)]
        provider: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = FixMateClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => match client.health().await {
            Ok(health) => println!("✓ API is healthy ({})", health.message),
            Err(e) => {
                println!("✗ API is not healthy: {e}");
                std::process::exit(1);
            }
        },

        Commands::Intent { action } => match action {
            IntentCommands::Create {
                booking,
                amount,
                customer,
                provider,
            } => {
                let intent = client
                    .create_intent(&booking, amount, &customer, &provider)
                    .await?;
                println!("{}", serde_json::to_string_pretty(&intent)?);
            }
            IntentCommands::Legacy { amount, user } => {
                let intent = client.create_legacy_intent(amount, user).await?;
                println!("{}", serde_json::to_string_pretty(&intent)?);
            }
        },

        Commands::Payment { action } => match action {
            PaymentCommands::Confirm { intent, booking } => {
                let resp = client.confirm_payment(&intent, &booking).await?;
                println!("{}", serde_json::to_string_pretty(&resp)?);
            }
            PaymentCommands::Cash {
                booking,
                amount,
                customer,
                provider,
            } => {
                let resp = client
                    .record_cash_payment(&booking, amount, &customer, &provider)
                    .await?;
                println!("{}", serde_json::to_string_pretty(&resp)?);
            }
        },
    }

    Ok(())
}

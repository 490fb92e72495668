// Terminal front-end for the travel booking client

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use travel_booking_client::{App, BookingOutcome, CancelOutcome, ClientConfig};

#[derive(Debug, Parser)]
#[command(name = "travel-client", version, about = "Browse trips and manage reservations")]
struct Cli {
    /// API base url, overrides TRAVEL_API_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Acting customer id, overrides TRAVEL_DEFAULT_CUSTOMER_ID
    #[arg(long, global = true)]
    customer: Option<i64>,

    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render the screen behind a route such as /, /trip/3, /my-bookings or /reservations-table
    Open {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Book a trip for the acting customer
    Book {
        #[arg(long)]
        trip: i64,
        #[arg(long, default_value_t = 1)]
        people: u32,
    },
    /// Cancel a pending reservation of the acting customer
    Cancel { reservation: String },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("travel_booking_client=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = ClientConfig::from_env().context("invalid environment configuration")?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(customer) = cli.customer {
        config.default_customer_id = customer;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    config.validate().context("invalid configuration")?;

    let mut app = App::new(config).context("failed to build API client")?;
    app.start().await;
    if let Some(error) = app.store().last_error() {
        warn!(%error, "customer list unavailable");
    }

    let command = cli.command.unwrap_or(Command::Open {
        path: "/".to_string(),
    });
    match command {
        Command::Open { path } => {
            let page = app.open(&path).await;
            print!("{page}");
        }
        Command::Book { trip, people } => {
            let (outcome, page) = app
                .book(trip, people)
                .await
                .with_context(|| format!("could not book trip {trip}"))?;
            print!("{page}");
            if let BookingOutcome::Rejected { error } = outcome {
                anyhow::bail!(error.unwrap_or_else(|| "Booking failed".to_string()));
            }
        }
        Command::Cancel { reservation } => {
            let (outcome, page) = app
                .cancel(&reservation)
                .await
                .with_context(|| format!("could not cancel {reservation}"))?;
            print!("{page}");
            if let CancelOutcome::Rejected { error } = outcome {
                anyhow::bail!(error.unwrap_or_else(|| "Cancellation failed".to_string()));
            }
        }
    }

    Ok(())
}

//! # Tavola Quote
//!
//! Prices an order request against the catalog and checks the submitted
//! total.
//!
//! ## Usage
//! ```text
//! tavola-quote order.json
//! cat order.json | tavola-quote
//! RUST_LOG=tavola_core=debug TAVOLA_PRICE_TOLERANCE=0.5 tavola-quote order.json
//! ```
//!
//! ## Input
//! ```json
//! {
//!   "items": [{ "productId": "p-1", "quantity": 2, "selections": { "size": "L" } }],
//!   "deliveryFee": 2.5,
//!   "totalAmount": 23.9
//! }
//! ```
//!
//! Prints the computed [`OrderQuote`](tavola_core::OrderQuote) as JSON. The
//! process exits with status 1 when the submitted total falls outside the
//! tolerance.

mod config;

use std::io::Read;
use std::process::ExitCode;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tavola_core::OrderRequest;
use tavola_db::{Database, DbConfig};

use crate::config::QuoteConfig;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize tracing (stderr, so stdout stays pure JSON)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = QuoteConfig::load()?;
    info!(
        db = %config.database_path.display(),
        tolerance = %config.price_tolerance,
        "Configuration loaded"
    );

    let request = read_request(std::env::args().nth(1))?;
    info!(lines = request.items.len(), "Order request parsed");

    let db = Database::new(
        DbConfig::new(&config.database_path).run_migrations(config.run_migrations),
    )
    .await
    .context("failed to open database")?;

    let quote = db
        .price_calculator()
        .quote(&request, config.price_tolerance)
        .await
        .context("failed to price order")?;

    db.close().await;

    println!("{}", serde_json::to_string_pretty(&quote)?);

    if quote.price_check.is_valid {
        Ok(ExitCode::SUCCESS)
    } else {
        warn!(
            client = %quote.price_check.client_amount,
            server = %quote.price_check.server_amount,
            difference = %quote.price_check.difference,
            "Submitted total does not match"
        );
        Ok(ExitCode::FAILURE)
    }
}

/// Reads the order request from `path`, or from stdin when no path is given.
fn read_request(path: Option<String>) -> anyhow::Result<OrderRequest> {
    let raw = match path.as_deref() {
        Some("-") | None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read order from stdin")?;
            buf
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read order file {path}"))?,
    };

    parse_request(&raw)
}

fn parse_request(raw: &str) -> anyhow::Result<OrderRequest> {
    serde_json::from_str(raw).context("invalid order request JSON")
}

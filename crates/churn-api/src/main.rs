//! HTTP API for the merchant churn alert back office.
//!
//! Serves alert and call log management over JSON and forwards notifications
//! to Slack.

mod config;
mod error;
mod extract;
mod routes;
mod state;

use std::sync::Arc;

use database::Database;
use merchant_data::{MerchantDirectory, PaymentLedger, PgMerchantDirectory, PgPaymentLedger};
use slack_notifier::Notifier;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting churn alert API");

    let db = Database::connect_with_pool_size(&config.database_url, config.database_pool_size)
        .await?;
    db.migrate().await?;

    let notifier = Notifier::new(config.slack.clone())?;

    let directory: Option<Arc<dyn MerchantDirectory>> = match &config.core_database_url {
        Some(url) => match PgMerchantDirectory::connect(url).await {
            Ok(directory) => Some(Arc::new(directory)),
            Err(e) => {
                warn!(error = %e, "Merchant directory unavailable, alert lookups will not include merchants");
                None
            }
        },
        None => None,
    };

    let ledger: Option<Arc<dyn PaymentLedger>> = match &config.payment_database_url {
        Some(url) => match PgPaymentLedger::connect(url).await {
            Ok(ledger) => Some(Arc::new(ledger)),
            Err(e) => {
                warn!(error = %e, "Payment ledger unavailable, merchant plan names disabled");
                None
            }
        },
        None => None,
    };

    let state = AppState::new(db.clone(), notifier).with_sources(directory, ledger);
    let app = routes::app(state);

    info!(addr = %config.addr, "Churn alert API listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Churn alert API stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
}

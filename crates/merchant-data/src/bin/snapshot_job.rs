//! Builds monthly user snapshots from the merchant directory and payment
//! ledger.

use chrono::Utc;
use clap::Parser;
use database::Database;
use merchant_data::{PgMerchantDirectory, PgPaymentLedger, SnapshotJob, SnapshotOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "snapshot-job")]
#[command(about = "Aggregate completed payments into monthly merchant snapshots")]
struct Args {
    /// SQLite URL of the churn alert store
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:churn_alert.db?mode=rwc")]
    database_url: String,

    /// Merchant directory (PostgreSQL)
    #[arg(long, env = "CORE_DATABASE_URL")]
    core_database_url: String,

    /// Payment ledger (PostgreSQL)
    #[arg(long, env = "PAYMENT_DATABASE_URL")]
    payment_database_url: String,

    /// Number of complete billing months per merchant
    #[arg(long, default_value_t = 3)]
    months: u32,

    /// Only merchants who signed up on this day of the month
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=31))]
    signup_day: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let db = Database::connect(&args.database_url).await?;
    db.migrate().await?;

    let directory = PgMerchantDirectory::connect(&args.core_database_url).await?;
    let ledger = PgPaymentLedger::connect(&args.payment_database_url).await?;

    let report = SnapshotJob::new(&directory, &ledger, &db)
        .run(SnapshotOptions {
            months: args.months,
            signup_day: args.signup_day,
            today: Utc::now().date_naive(),
        })
        .await?;

    info!(
        merchants = report.merchants,
        snapshots = report.snapshots,
        failures = report.failures,
        "Snapshot job finished"
    );

    db.close().await;
    Ok(())
}

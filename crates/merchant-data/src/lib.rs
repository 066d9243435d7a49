//! Read-only merchant and payment data.
//!
//! The merchant directory and the payment ledger live in separate
//! PostgreSQL databases owned by other systems. This crate reads them through
//! the [`MerchantDirectory`] and [`PaymentLedger`] traits and builds the
//! monthly [`database::UserSnapshot`] rows from them.
//!
//! [`memory`] has in-memory implementations of both traits.

pub mod directory;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod models;
pub mod queries;
pub mod snapshot;

pub use directory::{MerchantDirectory, PgMerchantDirectory, FIRST_OF_MONTH_SIGNUP_DAYS};
pub use error::{Result, SourceError};
pub use ledger::{PaymentLedger, PgPaymentLedger};
pub use memory::{MemoryDirectory, MemoryLedger};
pub use models::{
    DailyTotals, EligibleMerchant, Merchant, MerchantBusinessType, PeriodTotals, Transaction,
    WeeklyGtv,
};
pub use snapshot::{billing_periods, build_snapshot, BillingPeriod, SnapshotJob, SnapshotOptions, SnapshotReport};

/// Look up a merchant and, when a ledger is available, its plan name.
pub async fn merchant_profile(
    directory: &dyn MerchantDirectory,
    ledger: Option<&dyn PaymentLedger>,
    merchant_id: &str,
) -> Result<Option<Merchant>> {
    let Some(mut merchant) = directory.merchant_by_id(merchant_id).await? else {
        return Ok(None);
    };
    if let Some(ledger) = ledger {
        merchant.merchant_plan_name = ledger.plan_name(merchant_id).await?;
    }
    Ok(Some(merchant))
}

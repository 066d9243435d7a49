//! Monthly transaction snapshots.
//!
//! A merchant's billing month runs from its signup day in one calendar month
//! to the day before its signup day in the next. Signup days past the end of
//! a shorter month fall on that month's last day.

use chrono::{Datelike, Duration, Months, NaiveDate};
use database::{user_snapshot, Database, NewUserSnapshot};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::directory::MerchantDirectory;
use crate::error::Result;
use crate::ledger::PaymentLedger;
use crate::models::{DailyTotals, EligibleMerchant};

/// Inclusive date bounds of one billing month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// The merchant's signup day within the month containing `date`.
pub fn anchor(date: NaiveDate, signup_day: u32) -> Option<NaiveDate> {
    let first = date.with_day(1)?;
    let last = first.checked_add_months(Months::new(1))? - Duration::days(1);
    first.with_day(signup_day.clamp(1, last.day()))
}

/// The `months` most recent complete billing periods before `today`,
/// oldest first. The period containing `today` is still open and excluded.
pub fn billing_periods(signup_day: u32, today: NaiveDate, months: u32) -> Vec<BillingPeriod> {
    let mut periods = Vec::new();

    let Some(mut current) = anchor(today, signup_day) else {
        return periods;
    };
    if current > today {
        match today
            .checked_sub_months(Months::new(1))
            .and_then(|d| anchor(d, signup_day))
        {
            Some(previous) => current = previous,
            None => return periods,
        }
    }

    for _ in 0..months {
        let Some(start) = current
            .checked_sub_months(Months::new(1))
            .and_then(|d| anchor(d, signup_day))
        else {
            break;
        };
        periods.push(BillingPeriod {
            start,
            end: current - Duration::days(1),
        });
        current = start;
    }

    periods.reverse();
    periods
}

/// Fold per-day totals into a snapshot row.
pub fn build_snapshot(merchant_id: &str, period: BillingPeriod, days: &[DailyTotals]) -> NewUserSnapshot {
    let mut meta = Map::new();
    let mut count = 0;
    let mut volume = 0.0;

    for day in days {
        meta.insert(
            day.day.format("%Y-%m-%d").to_string(),
            json!({
                "transactionCount": day.transaction_count,
                "transactionVolume": day.transaction_volume,
            }),
        );
        count += day.transaction_count;
        volume += day.transaction_volume;
    }

    NewUserSnapshot {
        business_id: Some(merchant_id.to_string()),
        user_id: None,
        store_id: None,
        month_start: period.start,
        month_end: period.end,
        meta_data: Some(Value::Object(meta)),
        transaction_count: Some(count),
        transaction_volume: Some(volume),
    }
}

/// What a snapshot run should cover.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotOptions {
    /// Number of complete billing months per merchant.
    pub months: u32,
    /// Only merchants who signed up on this day of the month.
    pub signup_day: Option<u32>,
    /// Reference date; periods end before it.
    pub today: NaiveDate,
}

/// Outcome of a snapshot run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotReport {
    pub merchants: usize,
    pub snapshots: usize,
    pub failures: usize,
}

/// Builds snapshots from the auxiliary sources into the primary store.
pub struct SnapshotJob<'a> {
    directory: &'a dyn MerchantDirectory,
    ledger: &'a dyn PaymentLedger,
    db: &'a Database,
}

impl<'a> SnapshotJob<'a> {
    pub fn new(
        directory: &'a dyn MerchantDirectory,
        ledger: &'a dyn PaymentLedger,
        db: &'a Database,
    ) -> Self {
        Self {
            directory,
            ledger,
            db,
        }
    }

    /// Snapshot every eligible merchant.
    ///
    /// A merchant whose snapshots cannot be built is logged and counted as a
    /// failure; the run continues with the next one.
    pub async fn run(&self, options: SnapshotOptions) -> Result<SnapshotReport> {
        let merchants: Vec<EligibleMerchant> = self
            .directory
            .eligible_merchants()
            .await?
            .into_iter()
            .filter(|m| {
                options
                    .signup_day
                    .map_or(true, |day| m.signup_date.day() == day)
            })
            .collect();

        info!(merchants = merchants.len(), months = options.months, "Starting snapshot run");

        let mut report = SnapshotReport::default();
        for (n, merchant) in merchants.iter().enumerate() {
            match self.snapshot_merchant(merchant, &options).await {
                Ok(written) => report.snapshots += written,
                Err(e) => {
                    warn!(merchant_id = %merchant.merchant_id, error = %e, "Snapshot failed");
                    report.failures += 1;
                }
            }
            report.merchants += 1;

            if (n + 1) % 100 == 0 {
                info!("Processed {}/{} merchants", n + 1, merchants.len());
            }
        }

        info!(
            merchants = report.merchants,
            snapshots = report.snapshots,
            failures = report.failures,
            "Snapshot run complete"
        );
        Ok(report)
    }

    async fn snapshot_merchant(
        &self,
        merchant: &EligibleMerchant,
        options: &SnapshotOptions,
    ) -> Result<usize> {
        let periods = billing_periods(merchant.signup_date.day(), options.today, options.months);

        for period in &periods {
            let days = self
                .ledger
                .daily_totals(&merchant.merchant_id, period.start, period.end)
                .await?;
            let snapshot = build_snapshot(&merchant.merchant_id, *period, &days);
            user_snapshot::upsert_snapshot(self.db.pool(), &snapshot).await?;
        }

        Ok(periods.len())
    }
}

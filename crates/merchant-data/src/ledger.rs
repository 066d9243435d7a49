//! Payment ledger: completed transactions and their aggregates.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::error::{Result, SourceError};
use crate::models::{DailyTotals, PeriodTotals, Transaction, WeeklyGtv};
use crate::queries;

/// Read-only access to completed payments. Date bounds are inclusive.
#[async_trait]
pub trait PaymentLedger: Send + Sync {
    /// Completed transactions, newest first.
    async fn transactions(
        &self,
        merchant_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Transaction>>;

    /// GTV and transaction count per week, newest week first.
    async fn weekly_gtv(&self, merchant_id: &str, from: NaiveDate, to: NaiveDate)
        -> Result<Vec<WeeklyGtv>>;

    /// Count and volume per day that had any completed payment, oldest first.
    async fn daily_totals(
        &self,
        merchant_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyTotals>>;

    /// Name of the merchant's current plan.
    async fn plan_name(&self, merchant_id: &str) -> Result<Option<String>>;

    /// Totals over the six months ending on `today`.
    async fn last_six_months(&self, merchant_id: &str, today: NaiveDate) -> Result<PeriodTotals>;
}

/// Payment ledger backed by the payments PostgreSQL database.
#[derive(Debug, Clone)]
pub struct PgPaymentLedger {
    pool: PgPool,
}

impl PgPaymentLedger {
    /// Connect with a small read-only pool.
    pub async fn connect(url: &str) -> Result<Self> {
        if url.trim().is_empty() {
            return Err(SourceError::Config("payment ledger URL is empty".into()));
        }
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect(url)
            .await?;
        info!("Connected to payment ledger");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentLedger for PgPaymentLedger {
    async fn transactions(
        &self,
        merchant_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, Transaction>(queries::SELECT_TRANSACTIONS)
            .bind(merchant_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn weekly_gtv(
        &self,
        merchant_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WeeklyGtv>> {
        let rows = sqlx::query_as::<_, WeeklyGtv>(queries::SELECT_WEEKLY_GTV)
            .bind(merchant_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn daily_totals(
        &self,
        merchant_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyTotals>> {
        let rows = sqlx::query_as::<_, DailyTotals>(queries::SELECT_DAILY_TOTALS)
            .bind(merchant_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn plan_name(&self, merchant_id: &str) -> Result<Option<String>> {
        let name = sqlx::query_scalar::<_, String>(queries::SELECT_PLAN_NAME)
            .bind(merchant_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(name)
    }

    async fn last_six_months(&self, merchant_id: &str, today: NaiveDate) -> Result<PeriodTotals> {
        let totals = sqlx::query_as::<_, PeriodTotals>(queries::SELECT_LAST_SIX_MONTHS)
            .bind(merchant_id)
            .bind(today)
            .fetch_one(&self.pool)
            .await?;
        Ok(totals)
    }
}

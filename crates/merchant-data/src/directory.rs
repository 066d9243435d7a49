//! Merchant directory: who the merchants are and how they trade.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::error::{Result, SourceError};
use crate::models::{EligibleMerchant, Merchant, MerchantBusinessType};
use crate::queries;

/// Read-only access to merchant records.
#[async_trait]
pub trait MerchantDirectory: Send + Sync {
    /// Look up one merchant.
    async fn merchant_by_id(&self, merchant_id: &str) -> Result<Option<Merchant>>;

    /// Look up several merchants. Unknown ids are skipped.
    async fn merchants_by_ids(&self, merchant_ids: &[String]) -> Result<Vec<Merchant>>;

    /// Non-internal merchants who signed up on `day` of a month.
    async fn merchants_by_signup_day(&self, day: u32) -> Result<Vec<MerchantBusinessType>>;

    /// Non-internal merchants whose billing month turns over on the first:
    /// those who signed up on the 29th, 30th, 31st or 1st.
    async fn merchants_for_first_of_month(&self) -> Result<Vec<MerchantBusinessType>>;

    /// Approved, non-internal merchants that get monthly snapshots.
    async fn eligible_merchants(&self) -> Result<Vec<EligibleMerchant>>;
}

/// Signup days handled on the first of the month.
pub const FIRST_OF_MONTH_SIGNUP_DAYS: [u32; 4] = [29, 30, 31, 1];

/// Merchant directory backed by the core PostgreSQL database.
#[derive(Debug, Clone)]
pub struct PgMerchantDirectory {
    pool: PgPool,
}

impl PgMerchantDirectory {
    /// Connect with a small read-only pool.
    pub async fn connect(url: &str) -> Result<Self> {
        if url.trim().is_empty() {
            return Err(SourceError::Config("merchant directory URL is empty".into()));
        }
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect(url)
            .await?;
        info!("Connected to merchant directory");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MerchantDirectory for PgMerchantDirectory {
    async fn merchant_by_id(&self, merchant_id: &str) -> Result<Option<Merchant>> {
        let merchant = sqlx::query_as::<_, Merchant>(queries::SELECT_MERCHANT_BY_ID)
            .bind(merchant_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(merchant)
    }

    async fn merchants_by_ids(&self, merchant_ids: &[String]) -> Result<Vec<Merchant>> {
        if merchant_ids.is_empty() {
            return Ok(Vec::new());
        }
        let merchants = sqlx::query_as::<_, Merchant>(queries::SELECT_MERCHANTS_BY_IDS)
            .bind(merchant_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(merchants)
    }

    async fn merchants_by_signup_day(&self, day: u32) -> Result<Vec<MerchantBusinessType>> {
        let day = i32::try_from(day)
            .map_err(|_| SourceError::Config(format!("signup day out of range: {}", day)))?;
        let rows = sqlx::query_as::<_, MerchantBusinessType>(queries::SELECT_MERCHANTS_BY_SIGNUP_DAY)
            .bind(day)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn merchants_for_first_of_month(&self) -> Result<Vec<MerchantBusinessType>> {
        let rows =
            sqlx::query_as::<_, MerchantBusinessType>(queries::SELECT_MERCHANTS_FOR_FIRST_OF_MONTH)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }

    async fn eligible_merchants(&self) -> Result<Vec<EligibleMerchant>> {
        let rows = sqlx::query_as::<_, EligibleMerchant>(queries::SELECT_ELIGIBLE_MERCHANTS)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

//! Rows read from the merchant directory and payment ledger.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A merchant as known to the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Merchant {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub signup_date: DateTime<Utc>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_type_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,
    /// Filled from the payment ledger, not the directory.
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_plan_name: Option<String>,
}

/// A merchant and the business type it trades under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MerchantBusinessType {
    pub merchant_id: String,
    pub business_type_id: String,
}

/// A merchant that takes part in monthly snapshots.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct EligibleMerchant {
    pub merchant_id: String,
    pub signup_date: DateTime<Utc>,
}

/// A completed payment.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub merchant_id: String,
    pub amount: f64,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Completed payments grouped by ISO week (weeks start on Monday).
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyGtv {
    pub week_start: NaiveDate,
    pub total_gtv: f64,
    pub transaction_count: i64,
}

/// Completed payments for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotals {
    pub day: NaiveDate,
    pub transaction_count: i64,
    pub transaction_volume: f64,
}

/// Totals over a period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTotals {
    pub transaction_count: i64,
    pub transaction_volume: f64,
}

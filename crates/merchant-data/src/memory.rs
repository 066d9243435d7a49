//! In-memory directory and ledger for tests and local runs without the
//! PostgreSQL sources.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate};

use crate::directory::{MerchantDirectory, FIRST_OF_MONTH_SIGNUP_DAYS};
use crate::error::{Result, SourceError};
use crate::ledger::PaymentLedger;
use crate::models::{
    DailyTotals, EligibleMerchant, Merchant, MerchantBusinessType, PeriodTotals, Transaction,
    WeeklyGtv,
};

#[derive(Debug, Clone)]
struct Entry {
    merchant: Merchant,
    internal: bool,
    approved: bool,
}

/// Merchant directory held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    entries: Arc<RwLock<Vec<Entry>>>,
    fail: bool,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory whose every query fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Add an approved, non-internal merchant.
    pub fn insert(&self, merchant: Merchant) {
        self.insert_with(merchant, false, true);
    }

    pub fn insert_with(&self, merchant: Merchant, internal: bool, approved: bool) {
        if let Ok(mut entries) = self.entries.write() {
            entries.push(Entry {
                merchant,
                internal,
                approved,
            });
        }
    }

    fn snapshot(&self) -> Result<Vec<Entry>> {
        if self.fail {
            return Err(SourceError::Config("merchant directory unavailable".into()));
        }
        self.entries
            .read()
            .map(|entries| entries.clone())
            .map_err(|_| SourceError::Config("merchant directory lock poisoned".into()))
    }

    fn by_signup_days(&self, days: &[u32]) -> Result<Vec<MerchantBusinessType>> {
        Ok(self
            .snapshot()?
            .into_iter()
            .filter(|e| !e.internal && days.contains(&e.merchant.signup_date.day()))
            .filter_map(|e| {
                Some(MerchantBusinessType {
                    business_type_id: e.merchant.business_type_id?,
                    merchant_id: e.merchant.id,
                })
            })
            .collect())
    }
}

#[async_trait]
impl MerchantDirectory for MemoryDirectory {
    async fn merchant_by_id(&self, merchant_id: &str) -> Result<Option<Merchant>> {
        Ok(self
            .snapshot()?
            .into_iter()
            .map(|e| e.merchant)
            .find(|m| m.id == merchant_id))
    }

    async fn merchants_by_ids(&self, merchant_ids: &[String]) -> Result<Vec<Merchant>> {
        Ok(self
            .snapshot()?
            .into_iter()
            .map(|e| e.merchant)
            .filter(|m| merchant_ids.contains(&m.id))
            .collect())
    }

    async fn merchants_by_signup_day(&self, day: u32) -> Result<Vec<MerchantBusinessType>> {
        self.by_signup_days(&[day])
    }

    async fn merchants_for_first_of_month(&self) -> Result<Vec<MerchantBusinessType>> {
        self.by_signup_days(&FIRST_OF_MONTH_SIGNUP_DAYS)
    }

    async fn eligible_merchants(&self) -> Result<Vec<EligibleMerchant>> {
        Ok(self
            .snapshot()?
            .into_iter()
            .filter(|e| !e.internal && e.approved)
            .map(|e| EligibleMerchant {
                merchant_id: e.merchant.id,
                signup_date: e.merchant.signup_date,
            })
            .collect())
    }
}

/// Payment ledger held in memory. Every stored transaction counts as
/// completed.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    transactions: Arc<RwLock<Vec<Transaction>>>,
    plans: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, transaction: Transaction) {
        if let Ok(mut transactions) = self.transactions.write() {
            transactions.push(transaction);
        }
    }

    pub fn set_plan(&self, merchant_id: impl Into<String>, plan: impl Into<String>) {
        if let Ok(mut plans) = self.plans.write() {
            plans.insert(merchant_id.into(), plan.into());
        }
    }

    fn matching(&self, merchant_id: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<Transaction>> {
        let transactions = self
            .transactions
            .read()
            .map_err(|_| SourceError::Config("payment ledger lock poisoned".into()))?;
        Ok(transactions
            .iter()
            .filter(|t| t.merchant_id == merchant_id)
            .filter(|t| {
                let day = t.created_at.date_naive();
                day >= from && day <= to
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PaymentLedger for MemoryLedger {
    async fn transactions(
        &self,
        merchant_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        let mut rows = self.matching(merchant_id, from, to)?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn weekly_gtv(
        &self,
        merchant_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<WeeklyGtv>> {
        let mut weeks: Vec<WeeklyGtv> = Vec::new();
        for t in self.matching(merchant_id, from, to)? {
            let day = t.created_at.date_naive();
            let week_start = day - Duration::days(i64::from(day.weekday().num_days_from_monday()));
            match weeks.iter_mut().find(|w| w.week_start == week_start) {
                Some(week) => {
                    week.total_gtv += t.amount;
                    week.transaction_count += 1;
                }
                None => weeks.push(WeeklyGtv {
                    week_start,
                    total_gtv: t.amount,
                    transaction_count: 1,
                }),
            }
        }
        weeks.sort_by(|a, b| b.week_start.cmp(&a.week_start));
        Ok(weeks)
    }

    async fn daily_totals(
        &self,
        merchant_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DailyTotals>> {
        let mut days: Vec<DailyTotals> = Vec::new();
        for t in self.matching(merchant_id, from, to)? {
            let day = t.created_at.date_naive();
            match days.iter_mut().find(|d| d.day == day) {
                Some(totals) => {
                    totals.transaction_count += 1;
                    totals.transaction_volume += t.amount;
                }
                None => days.push(DailyTotals {
                    day,
                    transaction_count: 1,
                    transaction_volume: t.amount,
                }),
            }
        }
        days.sort_by_key(|d| d.day);
        Ok(days)
    }

    async fn plan_name(&self, merchant_id: &str) -> Result<Option<String>> {
        let plans = self
            .plans
            .read()
            .map_err(|_| SourceError::Config("payment ledger lock poisoned".into()))?;
        Ok(plans.get(merchant_id).cloned())
    }

    async fn last_six_months(&self, merchant_id: &str, today: NaiveDate) -> Result<PeriodTotals> {
        let from = today
            .checked_sub_months(chrono::Months::new(6))
            .map(|d| d + Duration::days(1))
            .unwrap_or(NaiveDate::MIN);
        let rows = self.matching(merchant_id, from, today)?;
        Ok(PeriodTotals {
            transaction_count: rows.len() as i64,
            transaction_volume: rows.iter().map(|t| t.amount).sum(),
        })
    }
}

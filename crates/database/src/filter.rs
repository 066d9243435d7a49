//! Filter, sort and pagination building blocks for alert and call log search.
//!
//! Every supplied criterion becomes one conjunctive condition; absent criteria
//! impose nothing. Results are ordered newest first with insertion order as the
//! tie-breaker, which keeps page boundaries stable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite};

use crate::models::{AlertStatus, AlertType, CallStatus, Severity};
use crate::timestamp;
use crate::validation::ValidationError;

/// Page number used when none is supplied.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when none is supplied.
pub const DEFAULT_LIMIT: i64 = 10;

/// Inclusive `created_at` bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Build a range, swapping the bounds when `from` is after `to`.
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        match (from, to) {
            (Some(f), Some(t)) if f > t => Self {
                from: Some(t),
                to: Some(f),
            },
            _ => Self { from, to },
        }
    }

    pub fn from(&self) -> Option<DateTime<Utc>> {
        self.from
    }

    pub fn to(&self) -> Option<DateTime<Utc>> {
        self.to
    }

    fn push_conditions(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        if let Some(from) = self.from {
            qb.push(" AND created_at >= ").push_bind(timestamp::encode(&from));
        }
        if let Some(to) = self.to {
            qb.push(" AND created_at <= ").push_bind(timestamp::encode(&to));
        }
    }
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: i64,
    limit: i64,
}

impl Pagination {
    /// Validate a page request. Both values must be at least 1.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Result<Self, ValidationError> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);

        if page < 1 {
            return Err(ValidationError::TooSmall {
                field: "page",
                min: 1,
                actual: page,
            });
        }
        if limit < 1 {
            return Err(ValidationError::TooSmall {
                field: "limit",
                min: 1,
                actual: limit,
            });
        }

        Ok(Self { page, limit })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Number of records skipped before this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    fn push_window(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" LIMIT ")
            .push_bind(self.limit)
            .push(" OFFSET ")
            .push_bind(self.offset());
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Pagination metadata returned with every search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageInfo {
    pub fn new(pagination: Pagination, total: i64) -> Self {
        let Pagination { page, limit } = pagination;
        Self {
            page,
            limit,
            total,
            total_pages: total.saturating_add(limit - 1) / limit,
            has_next: page.saturating_mul(limit) < total,
            has_prev: page > 1,
        }
    }
}

/// Alert search criteria.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub severity: Option<Severity>,
    pub alert_type: Option<AlertType>,
    pub assigned_to_user: Option<String>,
    pub status: Option<AlertStatus>,
    pub merchant_id: Option<String>,
    pub created: DateRange,
}

impl AlertFilter {
    /// Append the WHERE clause for this filter.
    ///
    /// With `with_severity` false the severity criterion is left out, which is
    /// what the per-severity histogram is computed over.
    pub(crate) fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>, with_severity: bool) {
        qb.push(" WHERE 1 = 1");

        if with_severity {
            if let Some(severity) = self.severity {
                qb.push(" AND severity = ").push_bind(severity);
            }
        }
        if let Some(alert_type) = self.alert_type {
            qb.push(" AND alert_type = ").push_bind(alert_type);
        }
        if let Some(user) = &self.assigned_to_user {
            qb.push(" AND assigned_to_user = ").push_bind(user.clone());
        }
        if let Some(status) = self.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(merchant_id) = &self.merchant_id {
            qb.push(" AND merchant_id = ").push_bind(merchant_id.clone());
        }
        self.created.push_conditions(qb);
    }
}

/// Call log search criteria.
#[derive(Debug, Clone, Default)]
pub struct CallLogFilter {
    pub called_by: Option<String>,
    pub call_status: Option<CallStatus>,
    pub created: DateRange,
}

impl CallLogFilter {
    pub(crate) fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" WHERE 1 = 1");

        if let Some(called_by) = &self.called_by {
            qb.push(" AND called_by = ").push_bind(called_by.clone());
        }
        if let Some(call_status) = self.call_status {
            qb.push(" AND call_status = ").push_bind(call_status);
        }
        self.created.push_conditions(qb);
    }
}

/// Append the newest-first ordering and the page window.
pub(crate) fn push_page(qb: &mut QueryBuilder<'_, Sqlite>, pagination: &Pagination) {
    qb.push(" ORDER BY created_at DESC, rowid DESC");
    pagination.push_window(qb);
}

/// Alert counts per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityStats {
    #[serde(rename = "Low")]
    pub low: i64,
    #[serde(rename = "Medium")]
    pub medium: i64,
    #[serde(rename = "High")]
    pub high: i64,
    #[serde(rename = "Critical")]
    pub critical: i64,
}

impl SeverityStats {
    /// Build from grouped `(severity, count)` rows; missing severities count 0.
    pub fn from_counts(rows: impl IntoIterator<Item = (Severity, i64)>) -> Self {
        let mut stats = Self::default();
        for (severity, count) in rows {
            *stats.slot(severity) += count;
        }
        stats
    }

    pub fn get(&self, severity: Severity) -> i64 {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
            Severity::Critical => self.critical,
        }
    }

    /// Sum over all buckets.
    pub fn total(&self) -> i64 {
        self.low + self.medium + self.high + self.critical
    }

    fn slot(&mut self, severity: Severity) -> &mut i64 {
        match severity {
            Severity::Low => &mut self.low,
            Severity::Medium => &mut self.medium,
            Severity::High => &mut self.high,
            Severity::Critical => &mut self.critical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_date_range_swaps_inverted_bounds() {
        let early = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();

        let range = DateRange::new(Some(late), Some(early));
        assert_eq!(range.from(), Some(early));
        assert_eq!(range.to(), Some(late));
        assert_eq!(range, DateRange::new(Some(early), Some(late)));

        // A single bound is never moved.
        let open = DateRange::new(Some(late), None);
        assert_eq!(open.from(), Some(late));
        assert_eq!(open.to(), None);
    }

    #[test]
    fn test_pagination_defaults_and_bounds() {
        let p = Pagination::new(None, None).unwrap();
        assert_eq!((p.page(), p.limit(), p.offset()), (1, 10, 0));

        let p = Pagination::new(Some(3), Some(25)).unwrap();
        assert_eq!(p.offset(), 50);

        assert_eq!(
            Pagination::new(Some(0), None),
            Err(ValidationError::TooSmall {
                field: "page",
                min: 1,
                actual: 0
            })
        );
        assert!(Pagination::new(None, Some(-5)).is_err());
    }

    #[test]
    fn test_page_info() {
        let info = PageInfo::new(Pagination::new(Some(1), Some(10)).unwrap(), 25);
        assert_eq!(info.total_pages, 3);
        assert!(info.has_next);
        assert!(!info.has_prev);

        let info = PageInfo::new(Pagination::new(Some(3), Some(10)).unwrap(), 25);
        assert!(!info.has_next);
        assert!(info.has_prev);

        let info = PageInfo::new(Pagination::new(Some(2), Some(5)).unwrap(), 10);
        assert_eq!(info.total_pages, 2);
        assert!(!info.has_next);

        let empty = PageInfo::new(Pagination::default(), 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
    }

    #[test]
    fn test_page_info_json_shape() {
        let info = PageInfo::new(Pagination::default(), 11);
        let json = serde_json::to_value(info).unwrap();
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["hasNext"], true);
        assert_eq!(json["hasPrev"], false);
    }

    #[test]
    fn test_severity_stats_fill_missing_buckets() {
        let stats = SeverityStats::from_counts([(Severity::High, 2), (Severity::Low, 1)]);
        assert_eq!(stats.get(Severity::High), 2);
        assert_eq!(stats.get(Severity::Critical), 0);
        assert_eq!(stats.total(), 3);
        assert_eq!(
            serde_json::to_value(stats).unwrap(),
            serde_json::json!({"Low": 1, "Medium": 0, "High": 2, "Critical": 0})
        );
    }

    #[test]
    fn test_alert_filter_sql() {
        let filter = AlertFilter {
            severity: Some(Severity::High),
            status: Some(AlertStatus::Open),
            ..Default::default()
        };

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM alerts");
        filter.push_where(&mut qb, true);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM alerts WHERE 1 = 1 AND severity = ? AND status = ?"
        );

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM alerts");
        filter.push_where(&mut qb, false);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM alerts WHERE 1 = 1 AND status = ?"
        );
    }
}

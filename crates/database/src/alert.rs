//! Alert persistence and lifecycle writes.
//!
//! Operations that touch more than one row run inside a single transaction:
//! resolving an alert together with its call log, appending an assignment
//! comment, and deleting an alert along with its call logs.

use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::call_log;
use crate::error::{DatabaseError, Result};
use crate::filter::{self, AlertFilter, Pagination, SeverityStats};
use crate::models::{
    Alert, AlertComment, AlertStatus, CallLog, NewAlert, NewCallLog, Severity, StatusChange,
};
use crate::timestamp;

const ALERT_COLUMNS: &str = "id, severity, merchant_id, alert_type, assigned_to_user, summary, \
     status, follow_up_date, follow_up_reason, comments, created_at, updated_at";

/// One page of alerts plus the aggregates computed over the whole match set.
#[derive(Debug, Clone)]
pub struct AlertSearch {
    pub alerts: Vec<Alert>,
    /// Count of all alerts matching the filter, before pagination.
    pub total: i64,
    /// Per-severity counts under every criterion except severity.
    pub stats: SeverityStats,
}

/// Record a new alert. Status always starts as [`AlertStatus::Open`].
pub async fn create_alert(pool: &SqlitePool, new: NewAlert) -> Result<Alert> {
    let now = timestamp::now();
    let alert = Alert {
        id: Uuid::new_v4().to_string(),
        severity: new.severity,
        merchant_id: new.merchant_id,
        alert_type: new.alert_type,
        assigned_to_user: new.assigned_to_user,
        summary: new.summary.map(Json),
        status: AlertStatus::Open,
        follow_up_date: None,
        follow_up_reason: new.follow_up_reason,
        comments: Json(new.comment.into_iter().collect()),
        created_at: now,
        updated_at: now,
    };

    insert_alert(pool, &alert).await?;
    info!(alert_id = %alert.id, merchant_id = %alert.merchant_id, severity = %alert.severity, "Alert created");

    Ok(alert)
}

/// Insert a fully-formed alert row.
pub async fn insert_alert<'e>(executor: impl SqliteExecutor<'e>, alert: &Alert) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO alerts (
            id, severity, merchant_id, alert_type, assigned_to_user, summary,
            status, follow_up_date, follow_up_reason, comments, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&alert.id)
    .bind(alert.severity)
    .bind(&alert.merchant_id)
    .bind(alert.alert_type)
    .bind(&alert.assigned_to_user)
    .bind(&alert.summary)
    .bind(alert.status)
    .bind(alert.follow_up_date)
    .bind(&alert.follow_up_reason)
    .bind(&alert.comments)
    .bind(timestamp::encode(&alert.created_at))
    .bind(timestamp::encode(&alert.updated_at))
    .execute(executor)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Alert",
                    id: alert.id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(())
}

/// Look up an alert, returning `None` when it does not exist.
pub async fn find_alert<'e>(executor: impl SqliteExecutor<'e>, id: &str) -> Result<Option<Alert>> {
    let alert = sqlx::query_as::<_, Alert>(&format!(
        "SELECT {} FROM alerts WHERE id = ?",
        ALERT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(alert)
}

/// Get an alert by ID.
pub async fn get_alert<'e>(executor: impl SqliteExecutor<'e>, id: &str) -> Result<Alert> {
    find_alert(executor, id)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Alert", id))
}

/// Apply a status transition and, when given, record the accompanying call
/// in the same transaction.
///
/// Either both writes land or neither does.
pub async fn change_status(
    pool: &SqlitePool,
    id: &str,
    change: StatusChange,
    call: Option<NewCallLog>,
) -> Result<(Alert, Option<CallLog>)> {
    let mut tx = crate::begin_write(pool).await?;

    let mut alert = get_alert(&mut *tx, id).await?;
    alert.status = change.status;
    if let Some(reason) = change.follow_up_reason {
        alert.follow_up_reason = Some(reason);
    }
    if let Some(date) = change.follow_up_date {
        alert.follow_up_date = Some(date);
    }
    alert.updated_at = timestamp::now();
    write_mutable_fields(&mut tx, &alert).await?;

    let call_log = match call {
        Some(new) => Some(call_log::insert_new(&mut tx, id, new).await?),
        None => None,
    };

    tx.commit().await?;

    info!(
        alert_id = %id,
        status = %alert.status,
        call_log_id = call_log.as_ref().map(|c| c.id.as_str()).unwrap_or("-"),
        "Alert status changed"
    );

    Ok((alert, call_log))
}

/// Reassign an alert and/or append a comment.
///
/// `assigned_to_user` overwrites the owner when present. `comment` is added
/// after the existing comments; earlier entries are never replaced.
pub async fn update_assignment(
    pool: &SqlitePool,
    id: &str,
    assigned_to_user: Option<String>,
    comment: Option<AlertComment>,
) -> Result<Alert> {
    let mut tx = crate::begin_write(pool).await?;

    let mut alert = get_alert(&mut *tx, id).await?;
    if let Some(user) = assigned_to_user {
        alert.assigned_to_user = Some(user);
    }
    if let Some(comment) = comment {
        alert.comments = Json(appended(&alert.comments, comment));
    }
    alert.updated_at = timestamp::now();
    write_mutable_fields(&mut tx, &alert).await?;

    tx.commit().await?;

    info!(
        alert_id = %id,
        assigned_to_user = alert.assigned_to_user.as_deref().unwrap_or("-"),
        comments = alert.comments.len(),
        "Alert assignment updated"
    );

    Ok(alert)
}

/// Delete an alert and every call log that references it.
///
/// Returns the number of call logs removed with the alert.
pub async fn delete_alert(pool: &SqlitePool, id: &str) -> Result<u64> {
    let mut tx = crate::begin_write(pool).await?;

    if find_alert(&mut *tx, id).await?.is_none() {
        return Err(DatabaseError::not_found("Alert", id));
    }

    let call_logs = call_log::delete_for_alert(&mut *tx, id).await?;

    let result = sqlx::query(
        r#"
        DELETE FROM alerts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Alert", id));
    }

    tx.commit().await?;
    info!(alert_id = %id, call_logs, "Alert deleted");

    Ok(call_logs)
}

/// Run a filtered, paginated alert search.
///
/// The page, total and severity histogram are read in one transaction so
/// they describe the same snapshot.
pub async fn search_alerts(
    pool: &SqlitePool,
    filter: &AlertFilter,
    pagination: &Pagination,
) -> Result<AlertSearch> {
    let mut tx = pool.begin().await?;

    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM alerts", ALERT_COLUMNS));
    filter.push_where(&mut qb, true);
    filter::push_page(&mut qb, pagination);
    debug!(sql = qb.sql(), "Searching alerts");
    let alerts = qb.build_query_as::<Alert>().fetch_all(&mut *tx).await?;

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM alerts");
    filter.push_where(&mut qb, true);
    let total = qb.build_query_scalar::<i64>().fetch_one(&mut *tx).await?;

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT severity, COUNT(*) FROM alerts");
    filter.push_where(&mut qb, false);
    qb.push(" GROUP BY severity");
    let counts = qb
        .build_query_as::<(Severity, i64)>()
        .fetch_all(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(AlertSearch {
        alerts,
        total,
        stats: SeverityStats::from_counts(counts),
    })
}

async fn write_mutable_fields(conn: &mut SqliteConnection, alert: &Alert) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE alerts
        SET status = ?, follow_up_reason = ?, follow_up_date = ?,
            assigned_to_user = ?, comments = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(alert.status)
    .bind(&alert.follow_up_reason)
    .bind(alert.follow_up_date)
    .bind(&alert.assigned_to_user)
    .bind(&alert.comments)
    .bind(timestamp::encode(&alert.updated_at))
    .bind(&alert.id)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Alert", alert.id.as_str()));
    }

    Ok(())
}

fn appended(existing: &[AlertComment], comment: AlertComment) -> Vec<AlertComment> {
    existing.iter().cloned().chain(std::iter::once(comment)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::DateRange;
    use crate::models::{AlertType, CallStatus};
    use crate::test_support::test_db;
    use chrono::{Duration, NaiveDate};

    fn new_alert(severity: Severity, merchant_id: &str, alert_type: AlertType) -> NewAlert {
        NewAlert {
            severity,
            merchant_id: merchant_id.to_string(),
            alert_type,
            assigned_to_user: None,
            summary: None,
            follow_up_reason: None,
            comment: None,
        }
    }

    fn new_call(alert_id: &str, called_by: &str) -> NewCallLog {
        NewCallLog {
            alert_id: alert_id.to_string(),
            called_by: called_by.to_string(),
            call_status: CallStatus::ReEngaged,
            call_id: None,
            summary: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_alert() {
        let db = test_db().await;

        let created = create_alert(
            db.pool(),
            NewAlert {
                summary: Some(serde_json::json!({"previousGtv": 50000, "currentGtv": 15000})),
                comment: Some(AlertComment {
                    from_user: "ops".to_string(),
                    to_user: None,
                    comment: "GTV fell 70%".to_string(),
                }),
                ..new_alert(Severity::Critical, "M1", AlertType::GtvDrop)
            },
        )
        .await
        .unwrap();

        assert_eq!(created.status, AlertStatus::Open);
        assert_eq!(created.comments.len(), 1);

        let fetched = get_alert(db.pool(), &created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(
            fetched.summary.as_ref().map(|s| s.0["currentGtv"].clone()),
            Some(serde_json::json!(15000))
        );
    }

    #[tokio::test]
    async fn test_get_missing_alert() {
        let db = test_db().await;
        let result = get_alert(db.pool(), "550e8400-e29b-41d4-a716-446655440099").await;
        assert!(matches!(result, Err(DatabaseError::NotFound { entity: "Alert", .. })));
    }

    #[tokio::test]
    async fn test_change_status_with_call_log() {
        let db = test_db().await;
        let alert = create_alert(db.pool(), new_alert(Severity::High, "M1", AlertType::TcDrop))
            .await
            .unwrap();

        let follow_up = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        let (updated, call) = change_status(
            db.pool(),
            &alert.id,
            StatusChange {
                status: AlertStatus::Resolved,
                follow_up_reason: Some("merchant re-engaged".to_string()),
                follow_up_date: Some(follow_up),
            },
            Some(new_call(&alert.id, "jane")),
        )
        .await
        .unwrap();

        assert_eq!(updated.status, AlertStatus::Resolved);
        assert_eq!(updated.follow_up_date, Some(follow_up));
        let call = call.unwrap();
        assert_eq!(call.alert_id, alert.id);

        let stored = get_alert(db.pool(), &alert.id).await.unwrap();
        assert_eq!(stored.status, AlertStatus::Resolved);
        assert_eq!(stored.follow_up_reason.as_deref(), Some("merchant re-engaged"));

        let calls = call_log::list_for_alert(db.pool(), &alert.id).await.unwrap();
        assert_eq!(calls, vec![call]);
    }

    #[tokio::test]
    async fn test_change_status_missing_alert_writes_nothing() {
        let db = test_db().await;
        let result = change_status(
            db.pool(),
            "missing",
            StatusChange {
                status: AlertStatus::Resolved,
                follow_up_reason: None,
                follow_up_date: None,
            },
            Some(new_call("missing", "jane")),
        )
        .await;

        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM call_logs")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_assignment_comments_append_in_order() {
        let db = test_db().await;
        let alert = create_alert(db.pool(), new_alert(Severity::Low, "M2", AlertType::GtvDrop))
            .await
            .unwrap();
        assert!(alert.comments.is_empty());

        let first = AlertComment {
            from_user: "ana".to_string(),
            to_user: Some("ben".to_string()),
            comment: "please call".to_string(),
        };
        let second = AlertComment {
            from_user: "ben".to_string(),
            to_user: Some("ana".to_string()),
            comment: "done".to_string(),
        };

        update_assignment(db.pool(), &alert.id, Some("ben".to_string()), Some(first.clone()))
            .await
            .unwrap();
        let updated = update_assignment(db.pool(), &alert.id, None, Some(second.clone()))
            .await
            .unwrap();

        assert_eq!(updated.assigned_to_user.as_deref(), Some("ben"));
        assert_eq!(updated.comments.0, vec![first, second]);
    }

    #[tokio::test]
    async fn test_delete_alert_cascades_to_call_logs() {
        let db = test_db().await;
        let alert = create_alert(db.pool(), new_alert(Severity::Medium, "M3", AlertType::TcDrop))
            .await
            .unwrap();
        let other = create_alert(db.pool(), new_alert(Severity::Medium, "M4", AlertType::TcDrop))
            .await
            .unwrap();

        call_log::create_call_log(db.pool(), new_call(&alert.id, "a")).await.unwrap();
        call_log::create_call_log(db.pool(), new_call(&alert.id, "b")).await.unwrap();
        call_log::create_call_log(db.pool(), new_call(&other.id, "c")).await.unwrap();

        let removed = delete_alert(db.pool(), &alert.id).await.unwrap();
        assert_eq!(removed, 2);

        assert!(find_alert(db.pool(), &alert.id).await.unwrap().is_none());
        assert!(call_log::list_for_alert(db.pool(), &alert.id)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            call_log::list_for_alert(db.pool(), &other.id).await.unwrap().len(),
            1
        );

        let again = delete_alert(db.pool(), &alert.id).await;
        assert!(matches!(again, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_search_filters_order_and_stats() {
        let db = test_db().await;
        let specs = [
            (Severity::High, "M1", AlertType::TcDrop),
            (Severity::High, "M2", AlertType::GtvDrop),
            (Severity::Low, "M1", AlertType::TcDrop),
            (Severity::Critical, "M3", AlertType::GtvDrop),
        ];
        let mut ids = Vec::new();
        for (severity, merchant, alert_type) in specs {
            ids.push(
                create_alert(db.pool(), new_alert(severity, merchant, alert_type))
                    .await
                    .unwrap()
                    .id,
            );
        }

        let all = search_alerts(db.pool(), &AlertFilter::default(), &Pagination::default())
            .await
            .unwrap();
        assert_eq!(all.total, 4);
        assert_eq!(all.stats.total(), 4);
        // Newest first.
        let listed: Vec<_> = all.alerts.iter().map(|a| a.id.clone()).collect();
        let mut expected = ids.clone();
        expected.reverse();
        assert_eq!(listed, expected);

        let high = AlertFilter {
            severity: Some(Severity::High),
            ..Default::default()
        };
        let result = search_alerts(db.pool(), &high, &Pagination::default())
            .await
            .unwrap();
        assert_eq!(result.total, 2);
        assert!(result.alerts.iter().all(|a| a.severity == Severity::High));
        // The histogram ignores the severity criterion.
        assert_eq!(result.stats.total(), 4);
        assert_eq!(result.stats.get(Severity::Low), 1);
        assert_eq!(result.stats.get(Severity::Medium), 0);

        let m1_tc = AlertFilter {
            merchant_id: Some("M1".to_string()),
            alert_type: Some(AlertType::TcDrop),
            ..Default::default()
        };
        let result = search_alerts(db.pool(), &m1_tc, &Pagination::default())
            .await
            .unwrap();
        assert_eq!(result.total, 2);
        assert_eq!(result.stats.get(Severity::High), 1);
        assert_eq!(result.stats.get(Severity::Low), 1);
        assert_eq!(result.stats.get(Severity::Critical), 0);
    }

    #[tokio::test]
    async fn test_search_pagination_window() {
        let db = test_db().await;
        for i in 0..7 {
            create_alert(
                db.pool(),
                new_alert(Severity::Medium, &format!("M{}", i), AlertType::GtvDrop),
            )
            .await
            .unwrap();
        }

        let page = |p, l| Pagination::new(Some(p), Some(l)).unwrap();
        let first = search_alerts(db.pool(), &AlertFilter::default(), &page(1, 3))
            .await
            .unwrap();
        let third = search_alerts(db.pool(), &AlertFilter::default(), &page(3, 3))
            .await
            .unwrap();
        let beyond = search_alerts(db.pool(), &AlertFilter::default(), &page(9, 3))
            .await
            .unwrap();

        assert_eq!(first.alerts.len(), 3);
        assert_eq!(third.alerts.len(), 1);
        assert!(beyond.alerts.is_empty());
        assert_eq!(beyond.total, 7);
        assert_eq!(first.alerts[0].merchant_id, "M6");
        assert_eq!(third.alerts[0].merchant_id, "M0");
    }

    #[tokio::test]
    async fn test_search_date_range_is_inclusive() {
        let db = test_db().await;
        let alert = create_alert(db.pool(), new_alert(Severity::High, "M1", AlertType::TcDrop))
            .await
            .unwrap();

        let exact = AlertFilter {
            created: DateRange::new(Some(alert.created_at), Some(alert.created_at)),
            ..Default::default()
        };
        let result = search_alerts(db.pool(), &exact, &Pagination::default())
            .await
            .unwrap();
        assert_eq!(result.total, 1);

        let later = AlertFilter {
            created: DateRange::new(Some(alert.created_at + Duration::seconds(1)), None),
            ..Default::default()
        };
        let result = search_alerts(db.pool(), &later, &Pagination::default())
            .await
            .unwrap();
        assert_eq!(result.total, 0);
        assert_eq!(result.stats.total(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_on_file_database() {
        let (db, path) = crate::test_support::file_db().await;
        let alert = create_alert(db.pool(), new_alert(Severity::Medium, "M9", AlertType::TcDrop))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let pool = db.pool().clone();
            let id = alert.id.clone();
            handles.push(tokio::spawn(async move {
                let comment = AlertComment {
                    from_user: format!("agent-{}", i),
                    to_user: None,
                    comment: format!("note {}", i),
                };
                update_assignment(&pool, &id, None, Some(comment)).await
            }));
        }
        let mut calls = Vec::new();
        for i in 0..8 {
            let pool = db.pool().clone();
            let id = alert.id.clone();
            calls.push(tokio::spawn(async move {
                call_log::create_call_log(&pool, new_call(&id, &format!("caller-{}", i))).await
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        for handle in calls {
            handle.await.unwrap().unwrap();
        }

        let stored = get_alert(db.pool(), &alert.id).await.unwrap();
        assert_eq!(stored.comments.len(), 16);
        let calls = call_log::list_for_alert(db.pool(), &alert.id).await.unwrap();
        assert_eq!(calls.len(), 8);

        crate::test_support::remove_file_db(db, path).await;
    }
}

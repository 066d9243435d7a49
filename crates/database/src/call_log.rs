//! Call log persistence.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::alert;
use crate::error::{DatabaseError, Result};
use crate::filter::{self, CallLogFilter, Pagination};
use crate::models::{CallLog, CallLogChanges, NewCallLog};
use crate::timestamp;

const CALL_LOG_COLUMNS: &str =
    "id, alert_id, call_id, called_by, call_status, summary, created_at";

/// Record a call against an existing alert.
pub async fn create_call_log(pool: &SqlitePool, new: NewCallLog) -> Result<CallLog> {
    let mut tx = crate::begin_write(pool).await?;
    let alert_id = new.alert_id.clone();
    let call_log = insert_new(&mut tx, &alert_id, new).await?;
    tx.commit().await?;

    info!(call_log_id = %call_log.id, alert_id = %call_log.alert_id, "Call log created");
    Ok(call_log)
}

/// Insert a call log for `alert_id` on an open connection or transaction.
///
/// Fails with `NotFound` when the alert does not exist.
pub async fn insert_new(
    conn: &mut SqliteConnection,
    alert_id: &str,
    new: NewCallLog,
) -> Result<CallLog> {
    if alert::find_alert(&mut *conn, alert_id).await?.is_none() {
        return Err(DatabaseError::not_found("Alert", alert_id));
    }

    let call_log = CallLog {
        id: Uuid::new_v4().to_string(),
        alert_id: alert_id.to_string(),
        call_id: new.call_id,
        called_by: new.called_by,
        call_status: new.call_status,
        summary: new.summary,
        created_at: timestamp::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO call_logs (id, alert_id, call_id, called_by, call_status, summary, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&call_log.id)
    .bind(&call_log.alert_id)
    .bind(&call_log.call_id)
    .bind(&call_log.called_by)
    .bind(call_log.call_status)
    .bind(&call_log.summary)
    .bind(timestamp::encode(&call_log.created_at))
    .execute(&mut *conn)
    .await?;

    Ok(call_log)
}

/// Get a call log by ID.
pub async fn get_call_log<'e>(executor: impl SqliteExecutor<'e>, id: &str) -> Result<CallLog> {
    sqlx::query_as::<_, CallLog>(&format!(
        "SELECT {} FROM call_logs WHERE id = ?",
        CALL_LOG_COLUMNS
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| DatabaseError::not_found("Call log", id))
}

/// All call logs for an alert, newest first.
pub async fn list_for_alert<'e>(
    executor: impl SqliteExecutor<'e>,
    alert_id: &str,
) -> Result<Vec<CallLog>> {
    let rows = sqlx::query_as::<_, CallLog>(&format!(
        "SELECT {} FROM call_logs WHERE alert_id = ? ORDER BY created_at DESC, rowid DESC",
        CALL_LOG_COLUMNS
    ))
    .bind(alert_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// Apply a partial update. Only the supplied fields change.
pub async fn update_call_log(
    pool: &SqlitePool,
    id: &str,
    changes: CallLogChanges,
) -> Result<CallLog> {
    let mut tx = crate::begin_write(pool).await?;

    let mut call_log = get_call_log(&mut *tx, id).await?;
    if let Some(called_by) = changes.called_by {
        call_log.called_by = called_by;
    }
    if let Some(call_status) = changes.call_status {
        call_log.call_status = call_status;
    }
    if let Some(call_id) = changes.call_id {
        call_log.call_id = call_id;
    }
    if let Some(summary) = changes.summary {
        call_log.summary = summary;
    }

    sqlx::query(
        r#"
        UPDATE call_logs
        SET called_by = ?, call_status = ?, call_id = ?, summary = ?
        WHERE id = ?
        "#,
    )
    .bind(&call_log.called_by)
    .bind(call_log.call_status)
    .bind(&call_log.call_id)
    .bind(&call_log.summary)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    info!(call_log_id = %id, call_status = %call_log.call_status, "Call log updated");

    Ok(call_log)
}

/// Delete a call log by ID.
pub async fn delete_call_log(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM call_logs
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Call log", id));
    }

    info!(call_log_id = %id, "Call log deleted");
    Ok(())
}

/// Delete every call log belonging to an alert.
pub async fn delete_for_alert<'e>(executor: impl SqliteExecutor<'e>, alert_id: &str) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM call_logs
        WHERE alert_id = ?
        "#,
    )
    .bind(alert_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Run a filtered, paginated call log search. Returns the page and the total
/// match count.
pub async fn search_call_logs(
    pool: &SqlitePool,
    filter: &CallLogFilter,
    pagination: &Pagination,
) -> Result<(Vec<CallLog>, i64)> {
    let mut tx = pool.begin().await?;

    let mut qb =
        QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM call_logs", CALL_LOG_COLUMNS));
    filter.push_where(&mut qb);
    filter::push_page(&mut qb, pagination);
    debug!(sql = qb.sql(), "Searching call logs");
    let rows = qb.build_query_as::<CallLog>().fetch_all(&mut *tx).await?;

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM call_logs");
    filter.push_where(&mut qb);
    let total = qb.build_query_scalar::<i64>().fetch_one(&mut *tx).await?;

    tx.commit().await?;

    Ok((rows, total))
}

//! Monthly per-merchant transaction snapshots.

use chrono::NaiveDate;
use sqlx::types::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{NewUserSnapshot, UserSnapshot};
use crate::timestamp;

const SNAPSHOT_COLUMNS: &str = "id, business_id, user_id, store_id, month_start, month_end, \
     meta_data, transaction_count, transaction_volume, created_at, updated_at";

/// Store a snapshot, replacing the figures of an existing snapshot for the
/// same business and month.
pub async fn upsert_snapshot(pool: &SqlitePool, snapshot: &NewUserSnapshot) -> Result<UserSnapshot> {
    let now = timestamp::encode(&timestamp::now());

    let stored = sqlx::query_as::<_, UserSnapshot>(&format!(
        r#"
        INSERT INTO user_snapshots (
            id, business_id, user_id, store_id, month_start, month_end,
            meta_data, transaction_count, transaction_volume, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (business_id, month_start) DO UPDATE SET
            month_end = excluded.month_end,
            meta_data = excluded.meta_data,
            transaction_count = excluded.transaction_count,
            transaction_volume = excluded.transaction_volume,
            updated_at = excluded.updated_at
        RETURNING {}
        "#,
        SNAPSHOT_COLUMNS
    ))
    .bind(Uuid::new_v4().to_string())
    .bind(&snapshot.business_id)
    .bind(&snapshot.user_id)
    .bind(&snapshot.store_id)
    .bind(snapshot.month_start)
    .bind(snapshot.month_end)
    .bind(snapshot.meta_data.as_ref().map(Json))
    .bind(snapshot.transaction_count)
    .bind(snapshot.transaction_volume)
    .bind(&now)
    .bind(&now)
    .fetch_one(pool)
    .await?;

    Ok(stored)
}

/// Snapshots for a business, most recent month first.
pub async fn list_for_business(pool: &SqlitePool, business_id: &str) -> Result<Vec<UserSnapshot>> {
    let rows = sqlx::query_as::<_, UserSnapshot>(&format!(
        "SELECT {} FROM user_snapshots WHERE business_id = ? ORDER BY month_start DESC",
        SNAPSHOT_COLUMNS
    ))
    .bind(business_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Snapshots whose month starts on or after `since`.
pub async fn list_since(pool: &SqlitePool, since: NaiveDate) -> Result<Vec<UserSnapshot>> {
    let rows = sqlx::query_as::<_, UserSnapshot>(&format!(
        "SELECT {} FROM user_snapshots WHERE month_start >= ? ORDER BY month_start DESC, business_id",
        SNAPSHOT_COLUMNS
    ))
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

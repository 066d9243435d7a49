//! Business-category severity thresholds.
//!
//! Each business type carries, per metric, the drop percentage at which each
//! severity starts to apply.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{DatabaseError, Result};
use crate::models::{BusinessCategorySeverity, Severity, ThresholdType};

/// Create a threshold. Fails if one already exists for the same business
/// type, metric and severity.
pub async fn create_threshold(
    pool: &SqlitePool,
    business_type_id: &str,
    threshold_type: ThresholdType,
    severity: Severity,
    threshold_value: i64,
) -> Result<BusinessCategorySeverity> {
    let threshold = BusinessCategorySeverity {
        id: Uuid::new_v4().to_string(),
        business_type_id: business_type_id.to_string(),
        threshold_type,
        severity,
        threshold_value,
    };

    sqlx::query(
        r#"
        INSERT INTO business_category_severities (id, business_type_id, threshold_type, severity, threshold_value)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&threshold.id)
    .bind(&threshold.business_type_id)
    .bind(threshold.threshold_type)
    .bind(threshold.severity)
    .bind(threshold.threshold_value)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Severity threshold",
                    id: format!("{}/{}/{}", business_type_id, threshold_type, severity),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(threshold)
}

/// Set a threshold value, creating the row when it does not exist yet.
pub async fn upsert_threshold(
    pool: &SqlitePool,
    business_type_id: &str,
    threshold_type: ThresholdType,
    severity: Severity,
    threshold_value: i64,
) -> Result<BusinessCategorySeverity> {
    let threshold = sqlx::query_as::<_, BusinessCategorySeverity>(
        r#"
        INSERT INTO business_category_severities (id, business_type_id, threshold_type, severity, threshold_value)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (business_type_id, threshold_type, severity)
        DO UPDATE SET threshold_value = excluded.threshold_value
        RETURNING id, business_type_id, threshold_type, severity, threshold_value
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(business_type_id)
    .bind(threshold_type)
    .bind(severity)
    .bind(threshold_value)
    .fetch_one(pool)
    .await?;

    Ok(threshold)
}

/// List thresholds, optionally for a single business type.
pub async fn list_thresholds(
    pool: &SqlitePool,
    business_type_id: Option<&str>,
) -> Result<Vec<BusinessCategorySeverity>> {
    let rows = sqlx::query_as::<_, BusinessCategorySeverity>(
        r#"
        SELECT id, business_type_id, threshold_type, severity, threshold_value
        FROM business_category_severities
        WHERE ? IS NULL OR business_type_id = ?
        ORDER BY business_type_id, threshold_type, threshold_value
        "#,
    )
    .bind(business_type_id)
    .bind(business_type_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// The severity of the highest threshold that `drop_percent` reaches, if any.
pub async fn resolve_severity(
    pool: &SqlitePool,
    business_type_id: &str,
    threshold_type: ThresholdType,
    drop_percent: i64,
) -> Result<Option<Severity>> {
    let severity = sqlx::query_scalar::<_, Severity>(
        r#"
        SELECT severity
        FROM business_category_severities
        WHERE business_type_id = ? AND threshold_type = ? AND threshold_value <= ?
        ORDER BY threshold_value DESC
        LIMIT 1
        "#,
    )
    .bind(business_type_id)
    .bind(threshold_type)
    .bind(drop_percent)
    .fetch_optional(pool)
    .await?;

    Ok(severity)
}

//! SQL run against the read-only PostgreSQL sources.
//!
//! Identifiers are compared as text so callers may pass any id format.
//! Timestamp columns are stored without a zone and read as UTC.

pub const SELECT_MERCHANT_BY_ID: &str = r#"
SELECT
    me."id"::text AS id,
    me."firstName" AS first_name,
    me."lastName" AS last_name,
    me."email" AS email,
    me."phone" AS phone,
    me."createdAt" AT TIME ZONE 'UTC' AS signup_date,
    me."isActive" AS is_active,
    mb."businessName" AS business_name,
    mbt."id"::text AS business_type_id,
    mbt."name" AS business_type
FROM merchant_entity me
LEFT JOIN merchant_business_info_entity mb ON mb."merchantId" = me."id"
LEFT JOIN merchant_business_type_entity mbt ON mbt."id" = mb."businessTypeId"
WHERE me."id"::text = $1
LIMIT 1;
"#;

pub const SELECT_MERCHANTS_BY_IDS: &str = r#"
SELECT
    me."id"::text AS id,
    me."firstName" AS first_name,
    me."lastName" AS last_name,
    me."email" AS email,
    me."phone" AS phone,
    me."createdAt" AT TIME ZONE 'UTC' AS signup_date,
    me."isActive" AS is_active,
    mb."businessName" AS business_name,
    mbt."id"::text AS business_type_id,
    mbt."name" AS business_type
FROM merchant_entity me
LEFT JOIN merchant_business_info_entity mb ON mb."merchantId" = me."id"
LEFT JOIN merchant_business_type_entity mbt ON mbt."id" = mb."businessTypeId"
WHERE me."id"::text = ANY($1)
ORDER BY me."createdAt";
"#;

pub const SELECT_MERCHANTS_BY_SIGNUP_DAY: &str = r#"
SELECT me."id"::text AS merchant_id, mbt."id"::text AS business_type_id
FROM merchant_entity me
JOIN merchant_business_info_entity mb ON mb."merchantId" = me."id"
JOIN merchant_business_type_entity mbt ON mbt."id" = mb."businessTypeId"
WHERE EXTRACT(DAY FROM me."createdAt") = $1
  AND me."internalUser" = false;
"#;

pub const SELECT_MERCHANTS_FOR_FIRST_OF_MONTH: &str = r#"
SELECT me."id"::text AS merchant_id, mbt."id"::text AS business_type_id
FROM merchant_entity me
JOIN merchant_business_info_entity mb ON mb."merchantId" = me."id"
JOIN merchant_business_type_entity mbt ON mbt."id" = mb."businessTypeId"
WHERE EXTRACT(DAY FROM me."createdAt") IN (29, 30, 31, 1)
  AND me."internalUser" = false;
"#;

pub const SELECT_ELIGIBLE_MERCHANTS: &str = r#"
SELECT me."id"::text AS merchant_id, me."createdAt" AT TIME ZONE 'UTC' AS signup_date
FROM merchant_entity me
WHERE me."internalUser" = false
  AND me."status" = 'APPROVED'
ORDER BY me."createdAt";
"#;

pub const SELECT_TRANSACTIONS: &str = r#"
SELECT
    pt."id"::text AS id,
    pt."merchantId"::text AS merchant_id,
    pt."paidAmount"::float8 AS amount,
    pt."paymentMethod" AS payment_method,
    pt."createdAt" AT TIME ZONE 'UTC' AS created_at
FROM payment_transaction_entity pt
WHERE pt."merchantId"::text = $1
  AND pt."status" = 'COMPLETED'
  AND pt."createdAt"::date BETWEEN $2 AND $3
ORDER BY pt."createdAt" DESC;
"#;

pub const SELECT_WEEKLY_GTV: &str = r#"
SELECT
    DATE_TRUNC('week', pt."createdAt")::date AS week_start,
    COALESCE(SUM(pt."paidAmount"), 0)::float8 AS total_gtv,
    COUNT(*) AS transaction_count
FROM payment_transaction_entity pt
WHERE pt."merchantId"::text = $1
  AND pt."status" = 'COMPLETED'
  AND pt."createdAt"::date BETWEEN $2 AND $3
GROUP BY DATE_TRUNC('week', pt."createdAt")
ORDER BY week_start DESC;
"#;

pub const SELECT_DAILY_TOTALS: &str = r#"
SELECT
    DATE(pt."createdAt") AS day,
    COUNT(*) AS transaction_count,
    COALESCE(SUM(pt."paidAmount"), 0)::float8 AS transaction_volume
FROM payment_transaction_entity pt
WHERE pt."merchantId"::text = $1
  AND pt."status" = 'COMPLETED'
  AND pt."createdAt"::date BETWEEN $2 AND $3
GROUP BY DATE(pt."createdAt")
ORDER BY day;
"#;

pub const SELECT_PLAN_NAME: &str = r#"
SELECT mp."name"
FROM merchant_subscription_entity ms
JOIN merchant_plan_entity mp ON mp."id" = ms."planId"
WHERE ms."merchantId"::text = $1
ORDER BY ms."createdAt" DESC
LIMIT 1;
"#;

pub const SELECT_LAST_SIX_MONTHS: &str = r#"
SELECT
    COUNT(*) AS transaction_count,
    COALESCE(SUM(pt."paidAmount"), 0)::float8 AS transaction_volume
FROM payment_transaction_entity pt
WHERE pt."merchantId"::text = $1
  AND pt."status" = 'COMPLETED'
  AND pt."createdAt"::date > ($2::date - INTERVAL '6 months')::date
  AND pt."createdAt"::date <= $2;
"#;

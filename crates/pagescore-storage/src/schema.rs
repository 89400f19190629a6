//! Schema SQL constants used by migrations.rs.

/// V1 schema: 7 tables + 3 indexes.
pub const SCHEMA_V1: &str = "
    CREATE TABLE IF NOT EXISTS plans (
        name TEXT PRIMARY KEY NOT NULL,
        audits_per_month INTEGER NOT NULL,
        pdf_exports INTEGER NOT NULL,
        history_days INTEGER NOT NULL,
        can_auto_audit INTEGER,
        can_export_pdf INTEGER,
        can_share_report INTEGER,
        can_view_full_metrics INTEGER,
        can_view_demographics INTEGER,
        can_view_ai_insights INTEGER
    ) STRICT;

    CREATE TABLE IF NOT EXISTS accounts (
        id TEXT PRIMARY KEY NOT NULL,
        created_at INTEGER NOT NULL
    ) STRICT;

    CREATE TABLE IF NOT EXISTS subscriptions (
        account_id TEXT PRIMARY KEY NOT NULL REFERENCES accounts(id),
        plan TEXT NOT NULL,
        status TEXT NOT NULL,
        updated_at INTEGER NOT NULL
    ) STRICT;

    CREATE TABLE IF NOT EXISTS monthly_grants (
        account_id TEXT NOT NULL REFERENCES accounts(id),
        period TEXT NOT NULL,
        granted_at INTEGER NOT NULL,
        PRIMARY KEY (account_id, period)
    ) STRICT;

    CREATE TABLE IF NOT EXISTS usage_periods (
        account_id TEXT NOT NULL,
        period TEXT NOT NULL,
        audit_count INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (account_id, period)
    ) STRICT;

    CREATE TABLE IF NOT EXISTS audits (
        id TEXT PRIMARY KEY NOT NULL,
        account_id TEXT NOT NULL REFERENCES accounts(id),
        request_key TEXT,
        score INTEGER NOT NULL,
        engagement_score INTEGER NOT NULL,
        consistency_score INTEGER NOT NULL,
        readiness_score INTEGER NOT NULL,
        inputs TEXT NOT NULL,
        metrics TEXT NOT NULL,
        posts TEXT NOT NULL,
        recommendations TEXT NOT NULL,
        ai_insights TEXT,
        demographics TEXT,
        unlocked INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL
    ) STRICT;

    CREATE TABLE IF NOT EXISTS share_links (
        audit_id TEXT PRIMARY KEY NOT NULL REFERENCES audits(id),
        slug TEXT UNIQUE,
        is_public INTEGER NOT NULL DEFAULT 0,
        view_count INTEGER NOT NULL DEFAULT 0,
        updated_at INTEGER NOT NULL
    ) STRICT;

    CREATE UNIQUE INDEX IF NOT EXISTS idx_audits_request_key
        ON audits(account_id, request_key) WHERE request_key IS NOT NULL;
    CREATE INDEX IF NOT EXISTS idx_audits_account_created ON audits(account_id, created_at);
    CREATE INDEX IF NOT EXISTS idx_grants_period ON monthly_grants(period);
";

/// All data table names.
pub const TABLE_NAMES: [&str; 7] = [
    "plans",
    "accounts",
    "subscriptions",
    "monthly_grants",
    "usage_periods",
    "audits",
    "share_links",
];

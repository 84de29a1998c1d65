//! SQL migration definitions for the postcraft template database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a batch of SQL statements.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            description: "Initial schema: templates",
            sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One row per template; list-valued fields are JSON text
CREATE TABLE IF NOT EXISTS templates (
    id               TEXT PRIMARY KEY,
    name             TEXT NOT NULL,
    description      TEXT NOT NULL DEFAULT '',
    content          TEXT NOT NULL,
    version          TEXT NOT NULL,
    variables        TEXT NOT NULL DEFAULT '[]',
    usage_count      INTEGER NOT NULL DEFAULT 0,
    feedback_score   REAL NOT NULL DEFAULT 5.0,
    feedback_history TEXT NOT NULL DEFAULT '[]',
    is_active        INTEGER NOT NULL DEFAULT 1,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
        },
        Migration {
            version: 2,
            description: "Index templates for ranked listing",
            sql: r#"
CREATE INDEX IF NOT EXISTS idx_templates_rank
    ON templates(usage_count DESC, feedback_score DESC, name);

INSERT INTO schema_migrations (version) VALUES (2);
"#,
        },
    ]
}

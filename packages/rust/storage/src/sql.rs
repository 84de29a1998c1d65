//! libSQL-backed template store (offline mode).

use std::path::Path;

use chrono::{DateTime, Utc};
use libsql::{Connection, Database, params};

use postcraft_shared::{PostcraftError, Result, Template, Version};

use crate::TemplateRepository;
use crate::migrations;

const COLUMNS: &str = "id, name, description, content, version, variables, usage_count, \
     feedback_score, feedback_history, is_active, created_at, updated_at";

fn db_err(e: libsql::Error) -> PostcraftError {
    PostcraftError::Storage(e.to_string())
}

/// Template store wrapping a local libSQL database file.
pub struct SqlRepository {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

impl SqlRepository {
    /// Open or create a database at `path` and bring its schema up to date.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PostcraftError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(db_err)?;
        let conn = db.connect().map_err(db_err)?;

        let repo = Self { db, conn };
        repo.run_migrations().await?;
        Ok(repo)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    PostcraftError::Storage(format!("migration v{} failed: {e}", migration.version))
                })?;
            }
        }
        Ok(())
    }

    /// Current schema version, or 0 before the first migration.
    async fn schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => match rows.next().await {
                Ok(Some(row)) => row.get::<u32>(0).unwrap_or(0),
                _ => 0,
            },
            Err(_) => 0, // table doesn't exist yet
        }
    }
}

impl TemplateRepository for SqlRepository {
    async fn get(&self, id: &str) -> Result<Option<Template>> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT {COLUMNS} FROM templates WHERE id = ?1"),
                params![id],
            )
            .await
            .map_err(db_err)?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(Some(row_to_template(&row)?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Template>> {
        let mut rows = self
            .conn
            .query(&format!("SELECT {COLUMNS} FROM templates"), params![])
            .await
            .map_err(db_err)?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            results.push(row_to_template(&row)?);
        }
        Ok(results)
    }

    async fn insert(&self, template: &Template) -> Result<bool> {
        let variables = serde_json::to_string(&template.variables)?;
        let history = serde_json::to_string(&template.feedback_history)?;
        let inserted = self
            .conn
            .execute(
                &format!(
                    "INSERT OR IGNORE INTO templates ({COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
                ),
                params![
                    template.id.as_str(),
                    template.name.as_str(),
                    template.description.as_str(),
                    template.content.as_str(),
                    template.version.to_string(),
                    variables,
                    template.usage_count as i64,
                    template.feedback_score,
                    history,
                    template.is_active as i64,
                    template.created_at.to_rfc3339(),
                    template.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(db_err)?;
        Ok(inserted > 0)
    }

    async fn upsert(&self, template: &Template) -> Result<()> {
        let variables = serde_json::to_string(&template.variables)?;
        let history = serde_json::to_string(&template.feedback_history)?;
        self.conn
            .execute(
                &format!(
                    "INSERT INTO templates ({COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                     ON CONFLICT(id) DO UPDATE SET
                       name = excluded.name,
                       description = excluded.description,
                       content = excluded.content,
                       version = excluded.version,
                       variables = excluded.variables,
                       usage_count = excluded.usage_count,
                       feedback_score = excluded.feedback_score,
                       feedback_history = excluded.feedback_history,
                       is_active = excluded.is_active,
                       updated_at = excluded.updated_at"
                ),
                params![
                    template.id.as_str(),
                    template.name.as_str(),
                    template.description.as_str(),
                    template.content.as_str(),
                    template.version.to_string(),
                    variables,
                    template.usage_count as i64,
                    template.feedback_score,
                    history,
                    template.is_active as i64,
                    template.created_at.to_rfc3339(),
                    template.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn compare_and_swap(&self, template: &Template, expected: Version) -> Result<()> {
        let variables = serde_json::to_string(&template.variables)?;
        let history = serde_json::to_string(&template.feedback_history)?;
        let updated = self
            .conn
            .execute(
                "UPDATE templates SET
                   name = ?1, description = ?2, content = ?3, version = ?4,
                   variables = ?5, feedback_score = ?6, feedback_history = ?7,
                   is_active = ?8, updated_at = ?9
                 WHERE id = ?10 AND version = ?11",
                params![
                    template.name.as_str(),
                    template.description.as_str(),
                    template.content.as_str(),
                    template.version.to_string(),
                    variables,
                    template.feedback_score,
                    history,
                    template.is_active as i64,
                    template.updated_at.to_rfc3339(),
                    template.id.as_str(),
                    expected.to_string(),
                ],
            )
            .await
            .map_err(db_err)?;

        if updated > 0 {
            return Ok(());
        }

        // Nothing matched: distinguish a missing row from a lost race.
        match self.get(&template.id).await? {
            None => Err(PostcraftError::not_found(&template.id)),
            Some(_) => Err(PostcraftError::VersionConflict {
                id: template.id.clone(),
                expected,
            }),
        }
    }

    async fn increment_usage(&self, id: &str) -> Result<u64> {
        let mut rows = self
            .conn
            .query(
                "UPDATE templates SET usage_count = usage_count + 1
                 WHERE id = ?1 RETURNING usage_count",
                params![id],
            )
            .await
            .map_err(db_err)?;

        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(row.get::<i64>(0).map_err(db_err)?.max(0) as u64),
            None => Err(PostcraftError::not_found(id)),
        }
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| PostcraftError::Storage(format!("invalid date: {e}")))
}

/// Convert a database row to a [`Template`].
fn row_to_template(row: &libsql::Row) -> Result<Template> {
    let text = |i: i32| row.get::<String>(i).map_err(db_err);

    Ok(Template {
        id: text(0)?,
        name: text(1)?,
        description: text(2)?,
        content: text(3)?,
        version: text(4)?.parse()?,
        variables: serde_json::from_str(&text(5)?)?,
        usage_count: row.get::<i64>(6).map_err(db_err)?.max(0) as u64,
        feedback_score: row.get::<f64>(7).map_err(db_err)?,
        feedback_history: serde_json::from_str(&text(8)?)?,
        is_active: row.get::<i64>(9).map_err(db_err)? != 0,
        created_at: parse_timestamp(&text(10)?)?,
        updated_at: parse_timestamp(&text(11)?)?,
    })
}

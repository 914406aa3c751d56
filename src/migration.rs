//! Versioned migrations: applied once each, recorded in `_migrations`, rolled back per batch.

use crate::error::AppError;
use crate::schema::{ColumnDef, ColumnType, SchemaChange, TableDef};
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};

pub const LEDGER_TABLE: &str = "_migrations";

#[derive(Clone, Debug)]
pub struct Migration {
    /// Sortable timestamp-style version, e.g. `20240101000000`.
    pub version: i64,
    pub name: String,
    pub up: Vec<SchemaChange>,
    pub down: Vec<SchemaChange>,
}

impl Migration {
    pub fn new(version: i64, name: impl Into<String>) -> Self {
        Self {
            version,
            name: name.into(),
            up: Vec::new(),
            down: Vec::new(),
        }
    }

    pub fn up(mut self, change: SchemaChange) -> Self {
        self.up.push(change);
        self
    }

    pub fn down(mut self, change: SchemaChange) -> Self {
        self.down.push(change);
        self
    }

    /// `20240101000000_create_posts_table`
    pub fn id(&self) -> String {
        format!("{}_{}", self.version, self.name)
    }
}

/// Migrations shipped with the application, oldest first.
pub fn builtin() -> Vec<Migration> {
    vec![Migration::new(20240101000000, "create_posts_table")
        .up(SchemaChange::CreateTable(
            TableDef::new("posts")
                .id()
                .column(ColumnDef::new("title", ColumnType::Varchar(255)))
                .column(ColumnDef::new("body", ColumnType::Text))
                .timestamps(),
        ))
        .down(SchemaChange::DropTable("posts".into()))]
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MigrationStatus {
    pub id: String,
    /// `None` while pending.
    pub batch: Option<i32>,
}

pub struct Migrator {
    migrations: Vec<Migration>,
}

impl Migrator {
    /// Versions must be unique and strictly ascending.
    pub fn new(migrations: Vec<Migration>) -> Result<Self, AppError> {
        for pair in migrations.windows(2) {
            if pair[1].version <= pair[0].version {
                return Err(AppError::Migration(format!(
                    "{} must come after {}",
                    pair[1].id(),
                    pair[0].id()
                )));
            }
        }
        Ok(Self { migrations })
    }

    /// Migrations not yet in `applied`, in version order.
    pub fn pending(&self, applied: &HashSet<i64>) -> Vec<&Migration> {
        self.migrations.iter().filter(|m| !applied.contains(&m.version)).collect()
    }

    /// Migrations of `batch` from a ledger listing, newest first.
    pub fn batch_to_revert<'a>(&'a self, ledger: &HashMap<i64, i32>, batch: i32) -> Vec<&'a Migration> {
        self.migrations
            .iter()
            .rev()
            .filter(|m| ledger.get(&m.version) == Some(&batch))
            .collect()
    }

    async fn ensure_ledger(pool: &PgPool) -> Result<(), AppError> {
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                version BIGINT PRIMARY KEY,
                name TEXT NOT NULL,
                batch INT NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            LEDGER_TABLE
        );
        sqlx::query(&ddl).execute(pool).await?;
        Ok(())
    }

    async fn ledger(pool: &PgPool) -> Result<HashMap<i64, i32>, AppError> {
        let rows: Vec<(i64, i32)> = sqlx::query_as(&format!("SELECT version, batch FROM {}", LEDGER_TABLE))
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().collect())
    }

    /// Apply every pending migration. Each runs in its own transaction with its ledger row.
    /// Returns the ids applied; empty when already up to date.
    pub async fn migrate(&self, pool: &PgPool) -> Result<Vec<String>, AppError> {
        Self::ensure_ledger(pool).await?;
        let ledger = Self::ledger(pool).await?;
        let applied: HashSet<i64> = ledger.keys().copied().collect();
        let batch = ledger.values().copied().max().unwrap_or(0) + 1;

        let mut done = Vec::new();
        for m in self.pending(&applied) {
            let mut tx = pool.begin().await?;
            for change in &m.up {
                let sql = change.sql();
                tracing::debug!(sql = %sql, migration = %m.id(), "up");
                sqlx::query(&sql).execute(&mut *tx).await?;
            }
            sqlx::query(&format!(
                "INSERT INTO {} (version, name, batch) VALUES ($1, $2, $3)",
                LEDGER_TABLE
            ))
            .bind(m.version)
            .bind(&m.name)
            .bind(batch)
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;
            tracing::info!(migration = %m.id(), batch, "migrated");
            done.push(m.id());
        }
        Ok(done)
    }

    /// Revert the most recent batch, newest migration first. Returns the ids reverted.
    pub async fn rollback(&self, pool: &PgPool) -> Result<Vec<String>, AppError> {
        Self::ensure_ledger(pool).await?;
        let ledger = Self::ledger(pool).await?;
        let Some(batch) = ledger.values().copied().max() else {
            return Ok(Vec::new());
        };
        let known: HashSet<i64> = self.migrations.iter().map(|m| m.version).collect();
        if let Some(v) = ledger.iter().find(|(v, b)| **b == batch && !known.contains(*v)).map(|(v, _)| *v) {
            return Err(AppError::Migration(format!("applied version {} is not a known migration", v)));
        }

        let mut done = Vec::new();
        for m in self.batch_to_revert(&ledger, batch) {
            let mut tx = pool.begin().await?;
            for change in &m.down {
                let sql = change.sql();
                tracing::debug!(sql = %sql, migration = %m.id(), "down");
                sqlx::query(&sql).execute(&mut *tx).await?;
            }
            sqlx::query(&format!("DELETE FROM {} WHERE version = $1", LEDGER_TABLE))
                .bind(m.version)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            tracing::info!(migration = %m.id(), batch, "rolled back");
            done.push(m.id());
        }
        Ok(done)
    }

    pub async fn status(&self, pool: &PgPool) -> Result<Vec<MigrationStatus>, AppError> {
        Self::ensure_ledger(pool).await?;
        let ledger = Self::ledger(pool).await?;
        Ok(self.status_from(&ledger))
    }

    fn status_from(&self, ledger: &HashMap<i64, i32>) -> Vec<MigrationStatus> {
        self.migrations
            .iter()
            .map(|m| MigrationStatus {
                id: m.id(),
                batch: ledger.get(&m.version).copied(),
            })
            .collect()
    }
}

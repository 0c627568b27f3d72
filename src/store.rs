//! SQLite pool bootstrap and live catalog queries used by the migration engine.

use crate::error::{AppError, ConfigError};
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Executor;
use std::path::Path;
use std::str::FromStr;

/// Live storage-side view of one table. Queried on demand, never cached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableCatalogEntry {
    pub table_name: String,
    /// Column names in storage order, surrogate key included.
    pub existing_columns: Vec<String>,
}

impl TableCatalogEntry {
    /// SQLite resolves column names without regard to ASCII case.
    pub fn has_column(&self, name: &str) -> bool {
        self.existing_columns.iter().any(|c| c.eq_ignore_ascii_case(name))
    }
}

/// Ensure the directory holding the database file in `database_url` exists. In-memory URLs are left alone.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let Some(path) = database_file_path(database_url) else {
        return Ok(());
    };
    if let Some(parent) = Path::new(&path).parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ConfigError::Setting {
                key: "DATABASE_URL",
                message: format!("cannot create {}: {}", parent.display(), e),
            })?;
    }
    Ok(())
}

fn database_file_path(url: &str) -> Option<String> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    let path = rest.split('?').next().unwrap_or("").trim();
    if path.is_empty() || path == ":memory:" || rest.contains("mode=memory") {
        None
    } else {
        Some(path.to_string())
    }
}

/// Open the shared pool. The database file is created if missing; file databases use WAL so readers don't block the writer.
/// An in-memory database lives only as long as its connection, so it gets exactly one that is never recycled.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, AppError> {
    let opts = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| ConfigError::Setting {
            key: "DATABASE_URL",
            message: e.to_string(),
        })?
        .create_if_missing(true);
    let pool = if database_file_path(database_url).is_some() {
        SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(opts.journal_mode(SqliteJournalMode::Wal))
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?
    };
    Ok(pool)
}

/// Whether a table named `table` exists, matched the way SQLite resolves names (ASCII case-insensitive).
pub async fn table_exists<'e, E>(executor: E, table: &str) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ? COLLATE NOCASE";
    tracing::debug!(sql = %sql, table = %table, "query");
    let row: Option<String> = sqlx::query_scalar(sql).bind(table).fetch_optional(executor).await?;
    Ok(row.is_some())
}

/// Live column list of `table`; empty if the table does not exist.
pub async fn table_columns<'e, E>(executor: E, table: &str) -> Result<TableCatalogEntry, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = "SELECT name FROM pragma_table_info(?) ORDER BY cid";
    tracing::debug!(sql = %sql, table = %table, "query");
    let existing_columns: Vec<String> = sqlx::query_scalar(sql).bind(table).fetch_all(executor).await?;
    Ok(TableCatalogEntry {
        table_name: table.to_string(),
        existing_columns,
    })
}

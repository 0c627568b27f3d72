//! Reconcile storage with the registry: create missing tables and add missing columns.
//! Additive only: nothing is ever dropped, renamed or retyped. Runs once, before serving.

use crate::config::{is_type_tag, ColumnDef, SchemaDefinition, SchemaRegistry};
use crate::error::MigrationError;
use crate::sql::{add_column, create_table};
use crate::store::{table_columns, table_exists, TableCatalogEntry};
use sqlx::SqlitePool;

/// DDL needed to bring one collection's table in line with its definition.
#[derive(Debug, PartialEq, Eq)]
pub enum MigrationPlan {
    CreateTable { sql: String },
    AddColumns { columns: Vec<String>, statements: Vec<String> },
    UpToDate,
}

impl MigrationPlan {
    pub fn statements(&self) -> Vec<&str> {
        match self {
            MigrationPlan::CreateTable { sql } => vec![sql.as_str()],
            MigrationPlan::AddColumns { statements, .. } => statements.iter().map(String::as_str).collect(),
            MigrationPlan::UpToDate => Vec::new(),
        }
    }

    fn action(self) -> MigrationAction {
        match self {
            MigrationPlan::CreateTable { .. } => MigrationAction::Created,
            MigrationPlan::AddColumns { columns, .. } => MigrationAction::ColumnsAdded(columns),
            MigrationPlan::UpToDate => MigrationAction::UpToDate,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MigrationAction {
    Created,
    ColumnsAdded(Vec<String>),
    UpToDate,
}

#[derive(Debug)]
pub struct CollectionOutcome {
    pub collection: String,
    pub result: Result<MigrationAction, MigrationError>,
}

/// Per-collection outcomes, in registry order.
#[derive(Debug, Default)]
pub struct MigrationReport {
    pub outcomes: Vec<CollectionOutcome>,
}

impl MigrationReport {
    pub fn outcome(&self, collection: &str) -> Option<&Result<MigrationAction, MigrationError>> {
        self.outcomes
            .iter()
            .find(|o| o.collection == collection)
            .map(|o| &o.result)
    }

    pub fn failures(&self) -> impl Iterator<Item = &MigrationError> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().err())
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }

    /// True when no collection needed any DDL.
    pub fn is_noop(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| matches!(o.result, Ok(MigrationAction::UpToDate)))
    }
}

/// Decide the DDL for `def` given the live table (`None` if it does not exist).
/// Missing columns keep declared order. Type tags are checked only for columns that reach DDL.
pub fn plan_collection(
    def: &SchemaDefinition,
    live: Option<&TableCatalogEntry>,
) -> Result<MigrationPlan, MigrationError> {
    let Some(live) = live else {
        check_type_tags(def, def.columns.iter())?;
        return Ok(MigrationPlan::CreateTable { sql: create_table(def) });
    };
    let missing: Vec<&ColumnDef> = def.columns.iter().filter(|c| !live.has_column(&c.name)).collect();
    if missing.is_empty() {
        return Ok(MigrationPlan::UpToDate);
    }
    check_type_tags(def, missing.iter().copied())?;
    Ok(MigrationPlan::AddColumns {
        columns: missing.iter().map(|c| c.name.clone()).collect(),
        statements: missing.iter().map(|c| add_column(&def.name, c)).collect(),
    })
}

fn check_type_tags<'a>(
    def: &SchemaDefinition,
    columns: impl Iterator<Item = &'a ColumnDef>,
) -> Result<(), MigrationError> {
    for c in columns {
        if !is_type_tag(&c.type_tag) {
            return Err(MigrationError::InvalidTypeTag {
                collection: def.name.clone(),
                column: c.name.clone(),
                tag: c.type_tag.clone(),
            });
        }
    }
    Ok(())
}

/// Migrate every registered collection in order. A failing collection is logged and skipped;
/// the others are still migrated. Always returns a report covering every collection.
pub async fn apply_migrations(pool: &SqlitePool, registry: &SchemaRegistry) -> MigrationReport {
    let mut report = MigrationReport::default();
    for def in registry.definitions() {
        let result = migrate_collection(pool, def).await;
        match &result {
            Ok(MigrationAction::Created) => tracing::info!(collection = %def.name, "table created"),
            Ok(MigrationAction::ColumnsAdded(cols)) => {
                tracing::info!(collection = %def.name, columns = %cols.join(", "), "columns added")
            }
            Ok(MigrationAction::UpToDate) => tracing::debug!(collection = %def.name, "table up to date"),
            Err(e) => tracing::error!(collection = %def.name, error = %e, "migration failed; collection left unmigrated"),
        }
        report.outcomes.push(CollectionOutcome {
            collection: def.name.clone(),
            result,
        });
    }
    report
}

/// Catalog lookups and DDL for one collection run in a single transaction, so a failure leaves the table untouched.
async fn migrate_collection(pool: &SqlitePool, def: &SchemaDefinition) -> Result<MigrationAction, MigrationError> {
    let db = |source: sqlx::Error| MigrationError::Db {
        collection: def.name.clone(),
        source,
    };
    let mut tx = pool.begin().await.map_err(db)?;
    let live = if table_exists(&mut *tx, &def.name).await.map_err(db)? {
        Some(table_columns(&mut *tx, &def.name).await.map_err(db)?)
    } else {
        None
    };
    let plan = plan_collection(def, live.as_ref())?;
    for sql in plan.statements() {
        tracing::debug!(sql = %sql, "ddl");
        sqlx::query(sql).execute(&mut *tx).await.map_err(db)?;
    }
    tx.commit().await.map_err(db)?;
    Ok(plan.action())
}

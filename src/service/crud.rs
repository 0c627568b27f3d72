//! Generic CRUD execution against SQLite, scoped to one registered collection per call.

use crate::config::SchemaRegistry;
use crate::error::AppError;
use crate::service::RequestValidator;
use crate::sql::{self, QueryBuf};
use serde_json::{Map, Value};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Sqlite, SqlitePool};

pub struct CrudService;

impl CrudService {
    /// Insert one record whose fields exactly match the collection's columns. Returns the new id.
    pub async fn create(
        pool: &SqlitePool,
        registry: &SchemaRegistry,
        collection: &str,
        payload: &Map<String, Value>,
    ) -> Result<i64, AppError> {
        let def = RequestValidator::validate(registry, collection, payload)?;
        let q = sql::insert(def, payload)?;
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let done = bind_all(&q).execute(pool).await?;
        Ok(done.last_insert_rowid())
    }

    /// All records with `id`. Zero matches is `NotFound`, not an empty list.
    pub async fn read(
        pool: &SqlitePool,
        registry: &SchemaRegistry,
        collection: &str,
        id: i64,
    ) -> Result<Vec<Value>, AppError> {
        let def = RequestValidator::collection(registry, collection)?;
        let q = sql::select_by_id(def, id);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(&q).fetch_all(pool).await?;
        if rows.is_empty() {
            return Err(AppError::NotFound(id));
        }
        Ok(rows.iter().map(row_to_json).collect())
    }

    /// Overwrite the supplied fields of the records with `id`; other fields are untouched.
    /// Returns the number of rows changed.
    pub async fn update(
        pool: &SqlitePool,
        registry: &SchemaRegistry,
        collection: &str,
        id: i64,
        payload: &Map<String, Value>,
    ) -> Result<u64, AppError> {
        let def = RequestValidator::validate_partial(registry, collection, payload)?;
        let q = sql::update(def, id, payload)?;
        Self::require_record(pool, &sql::exists_by_id(def, id), id).await?;
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let done = bind_all(&q).execute(pool).await?;
        Ok(done.rows_affected())
    }

    /// Remove the records with `id`. Returns the number of rows removed.
    pub async fn delete(
        pool: &SqlitePool,
        registry: &SchemaRegistry,
        collection: &str,
        id: i64,
    ) -> Result<u64, AppError> {
        let def = RequestValidator::collection(registry, collection)?;
        Self::require_record(pool, &sql::exists_by_id(def, id), id).await?;
        let q = sql::delete(def, id);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let done = bind_all(&q).execute(pool).await?;
        Ok(done.rows_affected())
    }

    async fn require_record(pool: &SqlitePool, probe: &QueryBuf, id: i64) -> Result<(), AppError> {
        tracing::debug!(sql = %probe.sql, params = ?probe.params, "query");
        let row = bind_all(probe).fetch_optional(pool).await?;
        match row {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(id)),
        }
    }
}

fn bind_all(q: &QueryBuf) -> sqlx::query::Query<'_, Sqlite, SqliteArguments<'_>> {
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

fn row_to_json(row: &SqliteRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

/// SQLite is dynamically typed: decode by the stored value's type, not the declared one.
fn cell_to_value(row: &SqliteRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(bytes)) = row.try_get::<Option<Vec<u8>>, _>(name) {
        return Value::String(String::from_utf8_lossy(&bytes).into_owned());
    }
    Value::Null
}

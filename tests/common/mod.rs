#![allow(dead_code)]

use collection_proxy::{connect, ColumnDef, SchemaRegistry};
use sqlx::SqlitePool;

pub async fn memory_pool() -> SqlitePool {
    connect("sqlite::memory:", 1).await.expect("in-memory pool")
}

pub fn text_columns(names: &[&str]) -> Vec<ColumnDef> {
    names.iter().map(|n| ColumnDef::new(*n, "TEXT")).collect()
}

/// The `test` collection: name, phone, email, location (all TEXT).
pub fn contacts_registry() -> SchemaRegistry {
    let mut r = SchemaRegistry::new();
    r.register("test", text_columns(&["name", "phone", "email", "location"]))
        .expect("register test");
    r
}

pub async fn live_columns(pool: &SqlitePool, table: &str) -> Vec<String> {
    collection_proxy::store::table_columns(pool, table)
        .await
        .expect("catalog")
        .existing_columns
}

pub async fn row_count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM \"{}\"", table))
        .fetch_one(pool)
        .await
        .expect("count")
}

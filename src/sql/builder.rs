//! Builds parameterized DDL, INSERT, SELECT, UPDATE, DELETE from a schema definition.
//! Table and column names always come from the definition; request data only ever becomes bound values.

use crate::config::{ColumnDef, SchemaDefinition, ID_COLUMN};
use crate::error::AppError;
use crate::sql::SqliteBindValue;
use serde_json::{Map, Value};

/// Quote identifier for SQLite (safe: only from the registry).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<SqliteBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: SqliteBindValue) {
        self.params.push(v);
    }
}

/// CREATE TABLE IF NOT EXISTS with the surrogate key followed by every declared column.
pub fn create_table(def: &SchemaDefinition) -> String {
    let mut col_defs = vec![format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", quoted(ID_COLUMN))];
    col_defs.extend(def.columns.iter().map(column_def));
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quoted(&def.name),
        col_defs.join(", ")
    )
}

/// ALTER TABLE .. ADD COLUMN for one column (SQLite takes one column per statement).
pub fn add_column(table: &str, column: &ColumnDef) -> String {
    format!("ALTER TABLE {} ADD COLUMN {}", quoted(table), column_def(column))
}

fn column_def(c: &ColumnDef) -> String {
    format!("{} {}", quoted(&c.name), c.type_tag)
}

/// INSERT one row. Columns in declared order; a declared column missing from `payload` binds NULL.
/// Field-set checks belong to `RequestValidator::validate`; keys that are not declared columns never reach the SQL.
pub fn insert(def: &SchemaDefinition, payload: &Map<String, Value>) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let mut cols = Vec::with_capacity(def.columns.len());
    for c in &def.columns {
        let v = payload.get(&c.name).unwrap_or(&Value::Null);
        q.push_param(SqliteBindValue::from_json(&c.name, v)?);
        cols.push(quoted(&c.name));
    }
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES", quoted(&def.name))
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quoted(&def.name),
            cols.join(", "),
            vec!["?"; cols.len()].join(", ")
        )
    };
    Ok(q)
}

/// SELECT every stored column of the rows matching `id`.
pub fn select_by_id(def: &SchemaDefinition, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(SqliteBindValue::Integer(id));
    q.sql = format!(
        "SELECT * FROM {} WHERE {} = ? ORDER BY {}",
        quoted(&def.name),
        quoted(ID_COLUMN),
        quoted(ID_COLUMN)
    );
    q
}

/// SELECT 1 if any row matches `id`.
pub fn exists_by_id(def: &SchemaDefinition, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(SqliteBindValue::Integer(id));
    q.sql = format!(
        "SELECT 1 FROM {} WHERE {} = ? LIMIT 1",
        quoted(&def.name),
        quoted(ID_COLUMN)
    );
    q
}

/// UPDATE by id: SET the declared columns present in `payload`, in declared order.
/// Callers check the payload with `RequestValidator::validate_partial` first, so at least one column is set.
pub fn update(def: &SchemaDefinition, id: i64, payload: &Map<String, Value>) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let mut sets = Vec::with_capacity(payload.len());
    for c in &def.columns {
        if let Some(v) = payload.get(&c.name) {
            q.push_param(SqliteBindValue::from_json(&c.name, v)?);
            sets.push(format!("{} = ?", quoted(&c.name)));
        }
    }
    q.push_param(SqliteBindValue::Integer(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        quoted(&def.name),
        sets.join(", "),
        quoted(ID_COLUMN)
    );
    Ok(q)
}

/// DELETE by id.
pub fn delete(def: &SchemaDefinition, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(SqliteBindValue::Integer(id));
    q.sql = format!("DELETE FROM {} WHERE {} = ?", quoted(&def.name), quoted(ID_COLUMN));
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contacts() -> SchemaDefinition {
        SchemaDefinition {
            name: "test".into(),
            columns: vec![
                ColumnDef::new("name", "TEXT"),
                ColumnDef::new("age", "INTEGER"),
            ],
        }
    }

    fn map(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn quoting_doubles_quotes() {
        assert_eq!(quoted("name"), "\"name\"");
        assert_eq!(quoted("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn create_table_has_surrogate_key_first() {
        assert_eq!(
            create_table(&contacts()),
            r#"CREATE TABLE IF NOT EXISTS "test" ("id" INTEGER PRIMARY KEY AUTOINCREMENT, "name" TEXT, "age" INTEGER)"#
        );
    }

    #[test]
    fn add_column_statement() {
        assert_eq!(
            add_column("test", &ColumnDef::new("email", "TEXT")),
            r#"ALTER TABLE "test" ADD COLUMN "email" TEXT"#
        );
    }

    #[test]
    fn insert_binds_in_declared_order() {
        let q = insert(&contacts(), &map(json!({"age": 30, "name": "Rachit"}))).unwrap();
        assert_eq!(q.sql, r#"INSERT INTO "test" ("name", "age") VALUES (?, ?)"#);
        assert_eq!(
            q.params,
            vec![SqliteBindValue::Text("Rachit".into()), SqliteBindValue::Integer(30)]
        );
    }

    #[test]
    fn values_never_reach_sql_text() {
        let q = insert(&contacts(), &map(json!({"name": "x'); DROP TABLE test; --", "age": 1}))).unwrap();
        assert!(!q.sql.contains("DROP"));
    }

    #[test]
    fn insert_names_only_declared_columns() {
        let q = insert(&contacts(), &map(json!({"name": "a", "age": 1, "evil\" TEXT": 2}))).unwrap();
        assert_eq!(q.sql, r#"INSERT INTO "test" ("name", "age") VALUES (?, ?)"#);
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn update_sets_only_supplied_fields() {
        let q = update(&contacts(), 9, &map(json!({"age": 31}))).unwrap();
        assert_eq!(q.sql, r#"UPDATE "test" SET "age" = ? WHERE "id" = ?"#);
        assert_eq!(q.params, vec![SqliteBindValue::Integer(31), SqliteBindValue::Integer(9)]);
    }

    #[test]
    fn update_sets_in_declared_order_from_definition() {
        let q = update(&contacts(), 2, &map(json!({"age": 5, "id": 7, "name": "b"}))).unwrap();
        assert_eq!(q.sql, r#"UPDATE "test" SET "name" = ?, "age" = ? WHERE "id" = ?"#);
        assert_eq!(
            q.params,
            vec![SqliteBindValue::Text("b".into()), SqliteBindValue::Integer(5), SqliteBindValue::Integer(2)]
        );
    }

    #[test]
    fn nested_values_are_rejected() {
        assert!(matches!(
            update(&contacts(), 1, &map(json!({"name": {"x": 1}}))),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn by_id_statements() {
        let def = contacts();
        assert_eq!(select_by_id(&def, 1).sql, r#"SELECT * FROM "test" WHERE "id" = ? ORDER BY "id""#);
        assert_eq!(exists_by_id(&def, 1).sql, r#"SELECT 1 FROM "test" WHERE "id" = ? LIMIT 1"#);
        let d = delete(&def, 4);
        assert_eq!(d.sql, r#"DELETE FROM "test" WHERE "id" = ?"#);
        assert_eq!(d.params, vec![SqliteBindValue::Integer(4)]);
    }
}

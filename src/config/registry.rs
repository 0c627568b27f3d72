//! Schema registry: the declared shape of every collection, built once at startup and read-only afterwards.

use crate::config::types::{ColumnDef, SchemaDocument};
use crate::config::validator::{validate_identifier, ID_COLUMN};
use crate::error::ConfigError;
use std::collections::{HashMap, HashSet};

/// One collection's declared shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaDefinition {
    pub name: String,
    /// Declared columns in document order. Names are unique ignoring ASCII case, as SQLite compares them.
    pub columns: Vec<ColumnDef>,
}

impl SchemaDefinition {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    definitions: HashMap<String, SchemaDefinition>,
    /// Registration order, so migration and listings are reproducible.
    order: Vec<String>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collection. A second registration of the same name (in any ASCII case) is rejected,
    /// since both would resolve to one SQLite table.
    pub fn register(&mut self, name: &str, columns: Vec<ColumnDef>) -> Result<(), ConfigError> {
        validate_identifier("collection", name)?;
        if self.order.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            return Err(ConfigError::DuplicateCollection(name.to_string()));
        }
        let mut seen = HashSet::new();
        for c in &columns {
            validate_identifier("column", &c.name)?;
            if c.name.eq_ignore_ascii_case(ID_COLUMN) {
                return Err(ConfigError::ReservedColumn {
                    collection: name.to_string(),
                    column: c.name.clone(),
                });
            }
            if !seen.insert(c.name.to_ascii_lowercase()) {
                return Err(ConfigError::DuplicateColumn {
                    collection: name.to_string(),
                    column: c.name.clone(),
                });
            }
        }
        self.definitions.insert(
            name.to_string(),
            SchemaDefinition {
                name: name.to_string(),
                columns,
            },
        );
        self.order.push(name.to_string());
        Ok(())
    }

    pub fn register_document(&mut self, name: &str, doc: SchemaDocument) -> Result<(), ConfigError> {
        self.register(name, doc.columns)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&SchemaDefinition> {
        self.definitions.get(name)
    }

    /// True iff `provided` is exactly the registered column set (order irrelevant).
    /// `None` only checks that the collection exists.
    pub fn is_shape_valid(&self, name: &str, provided: Option<&[&str]>) -> bool {
        let Some(def) = self.definitions.get(name) else {
            return false;
        };
        let Some(provided) = provided else {
            return true;
        };
        let provided: HashSet<&str> = provided.iter().copied().collect();
        provided.len() == def.columns.len() && def.column_names().all(|c| provided.contains(c))
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &SchemaDefinition> {
        self.order.iter().filter_map(|n| self.definitions.get(n))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

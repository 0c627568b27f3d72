//! Raw schema document types: one JSON object per collection mapping column name to type tag.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One declared column: name and storage type tag (e.g. `TEXT`, `INTEGER`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub type_tag: String,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        ColumnDef {
            name: name.into(),
            type_tag: type_tag.into(),
        }
    }
}

/// Parsed schema document. Column order follows the document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SchemaDocument {
    pub columns: Vec<ColumnDef>,
}

impl<'de> Deserialize<'de> for SchemaDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let obj = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        let mut columns = Vec::with_capacity(obj.len());
        for (name, tag) in obj {
            match tag {
                serde_json::Value::String(type_tag) => columns.push(ColumnDef { name, type_tag }),
                other => {
                    return Err(serde::de::Error::custom(format!(
                        "column '{}': type tag must be a string, got {}",
                        name, other
                    )))
                }
            }
        }
        Ok(SchemaDocument { columns })
    }
}

impl Serialize for SchemaDocument {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let obj: serde_json::Map<String, serde_json::Value> = self
            .columns
            .iter()
            .map(|c| (c.name.clone(), serde_json::Value::String(c.type_tag.clone())))
            .collect();
        obj.serialize(serializer)
    }
}

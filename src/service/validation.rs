//! Request validation against the registry. Runs before any storage round trip.

use crate::config::{SchemaDefinition, SchemaRegistry};
use crate::error::AppError;
use serde_json::{Map, Value};

pub struct RequestValidator;

impl RequestValidator {
    /// Existence check used by read, update and delete.
    pub fn collection<'r>(registry: &'r SchemaRegistry, collection: &str) -> Result<&'r SchemaDefinition, AppError> {
        registry
            .get(collection)
            .ok_or_else(|| AppError::UnknownCollection(collection.to_string()))
    }

    /// Create: the payload's field set must equal the declared column set exactly.
    pub fn validate<'r>(
        registry: &'r SchemaRegistry,
        collection: &str,
        payload: &Map<String, Value>,
    ) -> Result<&'r SchemaDefinition, AppError> {
        let def = Self::collection(registry, collection)?;
        let fields: Vec<&str> = payload.keys().map(String::as_str).collect();
        if !registry.is_shape_valid(collection, Some(fields.as_slice())) {
            return Err(AppError::ShapeMismatch {
                collection: collection.to_string(),
            });
        }
        Ok(def)
    }

    /// Update: any non-empty subset of the declared columns.
    pub fn validate_partial<'r>(
        registry: &'r SchemaRegistry,
        collection: &str,
        payload: &Map<String, Value>,
    ) -> Result<&'r SchemaDefinition, AppError> {
        let def = Self::collection(registry, collection)?;
        if payload.is_empty() {
            return Err(AppError::BadRequest("update requires at least one field".into()));
        }
        if let Some(field) = payload.keys().find(|k| !def.has_column(k)) {
            return Err(AppError::UnknownField {
                collection: collection.to_string(),
                field: field.clone(),
            });
        }
        Ok(def)
    }
}

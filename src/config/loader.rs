//! Load schema documents from a directory (`<collection>.json`) and build the registry.

use crate::config::registry::SchemaRegistry;
use crate::config::types::SchemaDocument;
use crate::error::ConfigError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Read every `*.json` in `dir` in file-name order. The file stem is the collection name;
/// stems listed in `exclude` are skipped.
pub async fn load_schema_dir(
    dir: &Path,
    exclude: &HashSet<String>,
) -> Result<Vec<(String, SchemaDocument)>, ConfigError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", dir.display(), e)))?;
    let mut files: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", dir.display(), e)))?
    {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            files.push(path);
        }
    }
    files.sort();

    let mut out = Vec::with_capacity(files.len());
    for path in files {
        let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            tracing::warn!(path = %path.display(), "skipping schema file with non-UTF-8 name");
            continue;
        };
        if exclude.contains(&name) {
            tracing::debug!(collection = %name, "schema excluded");
            continue;
        }
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
        let doc: SchemaDocument =
            serde_json::from_str(&raw).map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
        out.push((name, doc));
    }
    Ok(out)
}

/// Build the registry from loaded documents (one loading pass).
pub fn build_registry(
    docs: impl IntoIterator<Item = (String, SchemaDocument)>,
) -> Result<SchemaRegistry, ConfigError> {
    let mut registry = SchemaRegistry::new();
    for (name, doc) in docs {
        registry.register_document(&name, doc)?;
    }
    Ok(registry)
}

/// `load_schema_dir` followed by `build_registry`.
pub async fn load_registry(dir: &Path, exclude: &HashSet<String>) -> Result<SchemaRegistry, ConfigError> {
    let docs = load_schema_dir(dir, exclude).await?;
    let registry = build_registry(docs)?;
    tracing::info!(collections = registry.len(), dir = %dir.display(), "schemas loaded");
    Ok(registry)
}

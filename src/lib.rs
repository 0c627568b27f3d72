//! Collection proxy: schema-driven CRUD over SQLite tables declared as JSON schema documents.

pub mod config;
pub mod error;
pub mod migration;
pub mod response;
pub mod sql;
pub mod state;
pub mod store;
pub mod service;
pub mod handlers;
pub mod routes;

pub use config::{build_registry, load_registry, ColumnDef, ProxySettings, SchemaDefinition, SchemaDocument, SchemaRegistry};
pub use error::{AppError, ConfigError, MigrationError};
pub use migration::{apply_migrations, MigrationAction, MigrationReport};
pub use state::AppState;
pub use store::{connect, ensure_database_exists, TableCatalogEntry};
pub use routes::{app, collection_routes, common_routes_with_ready};
pub use service::CrudService;

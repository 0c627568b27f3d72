//! Typed errors and HTTP mapping.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors raised while loading schema documents and building the registry.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("duplicate collection: {0}")]
    DuplicateCollection(String),
    #[error("duplicate column '{column}' in collection {collection}")]
    DuplicateColumn { collection: String, column: String },
    #[error("invalid {kind} name: '{name}'")]
    InvalidIdentifier { kind: &'static str, name: String },
    #[error("column '{column}' in collection {collection} is reserved")]
    ReservedColumn { collection: String, column: String },
    #[error("config load: {0}")]
    Load(String),
    #[error("invalid setting {key}: {message}")]
    Setting { key: &'static str, message: String },
}

/// Failure to bring one collection's table in line with its schema.
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("collection {collection}: invalid type tag '{tag}' for column {column}")]
    InvalidTypeTag {
        collection: String,
        column: String,
        tag: String,
    },
    #[error("collection {collection}: {source}")]
    Db {
        collection: String,
        #[source]
        source: sqlx::Error,
    },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid collection name: {0}")]
    UnknownCollection(String),
    #[error("payload fields do not match the schema of collection {collection}")]
    ShapeMismatch { collection: String },
    #[error("unknown field '{field}' for collection {collection}")]
    UnknownField { collection: String, field: String },
    #[error("no record found with id {0}")]
    NotFound(i64),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Config(_) | AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UnknownCollection(_)
            | AppError::ShapeMismatch { .. }
            | AppError::UnknownField { .. }
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

//! Collection CRUD handlers: create, read, update, delete, plus the API index.

use crate::error::AppError;
use crate::response::{self, created, message_ok, success_many};
use crate::service::CrudService;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Request body envelope: `{ "data": { field: value, ... } }`.
#[derive(Deserialize)]
struct DataBody {
    data: Map<String, Value>,
}

fn data_payload(body: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, AppError> {
    let Json(body) = body?;
    let DataBody { data } = serde_json::from_value(body)
        .map_err(|_| AppError::BadRequest("body must be an object with a 'data' object".into()))?;
    Ok(data)
}

fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id: {}", id_str)))
}

/// Fails with `UnknownCollection` before the id or body are looked at.
fn require_collection(state: &AppState, collection: &str) -> Result<(), AppError> {
    if state.registry.exists(collection) {
        Ok(())
    } else {
        Err(AppError::UnknownCollection(collection.to_string()))
    }
}

pub async fn index(State(state): State<AppState>) -> Json<Value> {
    Json(serde_json::json!({
        "api_version": 1,
        "available_endpoints": [
            { "endpoint": "/:collection", "method": "POST" },
            { "endpoint": "/:collection/:id", "method": "GET" },
            { "endpoint": "/:collection/:id", "method": "POST" },
            { "endpoint": "/:collection/:id", "method": "DELETE" },
        ],
        "collections": state.registry.names().collect::<Vec<_>>(),
    }))
}

pub async fn create(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    require_collection(&state, &collection)?;
    let data = data_payload(body)?;
    let id = CrudService::create(&state.pool, &state.registry, &collection, &data).await?;
    Ok(created(id))
}

pub async fn read(
    State(state): State<AppState>,
    Path((collection, id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    require_collection(&state, &collection)?;
    let id = parse_id(&id_str)?;
    let rows = CrudService::read(&state.pool, &state.registry, &collection, id).await?;
    Ok(success_many(rows))
}

pub async fn update(
    State(state): State<AppState>,
    Path((collection, id_str)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    require_collection(&state, &collection)?;
    let id = parse_id(&id_str)?;
    let data = data_payload(body)?;
    CrudService::update(&state.pool, &state.registry, &collection, id, &data).await?;
    Ok(message_ok(response::UPDATED))
}

pub async fn delete(
    State(state): State<AppState>,
    Path((collection, id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    require_collection(&state, &collection)?;
    let id = parse_id(&id_str)?;
    CrudService::delete(&state.pool, &state.registry, &collection, id).await?;
    Ok(message_ok(response::DELETED))
}

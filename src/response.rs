//! Standard response envelope helpers.

use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct SuccessMany<T> {
    pub data: Vec<T>,
}

#[derive(Serialize)]
pub struct Message {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

pub const CREATED: &str = "Record created successfully";
pub const UPDATED: &str = "Record updated successfully";
pub const DELETED: &str = "Record deleted successfully";

pub fn created(id: i64) -> (StatusCode, Json<Message>) {
    (
        StatusCode::CREATED,
        Json(Message {
            message: CREATED,
            id: Some(id),
        }),
    )
}

pub fn message_ok(message: &'static str) -> (StatusCode, Json<Message>) {
    (StatusCode::OK, Json(Message { message, id: None }))
}

pub fn success_many<T: Serialize>(data: Vec<T>) -> (StatusCode, Json<SuccessMany<T>>) {
    (StatusCode::OK, Json(SuccessMany { data }))
}

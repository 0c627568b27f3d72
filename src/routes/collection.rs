//! Collection CRUD routes. Parameterized paths: handlers resolve the collection against the registry.

use crate::handlers::collection::{create, delete as delete_handler, index, read, update};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn collection_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/:collection", post(create))
        .route(
            "/:collection/:id",
            get(read).post(update).delete(delete_handler),
        )
        .with_state(state)
}

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use collection_proxy::{app, apply_migrations, AppState};
use common::{contacts_registry, memory_pool, row_count};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

async fn setup() -> (Router, SqlitePool) {
    let pool = memory_pool().await;
    let registry = contacts_registry();
    assert!(apply_migrations(&pool, &registry).await.is_clean());
    let router = app(AppState::new(pool.clone(), registry), 1024 * 1024);
    (router, pool)
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let res = router.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn rachit() -> Value {
    json!({
        "data": {
            "name": "Rachit",
            "phone": "9876543210",
            "email": "user@domain.tld",
            "location": "India"
        }
    })
}

#[tokio::test]
async fn full_record_lifecycle() {
    let (router, _pool) = setup().await;

    let (status, body) = send(&router, Method::POST, "/api/test", Some(rachit())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Record created successfully");
    assert_eq!(body["id"], 1);

    let (status, body) = send(&router, Method::GET, "/api/test/1", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], 1);
    assert_eq!(rows[0]["name"], "Rachit");
    assert_eq!(rows[0]["phone"], "9876543210");

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/test/1",
        Some(json!({"data": {"phone": "1234567890"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Record updated successfully");

    let (_, body) = send(&router, Method::GET, "/api/test/1", None).await;
    let row = &body["data"][0];
    assert_eq!(row["phone"], "1234567890");
    assert_eq!(row["name"], "Rachit");
    assert_eq!(row["email"], "user@domain.tld");
    assert_eq!(row["location"], "India");

    let (status, body) = send(&router, Method::DELETE, "/api/test/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Record deleted successfully");

    let (status, body) = send(&router, Method::GET, "/api/test/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn unknown_collection_is_rejected_without_writes() {
    let (router, pool) = setup().await;

    let (status, body) = send(&router, Method::POST, "/api/nope", Some(rachit())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("nope"));

    for (method, body) in [
        (Method::GET, None),
        (Method::POST, Some(json!({"data": {"phone": "1"}}))),
        (Method::DELETE, None),
    ] {
        let (status, body) = send(&router, method, "/api/nope/1", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
    assert_eq!(row_count(&pool, "test").await, 0);
}

#[tokio::test]
async fn create_requires_exact_shape() {
    let (router, pool) = setup().await;

    let subset = json!({"data": {"name": "a", "phone": "1", "email": "e"}});
    let superset = json!({"data": {"name": "a", "phone": "1", "email": "e", "location": "l", "age": 3}});
    for payload in [subset, superset, json!({"data": {}})] {
        let (status, body) = send(&router, Method::POST, "/api/test", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
    assert_eq!(row_count(&pool, "test").await, 0);
}

#[tokio::test]
async fn missing_id_is_not_found() {
    let (router, _pool) = setup().await;
    send(&router, Method::POST, "/api/test", Some(rachit())).await;

    let (status, body) = send(&router, Method::GET, "/api/test/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.get("data").is_none());

    let (status, _) = send(&router, Method::POST, "/api/test/999", Some(json!({"data": {"phone": "1"}}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&router, Method::DELETE, "/api/test/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_requests_are_client_errors() {
    let (router, pool) = setup().await;
    send(&router, Method::POST, "/api/test", Some(rachit())).await;

    let cases = [
        (Method::GET, "/api/test/abc", None),
        (Method::POST, "/api/test", Some(json!({"name": "no envelope"}))),
        (Method::POST, "/api/test/1", Some(json!({"data": {}}))),
        (Method::POST, "/api/test/1", Some(json!({"data": {"id": 5}}))),
        (Method::POST, "/api/test/1", Some(json!({"data": {"phone": ["1", "2"]}}))),
    ];
    for (method, uri, body) in cases {
        let (status, body) = send(&router, method, uri, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string());
    }

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/test")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = router.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let (_, body) = send(&router, Method::GET, "/api/test/1", None).await;
    assert_eq!(body["data"][0]["phone"], "9876543210");
    assert_eq!(row_count(&pool, "test").await, 1);
}

#[tokio::test]
async fn ids_increase_per_insert() {
    let (router, _pool) = setup().await;
    for expected in 1..=3 {
        let (status, body) = send(&router, Method::POST, "/api/test", Some(rachit())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], expected);
    }
    send(&router, Method::DELETE, "/api/test/3", None).await;
    let (_, body) = send(&router, Method::POST, "/api/test", Some(rachit())).await;
    assert_eq!(body["id"], 4);
}

#[tokio::test]
async fn index_and_operational_routes() {
    let (router, _pool) = setup().await;

    let (status, body) = send(&router, Method::GET, "/api", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["collections"], json!(["test"]));
    assert_eq!(body["available_endpoints"].as_array().unwrap().len(), 4);

    let (status, body) = send(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&router, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");
    assert_eq!(body["collections"], 1);
}

#[tokio::test]
async fn storage_failure_is_a_server_error() {
    let (router, pool) = setup().await;
    sqlx::query(r#"DROP TABLE "test""#).execute(&pool).await.unwrap();

    let (status, body) = send(&router, Method::POST, "/api/test", Some(rachit())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("no such table"));
}

#![allow(dead_code)]

use std::sync::{Arc, Once};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::{json, Value};
use tower::ServiceExt;

use eatery_api::api::create_api_router;
use eatery_api::entities::setup_schema;

static INIT: Once = Once::new();

/// Fresh app over a private in-memory database. One connection keeps the
/// whole test on the same SQLite instance.
pub async fn test_app() -> (Router, Arc<DatabaseConnection>) {
    INIT.call_once(|| {
        std::env::set_var("JWT_SECRET_KEY", "test-secret-key");
    });

    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options.max_connections(1);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    setup_schema(&db).await.expect("Failed to create schema");

    let db = Arc::new(db);
    (create_api_router(db.clone()), db)
}

pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    bearer: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .expect("Failed to build request"),
        None => builder.body(Body::empty()).expect("Failed to build request"),
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to run request");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, body)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    request(app, "GET", uri, None, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    request(app, "POST", uri, Some(body), None).await
}

pub async fn put_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    request(app, "PUT", uri, Some(body), None).await
}

pub async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    request(app, "DELETE", uri, None, None).await
}

/// Monetary fields serialize as decimal strings; accept a bare number too.
pub fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().expect("number out of range"),
        Value::String(s) => s.parse().expect("not a numeric string"),
        other => panic!("expected a numeric value, got {other:?}"),
    }
}

pub async fn seed_customer(app: &Router) -> i32 {
    let (status, body) = post_json(
        app,
        "/api/v1/customer/register",
        json!({
            "full_name": "Ada Lovelace",
            "contact": "0700000001",
            "email": "ada@example.com",
            "password": "S3curePass",
            "address": "12 Engine Rd",
            "customer_type": "individual",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "seed customer failed: {body}");
    body["customer"]["id"].as_i64().expect("customer id") as i32
}

pub async fn seed_admin(app: &Router) -> i32 {
    let (status, body) = post_json(
        app,
        "/api/v1/auth/register",
        json!({
            "full_name": "Grace Hopper",
            "contact": "0700000002",
            "email": "grace@example.com",
            "password": "FlowMatic1",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "seed admin failed: {body}");
    body["user"]["id"].as_i64().expect("admin id") as i32
}

pub async fn seed_staff(app: &Router) -> i32 {
    let (status, body) = post_json(
        app,
        "/api/v1/users/",
        json!({
            "full_name": "Joe Armstrong",
            "contact": "0700000003",
            "email": "joe@example.com",
            "password": "LetItCrash",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "seed staff failed: {body}");
    body["user"]["id"].as_i64().expect("staff id") as i32
}

pub async fn seed_menu_item(app: &Router, name: &str, price: i64) -> i32 {
    let (status, body) = post_json(
        app,
        "/api/v1/menu-items/create",
        json!({"name": name, "price": price, "category": "MEALS"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "seed menu item failed: {body}");
    body["menu_item"]["id"].as_i64().expect("menu item id") as i32
}

pub async fn seed_order(app: &Router, customer_id: i32) -> i32 {
    let (status, body) = post_json(
        app,
        "/api/v1/orders/create",
        json!({
            "customer_id": customer_id,
            "total_amount": 45000,
            "payment_status": "pending",
            "delivery_status": "pending",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "seed order failed: {body}");
    body["order"]["id"].as_i64().expect("order id") as i32
}

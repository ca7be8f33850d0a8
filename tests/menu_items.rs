mod common;

use axum::http::StatusCode;
use serde_json::json;
use std::collections::HashSet;

use common::{as_f64, delete, get, post_json, put_json, test_app};

#[tokio::test]
async fn populate_is_idempotent() {
    let (app, _db) = test_app().await;

    let (status, _) = post_json(&app, "/api/v1/menu-items/populate", json!({})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = post_json(&app, "/api/v1/menu-items/populate", json!({})).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = get(&app, "/api/v1/menu-items").await;
    assert_eq!(status, StatusCode::OK);

    let items = body.as_array().expect("array of menu items");
    assert_eq!(items.len(), 14);

    let names: HashSet<&str> = items
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 14, "populate duplicated a seed item");
    assert!(names.contains("Jollof Rice"));
}

#[tokio::test]
async fn create_requires_name_price_and_category() {
    let (app, _db) = test_app().await;

    let (status, body) = post_json(
        &app,
        "/api/v1/menu-items/create",
        json!({"price": 5000, "category": "MEALS"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required field: name");

    let (status, body) = post_json(
        &app,
        "/api/v1/menu-items/create",
        json!({"name": "Chapati", "category": "MEALS"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required field: price");

    let (status, _) = post_json(
        &app,
        "/api/v1/menu-items/create",
        json!({"name": "Chapati", "price": 2000}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_rejects_negative_price() {
    let (app, _db) = test_app().await;

    let (status, body) = post_json(
        &app,
        "/api/v1/menu-items/create",
        json!({"name": "Chapati", "price": -1, "category": "MEALS"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Price must be non-negative");
}

#[tokio::test]
async fn create_defaults_image_key_and_availability() {
    let (app, _db) = test_app().await;

    let (status, body) = post_json(
        &app,
        "/api/v1/menu-items/create",
        json!({"name": "Chapati", "price": 2000, "category": "MEALS"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["menu_item"]["image_key"], "meal1.jpg");
    assert_eq!(body["menu_item"]["available"], true);
    assert_eq!(as_f64(&body["menu_item"]["price"]), 2000.0);
}

#[tokio::test]
async fn update_is_partial_and_delete_removes_row() {
    let (app, _db) = test_app().await;

    let (status, body) = post_json(
        &app,
        "/api/v1/menu-items/create",
        json!({
            "name": "Chapati",
            "price": 2000,
            "category": "SNACKS",
            "description": "Flatbread",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["menu_item"]["id"].as_i64().unwrap();

    let (status, body) = put_json(
        &app,
        &format!("/api/v1/menu-items/{id}"),
        json!({"price": 2500, "available": false}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(as_f64(&body["menu_item"]["price"]), 2500.0);
    assert_eq!(body["menu_item"]["available"], false);
    assert_eq!(body["menu_item"]["name"], "Chapati");
    assert_eq!(body["menu_item"]["description"], "Flatbread");

    let (status, _) = delete(&app, &format!("/api/v1/menu-items/{id}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&app, &format!("/api/v1/menu-items/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_item_is_not_found() {
    let (app, _db) = test_app().await;

    let (status, body) = get(&app, "/api/v1/menu-items/4242").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Menu item not found");

    let (status, _) = put_json(&app, "/api/v1/menu-items/4242", json!({"price": 1})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = delete(&app, "/api/v1/menu-items/4242").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

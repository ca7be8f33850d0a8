mod common;

use axum::http::StatusCode;
use sea_orm::EntityTrait;
use serde_json::json;

use common::{
    as_f64, delete, get, post_json, put_json, seed_admin, seed_customer, seed_menu_item,
    seed_order, seed_staff, test_app,
};
use eatery_api::entities::{customer, order};

#[tokio::test]
async fn create_order_requires_fields() {
    let (app, _db) = test_app().await;
    let customer_id = seed_customer(&app).await;

    let (status, body) = post_json(
        &app,
        "/api/v1/orders/create",
        json!({
            "customer_id": customer_id,
            "payment_status": "pending",
            "delivery_status": "pending",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing field: total_amount");
}

#[tokio::test]
async fn create_order_with_unknown_customer_persists_nothing() {
    let (app, _db) = test_app().await;

    let (status, body) = post_json(
        &app,
        "/api/v1/orders/create",
        json!({
            "customer_id": 999,
            "total_amount": 1000,
            "payment_status": "pending",
            "delivery_status": "pending",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Invalid customer_id");

    let (status, body) = get(&app, "/api/v1/orders/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn create_order_validates_statuses_and_handler() {
    let (app, _db) = test_app().await;
    let customer_id = seed_customer(&app).await;

    let (status, _) = post_json(
        &app,
        "/api/v1/orders/create",
        json!({
            "customer_id": customer_id,
            "total_amount": 1000,
            "payment_status": "definitely-not-a-status",
            "delivery_status": "pending",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post_json(
        &app,
        "/api/v1/orders/create",
        json!({
            "customer_id": customer_id,
            "handler_id": 999,
            "total_amount": 1000,
            "payment_status": "pending",
            "delivery_status": "pending",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Invalid handler_id");

    let handler_id = seed_admin(&app).await;
    let (status, body) = post_json(
        &app,
        "/api/v1/orders/create",
        json!({
            "customer_id": customer_id,
            "handler_id": handler_id,
            "total_amount": 1000,
            "payment_status": "pending",
            "delivery_status": "pending",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["order"]["handler_id"], handler_id);
    assert_eq!(body["order"]["payment_status"], "pending");
    assert!(body["order"]["order_date"].is_string());
}

#[tokio::test]
async fn order_item_subtotal_follows_catalog_price() {
    let (app, _db) = test_app().await;
    let customer_id = seed_customer(&app).await;
    let order_id = seed_order(&app, customer_id).await;
    let rice = seed_menu_item(&app, "Fried Rice", 15000).await;
    let water = seed_menu_item(&app, "Water", 2000).await;

    // client-supplied subtotal must be ignored
    let (status, body) = post_json(
        &app,
        "/api/v1/order-items/create",
        json!({
            "order_id": order_id,
            "menu_item_id": rice,
            "quantity": 3,
            "subtotal": 1,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let item_id = body["order_item"]["id"].as_i64().unwrap();
    assert_eq!(as_f64(&body["order_item"]["subtotal"]), 45000.0);

    // quantity change recomputes
    let (status, body) = put_json(
        &app,
        &format!("/api/v1/order-items/{item_id}"),
        json!({"quantity": 5}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(as_f64(&body["order_item"]["subtotal"]), 75000.0);

    // menu item change re-resolves the price
    let (status, body) = put_json(
        &app,
        &format!("/api/v1/order-items/{item_id}"),
        json!({"menu_item_id": water}),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(as_f64(&body["order_item"]["subtotal"]), 10000.0);

    let (status, body) = get(&app, &format!("/api/v1/order-items/{item_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_f64(&body["subtotal"]), 10000.0);
}

#[tokio::test]
async fn order_item_creation_rejects_dangling_references() {
    let (app, _db) = test_app().await;
    let customer_id = seed_customer(&app).await;
    let order_id = seed_order(&app, customer_id).await;
    let rice = seed_menu_item(&app, "Fried Rice", 15000).await;

    let (status, body) = post_json(
        &app,
        "/api/v1/order-items/create",
        json!({"order_id": 999, "menu_item_id": rice, "quantity": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid order_id: order does not exist");

    let (status, body) = post_json(
        &app,
        "/api/v1/order-items/create",
        json!({"order_id": order_id, "menu_item_id": 999, "quantity": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid menu_item_id: menu item does not exist");

    let (status, body) = post_json(
        &app,
        "/api/v1/order-items/create",
        json!({"order_id": order_id, "menu_item_id": rice}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required fields");
}

#[tokio::test]
async fn deleting_an_order_cascades_to_items_but_customers_do_not_cascade() {
    let (app, db) = test_app().await;
    let customer_id = seed_customer(&app).await;
    let order_id = seed_order(&app, customer_id).await;
    let rice = seed_menu_item(&app, "Fried Rice", 15000).await;
    let water = seed_menu_item(&app, "Water", 2000).await;

    for menu_item_id in [rice, water] {
        let (status, _) = post_json(
            &app,
            "/api/v1/order-items/create",
            json!({"order_id": order_id, "menu_item_id": menu_item_id, "quantity": 2}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // deleting the customer under a live order violates the FK: no cascade
    let result = customer::Entity::delete_by_id(customer_id).exec(&*db).await;
    assert!(result.is_err(), "customer delete should be restricted");
    let remaining = order::Entity::find().all(&*db).await.unwrap();
    assert_eq!(remaining.len(), 1);

    let (status, _) = delete(&app, &format!("/api/v1/orders/{order_id}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&app, "/api/v1/order-items/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0, "items should cascade");

    let (status, _) = get(&app, &format!("/api/v1/orders/{order_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delivery_status_cannot_move_backwards() {
    let (app, _db) = test_app().await;
    let customer_id = seed_customer(&app).await;

    let (status, body) = post_json(
        &app,
        "/api/v1/orders/create",
        json!({
            "customer_id": customer_id,
            "total_amount": 5000,
            "payment_status": "paid",
            "delivery_status": "delivered",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = body["order"]["id"].as_i64().unwrap();

    let (status, body) = put_json(
        &app,
        &format!("/api/v1/orders/{order_id}"),
        json!({"delivery_status": "pending"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, body) = get(&app, &format!("/api/v1/orders/{order_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delivery_status"], "delivered", "row must be unchanged");
}

#[tokio::test]
async fn one_delivery_per_order() {
    let (app, _db) = test_app().await;
    let customer_id = seed_customer(&app).await;
    let order_id = seed_order(&app, customer_id).await;
    let staff_id = seed_staff(&app).await;

    let payload = json!({
        "order_id": order_id,
        "staff_id": staff_id,
        "delivery_address": "12 Engine Rd",
        "delivery_type": "home",
        "delivery_status": "pending",
    });

    let (status, body) = post_json(&app, "/api/v1/deliveries/register", payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let delivery_id = body["delivery"]["delivery_id"].as_i64().unwrap();
    assert!(body["delivery"]["delivery_date"].is_string());

    let (status, body) = post_json(&app, "/api/v1/deliveries/register", payload).await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");

    // forward transition is allowed, backwards is not
    let (status, _) = put_json(
        &app,
        &format!("/api/v1/deliveries/{delivery_id}"),
        json!({"delivery_status": "delivered"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = put_json(
        &app,
        &format!("/api/v1/deliveries/{delivery_id}"),
        json!({"delivery_status": "preparing"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // deleting the order removes its delivery record
    let (status, _) = delete(&app, &format!("/api/v1/orders/{order_id}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&app, &format!("/api/v1/deliveries/{delivery_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delivery_creation_validates_references() {
    let (app, _db) = test_app().await;
    let customer_id = seed_customer(&app).await;
    let order_id = seed_order(&app, customer_id).await;

    let (status, body) = post_json(
        &app,
        "/api/v1/deliveries/register",
        json!({
            "order_id": 999,
            "staff_id": 1,
            "delivery_address": "12 Engine Rd",
            "delivery_type": "home",
            "delivery_status": "pending",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Invalid order_id");

    let (status, body) = post_json(
        &app,
        "/api/v1/deliveries/register",
        json!({
            "order_id": order_id,
            "staff_id": 999,
            "delivery_address": "12 Engine Rd",
            "delivery_type": "home",
            "delivery_status": "pending",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Invalid staff_id");

    let (status, body) = post_json(
        &app,
        "/api/v1/deliveries/register",
        json!({"order_id": order_id, "staff_id": 1}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing field: delivery_address");
}

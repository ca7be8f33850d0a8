use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::internal_error;
use crate::entities::order_item::{self, compute_subtotal, Entity as OrderItemEntity};
use crate::entities::{menu_item, order};

//ROUTERS
pub fn order_items_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/order-items", get(get_all_order_items))
        .route("/order-items/", get(get_all_order_items))
        .route("/order-items/create", post(create_order_item))
        .route(
            "/order-items/:id",
            get(get_order_item)
                .put(update_order_item)
                .delete(delete_order_item),
        )
        .layer(Extension(db))
}

//ROUTES
async fn get_all_order_items(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match OrderItemEntity::find().all(&*db).await {
        Ok(items) => {
            let items: Vec<Value> = items.iter().map(serialize_order_item).collect();
            (StatusCode::OK, Json(json!(items)))
        }
        Err(err) => internal_error(err),
    }
}

async fn get_order_item(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match OrderItemEntity::find_by_id(id).one(&*db).await {
        Ok(Some(item)) => (StatusCode::OK, Json(serialize_order_item(&item))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Order item not found"})),
        ),
        Err(err) => internal_error(err),
    }
}

async fn create_order_item(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateOrderItemPayload>,
) -> impl IntoResponse {
    let (order_id, menu_item_id, quantity) =
        match (payload.order_id, payload.menu_item_id, payload.quantity) {
            (Some(order_id), Some(menu_item_id), Some(quantity)) => {
                (order_id, menu_item_id, quantity)
            }
            _ => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"message": "Missing required fields"})),
                );
            }
        };

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    match order::Entity::find_by_id(order_id).one(&txn).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Invalid order_id: order does not exist"})),
            );
        }
        Err(err) => return internal_error(err),
    }

    let menu_item = match menu_item::Entity::find_by_id(menu_item_id).one(&txn).await {
        Ok(Some(menu_item)) => menu_item,
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Invalid menu_item_id: menu item does not exist"})),
            );
        }
        Err(err) => return internal_error(err),
    };

    let new_item = order_item::ActiveModel {
        order_id: Set(order_id),
        menu_item_id: Set(menu_item_id),
        quantity: Set(quantity),
        subtotal: Set(compute_subtotal(menu_item.price, quantity)),
        ..Default::default()
    };

    let created = match new_item.insert(&txn).await {
        Ok(model) => model,
        Err(err) => {
            let _ = txn.rollback().await;
            return internal_error(err);
        }
    };

    if let Err(err) = txn.commit().await {
        return internal_error(err);
    }

    (
        StatusCode::CREATED,
        Json(json!({
            "message": "Order item created successfully",
            "order_item": serialize_order_item(&created),
        })),
    )
}

/// Re-resolves the (possibly new) menu item and recomputes the subtotal
/// from its current price, so `subtotal == price * quantity` holds after
/// every update, not just creation.
async fn update_order_item(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<UpdateOrderItemPayload>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    let existing = match OrderItemEntity::find_by_id(id).one(&txn).await {
        Ok(Some(item)) => item,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Order item not found"})),
            );
        }
        Err(err) => return internal_error(err),
    };

    let new_quantity = payload.quantity.unwrap_or(existing.quantity);
    let new_menu_item_id = payload.menu_item_id.unwrap_or(existing.menu_item_id);

    let menu_item = match menu_item::Entity::find_by_id(new_menu_item_id)
        .one(&txn)
        .await
    {
        Ok(Some(menu_item)) => menu_item,
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Invalid menu_item_id: menu item does not exist"})),
            );
        }
        Err(err) => return internal_error(err),
    };

    let mut item: order_item::ActiveModel = existing.into();
    item.menu_item_id = Set(new_menu_item_id);
    item.quantity = Set(new_quantity);
    item.subtotal = Set(compute_subtotal(menu_item.price, new_quantity));

    let updated = match item.update(&txn).await {
        Ok(model) => model,
        Err(err) => {
            let _ = txn.rollback().await;
            return internal_error(err);
        }
    };

    if let Err(err) = txn.commit().await {
        return internal_error(err);
    }

    (
        StatusCode::OK,
        Json(json!({
            "message": "Order item updated successfully",
            "order_item": serialize_order_item(&updated),
        })),
    )
}

async fn delete_order_item(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    let existing = match OrderItemEntity::find_by_id(id).one(&txn).await {
        Ok(Some(item)) => item,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Order item not found"})),
            );
        }
        Err(err) => return internal_error(err),
    };

    let item: order_item::ActiveModel = existing.into();
    if let Err(err) = item.delete(&txn).await {
        let _ = txn.rollback().await;
        return internal_error(err);
    }

    if let Err(err) = txn.commit().await {
        return internal_error(err);
    }

    (
        StatusCode::OK,
        Json(json!({"message": "Order item deleted successfully"})),
    )
}

//utilities
fn serialize_order_item(item: &order_item::Model) -> Value {
    json!({
        "id": item.id,
        "order_id": item.order_id,
        "menu_item_id": item.menu_item_id,
        "quantity": item.quantity,
        "subtotal": item.subtotal,
    })
}

//structs
#[derive(Deserialize, Clone)]
struct CreateOrderItemPayload {
    order_id: Option<i32>,
    menu_item_id: Option<i32>,
    quantity: Option<i32>,
}

#[derive(Deserialize, Clone)]
struct UpdateOrderItemPayload {
    menu_item_id: Option<i32>,
    quantity: Option<i32>,
}

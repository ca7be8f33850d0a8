use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set, TransactionTrait};
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;

use crate::api::internal_error;
use crate::entities::order::{self, DeliveryStatus, Entity as OrderEntity, PaymentStatus};
use crate::entities::{admin_user, customer};

//ROUTERS
pub fn orders_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/orders", get(get_all_orders))
        .route("/orders/", get(get_all_orders))
        .route("/orders/create", post(create_order))
        .route(
            "/orders/:id",
            get(get_order).put(update_order).delete(delete_order),
        )
        .layer(Extension(db))
}

//ROUTES
async fn get_all_orders(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    match OrderEntity::find().all(&*db).await {
        Ok(orders) => {
            let orders: Vec<Value> = orders.iter().map(serialize_order).collect();
            (StatusCode::OK, Json(json!(orders)))
        }
        Err(err) => internal_error(err),
    }
}

async fn get_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match OrderEntity::find_by_id(id).one(&*db).await {
        Ok(Some(order)) => (StatusCode::OK, Json(serialize_order(&order))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Order not found"})),
        ),
        Err(err) => internal_error(err),
    }
}

async fn create_order(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateOrderPayload>,
) -> impl IntoResponse {
    let customer_id = match payload.customer_id {
        Some(customer_id) => customer_id,
        None => return missing_field("customer_id"),
    };
    let total_amount = match payload.total_amount {
        Some(total_amount) => total_amount,
        None => return missing_field("total_amount"),
    };
    let payment_status = match payload.payment_status {
        Some(raw) => match PaymentStatus::from_str(&raw) {
            Ok(status) => status,
            Err(err) => return (StatusCode::BAD_REQUEST, Json(json!({"message": err}))),
        },
        None => return missing_field("payment_status"),
    };
    let delivery_status = match payload.delivery_status {
        Some(raw) => match DeliveryStatus::from_str(&raw) {
            Ok(status) => status,
            Err(err) => return (StatusCode::BAD_REQUEST, Json(json!({"message": err}))),
        },
        None => return missing_field("delivery_status"),
    };

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    match customer::Entity::find_by_id(customer_id).one(&txn).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Invalid customer_id"})),
            );
        }
        Err(err) => return internal_error(err),
    }

    if let Some(handler_id) = payload.handler_id {
        match admin_user::Entity::find_by_id(handler_id).one(&txn).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({"message": "Invalid handler_id"})),
                );
            }
            Err(err) => return internal_error(err),
        }
    }

    let new_order = order::ActiveModel {
        customer_id: Set(customer_id),
        handler_id: Set(payload.handler_id),
        order_date: Set(Utc::now()),
        total_amount: Set(total_amount),
        payment_status: Set(payment_status),
        delivery_status: Set(delivery_status),
        description: Set(payload.description),
        ..Default::default()
    };

    let created = match new_order.insert(&txn).await {
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
            "message": "Order created successfully",
            "order": serialize_order(&created),
        })),
    )
}

async fn update_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<UpdateOrderPayload>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    let existing = match OrderEntity::find_by_id(id).one(&txn).await {
        Ok(Some(order)) => order,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Order not found"})),
            );
        }
        Err(err) => return internal_error(err),
    };

    let current_delivery_status = existing.delivery_status;
    let mut order: order::ActiveModel = existing.into();

    if let Some(customer_id) = payload.customer_id {
        match customer::Entity::find_by_id(customer_id).one(&txn).await {
            Ok(Some(_)) => order.customer_id = Set(customer_id),
            Ok(None) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({"message": "Invalid customer_id"})),
                );
            }
            Err(err) => return internal_error(err),
        }
    }

    if let Some(handler_id) = payload.handler_id {
        match admin_user::Entity::find_by_id(handler_id).one(&txn).await {
            Ok(Some(_)) => order.handler_id = Set(Some(handler_id)),
            Ok(None) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({"message": "Invalid handler_id"})),
                );
            }
            Err(err) => return internal_error(err),
        }
    }

    if let Some(total_amount) = payload.total_amount {
        order.total_amount = Set(total_amount);
    }

    if let Some(raw) = payload.payment_status {
        match PaymentStatus::from_str(&raw) {
            Ok(status) => order.payment_status = Set(status),
            Err(err) => return (StatusCode::BAD_REQUEST, Json(json!({"message": err}))),
        }
    }

    if let Some(raw) = payload.delivery_status {
        match DeliveryStatus::from_str(&raw) {
            Ok(status) => {
                if !current_delivery_status.can_transition_to(status) {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "message": format!(
                                "Cannot change delivery_status from {} to {}",
                                current_delivery_status.to_string(),
                                status.to_string()
                            )
                        })),
                    );
                }
                order.delivery_status = Set(status);
            }
            Err(err) => return (StatusCode::BAD_REQUEST, Json(json!({"message": err}))),
        }
    }

    if let Some(description) = payload.description {
        order.description = Set(Some(description));
    }

    match order.update(&txn).await {
        // an empty payload leaves the row as-is
        Ok(_) | Err(DbErr::RecordNotUpdated) => {}
        Err(err) => {
            let _ = txn.rollback().await;
            return internal_error(err);
        }
    }

    if let Err(err) = txn.commit().await {
        return internal_error(err);
    }

    (
        StatusCode::OK,
        Json(json!({"message": "Order updated successfully"})),
    )
}

/// Removing an order also removes its order items and delivery record
/// through the cascading foreign keys.
async fn delete_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    let existing = match OrderEntity::find_by_id(id).one(&txn).await {
        Ok(Some(order)) => order,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Order not found"})),
            );
        }
        Err(err) => return internal_error(err),
    };

    let order: order::ActiveModel = existing.into();
    if let Err(err) = order.delete(&txn).await {
        let _ = txn.rollback().await;
        return internal_error(err);
    }

    if let Err(err) = txn.commit().await {
        return internal_error(err);
    }

    (
        StatusCode::OK,
        Json(json!({"message": "Order deleted successfully"})),
    )
}

//utilities
fn serialize_order(order: &order::Model) -> Value {
    json!({
        "id": order.id,
        "customer_id": order.customer_id,
        "handler_id": order.handler_id,
        "order_date": order.order_date,
        "total_amount": order.total_amount,
        "payment_status": order.payment_status.to_string(),
        "delivery_status": order.delivery_status.to_string(),
        "description": order.description,
    })
}

fn missing_field(field: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"message": format!("Missing field: {}", field)})),
    )
}

//structs
#[derive(Deserialize, Clone)]
struct CreateOrderPayload {
    customer_id: Option<i32>,
    handler_id: Option<i32>,
    total_amount: Option<Decimal>,
    payment_status: Option<String>,
    delivery_status: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize, Clone)]
struct UpdateOrderPayload {
    customer_id: Option<i32>,
    handler_id: Option<i32>,
    total_amount: Option<Decimal>,
    payment_status: Option<String>,
    delivery_status: Option<String>,
    description: Option<String>,
}

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;

use crate::api::internal_error;
use crate::entities::delivery::{self, DeliveryStatus, Entity as DeliveryEntity};
use crate::entities::{order, user};

//ROUTERS
pub fn deliveries_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/deliveries", get(get_all_deliveries))
        .route("/deliveries/", get(get_all_deliveries))
        .route("/deliveries/register", post(create_delivery))
        .route(
            "/deliveries/:id",
            get(get_delivery).put(update_delivery).delete(delete_delivery),
        )
        .layer(Extension(db))
}

//ROUTES
async fn get_all_deliveries(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match DeliveryEntity::find().all(&*db).await {
        Ok(deliveries) => {
            let deliveries: Vec<Value> = deliveries.iter().map(serialize_delivery).collect();
            (StatusCode::OK, Json(json!(deliveries)))
        }
        Err(err) => internal_error(err),
    }
}

async fn get_delivery(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match DeliveryEntity::find_by_id(id).one(&*db).await {
        Ok(Some(d)) => (StatusCode::OK, Json(serialize_delivery(&d))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Delivery not found"})),
        ),
        Err(err) => internal_error(err),
    }
}

async fn create_delivery(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateDeliveryPayload>,
) -> impl IntoResponse {
    let order_id = match payload.order_id {
        Some(order_id) => order_id,
        None => return missing_field("order_id"),
    };
    let staff_id = match payload.staff_id {
        Some(staff_id) => staff_id,
        None => return missing_field("staff_id"),
    };
    let delivery_address = match payload.delivery_address {
        Some(delivery_address) => delivery_address,
        None => return missing_field("delivery_address"),
    };
    let delivery_type = match payload.delivery_type {
        Some(delivery_type) => delivery_type,
        None => return missing_field("delivery_type"),
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

    match order::Entity::find_by_id(order_id).one(&txn).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Invalid order_id"})),
            );
        }
        Err(err) => return internal_error(err),
    }

    match user::Entity::find_by_id(staff_id).one(&txn).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Invalid staff_id"})),
            );
        }
        Err(err) => return internal_error(err),
    }

    match DeliveryEntity::find()
        .filter(delivery::Column::OrderId.eq(order_id))
        .one(&txn)
        .await
    {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({"message": "Order already has a delivery"})),
            );
        }
        Ok(None) => {}
        Err(err) => return internal_error(err),
    }

    let new_delivery = delivery::ActiveModel {
        order_id: Set(order_id),
        staff_id: Set(staff_id),
        delivery_address: Set(delivery_address),
        delivery_type: Set(delivery_type),
        delivery_status: Set(delivery_status),
        description: Set(payload.description),
        delivery_date: Set(Utc::now()),
        ..Default::default()
    };

    let created = match new_delivery.insert(&txn).await {
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
            "message": "Delivery created successfully",
            "delivery": serialize_delivery(&created),
        })),
    )
}

async fn update_delivery(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<UpdateDeliveryPayload>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    let existing = match DeliveryEntity::find_by_id(id).one(&txn).await {
        Ok(Some(d)) => d,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Delivery not found"})),
            );
        }
        Err(err) => return internal_error(err),
    };

    let current_status = existing.delivery_status;
    let current_id = existing.delivery_id;
    let mut d: delivery::ActiveModel = existing.clone().into();

    if let Some(order_id) = payload.order_id {
        match order::Entity::find_by_id(order_id).one(&txn).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({"message": "Invalid order_id"})),
                );
            }
            Err(err) => return internal_error(err),
        }

        match DeliveryEntity::find()
            .filter(delivery::Column::OrderId.eq(order_id))
            .filter(delivery::Column::DeliveryId.ne(current_id))
            .one(&txn)
            .await
        {
            Ok(Some(_)) => {
                return (
                    StatusCode::CONFLICT,
                    Json(json!({"message": "Order already has a delivery"})),
                );
            }
            Ok(None) => d.order_id = Set(order_id),
            Err(err) => return internal_error(err),
        }
    }

    if let Some(staff_id) = payload.staff_id {
        match user::Entity::find_by_id(staff_id).one(&txn).await {
            Ok(Some(_)) => d.staff_id = Set(staff_id),
            Ok(None) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({"message": "Invalid staff_id"})),
                );
            }
            Err(err) => return internal_error(err),
        }
    }

    if let Some(delivery_address) = payload.delivery_address {
        d.delivery_address = Set(delivery_address);
    }
    if let Some(delivery_type) = payload.delivery_type {
        d.delivery_type = Set(delivery_type);
    }
    if let Some(raw) = payload.delivery_status {
        match DeliveryStatus::from_str(&raw) {
            Ok(status) => {
                if !current_status.can_transition_to(status) {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "message": format!(
                                "Cannot change delivery_status from {} to {}",
                                current_status.to_string(),
                                status.to_string()
                            )
                        })),
                    );
                }
                d.delivery_status = Set(status);
            }
            Err(err) => return (StatusCode::BAD_REQUEST, Json(json!({"message": err}))),
        }
    }
    if let Some(description) = payload.description {
        d.description = Set(Some(description));
    }

    let updated = match d.update(&txn).await {
        Ok(model) => model,
        // nothing supplied: the row is already in the requested state
        Err(DbErr::RecordNotUpdated) => existing,
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
            "message": "Delivery updated successfully",
            "delivery": serialize_delivery(&updated),
        })),
    )
}

async fn delete_delivery(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    let existing = match DeliveryEntity::find_by_id(id).one(&txn).await {
        Ok(Some(d)) => d,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Delivery not found"})),
            );
        }
        Err(err) => return internal_error(err),
    };

    let d: delivery::ActiveModel = existing.into();
    if let Err(err) = d.delete(&txn).await {
        let _ = txn.rollback().await;
        return internal_error(err);
    }

    if let Err(err) = txn.commit().await {
        return internal_error(err);
    }

    (
        StatusCode::OK,
        Json(json!({"message": "Delivery deleted successfully"})),
    )
}

//utilities
fn serialize_delivery(d: &delivery::Model) -> Value {
    json!({
        "delivery_id": d.delivery_id,
        "order_id": d.order_id,
        "staff_id": d.staff_id,
        "delivery_address": d.delivery_address,
        "delivery_type": d.delivery_type,
        "delivery_status": d.delivery_status.to_string(),
        "description": d.description,
        "delivery_date": d.delivery_date,
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
struct CreateDeliveryPayload {
    order_id: Option<i32>,
    staff_id: Option<i32>,
    delivery_address: Option<String>,
    delivery_type: Option<String>,
    delivery_status: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize, Clone)]
struct UpdateDeliveryPayload {
    order_id: Option<i32>,
    staff_id: Option<i32>,
    delivery_address: Option<String>,
    delivery_type: Option<String>,
    delivery_status: Option<String>,
    description: Option<String>,
}

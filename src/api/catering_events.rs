use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use sea_orm::entity::prelude::DateTimeUtc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set, TransactionTrait};
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;

use crate::api::internal_error;
use crate::entities::catering_event::{self, Entity as CateringEventEntity, EventStatus};
use crate::entities::customer;

//ROUTERS
pub fn catering_events_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/catering-events", get(get_all_events))
        .route("/catering-events/", get(get_all_events))
        .route("/catering-events/create", post(create_event))
        .route(
            "/catering-events/:id",
            get(get_event_by_id).put(update_event).delete(delete_event),
        )
        .layer(Extension(db))
}

//ROUTES
async fn create_event(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateEventPayload>,
) -> impl IntoResponse {
    let mut missing = Vec::new();
    if payload.customer_id.is_none() {
        missing.push("customer_id");
    }
    if payload.event_name.is_none() {
        missing.push("event_name");
    }
    if payload.event_date.is_none() {
        missing.push("event_date");
    }
    if payload.location.is_none() {
        missing.push("location");
    }
    if payload.number_of_guests.is_none() {
        missing.push("number_of_guests");
    }
    if payload.menu.is_none() {
        missing.push("menu");
    }
    if !missing.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "message": format!("Missing required fields: {}", missing.join(", "))
            })),
        );
    }

    let event_date = match parse_event_date(&payload.event_date.unwrap_or_default()) {
        Some(event_date) => event_date,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "message": "Invalid date format for event_date, use ISO format (YYYY-MM-DDTHH:MM:SS)"
                })),
            );
        }
    };

    let number_of_guests =
        match coerce_guest_count(&payload.number_of_guests.unwrap_or(Value::Null)) {
            Some(number_of_guests) => number_of_guests,
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"message": "number_of_guests must be an integer"})),
                );
            }
        };

    let status = match payload.status {
        Some(raw) => match EventStatus::from_str(&raw) {
            Ok(status) => status,
            Err(err) => return (StatusCode::BAD_REQUEST, Json(json!({"message": err}))),
        },
        None => EventStatus::Pending,
    };

    let customer_id = payload.customer_id.unwrap_or_default();

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

    let new_event = catering_event::ActiveModel {
        customer_id: Set(customer_id),
        event_name: Set(payload.event_name.unwrap_or_default()),
        event_date: Set(event_date),
        location: Set(payload.location.unwrap_or_default()),
        number_of_guests: Set(number_of_guests),
        menu: Set(payload.menu.unwrap_or_default()),
        status: Set(status),
        description: Set(payload.description),
        ..Default::default()
    };

    let created = match new_event.insert(&txn).await {
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
            "message": "Catering event created successfully",
            "event": serialize_event(&created),
        })),
    )
}

async fn get_all_events(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    match CateringEventEntity::find().all(&*db).await {
        Ok(events) => {
            let events: Vec<Value> = events.iter().map(serialize_event).collect();
            (StatusCode::OK, Json(json!(events)))
        }
        Err(err) => internal_error(err),
    }
}

async fn get_event_by_id(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match CateringEventEntity::find_by_id(id).one(&*db).await {
        Ok(Some(event)) => (StatusCode::OK, Json(serialize_event(&event))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Catering event not found"})),
        ),
        Err(err) => internal_error(err),
    }
}

async fn update_event(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<UpdateEventPayload>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    let existing = match CateringEventEntity::find_by_id(id).one(&txn).await {
        Ok(Some(event)) => event,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Catering event not found"})),
            );
        }
        Err(err) => return internal_error(err),
    };

    let mut event: catering_event::ActiveModel = existing.into();

    if let Some(customer_id) = payload.customer_id {
        match customer::Entity::find_by_id(customer_id).one(&txn).await {
            Ok(Some(_)) => event.customer_id = Set(customer_id),
            Ok(None) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({"message": "Invalid customer_id"})),
                );
            }
            Err(err) => return internal_error(err),
        }
    }

    if let Some(event_name) = payload.event_name {
        event.event_name = Set(event_name);
    }

    if let Some(raw) = payload.event_date {
        match parse_event_date(&raw) {
            Some(event_date) => event.event_date = Set(event_date),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "message": "Invalid date format for event_date, use ISO format (YYYY-MM-DDTHH:MM:SS)"
                    })),
                );
            }
        }
    }

    if let Some(location) = payload.location {
        event.location = Set(location);
    }

    if let Some(raw) = payload.number_of_guests {
        match coerce_guest_count(&raw) {
            Some(number_of_guests) => event.number_of_guests = Set(number_of_guests),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"message": "number_of_guests must be an integer"})),
                );
            }
        }
    }

    if let Some(menu) = payload.menu {
        event.menu = Set(menu);
    }

    if let Some(raw) = payload.status {
        match EventStatus::from_str(&raw) {
            Ok(status) => event.status = Set(status),
            Err(err) => return (StatusCode::BAD_REQUEST, Json(json!({"message": err}))),
        }
    }

    if let Some(description) = payload.description {
        event.description = Set(Some(description));
    }

    match event.update(&txn).await {
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
        Json(json!({"message": "Catering event updated successfully"})),
    )
}

async fn delete_event(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    let existing = match CateringEventEntity::find_by_id(id).one(&txn).await {
        Ok(Some(event)) => event,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Catering event not found"})),
            );
        }
        Err(err) => return internal_error(err),
    };

    let event: catering_event::ActiveModel = existing.into();
    if let Err(err) = event.delete(&txn).await {
        let _ = txn.rollback().await;
        return internal_error(err);
    }

    if let Err(err) = txn.commit().await {
        return internal_error(err);
    }

    (
        StatusCode::OK,
        Json(json!({"message": "Catering event deleted successfully"})),
    )
}

//utilities
fn serialize_event(event: &catering_event::Model) -> Value {
    json!({
        "id": event.id,
        "customer_id": event.customer_id,
        "event_name": event.event_name,
        "event_date": event.event_date,
        "location": event.location,
        "number_of_guests": event.number_of_guests,
        "menu": event.menu,
        "status": event.status.to_string(),
        "description": event.description,
    })
}

/// Accepts `YYYY-MM-DDTHH:MM:SS` (with optional fractional seconds) or a
/// bare `YYYY-MM-DD`, interpreted as midnight UTC.
fn parse_event_date(raw: &str) -> Option<DateTimeUtc> {
    if let Ok(datetime) = NaiveDateTime::from_str(raw) {
        return Some(Utc.from_utc_datetime(&datetime));
    }

    if let Ok(date) = NaiveDate::from_str(raw) {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }

    None
}

/// Guest counts arrive as JSON numbers or numeric strings.
fn coerce_guest_count(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}

//structs
#[derive(Deserialize, Clone)]
struct CreateEventPayload {
    customer_id: Option<i32>,
    event_name: Option<String>,
    event_date: Option<String>,
    location: Option<String>,
    number_of_guests: Option<Value>,
    menu: Option<String>,
    status: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize, Clone)]
struct UpdateEventPayload {
    customer_id: Option<i32>,
    event_name: Option<String>,
    event_date: Option<String>,
    location: Option<String>,
    number_of_guests: Option<Value>,
    menu: Option<String>,
    status: Option<String>,
    description: Option<String>,
}

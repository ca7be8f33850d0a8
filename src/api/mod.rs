pub mod auth;
pub mod catering_events;
pub mod contact;
pub mod customers;
pub mod deliveries;
pub mod gallery;
pub mod menu_items;
pub mod order_items;
pub mod orders;
pub mod services;
pub mod static_files;
pub mod users;
pub mod vehicles;

use axum::{http::StatusCode, middleware, response::IntoResponse, routing::get, Json, Router};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::middleware::logging::logging_middleware;

pub fn create_api_router(db: Arc<DatabaseConnection>) -> Router {
    let api = Router::new()
        .merge(auth::auth_router(db.clone()))
        .merge(users::users_router(db.clone()))
        .merge(customers::customers_router(db.clone()))
        .merge(catering_events::catering_events_router(db.clone()))
        .merge(deliveries::deliveries_router(db.clone()))
        .merge(menu_items::menu_items_router(db.clone()))
        .merge(orders::orders_router(db.clone()))
        .merge(order_items::order_items_router(db.clone()))
        .merge(services::services_router(db.clone()))
        .merge(gallery::gallery_router(db.clone()))
        .merge(contact::contact_router(db.clone()))
        .merge(vehicles::vehicles_router(db));

    Router::new()
        .route("/", get(index))
        .nest("/api/v1", api)
        .merge(static_files::static_router())
        .layer(middleware::from_fn(logging_middleware))
}

async fn index() -> impl IntoResponse {
    (StatusCode::OK, "Welcome to the Eatery API")
}

/// Rolls every unexpected persistence or hashing failure into one generic
/// response; the detail goes to the log, never to the client.
pub(crate) fn internal_error<E: std::fmt::Display>(err: E) -> (StatusCode, Json<Value>) {
    tracing::error!(error = %err, "Internal error while handling request");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"message": "Internal server error"})),
    )
}

/// Last path component of a client-supplied file reference. Directory
/// parts, including traversal attempts, are discarded.
pub(crate) fn file_basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

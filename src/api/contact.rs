use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::api::internal_error;
use crate::entities::contact;

//ROUTERS
pub fn contact_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/contact", post(submit_contact))
        .route("/contact/", post(submit_contact))
        .layer(Extension(db))
}

//ROUTES
/// Write-only surface: messages are submitted here and read elsewhere.
async fn submit_contact(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<SubmitContactPayload>,
) -> impl IntoResponse {
    let (name, email, message) = match (payload.name, payload.email, payload.message) {
        (Some(name), Some(email), Some(message)) => (name, email, message),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "Name, email, and message are required"})),
            );
        }
    };

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    let new_contact = contact::ActiveModel {
        name: Set(name.clone()),
        email: Set(email.clone()),
        phone: Set(payload.phone),
        service_type: Set(payload.service_type),
        message: Set(message),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    if let Err(err) = new_contact.insert(&txn).await {
        let _ = txn.rollback().await;
        return internal_error(err);
    }

    if let Err(err) = txn.commit().await {
        return internal_error(err);
    }

    tracing::info!(name = %name, email = %email, "New contact message submitted");

    (
        StatusCode::CREATED,
        Json(json!({"message": "Contact message submitted successfully"})),
    )
}

//structs
#[derive(Deserialize, Clone)]
struct SubmitContactPayload {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    service_type: Option<String>,
    message: Option<String>,
}

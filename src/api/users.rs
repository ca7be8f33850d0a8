use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::auth::{hash_password, is_valid_email};
use crate::api::internal_error;
use crate::entities::user::{self, Entity as UserEntity};
use crate::middleware::auth::issue_token_pair;

//ROUTERS
pub fn users_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/users", get(get_users).post(register_user))
        .route("/users/", get(get_users).post(register_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .layer(Extension(db))
}

//ROUTES
async fn get_users(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    match UserEntity::find().all(&*db).await {
        Ok(users) => {
            let users: Vec<Value> = users.iter().map(serialize_user).collect();
            (StatusCode::OK, Json(json!(users)))
        }
        Err(err) => internal_error(err),
    }
}

async fn get_user(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match UserEntity::find_by_id(id).one(&*db).await {
        Ok(Some(user)) => (StatusCode::OK, Json(serialize_user(&user))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "User not found"})),
        ),
        Err(err) => internal_error(err),
    }
}

async fn register_user(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<RegisterUserPayload>,
) -> impl IntoResponse {
    let (full_name, contact, email, password) = match (
        payload.full_name,
        payload.contact,
        payload.email,
        payload.password,
    ) {
        (Some(full_name), Some(contact), Some(email), Some(password)) => {
            (full_name, contact, email, password)
        }
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "Missing required fields"})),
            );
        }
    };

    if password.len() < 8 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Password must be at least 8 characters"})),
        );
    }

    if !is_valid_email(&email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Invalid email address"})),
        );
    }

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    match UserEntity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&txn)
        .await
    {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({"message": "Email already registered"})),
            );
        }
        Ok(None) => {}
        Err(err) => return internal_error(err),
    }

    let hashed = match hash_password(&password) {
        Ok(hashed) => hashed,
        Err(err) => return internal_error(err),
    };

    let new_user = user::ActiveModel {
        full_name: Set(full_name),
        contact: Set(contact),
        email: Set(email),
        password: Set(hashed),
        role: Set(payload.role.unwrap_or_else(|| "staff".to_owned())),
        address: Set(payload.address),
        description: Set(payload.description),
        ..Default::default()
    };

    let created = match new_user.insert(&txn).await {
        Ok(model) => model,
        Err(err) => {
            let _ = txn.rollback().await;
            return internal_error(err);
        }
    };

    if let Err(err) = txn.commit().await {
        return internal_error(err);
    }

    let tokens = match issue_token_pair(created.id, &created.role) {
        Ok(tokens) => tokens,
        Err(err) => return internal_error(err),
    };

    (
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "user": serialize_user(&created),
            "access_token": tokens.access_token,
            "refresh_token": tokens.refresh_token,
        })),
    )
}

async fn update_user(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<UpdateUserPayload>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    let existing = match UserEntity::find_by_id(id).one(&txn).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "User not found"})),
            );
        }
        Err(err) => return internal_error(err),
    };

    let mut user: user::ActiveModel = existing.clone().into();

    if let Some(full_name) = payload.full_name {
        user.full_name = Set(full_name);
    }
    if let Some(contact) = payload.contact {
        user.contact = Set(contact);
    }
    if let Some(email) = payload.email {
        if !is_valid_email(&email) {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "Invalid email address"})),
            );
        }
        user.email = Set(email);
    }
    if let Some(address) = payload.address {
        user.address = Set(Some(address));
    }
    if let Some(role) = payload.role {
        user.role = Set(role);
    }
    if let Some(description) = payload.description {
        user.description = Set(Some(description));
    }

    let updated = match user.update(&txn).await {
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
            "message": "User updated successfully",
            "user": serialize_user(&updated),
        })),
    )
}

async fn delete_user(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    let existing = match UserEntity::find_by_id(id).one(&txn).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "User not found"})),
            );
        }
        Err(err) => return internal_error(err),
    };

    let user: user::ActiveModel = existing.into();
    if let Err(err) = user.delete(&txn).await {
        let _ = txn.rollback().await;
        return internal_error(err);
    }

    if let Err(err) = txn.commit().await {
        return internal_error(err);
    }

    (
        StatusCode::OK,
        Json(json!({"message": "User deleted successfully"})),
    )
}

//utilities
fn serialize_user(user: &user::Model) -> Value {
    json!({
        "id": user.id,
        "full_name": user.full_name,
        "contact": user.contact,
        "email": user.email,
        "address": user.address,
        "role": user.role,
        "description": user.description,
    })
}

//structs
#[derive(Deserialize, Clone)]
struct RegisterUserPayload {
    full_name: Option<String>,
    contact: Option<String>,
    email: Option<String>,
    password: Option<String>,
    address: Option<String>,
    role: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize, Clone)]
struct UpdateUserPayload {
    full_name: Option<String>,
    contact: Option<String>,
    email: Option<String>,
    address: Option<String>,
    role: Option<String>,
    description: Option<String>,
}

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use axum::{
    extract::Extension,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::api::internal_error;
use crate::entities::{admin_user, customer, user};
use crate::middleware::auth::{
    auth_middleware, issue_access_token, issue_token_pair, Claims, TokenKind,
};

//ROUTERS
pub fn auth_router(db: Arc<DatabaseConnection>) -> Router {
    let refresh = Router::new()
        .route("/auth/refresh", post(refresh_token))
        .layer(from_fn_with_state(TokenKind::Refresh, auth_middleware));

    Router::new()
        .route("/auth/register", post(register_admin))
        .route("/auth/login", post(login_admin))
        .route("/auth/customer-login", post(login_customer))
        .route("/auth/user-login", post(login_user))
        .merge(refresh)
        .layer(Extension(db))
}

//ROUTES
async fn register_admin(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<RegisterAdminPayload>,
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
                Json(json!({
                    "error": "All required fields must be provided: full_name, contact, email, password"
                })),
            );
        }
    };

    if password.len() < 8 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Password must be at least 8 characters"})),
        );
    }

    if !is_valid_email(&email) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid email format"})),
        );
    }

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    match admin_user::Entity::find()
        .filter(admin_user::Column::Email.eq(&email))
        .one(&txn)
        .await
    {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({"error": "Email already registered"})),
            );
        }
        Ok(None) => {}
        Err(err) => return internal_error(err),
    }

    match admin_user::Entity::find()
        .filter(admin_user::Column::Contact.eq(&contact))
        .one(&txn)
        .await
    {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({"error": "Contact already in use"})),
            );
        }
        Ok(None) => {}
        Err(err) => return internal_error(err),
    }

    let hashed = match hash_password(&password) {
        Ok(hashed) => hashed,
        Err(err) => return internal_error(err),
    };

    let new_admin = admin_user::ActiveModel {
        full_name: Set(full_name.clone()),
        contact: Set(contact),
        email: Set(email),
        password: Set(hashed),
        role: Set("admin".to_owned()),
        ..Default::default()
    };

    let admin = match new_admin.insert(&txn).await {
        Ok(model) => model,
        Err(err) => {
            let _ = txn.rollback().await;
            return internal_error(err);
        }
    };

    if let Err(err) = txn.commit().await {
        return internal_error(err);
    }

    let tokens = match issue_token_pair(admin.id, &admin.role) {
        Ok(tokens) => tokens,
        Err(err) => return internal_error(err),
    };

    (
        StatusCode::CREATED,
        Json(json!({
            "message": format!("{} has been registered successfully", full_name),
            "user": {
                "id": admin.id,
                "full_name": admin.full_name,
                "contact": admin.contact,
                "email": admin.email,
                "role": admin.role,
            },
            "access_token": tokens.access_token,
            "refresh_token": tokens.refresh_token,
        })),
    )
}

async fn login_admin(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<LoginPayload>,
) -> impl IntoResponse {
    let (email, password) = match (payload.email, payload.password) {
        (Some(email), Some(password)) => (email, password),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Email and password are required"})),
            );
        }
    };

    let result = admin_user::Entity::find()
        .filter(admin_user::Column::Email.eq(&email))
        .one(&*db)
        .await;

    match result {
        Ok(Some(account)) if account.check_hash(&password).is_ok() => {
            let tokens = match issue_token_pair(account.id, &account.role) {
                Ok(tokens) => tokens,
                Err(err) => return internal_error(err),
            };

            (
                StatusCode::OK,
                Json(json!({
                    "message": "Login successful",
                    "user": {
                        "id": account.id,
                        "full_name": account.full_name,
                        "email": account.email,
                        "role": account.role,
                    },
                    "access_token": tokens.access_token,
                    "refresh_token": tokens.refresh_token,
                })),
            )
        }
        Ok(_) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid email or password"})),
        ),
        Err(err) => internal_error(err),
    }
}

async fn login_customer(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<LoginPayload>,
) -> impl IntoResponse {
    let (email, password) = match (payload.email, payload.password) {
        (Some(email), Some(password)) => (email, password),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Email and password are required"})),
            );
        }
    };

    let result = customer::Entity::find()
        .filter(customer::Column::Email.eq(&email))
        .one(&*db)
        .await;

    match result {
        Ok(Some(account)) if account.check_hash(&password).is_ok() => {
            let tokens = match issue_token_pair(account.id, "customer") {
                Ok(tokens) => tokens,
                Err(err) => return internal_error(err),
            };

            (
                StatusCode::OK,
                Json(json!({
                    "message": "Login successful",
                    "customer": {
                        "id": account.id,
                        "full_name": account.full_name,
                        "email": account.email,
                    },
                    "access_token": tokens.access_token,
                    "refresh_token": tokens.refresh_token,
                })),
            )
        }
        Ok(_) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid email or password"})),
        ),
        Err(err) => internal_error(err),
    }
}

async fn login_user(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<LoginPayload>,
) -> impl IntoResponse {
    let (email, password) = match (payload.email, payload.password) {
        (Some(email), Some(password)) => (email, password),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Email and password are required"})),
            );
        }
    };

    let result = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&*db)
        .await;

    match result {
        Ok(Some(account)) if account.check_hash(&password).is_ok() => {
            let tokens = match issue_token_pair(account.id, &account.role) {
                Ok(tokens) => tokens,
                Err(err) => return internal_error(err),
            };

            (
                StatusCode::OK,
                Json(json!({
                    "message": "Login successful",
                    "user": {
                        "id": account.id,
                        "full_name": account.full_name,
                        "email": account.email,
                        "role": account.role,
                    },
                    "access_token": tokens.access_token,
                    "refresh_token": tokens.refresh_token,
                })),
            )
        }
        Ok(_) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid email or password"})),
        ),
        Err(err) => internal_error(err),
    }
}

async fn refresh_token(Extension(claims): Extension<Claims>) -> impl IntoResponse {
    match issue_access_token(claims.id, &claims.role) {
        Ok(access_token) => (
            StatusCode::OK,
            Json(json!({"access_token": access_token})),
        ),
        Err(err) => internal_error(err),
    }
}

//utilities
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\w\.-]+@[\w\.-]+\.\w+$").unwrap());

pub(crate) fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

pub(crate) fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();

    Ok(password_hash)
}

//structs
#[derive(Deserialize, Clone)]
struct RegisterAdminPayload {
    full_name: Option<String>,
    contact: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize, Clone)]
struct LoginPayload {
    email: Option<String>,
    password: Option<String>,
}

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::auth::{hash_password, is_valid_email};
use crate::api::internal_error;
use crate::entities::customer::{self, Entity as CustomerEntity};
use crate::middleware::auth::issue_token_pair;

//ROUTERS
pub fn customers_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/customer", get(get_customers).post(create_customer))
        .route("/customer/", get(get_customers).post(create_customer))
        .route("/customer/register", post(register_customer))
        .route("/customer/:id", get(get_customer).put(update_customer))
        .layer(Extension(db))
}

//ROUTES
async fn register_customer(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<RegisterCustomerPayload>,
) -> impl IntoResponse {
    let (full_name, contact, email, password, address, customer_type) = match (
        payload.full_name,
        payload.contact,
        payload.email,
        payload.password,
        payload.address,
        payload.customer_type,
    ) {
        (
            Some(full_name),
            Some(contact),
            Some(email),
            Some(password),
            Some(address),
            Some(customer_type),
        ) => (full_name, contact, email, password, address, customer_type),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "All fields are required"})),
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
            Json(json!({"error": "Invalid email address"})),
        );
    }

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    match CustomerEntity::find()
        .filter(customer::Column::Email.eq(&email))
        .one(&txn)
        .await
    {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({"error": "Email already in use"})),
            );
        }
        Ok(None) => {}
        Err(err) => return internal_error(err),
    }

    match CustomerEntity::find()
        .filter(customer::Column::Contact.eq(&contact))
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

    let new_customer = customer::ActiveModel {
        full_name: Set(full_name.clone()),
        contact: Set(contact),
        email: Set(email),
        password: Set(Some(hashed)),
        address: Set(Some(address)),
        customer_type: Set(Some(customer_type)),
        biography: Set(payload.biography),
        ..Default::default()
    };

    let created = match new_customer.insert(&txn).await {
        Ok(model) => model,
        Err(err) => {
            let _ = txn.rollback().await;
            return internal_error(err);
        }
    };

    if let Err(err) = txn.commit().await {
        return internal_error(err);
    }

    let tokens = match issue_token_pair(created.id, "customer") {
        Ok(tokens) => tokens,
        Err(err) => return internal_error(err),
    };

    (
        StatusCode::CREATED,
        Json(json!({
            "message": format!("{} has been registered successfully", full_name),
            "customer": serialize_customer(&created),
            "access_token": tokens.access_token,
            "refresh_token": tokens.refresh_token,
        })),
    )
}

async fn get_customers(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    match CustomerEntity::find().all(&*db).await {
        Ok(customers) => {
            let customers: Vec<Value> = customers
                .iter()
                .map(|customer| {
                    json!({
                        "id": customer.id,
                        "full_name": customer.full_name,
                        "contact": customer.contact,
                        "email": customer.email,
                        "biography": customer.biography,
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!(customers)))
        }
        Err(err) => internal_error(err),
    }
}

async fn get_customer(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match CustomerEntity::find_by_id(id).one(&*db).await {
        Ok(Some(customer)) => (StatusCode::OK, Json(serialize_customer(&customer))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Customer not found"})),
        ),
        Err(err) => internal_error(err),
    }
}

/// Back-office create: no credential, so the account cannot log in.
async fn create_customer(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateCustomerPayload>,
) -> impl IntoResponse {
    let full_name = match payload.full_name {
        Some(full_name) => full_name,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "Missing required field: full_name"})),
            );
        }
    };
    let contact = match payload.contact {
        Some(contact) => contact,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "Missing required field: contact"})),
            );
        }
    };
    let email = match payload.email {
        Some(email) => email,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "Missing required field: email"})),
            );
        }
    };

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    let duplicate = Condition::any()
        .add(customer::Column::Email.eq(&email))
        .add(customer::Column::Contact.eq(&contact));

    match CustomerEntity::find().filter(duplicate).one(&txn).await
    {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({"message": "Email or contact already in use"})),
            );
        }
        Ok(None) => {}
        Err(err) => return internal_error(err),
    }

    let new_customer = customer::ActiveModel {
        full_name: Set(full_name),
        contact: Set(contact),
        email: Set(email),
        password: Set(None),
        address: Set(payload.address),
        biography: Set(Some(payload.biography.unwrap_or_default())),
        ..Default::default()
    };

    let created = match new_customer.insert(&txn).await {
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
            "message": "Customer created successfully",
            "customer": serialize_customer(&created),
        })),
    )
}

async fn update_customer(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<UpdateCustomerPayload>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    let existing = match CustomerEntity::find_by_id(id).one(&txn).await {
        Ok(Some(customer)) => customer,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Customer not found"})),
            );
        }
        Err(err) => return internal_error(err),
    };

    let mut customer: customer::ActiveModel = existing.clone().into();

    if let Some(full_name) = payload.full_name {
        customer.full_name = Set(full_name);
    }
    if let Some(contact) = payload.contact {
        customer.contact = Set(contact);
    }
    if let Some(email) = payload.email {
        if !is_valid_email(&email) {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "Invalid email address"})),
            );
        }
        customer.email = Set(email);
    }
    if let Some(address) = payload.address {
        customer.address = Set(Some(address));
    }
    if let Some(biography) = payload.biography {
        customer.biography = Set(Some(biography));
    }

    let updated = match customer.update(&txn).await {
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
            "message": "Customer updated successfully",
            "customer": serialize_customer(&updated),
        })),
    )
}

//utilities
fn serialize_customer(customer: &customer::Model) -> Value {
    json!({
        "id": customer.id,
        "full_name": customer.full_name,
        "contact": customer.contact,
        "email": customer.email,
        "address": customer.address,
        "biography": customer.biography,
    })
}

//structs
#[derive(Deserialize, Clone)]
struct RegisterCustomerPayload {
    full_name: Option<String>,
    contact: Option<String>,
    email: Option<String>,
    password: Option<String>,
    address: Option<String>,
    customer_type: Option<String>,
    biography: Option<String>,
}

#[derive(Deserialize, Clone)]
struct CreateCustomerPayload {
    full_name: Option<String>,
    contact: Option<String>,
    email: Option<String>,
    address: Option<String>,
    biography: Option<String>,
}

#[derive(Deserialize, Clone)]
struct UpdateCustomerPayload {
    full_name: Option<String>,
    contact: Option<String>,
    email: Option<String>,
    address: Option<String>,
    biography: Option<String>,
}

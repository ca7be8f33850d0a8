use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use validator::Validate;

use crate::api::{file_basename, internal_error};
use crate::entities::service::{self, Entity as ServiceEntity};

static SLUG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]*$").unwrap());

//ROUTERS
pub fn services_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/services", get(get_services).post(create_service))
        .route("/services/", get(get_services).post(create_service))
        .route("/services/register", post(create_service))
        .route(
            "/services/:slug",
            get(get_service).put(update_service).delete(delete_service),
        )
        .layer(Extension(db))
}

//ROUTES
async fn get_services(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    match ServiceEntity::find().all(&*db).await {
        Ok(services) => {
            let services: Vec<Value> = services.iter().map(serialize_service).collect();
            (StatusCode::OK, Json(json!(services)))
        }
        Err(err) => internal_error(err),
    }
}

async fn get_service(
    Path(slug): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match ServiceEntity::find()
        .filter(service::Column::Slug.eq(&slug))
        .one(&*db)
        .await
    {
        Ok(Some(svc)) => (StatusCode::OK, Json(serialize_service(&svc))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Service not found"})),
        ),
        Err(err) => internal_error(err),
    }
}

async fn create_service(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateServicePayload>,
) -> impl IntoResponse {
    if payload.validate().is_err() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Invalid slug. It should contain only lowercase letters, numbers, or '-'."
            })),
        );
    }

    let slug = match payload.slug {
        Some(slug) => slug,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Missing required field: slug"})),
            );
        }
    };
    let title = match payload.title {
        Some(title) => title,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Missing required field: title"})),
            );
        }
    };
    let description = match payload.description {
        Some(description) => description,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Missing required field: description"})),
            );
        }
    };

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    match ServiceEntity::find()
        .filter(service::Column::Slug.eq(&slug))
        .one(&txn)
        .await
    {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({"error": "Service with this slug already exists"})),
            );
        }
        Ok(None) => {}
        Err(err) => return internal_error(err),
    }

    let new_service = service::ActiveModel {
        slug: Set(slug),
        title: Set(title),
        description: Set(description),
        image_url: Set(payload
            .image_url
            .map(|path| file_basename(&path).to_owned())),
        ..Default::default()
    };

    let created = match new_service.insert(&txn).await {
        Ok(model) => model,
        Err(err) => {
            let _ = txn.rollback().await;
            return internal_error(err);
        }
    };

    if let Err(err) = txn.commit().await {
        return internal_error(err);
    }

    (StatusCode::CREATED, Json(serialize_service(&created)))
}

async fn update_service(
    Path(slug): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<UpdateServicePayload>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    let existing = match ServiceEntity::find()
        .filter(service::Column::Slug.eq(&slug))
        .one(&txn)
        .await
    {
        Ok(Some(svc)) => svc,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "Service not found"})),
            );
        }
        Err(err) => return internal_error(err),
    };

    let mut svc: service::ActiveModel = existing.clone().into();

    if let Some(title) = payload.title {
        svc.title = Set(title);
    }
    if let Some(description) = payload.description {
        svc.description = Set(description);
    }
    if let Some(image_url) = payload.image_url {
        svc.image_url = Set(Some(file_basename(&image_url).to_owned()));
    }

    let updated = match svc.update(&txn).await {
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

    (StatusCode::OK, Json(serialize_service(&updated)))
}

async fn delete_service(
    Path(slug): Path<String>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    let existing = match ServiceEntity::find()
        .filter(service::Column::Slug.eq(&slug))
        .one(&txn)
        .await
    {
        Ok(Some(svc)) => svc,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "Service not found"})),
            );
        }
        Err(err) => return internal_error(err),
    };

    let svc: service::ActiveModel = existing.into();
    if let Err(err) = svc.delete(&txn).await {
        let _ = txn.rollback().await;
        return internal_error(err);
    }

    if let Err(err) = txn.commit().await {
        return internal_error(err);
    }

    (StatusCode::OK, Json(json!({"message": "Service deleted"})))
}

//utilities
fn serialize_service(svc: &service::Model) -> Value {
    json!({
        "id": svc.id,
        "slug": svc.slug,
        "title": svc.title,
        "description": svc.description,
        "image_url": svc
            .image_url
            .as_deref()
            .map(|file| format!("/images/services/{}", file_basename(file))),
    })
}

//structs
#[derive(Deserialize, Validate)]
struct CreateServicePayload {
    #[validate(regex(path = *SLUG_REGEX))]
    slug: Option<String>,
    title: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
}

#[derive(Deserialize)]
struct UpdateServicePayload {
    title: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
}

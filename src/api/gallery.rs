use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::fs as tokio_fs;

use crate::api::static_files::static_root;
use crate::api::{file_basename, internal_error};
use crate::entities::gallery_image::{self, Entity as GalleryImageEntity};

//ROUTERS
pub fn gallery_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/gallery", get(get_images).post(add_image))
        .route("/gallery/", get(get_images).post(add_image))
        .route("/gallery/:id", delete(delete_image))
        .layer(Extension(db))
}

//ROUTES
async fn get_images(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    match GalleryImageEntity::find().all(&*db).await {
        Ok(images) => {
            let images: Vec<Value> = images.iter().map(serialize_image).collect();
            (StatusCode::OK, Json(json!(images)))
        }
        Err(err) => internal_error(err),
    }
}

async fn add_image(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<AddImagePayload>,
) -> impl IntoResponse {
    let image_url = match payload.image_url {
        Some(image_url) => image_url,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "image_url is required"})),
            );
        }
    };

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    // Only the basename is stored; directory parts are discarded.
    let new_image = gallery_image::ActiveModel {
        title: Set(payload.title.unwrap_or_else(|| "Untitled".to_owned())),
        image_url: Set(file_basename(&image_url).to_owned()),
        description: Set(Some(payload.description.unwrap_or_default())),
        ..Default::default()
    };

    let created = match new_image.insert(&txn).await {
        Ok(model) => model,
        Err(err) => {
            let _ = txn.rollback().await;
            return internal_error(err);
        }
    };

    if let Err(err) = txn.commit().await {
        return internal_error(err);
    }

    (StatusCode::CREATED, Json(serialize_image(&created)))
}

/// Removes the row and the backing file. A file already missing from disk
/// is tolerated.
async fn delete_image(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    let existing = match GalleryImageEntity::find_by_id(id).one(&txn).await {
        Ok(Some(image)) => image,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "Image not found"})),
            );
        }
        Err(err) => return internal_error(err),
    };

    let file_name = existing.image_url.clone();

    let image: gallery_image::ActiveModel = existing.into();
    if let Err(err) = image.delete(&txn).await {
        let _ = txn.rollback().await;
        return internal_error(err);
    }

    if let Err(err) = txn.commit().await {
        return internal_error(err);
    }

    let file_path = std::path::Path::new(&static_root())
        .join("gallery")
        .join(&file_name);
    if let Err(err) = tokio_fs::remove_file(&file_path).await {
        tracing::debug!(error = %err, file = %file_path.display(), "Backing file not removed");
    }

    (
        StatusCode::OK,
        Json(json!({"message": "Image deleted successfully"})),
    )
}

//utilities
fn serialize_image(image: &gallery_image::Model) -> Value {
    json!({
        "id": image.id,
        "title": image.title,
        "image_url": format!("/static/gallery/{}", file_basename(&image.image_url)),
        "description": image.description,
    })
}

//structs
#[derive(Deserialize, Clone)]
struct AddImagePayload {
    title: Option<String>,
    image_url: Option<String>,
    description: Option<String>,
}

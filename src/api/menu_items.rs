use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::internal_error;
use crate::entities::menu_item::{self, Entity as MenuItemEntity, DEFAULT_IMAGE_KEY};

/// Canonical seed catalog: (name, price, category, description, image key).
const DEFAULT_MENU_ITEMS: [(&str, i64, &str, &str, &str); 14] = [
    // BREAKFAST
    ("Orange Juice", 5000, "BREAKFAST", "Freshly squeezed orange juice", "meal1.jpg"),
    ("Pineapple Juice", 5000, "BREAKFAST", "Fresh pineapple juice", "meal2.jpg"),
    ("Tea and Bread", 4000, "BREAKFAST", "Hot tea with fresh bread", "meal3.jpg"),
    // MEALS
    ("Fried Rice", 15000, "MEALS", "Delicious fried rice", "meal4.jpg"),
    ("Jollof Rice", 15000, "MEALS", "Classic Jollof Rice", "meal5.jpg"),
    ("White Rice & Stew", 15000, "MEALS", "Rice served with stew", "meal6.jpg"),
    ("Meal 1", 18000, "MEALS", "Tasty meal", "meal7.jpg"),
    ("Meal 2", 18000, "MEALS", "Special meal", "meal8.jpg"),
    // SNACKS
    ("Puff Puff", 3000, "SNACKS", "Sweet fried dough", "meal1.jpg"),
    ("Meat Pie", 4000, "SNACKS", "Savory meat pie", "meal2.jpg"),
    // DRINKS
    ("Fruit Drink", 4000, "DRINKS", "Refreshing fruit drink", "meal3.jpg"),
    ("Water", 2000, "DRINKS", "Bottled water", "meal4.jpg"),
    // VEGETABLES
    ("Vegetable 1", 8000, "VEGETABLES", "Healthy vegetable dish", "meal5.jpg"),
    ("Vegetable 2", 8000, "VEGETABLES", "Fresh vegetables", "meal6.jpg"),
];

//ROUTERS
pub fn menu_items_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/menu-items", get(get_all_menu_items))
        .route("/menu-items/", get(get_all_menu_items))
        .route("/menu-items/populate", post(populate_menu_items))
        .route("/menu-items/create", post(create_menu_item))
        .route(
            "/menu-items/:id",
            get(get_menu_item)
                .put(update_menu_item)
                .delete(delete_menu_item),
        )
        .layer(Extension(db))
}

//ROUTES
/// Seeds the canonical catalog. Idempotent: an item is inserted only when
/// no existing row shares its name, so repeated calls never duplicate or
/// overwrite rows.
async fn populate_menu_items(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    for (name, price, category, description, image_key) in DEFAULT_MENU_ITEMS {
        let exists = match MenuItemEntity::find()
            .filter(menu_item::Column::Name.eq(name))
            .one(&txn)
            .await
        {
            Ok(exists) => exists.is_some(),
            Err(err) => return internal_error(err),
        };

        if exists {
            continue;
        }

        let now = Utc::now();
        let item = menu_item::ActiveModel {
            name: Set(name.to_owned()),
            price: Set(Decimal::from(price)),
            category: Set(category.to_owned()),
            available: Set(true),
            description: Set(Some(description.to_owned())),
            image_key: Set(Some(image_key.to_owned())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Err(err) = item.insert(&txn).await {
            let _ = txn.rollback().await;
            return internal_error(err);
        }
    }

    if let Err(err) = txn.commit().await {
        return internal_error(err);
    }

    (
        StatusCode::CREATED,
        Json(json!({"message": "Default menu items populated successfully"})),
    )
}

async fn get_all_menu_items(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    match MenuItemEntity::find().all(&*db).await {
        Ok(items) => {
            let items: Vec<Value> = items.iter().map(serialize_menu_item).collect();
            (StatusCode::OK, Json(json!(items)))
        }
        Err(err) => internal_error(err),
    }
}

async fn get_menu_item(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match MenuItemEntity::find_by_id(id).one(&*db).await {
        Ok(Some(item)) => (StatusCode::OK, Json(serialize_menu_item(&item))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Menu item not found"})),
        ),
        Err(err) => internal_error(err),
    }
}

async fn create_menu_item(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateMenuItemPayload>,
) -> impl IntoResponse {
    let name = match payload.name {
        Some(name) => name,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "Missing required field: name"})),
            );
        }
    };
    let price = match payload.price {
        Some(price) => price,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "Missing required field: price"})),
            );
        }
    };
    let category = match payload.category {
        Some(category) => category,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "Missing required field: category"})),
            );
        }
    };

    if price < Decimal::ZERO {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Price must be non-negative"})),
        );
    }

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    let now = Utc::now();
    let new_item = menu_item::ActiveModel {
        name: Set(name),
        price: Set(price),
        category: Set(category),
        available: Set(payload.available.unwrap_or(true)),
        description: Set(payload.description),
        image_key: Set(Some(
            payload
                .image_key
                .unwrap_or_else(|| DEFAULT_IMAGE_KEY.to_owned()),
        )),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = match new_item.insert(&txn).await {
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
            "message": "Menu item created",
            "menu_item": serialize_menu_item(&created),
        })),
    )
}

async fn update_menu_item(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<UpdateMenuItemPayload>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    let existing = match MenuItemEntity::find_by_id(id).one(&txn).await {
        Ok(Some(item)) => item,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Menu item not found"})),
            );
        }
        Err(err) => return internal_error(err),
    };

    let mut item: menu_item::ActiveModel = existing.into();

    if let Some(name) = payload.name {
        item.name = Set(name);
    }
    if let Some(price) = payload.price {
        if price < Decimal::ZERO {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"message": "Price must be non-negative"})),
            );
        }
        item.price = Set(price);
    }
    if let Some(category) = payload.category {
        item.category = Set(category);
    }
    if let Some(description) = payload.description {
        item.description = Set(Some(description));
    }
    if let Some(available) = payload.available {
        item.available = Set(available);
    }
    if let Some(image_key) = payload.image_key {
        item.image_key = Set(Some(image_key));
    }
    item.updated_at = Set(Utc::now());

    let updated = match item.update(&txn).await {
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
        StatusCode::OK,
        Json(json!({
            "message": "Menu item updated",
            "menu_item": serialize_menu_item(&updated),
        })),
    )
}

async fn delete_menu_item(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    let existing = match MenuItemEntity::find_by_id(id).one(&txn).await {
        Ok(Some(item)) => item,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Menu item not found"})),
            );
        }
        Err(err) => return internal_error(err),
    };

    let item: menu_item::ActiveModel = existing.into();
    if let Err(err) = item.delete(&txn).await {
        let _ = txn.rollback().await;
        return internal_error(err);
    }

    if let Err(err) = txn.commit().await {
        return internal_error(err);
    }

    (
        StatusCode::OK,
        Json(json!({"message": "Deleted successfully"})),
    )
}

//utilities
fn serialize_menu_item(item: &menu_item::Model) -> Value {
    json!({
        "id": item.id,
        "name": item.name,
        "description": item.description,
        "price": item.price,
        "category": item.category,
        "available": item.available,
        "image_key": item.image_key.as_deref().unwrap_or(DEFAULT_IMAGE_KEY),
    })
}

//structs
#[derive(Deserialize, Clone)]
struct CreateMenuItemPayload {
    name: Option<String>,
    price: Option<Decimal>,
    category: Option<String>,
    description: Option<String>,
    available: Option<bool>,
    image_key: Option<String>,
}

#[derive(Deserialize, Clone)]
struct UpdateMenuItemPayload {
    name: Option<String>,
    price: Option<Decimal>,
    category: Option<String>,
    description: Option<String>,
    available: Option<bool>,
    image_key: Option<String>,
}

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::internal_error;
use crate::entities::user;
use crate::entities::vehicle::{self, Entity as VehicleEntity};

//ROUTERS
pub fn vehicles_router(db: Arc<DatabaseConnection>) -> Router {
    Router::new()
        .route("/vehicles", get(get_all_vehicles))
        .route("/vehicles/", get(get_all_vehicles))
        .route("/vehicles/register", post(create_vehicle))
        .route(
            "/vehicles/:id",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
        .layer(Extension(db))
}

//ROUTES
async fn get_all_vehicles(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    match VehicleEntity::find().all(&*db).await {
        Ok(vehicles) => {
            let vehicles: Vec<Value> = vehicles.iter().map(serialize_vehicle).collect();
            (StatusCode::OK, Json(json!(vehicles)))
        }
        Err(err) => internal_error(err),
    }
}

async fn get_vehicle(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match VehicleEntity::find_by_id(id).one(&*db).await {
        Ok(Some(vehicle)) => (StatusCode::OK, Json(serialize_vehicle(&vehicle))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Vehicle not found"})),
        ),
        Err(err) => internal_error(err),
    }
}

async fn create_vehicle(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateVehiclePayload>,
) -> impl IntoResponse {
    let staff_id = match payload.staff_id {
        Some(staff_id) => staff_id,
        None => return missing_field("staff_id"),
    };
    let vehicle_type = match payload.vehicle_type {
        Some(vehicle_type) => vehicle_type,
        None => return missing_field("vehicle_type"),
    };
    let plate_number = match payload.plate_number {
        Some(plate_number) => plate_number,
        None => return missing_field("plate_number"),
    };

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

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

    match VehicleEntity::find()
        .filter(vehicle::Column::StaffId.eq(staff_id))
        .one(&txn)
        .await
    {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({"message": "Staff member already has a vehicle"})),
            );
        }
        Ok(None) => {}
        Err(err) => return internal_error(err),
    }

    let new_vehicle = vehicle::ActiveModel {
        staff_id: Set(staff_id),
        vehicle_type: Set(vehicle_type),
        plate_number: Set(plate_number),
        status: Set(payload.status),
        description: Set(payload.description),
        ..Default::default()
    };

    let created = match new_vehicle.insert(&txn).await {
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
            "message": "Vehicle registered successfully",
            "vehicle": serialize_vehicle(&created),
        })),
    )
}

async fn update_vehicle(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<UpdateVehiclePayload>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    let existing = match VehicleEntity::find_by_id(id).one(&txn).await {
        Ok(Some(vehicle)) => vehicle,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Vehicle not found"})),
            );
        }
        Err(err) => return internal_error(err),
    };

    let current_id = existing.id;
    let mut vehicle: vehicle::ActiveModel = existing.clone().into();

    if let Some(staff_id) = payload.staff_id {
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

        match VehicleEntity::find()
            .filter(vehicle::Column::StaffId.eq(staff_id))
            .filter(vehicle::Column::Id.ne(current_id))
            .one(&txn)
            .await
        {
            Ok(Some(_)) => {
                return (
                    StatusCode::CONFLICT,
                    Json(json!({"message": "Staff member already has a vehicle"})),
                );
            }
            Ok(None) => vehicle.staff_id = Set(staff_id),
            Err(err) => return internal_error(err),
        }
    }

    if let Some(vehicle_type) = payload.vehicle_type {
        vehicle.vehicle_type = Set(vehicle_type);
    }
    if let Some(plate_number) = payload.plate_number {
        vehicle.plate_number = Set(plate_number);
    }
    if let Some(status) = payload.status {
        vehicle.status = Set(Some(status));
    }
    if let Some(description) = payload.description {
        vehicle.description = Set(Some(description));
    }

    let updated = match vehicle.update(&txn).await {
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
            "message": "Vehicle updated successfully",
            "vehicle": serialize_vehicle(&updated),
        })),
    )
}

async fn delete_vehicle(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(err) => return internal_error(err),
    };

    let existing = match VehicleEntity::find_by_id(id).one(&txn).await {
        Ok(Some(vehicle)) => vehicle,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "Vehicle not found"})),
            );
        }
        Err(err) => return internal_error(err),
    };

    let vehicle: vehicle::ActiveModel = existing.into();
    if let Err(err) = vehicle.delete(&txn).await {
        let _ = txn.rollback().await;
        return internal_error(err);
    }

    if let Err(err) = txn.commit().await {
        return internal_error(err);
    }

    (
        StatusCode::OK,
        Json(json!({"message": "Vehicle deleted successfully"})),
    )
}

//utilities
fn serialize_vehicle(vehicle: &vehicle::Model) -> Value {
    json!({
        "id": vehicle.id,
        "staff_id": vehicle.staff_id,
        "vehicle_type": vehicle.vehicle_type,
        "plate_number": vehicle.plate_number,
        "status": vehicle.status,
        "description": vehicle.description,
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
struct CreateVehiclePayload {
    staff_id: Option<i32>,
    vehicle_type: Option<String>,
    plate_number: Option<String>,
    status: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize, Clone)]
struct UpdateVehiclePayload {
    staff_id: Option<i32>,
    vehicle_type: Option<String>,
    plate_number: Option<String>,
    status: Option<String>,
    description: Option<String>,
}

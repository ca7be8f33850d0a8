use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;

use eatery_api::api::create_api_router;
use eatery_api::entities::setup_schema;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db: DatabaseConnection = Database::connect(&database_url)
        .await
        .expect("Failed to connect to the database");
    setup_schema(&db)
        .await
        .expect("Failed to create database schema");

    let shared_db = Arc::new(db);

    let app = create_api_router(shared_db);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_owned());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!("Listening on {}", bind_addr);
    axum::serve(listener, app).await.expect("Server error");
}

pub mod admin_user;
pub mod catering_event;
pub mod contact;
pub mod customer;
pub mod delivery;
pub mod gallery_image;
pub mod menu_item;
pub mod order;
pub mod order_item;
pub mod service;
pub mod user;
pub mod vehicle;

use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Schema};

/// Creates every table from its entity definition. Parents come before the
/// tables that reference them so the generated foreign keys resolve.
pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut statements = vec![
        schema.create_table_from_entity(admin_user::Entity),
        schema.create_table_from_entity(user::Entity),
        schema.create_table_from_entity(customer::Entity),
        schema.create_table_from_entity(menu_item::Entity),
        schema.create_table_from_entity(service::Entity),
        schema.create_table_from_entity(gallery_image::Entity),
        schema.create_table_from_entity(contact::Entity),
        schema.create_table_from_entity(order::Entity),
        schema.create_table_from_entity(order_item::Entity),
        schema.create_table_from_entity(delivery::Entity),
        schema.create_table_from_entity(catering_event::Entity),
        schema.create_table_from_entity(vehicle::Entity),
    ];

    for statement in statements.iter_mut() {
        statement.if_not_exists();
        db.execute(backend.build(&*statement)).await?;
    }

    Ok(())
}

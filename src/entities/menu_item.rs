use sea_orm::entity::prelude::*;

/// Substituted at serialization time when a row carries no image key.
pub const DEFAULT_IMAGE_KEY: &str = "meal1.jpg";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "menu_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    pub category: String,
    #[sea_orm(default_value = true)]
    pub available: bool,
    pub description: Option<String>,
    pub image_key: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;

pub use crate::entities::order::DeliveryStatus;

/// One delivery record per order; `order_id` is unique to hold the
/// one-to-one relation at the schema level.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "deliveries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub delivery_id: i32,
    #[sea_orm(unique)]
    pub order_id: i32,
    pub staff_id: i32,
    pub delivery_address: String,
    pub delivery_type: String,
    pub delivery_status: DeliveryStatus,
    pub description: Option<String>,
    pub delivery_date: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::entities::order::Entity",
        from = "Column::OrderId",
        to = "crate::entities::order::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Order,
    #[sea_orm(
        belongs_to = "crate::entities::user::Entity",
        from = "Column::StaffId",
        to = "crate::entities::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Staff,
}

impl Related<crate::entities::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

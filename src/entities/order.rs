use sea_orm::entity::prelude::*;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub customer_id: i32,
    #[sea_orm(indexed)]
    pub handler_id: Option<i32>,
    pub order_date: DateTimeUtc,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub delivery_status: DeliveryStatus,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::entities::customer::Entity",
        from = "Column::CustomerId",
        to = "crate::entities::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "crate::entities::admin_user::Entity",
        from = "Column::HandlerId",
        to = "crate::entities::admin_user::Column::Id"
    )]
    Handler,
}

impl Related<crate::entities::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumIter, DeriveActiveEnum)]
#[sea_orm(
    enum_name = "payment_status_enum",
    db_type = "String(StringLen::N(100))",
    rs_type = "String"
)]
pub enum PaymentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            _ => Err(format!("Invalid payment_status: {}", s)),
        }
    }
}

impl ToString for PaymentStatus {
    fn to_string(&self) -> String {
        match self {
            Self::Pending => "pending".to_string(),
            Self::Paid => "paid".to_string(),
            Self::Failed => "failed".to_string(),
            Self::Refunded => "refunded".to_string(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, EnumIter, DeriveActiveEnum)]
#[sea_orm(
    enum_name = "delivery_status_enum",
    db_type = "String(StringLen::N(100))",
    rs_type = "String"
)]
pub enum DeliveryStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "preparing")]
    Preparing,
    #[sea_orm(string_value = "out_for_delivery")]
    OutForDelivery,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl DeliveryStatus {
    /// Forward-only lifecycle. `delivered` and `cancelled` are terminal;
    /// `cancelled` is reachable from any non-terminal state.
    pub fn can_transition_to(self, next: DeliveryStatus) -> bool {
        use DeliveryStatus::*;

        if self == next {
            return true;
        }

        match (self, next) {
            (Pending, Preparing | OutForDelivery | Delivered | Cancelled) => true,
            (Preparing, OutForDelivery | Delivered | Cancelled) => true,
            (OutForDelivery, Delivered | Cancelled) => true,
            _ => false,
        }
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "preparing" => Ok(Self::Preparing),
            "out_for_delivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid delivery_status: {}", s)),
        }
    }
}

impl ToString for DeliveryStatus {
    fn to_string(&self) -> String {
        match self {
            Self::Pending => "pending".to_string(),
            Self::Preparing => "preparing".to_string(),
            Self::OutForDelivery => "out_for_delivery".to_string(),
            Self::Delivered => "delivered".to_string(),
            Self::Cancelled => "cancelled".to_string(),
        }
    }
}

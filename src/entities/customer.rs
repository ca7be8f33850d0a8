use sea_orm::entity::prelude::*;

use argon2::{password_hash::PasswordVerifier, Argon2, PasswordHash};

/// Customers created through the back-office endpoint carry no password
/// and cannot log in.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub full_name: String,
    #[sea_orm(unique)]
    pub contact: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password: Option<String>,
    pub address: Option<String>,
    pub customer_type: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub biography: Option<String>,
}

impl Model {
    pub fn check_hash(&self, password: &str) -> Result<(), String> {
        let stored = self
            .password
            .as_deref()
            .ok_or("No password set for this account")?;

        let parsed_hash =
            PasswordHash::new(stored).map_err(|_| "Stored password hash is malformed")?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| "Password verification failed")?;

        Ok(())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

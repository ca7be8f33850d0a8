use sea_orm::entity::prelude::*;

use argon2::{password_hash::PasswordVerifier, Argon2, PasswordHash};

/// Staff accounts. The `role` column defaults to "staff" at the handler
/// level; admins live in their own table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub full_name: String,
    pub contact: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
    pub role: String,
    pub address: Option<String>,
    pub description: Option<String>,
}

impl Model {
    pub fn check_hash(&self, password: &str) -> Result<(), String> {
        let parsed_hash =
            PasswordHash::new(&self.password).map_err(|_| "Stored password hash is malformed")?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| "Password verification failed")?;

        Ok(())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

//! The module contains the definition of an authenticated user.
//!
//! The server consumes authentication as a thin session provider: a row in
//! the `users` table with a role. Everything beyond username/password/role
//! (sessions, tokens, permission sets) belongs to the outer auth layer and
//! is not modeled here.

use sea_orm::entity::prelude::*;

use crate::ServerError;

pub const ROLE_ADMIN: &str = "admin";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Guards admin-only routes (deposits, recomputation, archiving).
pub fn require_admin(user: &Model) -> Result<(), ServerError> {
    if user.role == ROLE_ADMIN {
        Ok(())
    } else {
        Err(ServerError::Forbidden(
            "admin role required".to_string(),
        ))
    }
}

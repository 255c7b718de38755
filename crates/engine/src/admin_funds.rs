//! The undistributed admin pool.
//!
//! A single durable row holds the funds an admin has deposited but not yet
//! allocated to a project. Income transactions debit this pool; the row is
//! only updated inside the same database transaction as the movement that
//! changes it.

use sea_orm::entity::prelude::*;

/// The pool is a singleton row.
pub const POOL_ROW_ID: i32 = 1;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "admin_funds")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub balance: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

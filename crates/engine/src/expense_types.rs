//! Expense type definitions used for ledger classification.
//!
//! Renaming or deactivating a type never touches historical ledger entries:
//! entries reference the type by id, and a stale classification is only
//! replaced by an explicit reclassification pass.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseType {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

impl ExpenseType {
    pub fn new(name: String, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            is_active: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "expense_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub name_norm: String,
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<(&ExpenseType, &str)> for ActiveModel {
    fn from((expense_type, name_norm): (&ExpenseType, &str)) -> Self {
        Self {
            id: ActiveValue::Set(expense_type.id.to_string()),
            name: ActiveValue::Set(expense_type.name.clone()),
            name_norm: ActiveValue::Set(name_norm.to_string()),
            description: ActiveValue::Set(expense_type.description.clone()),
            is_active: ActiveValue::Set(expense_type.is_active),
        }
    }
}

impl TryFrom<Model> for ExpenseType {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense type")?,
            name: model.name,
            description: model.description,
            is_active: model.is_active,
        })
    }
}

//! Project bookkeeping primitives.
//!
//! A `Project` holds the money an admin has allocated to it. Its `balance`
//! and income/expense totals are denormalized aggregates: they must always
//! equal the replay of the project's non-deleted transactions, and they are
//! only ever rewritten inside the same database transaction that records or
//! reverses a money movement.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    Archived,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }
}

impl TryFrom<&str> for ProjectStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            other => Err(EngineError::InvalidProject(format!(
                "invalid project status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub balance: i64,
    pub total_income: i64,
    pub total_expenses: i64,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            balance: 0,
            total_income: 0,
            total_expenses: 0,
            status: ProjectStatus::Active,
            created_at,
        }
    }

    /// Net result so far. Derived on read, never stored.
    #[must_use]
    pub fn net_profit(&self) -> i64 {
        self.total_income - self.total_expenses
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub name_norm: String,
    pub balance: i64,
    pub total_income: i64,
    pub total_expenses: i64,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<(&Project, &str)> for ActiveModel {
    fn from((project, name_norm): (&Project, &str)) -> Self {
        Self {
            id: ActiveValue::Set(project.id.to_string()),
            name: ActiveValue::Set(project.name.clone()),
            name_norm: ActiveValue::Set(name_norm.to_string()),
            balance: ActiveValue::Set(project.balance),
            total_income: ActiveValue::Set(project.total_income),
            total_expenses: ActiveValue::Set(project.total_expenses),
            status: ActiveValue::Set(project.status.as_str().to_string()),
            created_at: ActiveValue::Set(project.created_at),
        }
    }
}

impl TryFrom<Model> for Project {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "project")?,
            name: model.name,
            balance: model.balance,
            total_income: model.total_income,
            total_expenses: model.total_expenses,
            status: ProjectStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn net_profit_is_income_minus_expenses() {
        let mut project = Project::new("توسعة المصنع".to_string(), Utc::now());
        project.total_income = 200_000;
        project.total_expenses = 50_000;
        assert_eq!(project.net_profit(), 150_000);
    }
}

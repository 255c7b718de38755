//! Posted ledger entries.
//!
//! Exactly one entry exists per posted money-movement event: a classified
//! expense transaction or a transferred deferred-payment installment. The
//! `source_event_id` column carries the id of that source event and is
//! unique in the store, which is what makes classification and transfer
//! idempotent under retries.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Expense matched to an active expense type.
    Classified,
    /// Expense with no matching active type.
    GeneralExpense,
    /// Transferred deferred-payment installment.
    Deferred,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classified => "classified",
            Self::GeneralExpense => "general_expense",
            Self::Deferred => "deferred",
        }
    }
}

impl TryFrom<&str> for EntryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "classified" => Ok(Self::Classified),
            "general_expense" => Ok(Self::GeneralExpense),
            "deferred" => Ok(Self::Deferred),
            other => Err(EngineError::NotFound(format!("ledger entry kind {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub source_event_id: Uuid,
    pub transaction_id: Option<Uuid>,
    pub expense_type_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub beneficiary: Option<String>,
    pub amount_minor: i64,
    pub description: String,
    pub kind: EntryKind,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub occurred_at: DateTimeUtc,
    pub source_event_id: String,
    pub transaction_id: Option<String>,
    pub expense_type_id: Option<String>,
    pub project_id: Option<String>,
    pub beneficiary: Option<String>,
    pub amount_minor: i64,
    pub description: String,
    pub kind: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerEntry> for ActiveModel {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            occurred_at: ActiveValue::Set(entry.occurred_at),
            source_event_id: ActiveValue::Set(entry.source_event_id.to_string()),
            transaction_id: ActiveValue::Set(entry.transaction_id.map(|id| id.to_string())),
            expense_type_id: ActiveValue::Set(entry.expense_type_id.map(|id| id.to_string())),
            project_id: ActiveValue::Set(entry.project_id.map(|id| id.to_string())),
            beneficiary: ActiveValue::Set(entry.beneficiary.clone()),
            amount_minor: ActiveValue::Set(entry.amount_minor),
            description: ActiveValue::Set(entry.description.clone()),
            kind: ActiveValue::Set(entry.kind.as_str().to_string()),
        }
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "ledger entry")?,
            occurred_at: model.occurred_at,
            source_event_id: parse_uuid(&model.source_event_id, "source event")?,
            transaction_id: model
                .transaction_id
                .as_deref()
                .map(|id| parse_uuid(id, "transaction"))
                .transpose()?,
            expense_type_id: model
                .expense_type_id
                .as_deref()
                .map(|id| parse_uuid(id, "expense type"))
                .transpose()?,
            project_id: model
                .project_id
                .as_deref()
                .map(|id| parse_uuid(id, "project"))
                .transpose()?,
            beneficiary: model.beneficiary,
            amount_minor: model.amount_minor,
            description: model.description,
            kind: EntryKind::try_from(model.kind.as_str())?,
        })
    }
}

//! Transaction primitives.
//!
//! A `Transaction` is an atomic event that moves money between the admin
//! pool and a project (or, for deposits, into the pool from outside).
//! Committed transactions are immutable; an administrative correction is a
//! delete (which reverses the balance effects) followed by a re-create.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money allocated from the admin pool to a project.
    Income,
    /// Money spent from a project's balance.
    Expense,
    /// External money entering the admin pool. Carries no project.
    Deposit,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Deposit => "deposit",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "deposit" => Ok(Self::Deposit),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub occurred_at: DateTime<Utc>,
    pub description: String,
    pub amount_minor: i64,
    pub project_id: Option<Uuid>,
    pub expense_type_label: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub idempotency_key: Option<String>,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: TransactionKind,
        occurred_at: DateTime<Utc>,
        description: String,
        amount_minor: i64,
        project_id: Option<Uuid>,
        expense_type_label: Option<String>,
        created_by: String,
        idempotency_key: Option<String>,
    ) -> ResultEngine<Self> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            kind,
            occurred_at,
            description,
            amount_minor,
            project_id,
            expense_type_label,
            created_by,
            created_at: Utc::now(),
            idempotency_key,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub occurred_at: DateTimeUtc,
    pub description: String,
    pub amount_minor: i64,
    pub project_id: Option<String>,
    pub expense_type_label: Option<String>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
    pub idempotency_key: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Projects,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            description: ActiveValue::Set(tx.description.clone()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            project_id: ActiveValue::Set(tx.project_id.map(|id| id.to_string())),
            expense_type_label: ActiveValue::Set(tx.expense_type_label.clone()),
            created_by: ActiveValue::Set(tx.created_by.clone()),
            created_at: ActiveValue::Set(tx.created_at),
            idempotency_key: ActiveValue::Set(tx.idempotency_key.clone()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            occurred_at: model.occurred_at,
            description: model.description,
            amount_minor: model.amount_minor,
            project_id: model
                .project_id
                .as_deref()
                .map(|id| parse_uuid(id, "project"))
                .transpose()?,
            expense_type_label: model.expense_type_label,
            created_by: model.created_by,
            created_at: model.created_at,
            idempotency_key: model.idempotency_key,
        })
    }
}

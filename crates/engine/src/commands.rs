//! Command structs for engine operations.
//!
//! These types group parameters for write operations (record/deposit/
//! deferred-payment creation), keeping call sites readable and avoiding
//! long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::TransactionKind;

/// Record an income or expense transaction against a project.
#[derive(Clone, Debug)]
pub struct RecordTransactionCmd {
    pub kind: TransactionKind,
    pub project_id: Uuid,
    pub amount_minor: i64,
    pub description: String,
    /// Free-text expense type label, matched against active expense types.
    pub expense_type: Option<String>,
    pub idempotency_key: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub user_id: String,
}

impl RecordTransactionCmd {
    #[must_use]
    pub fn new(
        kind: TransactionKind,
        project_id: Uuid,
        user_id: impl Into<String>,
        amount_minor: i64,
        description: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            project_id,
            amount_minor,
            description: description.into(),
            expense_type: None,
            idempotency_key: None,
            occurred_at,
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn expense_type(mut self, expense_type: impl Into<String>) -> Self {
        self.expense_type = Some(expense_type.into());
        self
    }

    #[must_use]
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// Deposit external money into the admin pool.
#[derive(Clone, Debug)]
pub struct DepositCmd {
    pub amount_minor: i64,
    pub description: Option<String>,
    pub idempotency_key: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub user_id: String,
}

impl DepositCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, amount_minor: i64, occurred_at: DateTime<Utc>) -> Self {
        Self {
            amount_minor,
            description: None,
            idempotency_key: None,
            occurred_at,
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

/// Create a deferred payment owed to a beneficiary.
#[derive(Clone, Debug)]
pub struct DeferredPaymentCmd {
    pub beneficiary_name: String,
    pub total_amount_minor: i64,
    pub project_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    pub user_id: String,
}

impl DeferredPaymentCmd {
    #[must_use]
    pub fn new(
        beneficiary_name: impl Into<String>,
        user_id: impl Into<String>,
        total_amount_minor: i64,
    ) -> Self {
        Self {
            beneficiary_name: beneficiary_name.into(),
            total_amount_minor,
            project_id: None,
            due_date: None,
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn project_id(mut self, project_id: Uuid) -> Self {
        self.project_id = Some(project_id);
        self
    }

    #[must_use]
    pub fn due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod project {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ProjectStatus {
        Active,
        Archived,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProjectCreate {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProjectList {
        pub include_archived: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProjectView {
        pub id: Uuid,
        pub name: String,
        pub balance_minor: i64,
        pub total_income_minor: i64,
        pub total_expenses_minor: i64,
        /// Derived on the server: `total_income - total_expenses`.
        pub net_profit_minor: i64,
        pub status: ProjectStatus,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProjectsResponse {
        pub projects: Vec<ProjectView>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Income,
        Expense,
        Deposit,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub kind: TransactionKind,
        pub project_id: Uuid,
        pub amount_minor: i64,
        pub description: String,
        /// Free-text expense type label; matched server-side against active
        /// expense types.
        pub expense_type: Option<String>,
        /// Optional idempotency key for safely retrying the same create request.
        pub idempotency_key: Option<String>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub occurred_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub kind: TransactionKind,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub occurred_at: DateTime<FixedOffset>,
        pub description: String,
        pub amount_minor: i64,
        pub project_id: Option<Uuid>,
        pub expense_type: Option<String>,
        pub created_by: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UpdatedBalances {
        pub admin_balance_minor: i64,
        pub project: super::project::ProjectView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionRecorded {
        pub transaction: TransactionView,
        pub updated_balances: UpdatedBalances,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionList {
        pub project_id: Option<Uuid>,
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }
}

pub mod expense_type {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseTypeCreate {
        pub name: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseTypeUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseTypeList {
        pub include_inactive: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseTypeView {
        pub id: Uuid,
        pub name: String,
        pub description: Option<String>,
        pub is_active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseTypesResponse {
        pub expense_types: Vec<ExpenseTypeView>,
    }
}

pub mod deferred {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DeferredStatus {
        Pending,
        Completed,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DeferredPaymentNew {
        pub beneficiary_name: String,
        pub total_amount_minor: i64,
        pub project_id: Option<Uuid>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub due_date: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InstallmentPay {
        pub amount_minor: i64,
        /// Optional: if absent, server uses now().
        pub paid_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DeferredPaymentList {
        pub include_completed: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DeferredPaymentView {
        pub id: Uuid,
        pub beneficiary_name: String,
        pub total_amount_minor: i64,
        pub paid_amount_minor: i64,
        pub remaining_amount_minor: i64,
        pub status: DeferredStatus,
        pub project_id: Option<Uuid>,
        pub due_date: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DeferredPaymentsResponse {
        pub payments: Vec<DeferredPaymentView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InstallmentView {
        pub id: Uuid,
        pub amount_minor: i64,
        pub paid_at: DateTime<FixedOffset>,
        pub transferred: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DeferredPaymentDetailResponse {
        pub payment: DeferredPaymentView,
        pub installments: Vec<InstallmentView>,
    }
}

pub mod ledger {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum EntryKind {
        Classified,
        GeneralExpense,
        Deferred,
    }

    /// Request body for transferring receivables into the ledger.
    ///
    /// Provide explicit installment event ids, a beneficiary name (all of
    /// their untransferred installments), or both.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferReceivables {
        pub receivable_ids: Option<Vec<Uuid>>,
        pub beneficiary: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferReceivablesResponse {
        /// Number of ledger entries created; retries return 0.
        pub created: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReclassifyResponse {
        pub reclassified: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerEntryView {
        pub id: Uuid,
        pub occurred_at: DateTime<FixedOffset>,
        pub source_event_id: Uuid,
        pub transaction_id: Option<Uuid>,
        pub expense_type_id: Option<Uuid>,
        pub project_id: Option<Uuid>,
        pub beneficiary: Option<String>,
        pub amount_minor: i64,
        pub description: String,
        pub kind: EntryKind,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerBucketView {
        pub total_minor: i64,
        pub count: u64,
        pub entries: Vec<LedgerEntryView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerSummaryResponse {
        pub classified: LedgerBucketView,
        pub general_expense: LedgerBucketView,
        pub grand_total_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatementLineView {
        pub entry: LedgerEntryView,
        pub running_balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BeneficiaryStatementResponse {
        pub beneficiary: String,
        pub lines: Vec<StatementLineView>,
    }
}

pub mod funds {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DepositNew {
        pub amount_minor: i64,
        pub description: Option<String>,
        /// Optional idempotency key for safely retrying the same create request.
        pub idempotency_key: Option<String>,
        /// RFC3339 timestamp, including timezone offset (local user time).
        pub occurred_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DepositCreated {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AdminFundsView {
        pub balance_minor: i64,
    }
}

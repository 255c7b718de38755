//! Financial ledger and balance-reconciliation core.
//!
//! The engine moves money between an admin pool, per-project balances,
//! classified expense-ledger entries and deferred (installment) payments,
//! guaranteeing that no amount is created, lost or double-counted. Every
//! balance-affecting operation runs as a single database transaction; the
//! cached aggregates (pool balance, project balances and totals) are only
//! ever rewritten inside the transaction that records or reverses the
//! movement they reflect.

pub use commands::{DeferredPaymentCmd, DepositCmd, RecordTransactionCmd};
pub use deferred_payments::{DeferredPayment, DeferredStatus};
pub use error::EngineError;
pub use expense_types::ExpenseType;
pub use installments::Installment;
pub use ledger_entries::{EntryKind, LedgerEntry};
pub use money::Amount;
pub use ops::{
    Engine, EngineBuilder, LedgerBucket, LedgerSummary, StatementLine, TransactionOutcome,
    UpdatedBalances,
};
pub use projects::{Project, ProjectStatus};
pub use transactions::{Transaction, TransactionKind};

mod admin_funds;
mod commands;
mod deferred_payments;
mod error;
mod expense_types;
mod installments;
mod ledger_entries;
mod money;
mod ops;
mod projects;
mod transactions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;

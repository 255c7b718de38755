//! Ledger summary aggregation.

use sea_orm::{QueryOrder, prelude::*};
use serde::Serialize;

use crate::{LedgerEntry, ResultEngine, ledger_entries};

use super::Engine;

/// One classification bucket of the ledger summary.
#[derive(Clone, Debug, Default, Serialize)]
pub struct LedgerBucket {
    pub total: i64,
    pub count: u64,
    pub entries: Vec<LedgerEntry>,
}

impl LedgerBucket {
    fn push(&mut self, entry: LedgerEntry) {
        self.total += entry.amount_minor;
        self.count += 1;
        self.entries.push(entry);
    }
}

/// Aggregated view over every posted ledger entry.
///
/// `grand_total` always equals `classified.total + general_expense.total`,
/// which in turn reconciles to the sum of expense transactions plus
/// transferred deferred installments.
#[derive(Clone, Debug, Serialize)]
pub struct LedgerSummary {
    pub classified: LedgerBucket,
    pub general_expense: LedgerBucket,
    pub grand_total: i64,
}

impl Engine {
    /// Builds the ledger summary.
    ///
    /// Entries are bucketed by classification: entries carrying an expense
    /// type id land in `classified`, everything else (unmatched expenses and
    /// transferred deferred installments) in `general_expense`.
    pub async fn ledger_summary(&self) -> ResultEngine<LedgerSummary> {
        let models = ledger_entries::Entity::find()
            .order_by_asc(ledger_entries::Column::OccurredAt)
            .order_by_asc(ledger_entries::Column::Id)
            .all(&self.database)
            .await?;

        let mut classified = LedgerBucket::default();
        let mut general_expense = LedgerBucket::default();

        for model in models {
            let entry = LedgerEntry::try_from(model)?;
            if entry.expense_type_id.is_some() {
                classified.push(entry);
            } else {
                general_expense.push(entry);
            }
        }

        let grand_total = classified.total + general_expense.total;
        Ok(LedgerSummary {
            classified,
            general_expense,
            grand_total,
        })
    }
}

//! Expense classification.
//!
//! Every expense transaction gets exactly one ledger entry: `classified`
//! when its free-text type label matches an active expense type,
//! `general_expense` otherwise. Posting is keyed by `source_event_id`, so
//! repeating the classification of an already-posted transaction is a
//! no-op instead of a duplicate.

use std::collections::HashMap;

use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EntryKind, LedgerEntry, ResultEngine, Transaction, TransactionKind, expense_types,
    ledger_entries, transactions,
    util::{normalize_name_key, parse_uuid},
};

use super::{Engine, with_tx};

impl Engine {
    /// Re-evaluates every expense transaction against the current expense
    /// type definitions.
    ///
    /// Used after a type is renamed, created or deactivated. Stale entries
    /// are replaced in place: only the classification (`kind` and
    /// `expense_type_id`) changes, never the amount, date or project. A
    /// missing entry is recreated. The whole pass commits as one batch.
    ///
    /// Returns the number of entries whose classification changed.
    pub async fn reclassify_transactions(&self) -> ResultEngine<u64> {
        with_tx!(self, |db_tx| {
            let types_by_key = self.active_types_by_key(&db_tx).await?;

            let expense_txs = transactions::Entity::find()
                .filter(transactions::Column::Kind.eq(TransactionKind::Expense.as_str()))
                .all(&db_tx)
                .await?;

            let mut changed = 0u64;
            for tx_model in expense_txs {
                let tx = Transaction::try_from(tx_model)?;
                let desired = classification_for(&types_by_key, tx.expense_type_label.as_deref());

                let existing = ledger_entries::Entity::find()
                    .filter(ledger_entries::Column::SourceEventId.eq(tx.id.to_string()))
                    .one(&db_tx)
                    .await?;

                match existing {
                    None => {
                        // Self-heal: an expense without an entry gets one now.
                        let entry = expense_entry(&tx, desired);
                        ledger_entries::ActiveModel::from(&entry).insert(&db_tx).await?;
                        changed += 1;
                    }
                    Some(model) => {
                        let current_type = model
                            .expense_type_id
                            .as_deref()
                            .map(|id| parse_uuid(id, "expense type"))
                            .transpose()?;
                        if current_type == desired {
                            continue;
                        }
                        let kind = entry_kind_for(desired);
                        let active = ledger_entries::ActiveModel {
                            id: ActiveValue::Set(model.id),
                            expense_type_id: ActiveValue::Set(desired.map(|id| id.to_string())),
                            kind: ActiveValue::Set(kind.as_str().to_string()),
                            ..Default::default()
                        };
                        active.update(&db_tx).await?;
                        changed += 1;
                    }
                }
            }

            tracing::info!(changed, "reclassified ledger entries");
            Ok(changed)
        })
    }

    /// Posts the ledger entry for a freshly recorded expense transaction.
    ///
    /// Skips silently when an entry for this transaction already exists (the
    /// unique `source_event_id` index backs this check at the store level).
    pub(super) async fn post_expense_entry(
        &self,
        db_tx: &DatabaseTransaction,
        tx: &Transaction,
    ) -> ResultEngine<()> {
        let existing = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::SourceEventId.eq(tx.id.to_string()))
            .one(db_tx)
            .await?;
        if existing.is_some() {
            return Ok(());
        }

        let expense_type_id = self
            .resolve_expense_type(db_tx, tx.expense_type_label.as_deref())
            .await?;
        let entry = expense_entry(tx, expense_type_id);
        ledger_entries::ActiveModel::from(&entry).insert(db_tx).await?;
        Ok(())
    }

    /// Matches a free-text label against the **active** expense types.
    async fn resolve_expense_type(
        &self,
        db_tx: &DatabaseTransaction,
        label: Option<&str>,
    ) -> ResultEngine<Option<Uuid>> {
        let Some(label) = label.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(None);
        };

        let key = normalize_name_key(label);
        let model = expense_types::Entity::find()
            .filter(expense_types::Column::NameNorm.eq(key))
            .filter(expense_types::Column::IsActive.eq(true))
            .one(db_tx)
            .await?;

        model
            .map(|model| parse_uuid(&model.id, "expense type"))
            .transpose()
    }

    async fn active_types_by_key(
        &self,
        db_tx: &DatabaseTransaction,
    ) -> ResultEngine<HashMap<String, Uuid>> {
        let models = expense_types::Entity::find()
            .filter(expense_types::Column::IsActive.eq(true))
            .all(db_tx)
            .await?;

        let mut map = HashMap::with_capacity(models.len());
        for model in models {
            map.insert(model.name_norm.clone(), parse_uuid(&model.id, "expense type")?);
        }
        Ok(map)
    }
}

fn classification_for(
    types_by_key: &HashMap<String, Uuid>,
    label: Option<&str>,
) -> Option<Uuid> {
    let label = label.map(str::trim).filter(|value| !value.is_empty())?;
    types_by_key.get(&normalize_name_key(label)).copied()
}

fn entry_kind_for(expense_type_id: Option<Uuid>) -> EntryKind {
    if expense_type_id.is_some() {
        EntryKind::Classified
    } else {
        EntryKind::GeneralExpense
    }
}

fn expense_entry(tx: &Transaction, expense_type_id: Option<Uuid>) -> LedgerEntry {
    LedgerEntry {
        id: Uuid::new_v4(),
        occurred_at: tx.occurred_at,
        source_event_id: tx.id,
        transaction_id: Some(tx.id),
        expense_type_id,
        project_id: tx.project_id,
        beneficiary: None,
        amount_minor: tx.amount_minor,
        description: tx.description.clone(),
        kind: entry_kind_for(expense_type_id),
    }
}

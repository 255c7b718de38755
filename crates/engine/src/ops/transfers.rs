//! Transfer coordination between deferred payments and the ledger.
//!
//! Moving an installment into the ledger must happen exactly once. The
//! membership check runs against `source_event_id` inside the same database
//! transaction that inserts the entry and flips the installment's
//! `transferred` flag, and the unique index on `source_event_id` backs the
//! check at the store level. Re-transferring is a successful no-op.

use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    EngineError, EntryKind, LedgerEntry, ResultEngine, deferred_payments, installments,
    ledger_entries, util::{normalize_display_name, parse_uuid},
};

use super::{Engine, with_tx};

/// One line of a beneficiary ledger view: a transferred entry plus the
/// running balance up to and including it.
#[derive(Clone, Debug, Serialize)]
pub struct StatementLine {
    pub entry: LedgerEntry,
    pub running_balance: i64,
}

impl Engine {
    /// Transfers the given installment events into the ledger.
    ///
    /// Already-transferred installments are skipped without error, so the
    /// operation is safely retryable. Unknown ids fail the whole batch with
    /// [`EngineError::NotFound`]; nothing is applied in that case.
    ///
    /// Returns the number of ledger entries created.
    pub async fn transfer_receivables(&self, installment_ids: &[Uuid]) -> ResultEngine<u64> {
        with_tx!(self, |db_tx| {
            let mut batch = Vec::with_capacity(installment_ids.len());
            for installment_id in installment_ids {
                let pair = installments::Entity::find_by_id(installment_id.to_string())
                    .find_also_related(deferred_payments::Entity)
                    .one(&db_tx)
                    .await?;
                let (installment, payment) = pair
                    .ok_or_else(|| EngineError::NotFound("installment".to_string()))?;
                let payment = payment
                    .ok_or_else(|| EngineError::NotFound("deferred payment".to_string()))?;
                batch.push((installment, payment));
            }

            self.transfer_installments(&db_tx, batch).await
        })
    }

    /// Transfers every untransferred installment owed to a beneficiary.
    pub async fn transfer_beneficiary_receivables(
        &self,
        beneficiary_name: &str,
    ) -> ResultEngine<u64> {
        let beneficiary = normalize_display_name(beneficiary_name, "beneficiary name")?;

        with_tx!(self, |db_tx| {
            let rows = installments::Entity::find()
                .filter(installments::Column::Transferred.eq(false))
                .find_also_related(deferred_payments::Entity)
                .all(&db_tx)
                .await?;

            let batch = rows
                .into_iter()
                .filter_map(|(installment, payment)| {
                    let payment = payment?;
                    (payment.beneficiary_name == beneficiary).then_some((installment, payment))
                })
                .collect::<Vec<_>>();

            self.transfer_installments(&db_tx, batch).await
        })
    }

    /// Computes a beneficiary's ledger view.
    ///
    /// The running balance is a pure fold over the transferred entries
    /// ordered by date; it is recomputed on every read and never stored, so
    /// it cannot drift from the entries themselves.
    pub async fn beneficiary_statement(
        &self,
        beneficiary_name: &str,
    ) -> ResultEngine<Vec<StatementLine>> {
        let beneficiary = normalize_display_name(beneficiary_name, "beneficiary name")?;

        let models = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::Kind.eq(EntryKind::Deferred.as_str()))
            .filter(ledger_entries::Column::Beneficiary.eq(beneficiary))
            .order_by_asc(ledger_entries::Column::OccurredAt)
            .order_by_asc(ledger_entries::Column::Id)
            .all(&self.database)
            .await?;

        let mut running_balance = 0i64;
        let mut lines = Vec::with_capacity(models.len());
        for model in models {
            let entry = LedgerEntry::try_from(model)?;
            running_balance += entry.amount_minor;
            lines.push(StatementLine {
                entry,
                running_balance,
            });
        }
        Ok(lines)
    }

    async fn transfer_installments(
        &self,
        db_tx: &DatabaseTransaction,
        batch: Vec<(installments::Model, deferred_payments::Model)>,
    ) -> ResultEngine<u64> {
        let transferred_at = Utc::now();
        let mut created = 0u64;

        for (installment_model, payment_model) in batch {
            if installment_model.transferred {
                continue;
            }
            // Belt and braces: the flag is authoritative, but a membership
            // check against existing entries keeps a half-migrated store
            // from ever double-posting.
            let existing = ledger_entries::Entity::find()
                .filter(ledger_entries::Column::SourceEventId.eq(installment_model.id.clone()))
                .one(db_tx)
                .await?;
            if existing.is_some() {
                continue;
            }

            let installment_id = parse_uuid(&installment_model.id, "installment")?;
            let entry = LedgerEntry {
                id: Uuid::new_v4(),
                occurred_at: installment_model.paid_at,
                source_event_id: installment_id,
                transaction_id: None,
                expense_type_id: None,
                project_id: payment_model
                    .project_id
                    .as_deref()
                    .map(|id| parse_uuid(id, "project"))
                    .transpose()?,
                beneficiary: Some(payment_model.beneficiary_name.clone()),
                amount_minor: installment_model.amount_minor,
                description: format!(
                    "receivable installment for {}",
                    payment_model.beneficiary_name
                ),
                kind: EntryKind::Deferred,
            };
            ledger_entries::ActiveModel::from(&entry).insert(db_tx).await?;

            let active = installments::ActiveModel {
                id: ActiveValue::Set(installment_model.id),
                transferred: ActiveValue::Set(true),
                transferred_at: ActiveValue::Set(Some(transferred_at)),
                ..Default::default()
            };
            active.update(db_tx).await?;

            created += 1;
        }

        tracing::info!(created, "transferred receivable installments to ledger");
        Ok(created)
    }
}

//! Balance recomputation.

use std::collections::HashMap;

use sea_orm::{QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, ResultEngine, TransactionKind, projects, transactions, util::parse_uuid,
};

use super::{Engine, transactions::ProjectBalanceUpdate, with_tx};

impl Engine {
    /// Recomputes the denormalized pool and project balances from the
    /// transaction log.
    ///
    /// - Replays all transactions in chronological order.
    /// - Validates non-negativity at every step, so a corrupted log is
    ///   reported instead of silently persisted.
    /// - Rewrites the pool row and every project's aggregates.
    ///
    /// The cached balances are a convenience; the transaction log is the
    /// source of truth, and this operation realigns the two.
    pub async fn recompute_balances(&self) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let project_models = projects::Entity::find().all(&db_tx).await?;
            let mut project_updates: HashMap<String, ProjectBalanceUpdate> = project_models
                .iter()
                .map(|model| {
                    (
                        model.id.clone(),
                        ProjectBalanceUpdate {
                            balance: 0,
                            total_income: 0,
                            total_expenses: 0,
                        },
                    )
                })
                .collect();
            let mut admin_balance = 0i64;

            let tx_models = transactions::Entity::find()
                .order_by_asc(transactions::Column::OccurredAt)
                .order_by_asc(transactions::Column::CreatedAt)
                .all(&db_tx)
                .await?;

            for tx_model in tx_models {
                let kind = TransactionKind::try_from(tx_model.kind.as_str())?;
                let amount = tx_model.amount_minor;

                match kind {
                    TransactionKind::Deposit => {
                        admin_balance += amount;
                    }
                    TransactionKind::Income => {
                        if admin_balance < amount {
                            return Err(EngineError::InsufficientFunds(format!(
                                "replay: pool would go negative at transaction {}",
                                tx_model.id
                            )));
                        }
                        admin_balance -= amount;
                        let update = require_update(&mut project_updates, &tx_model)?;
                        update.balance += amount;
                        update.total_income += amount;
                    }
                    TransactionKind::Expense => {
                        let update = require_update(&mut project_updates, &tx_model)?;
                        if update.balance < amount {
                            return Err(EngineError::InsufficientProjectBalance(format!(
                                "replay: project would go negative at transaction {}",
                                tx_model.id
                            )));
                        }
                        update.balance -= amount;
                        update.total_expenses += amount;
                    }
                }
            }

            for (project_id, update) in &project_updates {
                self.persist_project_balances(&db_tx, project_id, update)
                    .await?;
            }
            self.persist_admin_balance(&db_tx, admin_balance).await?;

            tracing::info!(
                admin_balance,
                projects = project_updates.len(),
                "recomputed balances from the transaction log"
            );
            Ok(())
        })
    }
}

fn require_update<'a>(
    project_updates: &'a mut HashMap<String, ProjectBalanceUpdate>,
    tx_model: &transactions::Model,
) -> ResultEngine<&'a mut ProjectBalanceUpdate> {
    let project_id = tx_model
        .project_id
        .as_deref()
        .ok_or_else(|| EngineError::NotFound("project".to_string()))?;
    // Validate the stored id before using it as a map key.
    parse_uuid(project_id, "project")?;
    project_updates
        .get_mut(project_id)
        .ok_or_else(|| EngineError::NotFound("project".to_string()))
}

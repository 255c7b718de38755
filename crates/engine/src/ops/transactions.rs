//! Transaction apply/reverse operations.
//!
//! This is the balance accessor: a pending transaction is validated against
//! the current pool/project balances and committed atomically together with
//! the balance updates, or rejected without any effect. The
//! insufficient-funds check and the balance mutation always happen inside
//! the same database transaction, so two concurrent spends serialize at the
//! store instead of racing past the check.

use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    EngineError, Project, RecordTransactionCmd, ResultEngine, Transaction, TransactionKind,
    ledger_entries, projects, transactions,
    util::{normalize_display_name, parse_uuid},
};

use super::{Engine, with_tx};

/// Balances as they stand after an apply/reverse, for the caller's response.
#[derive(Clone, Debug, Serialize)]
pub struct UpdatedBalances {
    pub admin_balance: i64,
    pub project: Project,
}

/// A committed transaction together with the balances it produced.
#[derive(Clone, Debug, Serialize)]
pub struct TransactionOutcome {
    pub transaction: Transaction,
    pub balances: UpdatedBalances,
}

impl Engine {
    /// Validates and applies an income or expense transaction.
    ///
    /// - income: money moves from the admin pool to the project. Fails with
    ///   [`EngineError::InsufficientFunds`] if the pool holds less than the
    ///   amount.
    /// - expense: money leaves the project balance. Fails with
    ///   [`EngineError::InsufficientProjectBalance`] if the project holds
    ///   less than the amount.
    ///
    /// Expense transactions are classified and posted to the ledger in the
    /// same database transaction. An idempotency-key replay returns the
    /// previously committed transaction without re-applying balances.
    pub async fn record_transaction(
        &self,
        cmd: RecordTransactionCmd,
    ) -> ResultEngine<TransactionOutcome> {
        if cmd.kind == TransactionKind::Deposit {
            return Err(EngineError::InvalidAmount(
                "deposits are recorded through deposit_admin_funds".to_string(),
            ));
        }
        if cmd.amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        let description = normalize_display_name(&cmd.description, "description")?;

        with_tx!(self, |db_tx| {
            if let Some(key) = cmd.idempotency_key.as_deref() {
                if let Some(existing) = self
                    .find_by_idempotency_key(&db_tx, &cmd.user_id, key)
                    .await?
                {
                    let tx = Transaction::try_from(existing)?;
                    let balances = self
                        .current_balances(&db_tx, tx.project_id.unwrap_or(cmd.project_id))
                        .await?;
                    return Ok(TransactionOutcome {
                        transaction: tx,
                        balances,
                    });
                }
            }

            let project_model = self.require_active_project(&db_tx, cmd.project_id).await?;

            let (new_admin_balance, project_update) = match cmd.kind {
                TransactionKind::Income => {
                    let funds = self.admin_funds_row(&db_tx).await?;
                    if funds.balance < cmd.amount_minor {
                        return Err(EngineError::InsufficientFunds(format!(
                            "pool holds {}, income of {} requested",
                            funds.balance, cmd.amount_minor
                        )));
                    }
                    (
                        Some(funds.balance - cmd.amount_minor),
                        ProjectBalanceUpdate {
                            balance: project_model.balance + cmd.amount_minor,
                            total_income: project_model.total_income + cmd.amount_minor,
                            total_expenses: project_model.total_expenses,
                        },
                    )
                }
                TransactionKind::Expense => {
                    if project_model.balance < cmd.amount_minor {
                        return Err(EngineError::InsufficientProjectBalance(format!(
                            "project '{}' holds {}, expense of {} requested",
                            project_model.name, project_model.balance, cmd.amount_minor
                        )));
                    }
                    (
                        None,
                        ProjectBalanceUpdate {
                            balance: project_model.balance - cmd.amount_minor,
                            total_income: project_model.total_income,
                            total_expenses: project_model.total_expenses + cmd.amount_minor,
                        },
                    )
                }
                TransactionKind::Deposit => unreachable!("rejected above"),
            };

            let tx = Transaction::new(
                cmd.kind,
                cmd.occurred_at,
                description,
                cmd.amount_minor,
                Some(cmd.project_id),
                cmd.expense_type.clone(),
                cmd.user_id.clone(),
                cmd.idempotency_key.clone(),
            )?;
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;

            if cmd.kind == TransactionKind::Expense {
                self.post_expense_entry(&db_tx, &tx).await?;
            }

            self.persist_project_balances(&db_tx, &project_model.id, &project_update)
                .await?;
            if let Some(balance) = new_admin_balance {
                self.persist_admin_balance(&db_tx, balance).await?;
            }

            let admin_balance = match new_admin_balance {
                Some(balance) => balance,
                None => self.admin_funds_row(&db_tx).await?.balance,
            };
            let mut project = Project::try_from(project_model)?;
            project.balance = project_update.balance;
            project.total_income = project_update.total_income;
            project.total_expenses = project_update.total_expenses;

            Ok(TransactionOutcome {
                transaction: tx,
                balances: UpdatedBalances {
                    admin_balance,
                    project,
                },
            })
        })
    }

    /// Deletes a transaction, reversing its balance effects first.
    ///
    /// The reverse is the exact inverse of the original apply: an income
    /// delete returns money from the project to the pool (refused if the
    /// project has already spent it), an expense delete returns money to the
    /// project, a deposit delete drains the pool (refused if that would go
    /// negative). The transaction's ledger entry, if any, is removed in the
    /// same step.
    pub async fn delete_transaction(&self, transaction_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let tx_model = transactions::Entity::find_by_id(transaction_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("transaction".to_string()))?;
            let kind = TransactionKind::try_from(tx_model.kind.as_str())?;
            let amount = tx_model.amount_minor;

            match kind {
                TransactionKind::Income => {
                    let project_model = self.require_tx_project(&db_tx, &tx_model).await?;
                    if project_model.balance < amount {
                        return Err(EngineError::InsufficientProjectBalance(format!(
                            "project '{}' holds {}, cannot reverse income of {}",
                            project_model.name, project_model.balance, amount
                        )));
                    }
                    let funds = self.admin_funds_row(&db_tx).await?;
                    self.persist_project_balances(
                        &db_tx,
                        &project_model.id,
                        &ProjectBalanceUpdate {
                            balance: project_model.balance - amount,
                            total_income: project_model.total_income - amount,
                            total_expenses: project_model.total_expenses,
                        },
                    )
                    .await?;
                    self.persist_admin_balance(&db_tx, funds.balance + amount)
                        .await?;
                }
                TransactionKind::Expense => {
                    let project_model = self.require_tx_project(&db_tx, &tx_model).await?;
                    self.persist_project_balances(
                        &db_tx,
                        &project_model.id,
                        &ProjectBalanceUpdate {
                            balance: project_model.balance + amount,
                            total_income: project_model.total_income,
                            total_expenses: project_model.total_expenses - amount,
                        },
                    )
                    .await?;
                }
                TransactionKind::Deposit => {
                    let funds = self.admin_funds_row(&db_tx).await?;
                    if funds.balance < amount {
                        return Err(EngineError::InsufficientFunds(format!(
                            "pool holds {}, cannot reverse deposit of {}",
                            funds.balance, amount
                        )));
                    }
                    self.persist_admin_balance(&db_tx, funds.balance - amount)
                        .await?;
                }
            }

            ledger_entries::Entity::delete_many()
                .filter(ledger_entries::Column::SourceEventId.eq(tx_model.id.clone()))
                .exec(&db_tx)
                .await?;
            transactions::Entity::delete_by_id(tx_model.id)
                .exec(&db_tx)
                .await?;

            Ok(())
        })
    }

    /// Lists recent transactions, newest first, optionally scoped to one
    /// project.
    pub async fn list_transactions(
        &self,
        project_id: Option<Uuid>,
        limit: u64,
    ) -> ResultEngine<Vec<Transaction>> {
        let mut query = transactions::Entity::find()
            .order_by_desc(transactions::Column::OccurredAt)
            .limit(limit);
        if let Some(project_id) = project_id {
            query = query.filter(transactions::Column::ProjectId.eq(project_id.to_string()));
        }

        let models = query.all(&self.database).await?;
        models.into_iter().map(Transaction::try_from).collect()
    }

    async fn require_tx_project(
        &self,
        db_tx: &DatabaseTransaction,
        tx_model: &transactions::Model,
    ) -> ResultEngine<projects::Model> {
        let project_id = tx_model
            .project_id
            .as_deref()
            .ok_or_else(|| EngineError::NotFound("project".to_string()))?;
        self.require_project(db_tx, parse_uuid(project_id, "project")?)
            .await
    }

    async fn current_balances(
        &self,
        db_tx: &DatabaseTransaction,
        project_id: Uuid,
    ) -> ResultEngine<UpdatedBalances> {
        let funds = self.admin_funds_row(db_tx).await?;
        let project_model = self.require_project(db_tx, project_id).await?;
        Ok(UpdatedBalances {
            admin_balance: funds.balance,
            project: Project::try_from(project_model)?,
        })
    }

    pub(super) async fn persist_project_balances(
        &self,
        db_tx: &DatabaseTransaction,
        project_id: &str,
        update: &ProjectBalanceUpdate,
    ) -> ResultEngine<()> {
        let active = projects::ActiveModel {
            id: ActiveValue::Set(project_id.to_string()),
            balance: ActiveValue::Set(update.balance),
            total_income: ActiveValue::Set(update.total_income),
            total_expenses: ActiveValue::Set(update.total_expenses),
            ..Default::default()
        };
        active.update(db_tx).await?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
pub(super) struct ProjectBalanceUpdate {
    pub(super) balance: i64,
    pub(super) total_income: i64,
    pub(super) total_expenses: i64,
}

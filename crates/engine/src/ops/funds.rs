//! Admin pool operations.

use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    DepositCmd, EngineError, ResultEngine, Transaction, TransactionKind, admin_funds,
    transactions, util::normalize_display_name,
};

use super::{Engine, with_tx};

impl Engine {
    /// Returns the current admin pool balance.
    pub async fn admin_balance(&self) -> ResultEngine<i64> {
        let model = admin_funds::Entity::find_by_id(admin_funds::POOL_ROW_ID)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("admin funds".to_string()))?;
        Ok(model.balance)
    }

    /// Deposits external money into the admin pool.
    ///
    /// The deposit is recorded as a `deposit` transaction so the pool stays
    /// reconstructible from the transaction log, and the pool row is updated
    /// in the same database transaction.
    pub async fn deposit_admin_funds(&self, cmd: DepositCmd) -> ResultEngine<Uuid> {
        if cmd.amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "deposit amount must be > 0".to_string(),
            ));
        }
        let description = match cmd.description.as_deref() {
            Some(text) => normalize_display_name(text, "description")?,
            None => "admin funds deposit".to_string(),
        };

        with_tx!(self, |db_tx| {
            if let Some(key) = cmd.idempotency_key.as_deref() {
                if let Some(existing) = self
                    .find_by_idempotency_key(&db_tx, &cmd.user_id, key)
                    .await?
                {
                    return Transaction::try_from(existing).map(|tx| tx.id);
                }
            }

            let funds = self.admin_funds_row(&db_tx).await?;

            let tx = Transaction::new(
                TransactionKind::Deposit,
                cmd.occurred_at,
                description,
                cmd.amount_minor,
                None,
                None,
                cmd.user_id,
                cmd.idempotency_key,
            )?;
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;

            self.persist_admin_balance(&db_tx, funds.balance + cmd.amount_minor)
                .await?;

            Ok(tx.id)
        })
    }

    pub(super) async fn admin_funds_row(
        &self,
        db_tx: &DatabaseTransaction,
    ) -> ResultEngine<admin_funds::Model> {
        admin_funds::Entity::find_by_id(admin_funds::POOL_ROW_ID)
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::NotFound("admin funds".to_string()))
    }

    pub(super) async fn persist_admin_balance(
        &self,
        db_tx: &DatabaseTransaction,
        balance: i64,
    ) -> ResultEngine<()> {
        let active = admin_funds::ActiveModel {
            id: ActiveValue::Set(admin_funds::POOL_ROW_ID),
            balance: ActiveValue::Set(balance),
        };
        active.update(db_tx).await?;
        Ok(())
    }

    pub(super) async fn find_by_idempotency_key(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        key: &str,
    ) -> ResultEngine<Option<transactions::Model>> {
        let existing = transactions::Entity::find()
            .filter(transactions::Column::CreatedBy.eq(user_id.to_string()))
            .filter(transactions::Column::IdempotencyKey.eq(key.to_string()))
            .one(db_tx)
            .await?;
        Ok(existing)
    }
}

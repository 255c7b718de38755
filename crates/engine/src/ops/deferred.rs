//! Deferred payment operations.
//!
//! Deferred payments live beside the main transaction flow: creating one or
//! paying an installment never touches the ledger or any balance. Money
//! only reaches the ledger through the transfer coordinator.

use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    DeferredPayment, DeferredPaymentCmd, DeferredStatus, EngineError, Installment, ResultEngine,
    deferred_payments, installments, util::normalize_display_name,
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a deferred payment owed to a beneficiary.
    pub async fn create_deferred_payment(
        &self,
        cmd: DeferredPaymentCmd,
    ) -> ResultEngine<DeferredPayment> {
        let beneficiary = normalize_display_name(&cmd.beneficiary_name, "beneficiary name")?;

        with_tx!(self, |db_tx| {
            if let Some(project_id) = cmd.project_id {
                self.require_project(&db_tx, project_id).await?;
            }

            let payment = DeferredPayment::new(
                beneficiary,
                cmd.total_amount_minor,
                cmd.project_id,
                cmd.due_date,
                cmd.user_id,
            )?;
            deferred_payments::ActiveModel::from(&payment)
                .insert(&db_tx)
                .await?;
            Ok(payment)
        })
    }

    /// Pays an installment against a deferred payment.
    ///
    /// Atomically updates paid/remaining (flipping the status to completed
    /// when the remainder reaches 0) and records the installment event. The
    /// event stays untransferred until the coordinator moves it into the
    /// ledger.
    pub async fn pay_installment(
        &self,
        deferred_payment_id: Uuid,
        amount_minor: i64,
        paid_at: DateTime<Utc>,
    ) -> ResultEngine<DeferredPayment> {
        with_tx!(self, |db_tx| {
            let model = deferred_payments::Entity::find_by_id(deferred_payment_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("deferred payment".to_string()))?;

            let mut payment = DeferredPayment::try_from(model)?;
            payment.apply_installment(amount_minor)?;

            let installment = Installment::new(payment.id, amount_minor, paid_at);
            installments::ActiveModel::from(&installment)
                .insert(&db_tx)
                .await?;

            deferred_payments::ActiveModel::from(&payment)
                .save(&db_tx)
                .await?;

            Ok(payment)
        })
    }

    /// Returns a deferred payment together with its installment events.
    pub async fn deferred_payment(
        &self,
        deferred_payment_id: Uuid,
    ) -> ResultEngine<(DeferredPayment, Vec<Installment>)> {
        let model = deferred_payments::Entity::find_by_id(deferred_payment_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound("deferred payment".to_string()))?;
        let payment = DeferredPayment::try_from(model)?;

        let installment_models = installments::Entity::find()
            .filter(installments::Column::DeferredPaymentId.eq(payment.id.to_string()))
            .order_by_asc(installments::Column::PaidAt)
            .all(&self.database)
            .await?;
        let installments = installment_models
            .into_iter()
            .map(Installment::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        Ok((payment, installments))
    }

    /// Lists deferred payments, newest first.
    pub async fn list_deferred_payments(
        &self,
        include_completed: bool,
    ) -> ResultEngine<Vec<DeferredPayment>> {
        let mut query = deferred_payments::Entity::find()
            .order_by_desc(deferred_payments::Column::CreatedAt);
        if !include_completed {
            query = query
                .filter(deferred_payments::Column::Status.eq(DeferredStatus::Pending.as_str()));
        }

        let models = query.all(&self.database).await?;
        models.into_iter().map(DeferredPayment::try_from).collect()
    }
}

//! Deferred (installment) payments owed to a beneficiary.
//!
//! A deferred payment tracks what is owed and what has been paid so far,
//! independent of the main transaction flow: paying an installment does not
//! touch the ledger or any balance until the installment is explicitly
//! transferred. The arithmetic invariant `paid + remaining == total` holds
//! after every operation, and `status` is `completed` exactly when
//! `remaining` reaches 0.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeferredStatus {
    Pending,
    Completed,
}

impl DeferredStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl TryFrom<&str> for DeferredStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(EngineError::NotFound(format!(
                "deferred payment status {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredPayment {
    pub id: Uuid,
    pub beneficiary_name: String,
    pub total_amount_minor: i64,
    pub paid_amount_minor: i64,
    pub remaining_amount_minor: i64,
    pub status: DeferredStatus,
    pub project_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl DeferredPayment {
    pub fn new(
        beneficiary_name: String,
        total_amount_minor: i64,
        project_id: Option<Uuid>,
        due_date: Option<DateTime<Utc>>,
        created_by: String,
    ) -> ResultEngine<Self> {
        if total_amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "total_amount_minor must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            beneficiary_name,
            total_amount_minor,
            paid_amount_minor: 0,
            remaining_amount_minor: total_amount_minor,
            status: DeferredStatus::Pending,
            project_id,
            due_date,
            created_by,
            created_at: Utc::now(),
        })
    }

    /// Applies a partial payment.
    ///
    /// Fails without mutating if the amount is not positive or exceeds the
    /// remaining debt. Flips `status` to `completed` when the remainder
    /// reaches 0.
    pub fn apply_installment(&mut self, amount_minor: i64) -> ResultEngine<()> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "installment amount must be > 0".to_string(),
            ));
        }
        if amount_minor > self.remaining_amount_minor {
            return Err(EngineError::InvalidAmount(format!(
                "installment {amount_minor} exceeds remaining {}",
                self.remaining_amount_minor
            )));
        }

        self.paid_amount_minor += amount_minor;
        self.remaining_amount_minor -= amount_minor;
        if self.remaining_amount_minor == 0 {
            self.status = DeferredStatus::Completed;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "deferred_payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub beneficiary_name: String,
    pub total_amount_minor: i64,
    pub paid_amount_minor: i64,
    pub remaining_amount_minor: i64,
    pub status: String,
    pub project_id: Option<String>,
    pub due_date: Option<DateTimeUtc>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::installments::Entity")]
    Installments,
}

impl Related<super::installments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Installments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&DeferredPayment> for ActiveModel {
    fn from(payment: &DeferredPayment) -> Self {
        Self {
            id: ActiveValue::Set(payment.id.to_string()),
            beneficiary_name: ActiveValue::Set(payment.beneficiary_name.clone()),
            total_amount_minor: ActiveValue::Set(payment.total_amount_minor),
            paid_amount_minor: ActiveValue::Set(payment.paid_amount_minor),
            remaining_amount_minor: ActiveValue::Set(payment.remaining_amount_minor),
            status: ActiveValue::Set(payment.status.as_str().to_string()),
            project_id: ActiveValue::Set(payment.project_id.map(|id| id.to_string())),
            due_date: ActiveValue::Set(payment.due_date),
            created_by: ActiveValue::Set(payment.created_by.clone()),
            created_at: ActiveValue::Set(payment.created_at),
        }
    }
}

impl TryFrom<Model> for DeferredPayment {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "deferred payment")?,
            beneficiary_name: model.beneficiary_name,
            total_amount_minor: model.total_amount_minor,
            paid_amount_minor: model.paid_amount_minor,
            remaining_amount_minor: model.remaining_amount_minor,
            status: DeferredStatus::try_from(model.status.as_str())?,
            project_id: model
                .project_id
                .as_deref()
                .map(|id| parse_uuid(id, "project"))
                .transpose()?,
            due_date: model.due_date,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(total: i64) -> DeferredPayment {
        DeferredPayment::new("مقاول الكهرباء".to_string(), total, None, None, "alice".to_string())
            .unwrap()
    }

    #[test]
    fn new_payment_starts_pending() {
        let payment = payment(5000);
        assert_eq!(payment.paid_amount_minor, 0);
        assert_eq!(payment.remaining_amount_minor, 5000);
        assert_eq!(payment.status, DeferredStatus::Pending);
    }

    #[test]
    fn partial_installment_keeps_pending() {
        let mut payment = payment(5000);
        payment.apply_installment(3000).unwrap();
        assert_eq!(payment.paid_amount_minor, 3000);
        assert_eq!(payment.remaining_amount_minor, 2000);
        assert_eq!(payment.status, DeferredStatus::Pending);
        assert_eq!(
            payment.paid_amount_minor + payment.remaining_amount_minor,
            payment.total_amount_minor
        );
    }

    #[test]
    fn exact_remainder_completes() {
        let mut payment = payment(5000);
        payment.apply_installment(3000).unwrap();
        payment.apply_installment(2000).unwrap();
        assert_eq!(payment.remaining_amount_minor, 0);
        assert_eq!(payment.status, DeferredStatus::Completed);
    }

    #[test]
    fn fail_installment_exceeding_remainder() {
        let mut payment = payment(5000);
        payment.apply_installment(3000).unwrap();
        let err = payment.apply_installment(2001).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
        // A rejected installment leaves the payment untouched.
        assert_eq!(payment.paid_amount_minor, 3000);
        assert_eq!(payment.remaining_amount_minor, 2000);
    }

    #[test]
    fn fail_non_positive_installment() {
        let mut payment = payment(5000);
        assert!(payment.apply_installment(0).is_err());
        assert!(payment.apply_installment(-10).is_err());
    }

    #[test]
    fn fail_non_positive_total() {
        assert!(
            DeferredPayment::new("x".to_string(), 0, None, None, "alice".to_string()).is_err()
        );
    }
}

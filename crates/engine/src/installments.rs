//! Installment events recorded against a deferred payment.
//!
//! Each partial payment is its own timestamped event. `transferred` is a
//! one-way flag: once an installment has been moved into the ledger it can
//! never be transferred again.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    pub id: Uuid,
    pub deferred_payment_id: Uuid,
    pub amount_minor: i64,
    pub paid_at: DateTime<Utc>,
    pub transferred: bool,
    pub transferred_at: Option<DateTime<Utc>>,
}

impl Installment {
    pub fn new(deferred_payment_id: Uuid, amount_minor: i64, paid_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            deferred_payment_id,
            amount_minor,
            paid_at,
            transferred: false,
            transferred_at: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "installments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub deferred_payment_id: String,
    pub amount_minor: i64,
    pub paid_at: DateTimeUtc,
    pub transferred: bool,
    pub transferred_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::deferred_payments::Entity",
        from = "Column::DeferredPaymentId",
        to = "super::deferred_payments::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    DeferredPayments,
}

impl Related<super::deferred_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DeferredPayments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Installment> for ActiveModel {
    fn from(installment: &Installment) -> Self {
        Self {
            id: ActiveValue::Set(installment.id.to_string()),
            deferred_payment_id: ActiveValue::Set(installment.deferred_payment_id.to_string()),
            amount_minor: ActiveValue::Set(installment.amount_minor),
            paid_at: ActiveValue::Set(installment.paid_at),
            transferred: ActiveValue::Set(installment.transferred),
            transferred_at: ActiveValue::Set(installment.transferred_at),
        }
    }
}

impl TryFrom<Model> for Installment {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "installment")?,
            deferred_payment_id: parse_uuid(&model.deferred_payment_id, "deferred payment")?,
            amount_minor: model.amount_minor,
            paid_at: model.paid_at,
            transferred: model.transferred,
            transferred_at: model.transferred_at,
        })
    }
}

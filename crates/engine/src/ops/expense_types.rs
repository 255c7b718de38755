//! Expense type management.

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ExpenseType, ResultEngine, expense_types,
    util::{normalize_display_name, normalize_name_key},
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates a new, active expense type.
    pub async fn create_expense_type(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> ResultEngine<ExpenseType> {
        let name = normalize_display_name(name, "expense type name")?;
        let name_norm = normalize_name_key(&name);
        let description = description
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string);

        with_tx!(self, |db_tx| {
            let existing = expense_types::Entity::find()
                .filter(expense_types::Column::NameNorm.eq(name_norm.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::DuplicateName(name));
            }

            let expense_type = ExpenseType::new(name, description);
            expense_types::ActiveModel::from((&expense_type, name_norm.as_str()))
                .insert(&db_tx)
                .await?;
            Ok(expense_type)
        })
    }

    /// Renames, describes, activates or deactivates an expense type.
    ///
    /// Historical ledger entries keep referencing the type by id, so neither
    /// a rename nor a deactivation touches them; a reclassification pass is
    /// the explicit way to re-evaluate past transactions.
    pub async fn update_expense_type(
        &self,
        expense_type_id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        is_active: Option<bool>,
    ) -> ResultEngine<ExpenseType> {
        with_tx!(self, |db_tx| {
            let model = expense_types::Entity::find_by_id(expense_type_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound("expense type".to_string()))?;

            let mut active = expense_types::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                ..Default::default()
            };

            if let Some(name) = name {
                let name = normalize_display_name(name, "expense type name")?;
                let name_norm = normalize_name_key(&name);
                let conflict = expense_types::Entity::find()
                    .filter(expense_types::Column::NameNorm.eq(name_norm.clone()))
                    .filter(expense_types::Column::Id.ne(model.id.clone()))
                    .one(&db_tx)
                    .await?;
                if conflict.is_some() {
                    return Err(EngineError::DuplicateName(name));
                }
                active.name = ActiveValue::Set(name);
                active.name_norm = ActiveValue::Set(name_norm);
            }
            if let Some(description) = description {
                let trimmed = description.trim();
                active.description = ActiveValue::Set(if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                });
            }
            if let Some(is_active) = is_active {
                active.is_active = ActiveValue::Set(is_active);
            }

            let updated = active.update(&db_tx).await?;
            ExpenseType::try_from(updated)
        })
    }

    /// Lists expense types, active first.
    pub async fn list_expense_types(
        &self,
        include_inactive: bool,
    ) -> ResultEngine<Vec<ExpenseType>> {
        let mut query = expense_types::Entity::find().order_by_asc(expense_types::Column::Name);
        if !include_inactive {
            query = query.filter(expense_types::Column::IsActive.eq(true));
        }

        let models = query.all(&self.database).await?;
        models.into_iter().map(ExpenseType::try_from).collect()
    }
}

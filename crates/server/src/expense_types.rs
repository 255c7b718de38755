//! Expense types API endpoints.

use api_types::expense_type::{
    ExpenseTypeCreate, ExpenseTypeList, ExpenseTypeUpdate, ExpenseTypeView, ExpenseTypesResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn map_expense_type(expense_type: engine::ExpenseType) -> ExpenseTypeView {
    ExpenseTypeView {
        id: expense_type.id,
        name: expense_type.name,
        description: expense_type.description,
        is_active: expense_type.is_active,
    }
}

pub async fn create(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseTypeCreate>,
) -> Result<(StatusCode, Json<ExpenseTypeView>), ServerError> {
    let expense_type = state
        .engine
        .create_expense_type(&payload.name, payload.description.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(map_expense_type(expense_type))))
}

pub async fn update(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExpenseTypeUpdate>,
) -> Result<Json<ExpenseTypeView>, ServerError> {
    if payload.name.is_none() && payload.description.is_none() && payload.is_active.is_none() {
        return Err(ServerError::Generic(
            "provide at least one of name, description or is_active".to_string(),
        ));
    }

    let expense_type = state
        .engine
        .update_expense_type(
            id,
            payload.name.as_deref(),
            payload.description.as_deref(),
            payload.is_active,
        )
        .await?;
    Ok(Json(map_expense_type(expense_type)))
}

pub async fn list(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseTypeList>,
) -> Result<Json<ExpenseTypesResponse>, ServerError> {
    let include_inactive = payload.include_inactive.unwrap_or(false);
    let expense_types = state
        .engine
        .list_expense_types(include_inactive)
        .await?
        .into_iter()
        .map(map_expense_type)
        .collect();

    Ok(Json(ExpenseTypesResponse { expense_types }))
}

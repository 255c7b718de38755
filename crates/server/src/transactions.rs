//! Transactions API endpoints

use api_types::transaction::{
    TransactionKind as ApiKind, TransactionList, TransactionListResponse, TransactionNew,
    TransactionRecorded, TransactionView, UpdatedBalances,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, projects::map_project, server::ServerState, user};

pub(crate) fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Income => ApiKind::Income,
        engine::TransactionKind::Expense => ApiKind::Expense,
        engine::TransactionKind::Deposit => ApiKind::Deposit,
    }
}

pub(crate) fn map_transaction(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        kind: map_kind(tx.kind),
        occurred_at: tx.occurred_at.fixed_offset(),
        description: tx.description,
        amount_minor: tx.amount_minor,
        project_id: tx.project_id,
        expense_type: tx.expense_type_label,
        created_by: tx.created_by,
    }
}

pub async fn record(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionRecorded>), ServerError> {
    let kind = match payload.kind {
        ApiKind::Income => engine::TransactionKind::Income,
        ApiKind::Expense => engine::TransactionKind::Expense,
        ApiKind::Deposit => {
            return Err(ServerError::Generic(
                "deposits go through /adminFunds/deposit".to_string(),
            ));
        }
    };

    let mut cmd = engine::RecordTransactionCmd::new(
        kind,
        payload.project_id,
        user.username.clone(),
        payload.amount_minor,
        payload.description,
        payload.occurred_at.with_timezone(&Utc),
    );
    if let Some(expense_type) = payload.expense_type {
        cmd = cmd.expense_type(expense_type);
    }
    if let Some(key) = payload.idempotency_key {
        cmd = cmd.idempotency_key(key);
    }

    let outcome = state.engine.record_transaction(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionRecorded {
            transaction: map_transaction(outcome.transaction),
            updated_balances: UpdatedBalances {
                admin_balance_minor: outcome.balances.admin_balance,
                project: map_project(outcome.balances.project),
            },
        }),
    ))
}

pub async fn list(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionList>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let limit = payload.limit.unwrap_or(50);
    let transactions = state
        .engine
        .list_transactions(payload.project_id, limit)
        .await?
        .into_iter()
        .map(map_transaction)
        .collect();

    Ok(Json(TransactionListResponse { transactions }))
}

pub async fn remove(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transaction(id).await?;
    Ok(StatusCode::OK)
}

//! Admin funds API endpoints.

use api_types::funds::{AdminFundsView, DepositCreated, DepositNew};
use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;

use crate::{ServerError, server::ServerState, user};

pub async fn get_balance(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<AdminFundsView>, ServerError> {
    let balance_minor = state.engine.admin_balance().await?;
    Ok(Json(AdminFundsView { balance_minor }))
}

pub async fn deposit(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<DepositNew>,
) -> Result<(StatusCode, Json<DepositCreated>), ServerError> {
    user::require_admin(&user)?;

    let mut cmd = engine::DepositCmd::new(
        user.username.clone(),
        payload.amount_minor,
        payload.occurred_at.with_timezone(&Utc),
    );
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(key) = payload.idempotency_key {
        cmd = cmd.idempotency_key(key);
    }

    let id = state.engine.deposit_admin_funds(cmd).await?;
    Ok((StatusCode::CREATED, Json(DepositCreated { id })))
}

pub async fn recompute(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    user::require_admin(&user)?;
    state.engine.recompute_balances().await?;
    Ok(StatusCode::OK)
}

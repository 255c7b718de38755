//! Deferred payments API endpoints.

use api_types::deferred::{
    DeferredPaymentDetailResponse, DeferredPaymentList, DeferredPaymentNew, DeferredPaymentView,
    DeferredPaymentsResponse, DeferredStatus as ApiStatus, InstallmentPay, InstallmentView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn map_status(status: engine::DeferredStatus) -> ApiStatus {
    match status {
        engine::DeferredStatus::Pending => ApiStatus::Pending,
        engine::DeferredStatus::Completed => ApiStatus::Completed,
    }
}

fn map_payment(payment: engine::DeferredPayment) -> DeferredPaymentView {
    DeferredPaymentView {
        id: payment.id,
        beneficiary_name: payment.beneficiary_name,
        total_amount_minor: payment.total_amount_minor,
        paid_amount_minor: payment.paid_amount_minor,
        remaining_amount_minor: payment.remaining_amount_minor,
        status: map_status(payment.status),
        project_id: payment.project_id,
        due_date: payment.due_date.map(|date| date.fixed_offset()),
    }
}

fn map_installment(installment: engine::Installment) -> InstallmentView {
    InstallmentView {
        id: installment.id,
        amount_minor: installment.amount_minor,
        paid_at: installment.paid_at.fixed_offset(),
        transferred: installment.transferred,
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<DeferredPaymentNew>,
) -> Result<(StatusCode, Json<DeferredPaymentView>), ServerError> {
    let mut cmd = engine::DeferredPaymentCmd::new(
        payload.beneficiary_name,
        user.username.clone(),
        payload.total_amount_minor,
    );
    if let Some(project_id) = payload.project_id {
        cmd = cmd.project_id(project_id);
    }
    if let Some(due_date) = payload.due_date {
        cmd = cmd.due_date(due_date.with_timezone(&Utc));
    }

    let payment = state.engine.create_deferred_payment(cmd).await?;
    Ok((StatusCode::CREATED, Json(map_payment(payment))))
}

pub async fn pay(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<InstallmentPay>,
) -> Result<Json<DeferredPaymentView>, ServerError> {
    let paid_at = payload
        .paid_at
        .map(|date| date.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    let payment = state
        .engine
        .pay_installment(id, payload.amount_minor, paid_at)
        .await?;
    Ok(Json(map_payment(payment)))
}

pub async fn detail(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeferredPaymentDetailResponse>, ServerError> {
    let (payment, installments) = state.engine.deferred_payment(id).await?;
    Ok(Json(DeferredPaymentDetailResponse {
        payment: map_payment(payment),
        installments: installments.into_iter().map(map_installment).collect(),
    }))
}

pub async fn list(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<DeferredPaymentList>,
) -> Result<Json<DeferredPaymentsResponse>, ServerError> {
    let include_completed = payload.include_completed.unwrap_or(true);
    let payments = state
        .engine
        .list_deferred_payments(include_completed)
        .await?
        .into_iter()
        .map(map_payment)
        .collect();

    Ok(Json(DeferredPaymentsResponse { payments }))
}

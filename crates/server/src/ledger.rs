//! Ledger API endpoints: transfers, reclassification, summary, statements.

use api_types::ledger::{
    BeneficiaryStatementResponse, EntryKind as ApiEntryKind, LedgerBucketView, LedgerEntryView,
    LedgerSummaryResponse, ReclassifyResponse, StatementLineView, TransferReceivables,
    TransferReceivablesResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{ServerError, server::ServerState, user};

fn map_entry_kind(kind: engine::EntryKind) -> ApiEntryKind {
    match kind {
        engine::EntryKind::Classified => ApiEntryKind::Classified,
        engine::EntryKind::GeneralExpense => ApiEntryKind::GeneralExpense,
        engine::EntryKind::Deferred => ApiEntryKind::Deferred,
    }
}

fn map_entry(entry: engine::LedgerEntry) -> LedgerEntryView {
    LedgerEntryView {
        id: entry.id,
        occurred_at: entry.occurred_at.fixed_offset(),
        source_event_id: entry.source_event_id,
        transaction_id: entry.transaction_id,
        expense_type_id: entry.expense_type_id,
        project_id: entry.project_id,
        beneficiary: entry.beneficiary,
        amount_minor: entry.amount_minor,
        description: entry.description,
        kind: map_entry_kind(entry.kind),
    }
}

fn map_bucket(bucket: engine::LedgerBucket) -> LedgerBucketView {
    LedgerBucketView {
        total_minor: bucket.total,
        count: bucket.count,
        entries: bucket.entries.into_iter().map(map_entry).collect(),
    }
}

pub async fn transfer_receivables(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransferReceivables>,
) -> Result<Json<TransferReceivablesResponse>, ServerError> {
    let mut created = 0u64;

    match (payload.receivable_ids, payload.beneficiary) {
        (None, None) => {
            return Err(ServerError::Generic(
                "either receivable_ids or beneficiary is required".to_string(),
            ));
        }
        (ids, beneficiary) => {
            if let Some(ids) = ids {
                created += state.engine.transfer_receivables(&ids).await?;
            }
            if let Some(beneficiary) = beneficiary {
                created += state
                    .engine
                    .transfer_beneficiary_receivables(&beneficiary)
                    .await?;
            }
        }
    }

    Ok(Json(TransferReceivablesResponse { created }))
}

pub async fn reclassify(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<ReclassifyResponse>, ServerError> {
    let reclassified = state.engine.reclassify_transactions().await?;
    Ok(Json(ReclassifyResponse { reclassified }))
}

pub async fn summary(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<LedgerSummaryResponse>, ServerError> {
    let summary = state.engine.ledger_summary().await?;
    Ok(Json(LedgerSummaryResponse {
        classified: map_bucket(summary.classified),
        general_expense: map_bucket(summary.general_expense),
        grand_total_minor: summary.grand_total,
    }))
}

pub async fn beneficiary_statement(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<BeneficiaryStatementResponse>, ServerError> {
    let lines = state
        .engine
        .beneficiary_statement(&name)
        .await?
        .into_iter()
        .map(|line| StatementLineView {
            entry: map_entry(line.entry),
            running_balance_minor: line.running_balance,
        })
        .collect();

    Ok(Json(BeneficiaryStatementResponse {
        beneficiary: name,
        lines,
    }))
}

use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod deferred;
mod expense_types;
mod funds;
mod ledger;
mod projects;
mod server;
mod transactions;
mod user;

pub mod types {
    pub mod project {
        pub use api_types::project::{ProjectCreate, ProjectList, ProjectView, ProjectsResponse};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            TransactionKind, TransactionList, TransactionListResponse, TransactionNew,
            TransactionRecorded, TransactionView, UpdatedBalances,
        };
    }

    pub mod expense_type {
        pub use api_types::expense_type::{
            ExpenseTypeCreate, ExpenseTypeList, ExpenseTypeUpdate, ExpenseTypeView,
            ExpenseTypesResponse,
        };
    }

    pub mod deferred {
        pub use api_types::deferred::{
            DeferredPaymentDetailResponse, DeferredPaymentList, DeferredPaymentNew,
            DeferredPaymentView, DeferredPaymentsResponse, InstallmentPay, InstallmentView,
        };
    }

    pub mod ledger {
        pub use api_types::ledger::{
            BeneficiaryStatementResponse, LedgerSummaryResponse, ReclassifyResponse,
            TransferReceivables, TransferReceivablesResponse,
        };
    }

    pub mod funds {
        pub use api_types::funds::{AdminFundsView, DepositCreated, DepositNew};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Forbidden(String),
    Generic(String),
}

//TODO: Find a better solution
#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        EngineError::DuplicateName(_) => StatusCode::CONFLICT,
        EngineError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InsufficientFunds(_)
        | EngineError::InsufficientProjectBalance(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidName(_)
        | EngineError::InvalidProject(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Forbidden(err) => (StatusCode::FORBIDDEN, err),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::NotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::DuplicateName("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::InvalidAmount("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let res = ServerError::from(EngineError::InsufficientFunds("x".to_string()))
            .into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let res = ServerError::from(EngineError::InsufficientProjectBalance("x".to_string()))
            .into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn engine_store_unavailable_maps_to_503() {
        let res =
            ServerError::from(EngineError::StoreUnavailable("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn forbidden_maps_to_403() {
        let res = ServerError::Forbidden("admin only".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}

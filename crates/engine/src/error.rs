//! The module contains the errors the engine can throw.
//!
//! Validation errors ([`InsufficientFunds`], [`InsufficientProjectBalance`],
//! [`InvalidAmount`], ...) are returned before any balance is mutated, so a
//! failed operation never leaves the store partially applied.
//! [`StoreUnavailable`] is transient: callers are expected to retry with
//! backoff.
//!
//! [`InsufficientFunds`]: EngineError::InsufficientFunds
//! [`InsufficientProjectBalance`]: EngineError::InsufficientProjectBalance
//! [`InvalidAmount`]: EngineError::InvalidAmount
//! [`StoreUnavailable`]: EngineError::StoreUnavailable
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Insufficient admin funds: {0}")]
    InsufficientFunds(String),
    #[error("Insufficient project balance: {0}")]
    InsufficientProjectBalance(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid project: {0}")]
    InvalidProject(String),
    #[error("\"{0}\" already present!")]
    DuplicateName(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
    #[error(transparent)]
    Database(DbErr),
}

impl From<DbErr> for EngineError {
    fn from(err: DbErr) -> Self {
        match err {
            // Connection-level failures are transient; callers retry with
            // backoff instead of treating them as data errors.
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => {
                Self::StoreUnavailable(err.to_string())
            }
            other => Self::Database(other),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::InsufficientProjectBalance(a), Self::InsufficientProjectBalance(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidProject(a), Self::InvalidProject(b)) => a == b,
            (Self::DuplicateName(a), Self::DuplicateName(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::StoreUnavailable(a), Self::StoreUnavailable(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

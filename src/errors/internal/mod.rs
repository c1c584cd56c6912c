use thiserror::Error;

pub mod audit;
pub mod credential;
pub mod database;
pub mod jwt_validation;
pub mod lifecycle;

pub use audit::AuditError;
pub use credential::CredentialError;
pub use database::{DatabaseError, TransactionStage};
pub use jwt_validation::{TokenRejection, TokenRejectionClass};
pub use lifecycle::LifecycleError;

/// Internal error type for store, provider and service operations
///
/// Infrastructure errors (database, parse, crypto) are shared; domain errors
/// (credential, lifecycle, audit) are specific to a concern.
/// Not exposed via API - endpoints must convert to AuthError or AdminError.
#[derive(Error, Debug)]
pub enum InternalError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Parse error: failed to parse {value_type}: {message}")]
    Parse {
        value_type: String,
        message: String,
    },

    #[error("Crypto error: {operation} failed: {message}")]
    Crypto {
        operation: String,
        message: String,
    },

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Audit(#[from] AuditError),
}

impl InternalError {
    pub fn database(operation: &str, source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::Operation {
            operation: operation.to_string(),
            source,
        })
    }

    pub fn transaction_begin(source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::Transaction {
            stage: TransactionStage::Begin,
            source,
        })
    }

    pub fn transaction_commit(source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::Transaction {
            stage: TransactionStage::Commit,
            source,
        })
    }

    pub fn parse(value_type: &str, message: impl Into<String>) -> InternalError {
        InternalError::Parse {
            value_type: value_type.to_string(),
            message: message.into(),
        }
    }

    pub fn crypto(operation: &str, message: impl Into<String>) -> InternalError {
        InternalError::Crypto {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    /// Store/transaction failures are safe to retry; nothing else is
    pub fn is_transient(&self) -> bool {
        matches!(self, InternalError::Database(_))
    }
}

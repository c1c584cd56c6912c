use std::fmt;

use thiserror::Error;

/// Which half of a lifecycle or login transaction failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStage {
    Begin,
    Commit,
}

impl fmt::Display for TransactionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStage::Begin => write!(f, "begin"),
            TransactionStage::Commit => write!(f, "commit"),
        }
    }
}

/// Storage failure, labelled with the store call that hit it
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// `operation` is the store's label, e.g. `soft_delete_user`
    #[error("Database error: {operation} failed: {source}")]
    Operation {
        operation: String,
        #[source]
        source: sea_orm::DbErr,
    },

    #[error("Transaction {stage} failed: {source}")]
    Transaction {
        stage: TransactionStage,
        #[source]
        source: sea_orm::DbErr,
    },
}

impl DatabaseError {
    /// Label for log fields
    pub fn operation(&self) -> String {
        match self {
            DatabaseError::Operation { operation, .. } => operation.clone(),
            DatabaseError::Transaction { stage, .. } => format!("transaction_{}", stage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_labels() {
        let op = DatabaseError::Operation {
            operation: "find_user_by_email".to_string(),
            source: sea_orm::DbErr::Custom("locked".to_string()),
        };
        assert_eq!(op.operation(), "find_user_by_email");
        assert!(op.to_string().contains("find_user_by_email failed"));

        let commit = DatabaseError::Transaction {
            stage: TransactionStage::Commit,
            source: sea_orm::DbErr::Custom("busy".to_string()),
        };
        assert_eq!(commit.operation(), "transaction_commit");
        assert!(commit.to_string().starts_with("Transaction commit failed"));
    }
}

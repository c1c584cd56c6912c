use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Invalid audit query: {0}")]
    InvalidQuery(String),
}

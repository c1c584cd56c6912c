use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialError {
    /// Unknown email, wrong password, or soft-deleted account
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Password validation failed: {0}")]
    PasswordValidationFailed(String),

    #[error("User already exists: {0}")]
    DuplicateEmail(String),

    #[error("Password hashing failed: {0}")]
    PasswordHashingFailed(String),

    #[error("Invalid or expired password reset token")]
    InvalidResetToken,
}

use crate::auth::Denied;
use crate::errors::internal::{CredentialError, InternalError};
use poem_openapi::{ApiResponse, Object, payload::Json};
use std::fmt;

/// Standardized error response for authentication endpoints
#[derive(Object, Debug)]
pub struct AuthErrorResponse {
    /// Error code identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status_code: u16,
}

/// Authentication error types
#[derive(ApiResponse, Debug)]
pub enum AuthError {
    /// No valid session
    #[oai(status = 401)]
    Unauthenticated(Json<AuthErrorResponse>),

    /// Invalid email or password
    #[oai(status = 401)]
    InvalidCredentials(Json<AuthErrorResponse>),

    /// Valid session, role not allowed
    #[oai(status = 403)]
    Forbidden(Json<AuthErrorResponse>),

    /// Password validation failed
    #[oai(status = 400)]
    PasswordValidationFailed(Json<AuthErrorResponse>),

    /// Email address is not usable
    #[oai(status = 400)]
    InvalidEmail(Json<AuthErrorResponse>),

    /// Password reset token unknown, expired, or account inactive
    #[oai(status = 400)]
    InvalidResetToken(Json<AuthErrorResponse>),

    /// Email already registered
    #[oai(status = 409)]
    DuplicateEmail(Json<AuthErrorResponse>),

    /// Store unavailable, safe to retry
    #[oai(status = 503)]
    ServiceUnavailable(Json<AuthErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<AuthErrorResponse>),
}

impl AuthError {
    fn response(error: &str, message: &str, status_code: u16) -> Json<AuthErrorResponse> {
        Json(AuthErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
            status_code,
        })
    }

    pub fn unauthenticated() -> Self {
        AuthError::Unauthenticated(Self::response(
            "unauthenticated",
            "Authentication required",
            401,
        ))
    }

    pub fn invalid_credentials() -> Self {
        AuthError::InvalidCredentials(Self::response(
            "invalid_credentials",
            "Invalid email or password",
            401,
        ))
    }

    pub fn forbidden() -> Self {
        AuthError::Forbidden(Self::response(
            "forbidden",
            "You do not have permission to perform this action",
            403,
        ))
    }

    pub fn password_validation_failed(message: String) -> Self {
        AuthError::PasswordValidationFailed(Json(AuthErrorResponse {
            error: "password_validation_failed".to_string(),
            message,
            status_code: 400,
        }))
    }

    pub fn invalid_email() -> Self {
        AuthError::InvalidEmail(Self::response(
            "invalid_email",
            "A valid email address is required",
            400,
        ))
    }

    pub fn invalid_reset_token() -> Self {
        AuthError::InvalidResetToken(Self::response(
            "invalid_reset_token",
            "Invalid or expired password reset token",
            400,
        ))
    }

    pub fn duplicate_email() -> Self {
        AuthError::DuplicateEmail(Self::response(
            "duplicate_email",
            "An account with this email already exists",
            409,
        ))
    }

    pub fn service_unavailable() -> Self {
        AuthError::ServiceUnavailable(Self::response(
            "service_unavailable",
            "Service temporarily unavailable, please retry",
            503,
        ))
    }

    fn internal_server_error() -> Self {
        AuthError::InternalError(Self::response(
            "internal_error",
            "An internal error occurred",
            500,
        ))
    }

    /// Map a gate denial to its HTTP outcome
    pub fn from_denied(denied: Denied) -> Self {
        match denied {
            Denied::Unauthenticated => Self::unauthenticated(),
            Denied::Forbidden => Self::forbidden(),
        }
    }

    /// Convert InternalError to AuthError
    ///
    /// Infrastructure details are logged and replaced with a generic message.
    pub fn from_internal_error(err: InternalError) -> Self {
        match &err {
            InternalError::Database(db_err) => {
                tracing::error!(
                    operation = %db_err.operation(),
                    "Database error in auth operation: {}",
                    err
                );
                Self::service_unavailable()
            }
            InternalError::Parse { .. } | InternalError::Crypto { .. } => {
                tracing::error!("Internal error in auth operation: {}", err);
                Self::internal_server_error()
            }
            InternalError::Credential(CredentialError::InvalidCredentials) => {
                Self::invalid_credentials()
            }
            InternalError::Credential(CredentialError::PasswordValidationFailed(message)) => {
                tracing::debug!("Password validation failed: {}", message);
                Self::password_validation_failed(message.clone())
            }
            InternalError::Credential(CredentialError::DuplicateEmail(email)) => {
                tracing::warn!("Duplicate email registration attempt: {}", email);
                Self::duplicate_email()
            }
            InternalError::Credential(CredentialError::InvalidEmail(email)) => {
                tracing::debug!("Rejected email address: {}", email);
                Self::invalid_email()
            }
            InternalError::Credential(CredentialError::InvalidResetToken) => {
                Self::invalid_reset_token()
            }
            InternalError::Credential(CredentialError::PasswordHashingFailed(message)) => {
                tracing::error!("Password hashing failed: {}", message);
                Self::internal_server_error()
            }
            _ => {
                tracing::error!("Unexpected error in auth operation: {}", err);
                Self::internal_server_error()
            }
        }
    }

    /// Get the error message from the error variant
    pub fn message(&self) -> String {
        self.body().message.clone()
    }

    pub fn status_code(&self) -> u16 {
        self.body().status_code
    }

    fn body(&self) -> &AuthErrorResponse {
        match self {
            AuthError::Unauthenticated(json)
            | AuthError::InvalidCredentials(json)
            | AuthError::Forbidden(json)
            | AuthError::PasswordValidationFailed(json)
            | AuthError::InvalidEmail(json)
            | AuthError::InvalidResetToken(json)
            | AuthError::DuplicateEmail(json)
            | AuthError::ServiceUnavailable(json)
            | AuthError::InternalError(json) => &json.0,
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

use crate::auth::Denied;
use crate::errors::internal::{AuditError, CredentialError, InternalError, LifecycleError};
use poem_openapi::{ApiResponse, Object, payload::Json};
use std::fmt;

/// Standardized error response for admin endpoints
#[derive(Object, Debug)]
pub struct AdminErrorResponse {
    /// Error code identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code
    pub status_code: u16,
}

/// Admin operation error types
#[derive(ApiResponse, Debug)]
pub enum AdminError {
    /// No valid session
    #[oai(status = 401)]
    Unauthenticated(Json<AdminErrorResponse>),

    /// Valid session, role not allowed for this operation
    #[oai(status = 403)]
    Forbidden(Json<AdminErrorResponse>),

    /// Target user does not exist
    #[oai(status = 404)]
    UserNotFound(Json<AdminErrorResponse>),

    /// Lifecycle transition not allowed from the current state
    #[oai(status = 409)]
    NotEligible(Json<AdminErrorResponse>),

    /// Uniqueness violation
    #[oai(status = 409)]
    Conflict(Json<AdminErrorResponse>),

    /// Malformed request parameters
    #[oai(status = 400)]
    BadRequest(Json<AdminErrorResponse>),

    /// Store unavailable, safe to retry
    #[oai(status = 503)]
    ServiceUnavailable(Json<AdminErrorResponse>),

    /// Internal server error
    #[oai(status = 500)]
    InternalError(Json<AdminErrorResponse>),
}

impl AdminError {
    fn response(error: &str, message: impl Into<String>, status_code: u16) -> Json<AdminErrorResponse> {
        Json(AdminErrorResponse {
            error: error.to_string(),
            message: message.into(),
            status_code,
        })
    }

    pub fn unauthenticated() -> Self {
        AdminError::Unauthenticated(Self::response(
            "unauthenticated",
            "Authentication required",
            401,
        ))
    }

    pub fn forbidden() -> Self {
        AdminError::Forbidden(Self::response(
            "forbidden",
            "You do not have permission to perform this action",
            403,
        ))
    }

    pub fn self_modification_denied() -> Self {
        AdminError::Forbidden(Self::response(
            "self_modification_denied",
            "You cannot apply this action to your own account",
            403,
        ))
    }

    pub fn user_not_found() -> Self {
        AdminError::UserNotFound(Self::response("user_not_found", "User not found", 404))
    }

    pub fn not_eligible(message: impl Into<String>) -> Self {
        AdminError::NotEligible(Self::response("not_eligible", message, 409))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AdminError::Conflict(Self::response("conflict", message, 409))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AdminError::BadRequest(Self::response("bad_request", message, 400))
    }

    pub fn service_unavailable() -> Self {
        AdminError::ServiceUnavailable(Self::response(
            "service_unavailable",
            "Service temporarily unavailable, please retry",
            503,
        ))
    }

    fn internal_server_error() -> Self {
        AdminError::InternalError(Self::response(
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

    /// Convert InternalError to AdminError
    ///
    /// Lifecycle errors keep their distinct status; infrastructure details
    /// are logged and replaced with a generic message.
    pub fn from_internal_error(err: InternalError) -> Self {
        match &err {
            InternalError::Database(db_err) => {
                tracing::error!(
                    operation = %db_err.operation(),
                    "Database error in admin operation: {}",
                    err
                );
                Self::service_unavailable()
            }
            InternalError::Lifecycle(LifecycleError::NotFound { user_id }) => {
                tracing::debug!("Admin target not found: {}", user_id);
                Self::user_not_found()
            }
            InternalError::Lifecycle(LifecycleError::NotEligible { state, transition, .. }) => {
                Self::not_eligible(format!("Cannot {} a user that is {}", transition, state))
            }
            InternalError::Lifecycle(LifecycleError::SelfModification { user_id, transition }) => {
                tracing::warn!("User {} attempted '{}' on own account", user_id, transition);
                Self::self_modification_denied()
            }
            InternalError::Credential(CredentialError::DuplicateEmail(_)) => {
                Self::conflict("An account with this email already exists")
            }
            InternalError::Audit(AuditError::InvalidQuery(message)) => {
                Self::bad_request(message.clone())
            }
            InternalError::Parse { value_type, .. } => {
                tracing::debug!("Invalid admin request parameter: {}", err);
                Self::bad_request(format!("Invalid {}", value_type))
            }
            _ => {
                tracing::error!("Unexpected error in admin operation: {}", err);
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

    pub fn error_code(&self) -> &str {
        &self.body().error
    }

    fn body(&self) -> &AdminErrorResponse {
        match self {
            AdminError::Unauthenticated(json)
            | AdminError::Forbidden(json)
            | AdminError::UserNotFound(json)
            | AdminError::NotEligible(json)
            | AdminError::Conflict(json)
            | AdminError::BadRequest(json)
            | AdminError::ServiceUnavailable(json)
            | AdminError::InternalError(json) => &json.0,
        }
    }
}

impl fmt::Display for AdminError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

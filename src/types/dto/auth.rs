use poem_openapi::payload::Json;
use poem_openapi::{ApiResponse, Object};
use serde::{Deserialize, Serialize};

use crate::types::dto::common::MessageResponse;
use crate::types::internal::auth::{Principal, Role};

/// Request model for account registration
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,

    /// At least 8 characters
    #[oai(write_only)]
    pub password: String,
}

/// Request model for user login
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,

    #[oai(write_only)]
    pub password: String,
}

/// Identity behind the current session
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    /// User ID (UUID)
    pub user_id: String,

    pub email: String,

    /// Current role, read from the account rather than the token
    pub role: Role,
}

impl From<Principal> for SessionResponse {
    fn from(principal: Principal) -> Self {
        Self {
            user_id: principal.user_id,
            email: principal.email,
            role: principal.role,
        }
    }
}

/// Response model for a successful login
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: SessionResponse,

    /// Seconds until the session cookie expires
    pub expires_in: i64,
}

/// Response model for heartbeat
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct HeartbeatResponse {
    /// Recorded online time (Unix timestamp)
    pub online_at: i64,
}

/// Request model for completing a password reset
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,

    /// Raw token delivered out of band
    #[oai(write_only)]
    pub token: String,

    /// At least 8 characters
    #[oai(write_only)]
    pub new_password: String,
}

/// API response for login endpoint
#[derive(ApiResponse)]
pub enum LoginApiResponse {
    /// Authentication successful, session cookie set
    #[oai(status = 200)]
    Ok(Json<LoginResponse>, #[oai(header = "Set-Cookie")] String),
}

/// API response for logout endpoint
#[derive(ApiResponse)]
pub enum LogoutApiResponse {
    /// Session cookie cleared
    #[oai(status = 200)]
    Ok(Json<MessageResponse>, #[oai(header = "Set-Cookie")] String),
}

/// API response for registration endpoint
#[derive(ApiResponse)]
pub enum RegisterApiResponse {
    /// Account created
    #[oai(status = 201)]
    Created(Json<SessionResponse>),
}

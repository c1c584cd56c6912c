use poem_openapi::Object;

use crate::types::db::user;
use crate::types::internal::auth::Role;
use crate::types::internal::lifecycle::PurgeOutcome;

/// An account as shown to administrators
///
/// Password and reset token fields are never exposed.
#[derive(Object, Debug)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub role: Role,

    /// `active` or `soft_deleted`
    pub state: String,

    /// Soft-delete time (Unix timestamp)
    pub deleted_at: Option<i64>,

    /// Last heartbeat (Unix timestamp)
    pub online_at: Option<i64>,

    pub created_at: i64,
    pub updated_at: i64,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            state: user.lifecycle_state().to_string(),
            id: user.id,
            email: user.email,
            role: user.role,
            deleted_at: user.deleted_at,
            online_at: user.online_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Request to change a user's role
#[derive(Object, Debug)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

/// Response after a purge
#[derive(Object, Debug)]
pub struct PurgeResponse {
    pub user_id: String,
    pub email: String,

    /// Audit records that targeted the purged account
    pub audit_records_deleted: u64,
}

impl From<PurgeOutcome> for PurgeResponse {
    fn from(outcome: PurgeOutcome) -> Self {
        Self {
            user_id: outcome.user_id,
            email: outcome.email,
            audit_records_deleted: outcome.audit_records_deleted,
        }
    }
}

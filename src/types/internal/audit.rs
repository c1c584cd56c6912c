use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::auth::Principal;

/// Actor id and role written for sweep-driven transitions
pub const SYSTEM_ACTOR: &str = "system";

/// Closed set of audited actions
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash,
    EnumIter, DeriveActiveEnum,
    Serialize, Deserialize,
    poem_openapi::Enum,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[oai(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    #[sea_orm(string_value = "SOFT_DELETE")]
    SoftDelete,
    #[sea_orm(string_value = "RESTORE")]
    Restore,
    #[sea_orm(string_value = "AUTO_PURGE")]
    AutoPurge,
    #[sea_orm(string_value = "ROLE_CHANGE")]
    RoleChange,
    #[sea_orm(string_value = "PASSWORD_RESET")]
    PasswordReset,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SoftDelete => "SOFT_DELETE",
            Self::Restore => "RESTORE",
            Self::AutoPurge => "AUTO_PURGE",
            Self::RoleChange => "ROLE_CHANGE",
            Self::PasswordReset => "PASSWORD_RESET",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who performed an audited action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditActor {
    pub id: String,
    pub role: String,
}

impl AuditActor {
    /// Sentinel actor for the purge sweeper
    pub fn system() -> Self {
        Self {
            id: SYSTEM_ACTOR.to_string(),
            role: SYSTEM_ACTOR.to_string(),
        }
    }

    pub fn is_system(&self) -> bool {
        self.id == SYSTEM_ACTOR
    }
}

impl From<&Principal> for AuditActor {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.user_id.clone(),
            role: principal.role.as_str().to_string(),
        }
    }
}

/// The account an audited action was applied to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditTarget {
    pub id: String,
    pub email: String,
}

/// Filters for the administrative audit review
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub action: Option<AuditAction>,
    pub target_id: Option<String>,
    pub actor_id: Option<String>,
    /// Inclusive lower bound (Unix timestamp)
    pub since: Option<i64>,
    /// Inclusive upper bound (Unix timestamp)
    pub until: Option<i64>,
}

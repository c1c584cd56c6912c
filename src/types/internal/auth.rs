use std::fmt;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Closed set of account roles
///
/// Stored as a string column, serialized in JWT claims and exposed via the API
/// under the same snake_case names. Anything outside this set is rejected at
/// the boundary (DB decode, claims decode, request body parse).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash,
    EnumIter, DeriveActiveEnum,
    Serialize, Deserialize,
    poem_openapi::Enum,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
#[oai(rename_all = "snake_case")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "editor")]
    Editor,
    #[sea_orm(string_value = "content_manager")]
    ContentManager,
    #[sea_orm(string_value = "viewer")]
    Viewer,
    /// Authenticated non-staff account
    #[sea_orm(string_value = "member")]
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::ContentManager => "content_manager",
            Self::Viewer => "viewer",
            Self::Member => "member",
        }
    }

    /// Parse a role name as typed on the command line
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "editor" => Some(Self::Editor),
            "content_manager" => Some(Self::ContentManager),
            "viewer" => Some(Self::Viewer),
            "member" => Some(Self::Member),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT Claims structure for session tokens
///
/// `role` is a cache of the role at issuance time. Authorization never reads
/// it; the session resolver re-reads the user row instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user_id)
    pub sub: String,

    /// Email at issuance time
    pub email: String,

    /// Role at issuance time (not authoritative)
    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// JWT ID
    pub jti: String,
}

/// Identity fields a session token is issued for
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

/// The resolved, currently-valid identity behind a session
///
/// Only ever built from the backing user row, so `role` is the current role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_accepts_known_roles_case_insensitively() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse(" Content_Manager "), Some(Role::ContentManager));
        assert_eq!(Role::parse("VIEWER"), Some(Role::Viewer));
    }

    #[test]
    fn test_role_parse_rejects_unknown_roles() {
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_role_serializes_as_snake_case() {
        let json = serde_json::to_string(&Role::ContentManager).unwrap();
        assert_eq!(json, "\"content_manager\"");
    }

    #[test]
    fn test_claims_with_unknown_role_fail_to_deserialize() {
        let raw = r#"{"sub":"u1","email":"a@x.org","role":"root","iat":0,"exp":1,"jti":"j"}"#;
        assert!(serde_json::from_str::<Claims>(raw).is_err());
    }
}

use std::fmt;

use crate::auth::capabilities::Operation;
use crate::types::internal::auth::{Principal, Role};

/// Why the gate refused a request
///
/// A denial is an expected outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denied {
    /// No valid session, or its subject is no longer active
    Unauthenticated,
    /// Valid session, role not in the allowed set
    Forbidden,
}

impl fmt::Display for Denied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denied::Unauthenticated => f.write_str("unauthenticated"),
            Denied::Forbidden => f.write_str("forbidden"),
        }
    }
}

/// Admit the resolved principal only if its current role is in `allowed`
///
/// Plain set membership: there is no role hierarchy.
pub fn require(resolved: Option<Principal>, allowed: &[Role]) -> Result<Principal, Denied> {
    let principal = resolved.ok_or(Denied::Unauthenticated)?;

    if allowed.contains(&principal.role) {
        Ok(principal)
    } else {
        tracing::debug!(
            user_id = %principal.user_id,
            role = %principal.role,
            "Role not in allowed set"
        );
        Err(Denied::Forbidden)
    }
}

/// `require` against an operation's declared capability set
pub fn require_operation(resolved: Option<Principal>, operation: Operation) -> Result<Principal, Denied> {
    require(resolved, operation.allowed_roles())
}

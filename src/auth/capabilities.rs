use std::fmt;

use crate::types::internal::auth::Role;

/// Every protected operation in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ViewOwnSession,
    ListUsers,
    ListDeletedUsers,
    SoftDeleteUser,
    RestoreUser,
    PurgeUser,
    ChangeUserRole,
    ReviewAuditLog,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::ViewOwnSession,
        Operation::ListUsers,
        Operation::ListDeletedUsers,
        Operation::SoftDeleteUser,
        Operation::RestoreUser,
        Operation::PurgeUser,
        Operation::ChangeUserRole,
        Operation::ReviewAuditLog,
    ];

    /// The roles allowed to perform this operation
    ///
    /// Each set is explicit. No role implies another; granting a role here
    /// affects only this operation.
    pub fn allowed_roles(&self) -> &'static [Role] {
        use Role::*;

        match self {
            Operation::ViewOwnSession => &[Admin, Editor, ContentManager, Viewer, Member],
            Operation::ListUsers => &[Admin, Editor, ContentManager, Viewer],
            Operation::ListDeletedUsers => &[Admin, Editor, ContentManager],
            Operation::SoftDeleteUser => &[Admin],
            Operation::RestoreUser => &[Admin],
            Operation::PurgeUser => &[Admin],
            Operation::ChangeUserRole => &[Admin],
            Operation::ReviewAuditLog => &[Admin],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ViewOwnSession => "view_own_session",
            Operation::ListUsers => "list_users",
            Operation::ListDeletedUsers => "list_deleted_users",
            Operation::SoftDeleteUser => "soft_delete_user",
            Operation::RestoreUser => "restore_user",
            Operation::PurgeUser => "purge_user",
            Operation::ChangeUserRole => "change_user_role",
            Operation::ReviewAuditLog => "review_audit_log",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

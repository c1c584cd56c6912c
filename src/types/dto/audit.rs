use poem_openapi::Object;

use crate::types::db::audit_record;
use crate::types::internal::audit::AuditAction;

/// One audit record
#[derive(Object, Debug)]
pub struct AuditRecordResponse {
    pub id: i64,
    pub action: AuditAction,
    pub target_id: String,
    pub target_email: String,
    /// User id, or `system` for sweep-driven actions
    pub actor_id: String,
    pub actor_role: String,
    /// Unix timestamp
    pub created_at: i64,
}

impl From<audit_record::Model> for AuditRecordResponse {
    fn from(record: audit_record::Model) -> Self {
        Self {
            id: record.id,
            action: record.action,
            target_id: record.target_id,
            target_email: record.target_email,
            actor_id: record.actor_id,
            actor_role: record.actor_role,
            created_at: record.created_at,
        }
    }
}

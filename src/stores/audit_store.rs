use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::errors::InternalError;
use crate::types::db::audit_record::{self, Entity as AuditRecord};
use crate::types::internal::audit::{AuditAction, AuditActor, AuditFilter, AuditTarget};

/// Repository for audit record storage
///
/// Stateless like `UserStore`: writes run on the caller's connection, which
/// is the open transaction of the state change being recorded.
#[derive(Debug, Default, Clone, Copy)]
pub struct AuditStore;

impl AuditStore {
    pub fn new() -> Self {
        Self
    }

    /// Append one audit record
    pub async fn append<C: ConnectionTrait>(
        &self,
        conn: &C,
        action: AuditAction,
        target: &AuditTarget,
        actor: &AuditActor,
        created_at: i64,
    ) -> Result<audit_record::Model, InternalError> {
        let record = audit_record::ActiveModel {
            id: NotSet,
            action: Set(action),
            target_id: Set(target.id.clone()),
            target_email: Set(target.email.clone()),
            actor_id: Set(actor.id.clone()),
            actor_role: Set(actor.role.clone()),
            created_at: Set(created_at),
        };

        record
            .insert(conn)
            .await
            .map_err(|e| InternalError::database("append_audit_record", e))
    }

    /// Delete every record whose target is `target_id`
    ///
    /// # Returns
    /// Number of records deleted
    pub async fn delete_by_target<C: ConnectionTrait>(
        &self,
        conn: &C,
        target_id: &str,
    ) -> Result<u64, InternalError> {
        let result = AuditRecord::delete_many()
            .filter(audit_record::Column::TargetId.eq(target_id))
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_audit_by_target", e))?;

        Ok(result.rows_affected)
    }

    /// Filtered read, newest first
    pub async fn query<C: ConnectionTrait>(
        &self,
        conn: &C,
        filter: &AuditFilter,
        limit: u64,
    ) -> Result<Vec<audit_record::Model>, InternalError> {
        let mut select = AuditRecord::find();

        if let Some(action) = filter.action {
            select = select.filter(audit_record::Column::Action.eq(action.as_str()));
        }
        if let Some(target_id) = &filter.target_id {
            select = select.filter(audit_record::Column::TargetId.eq(target_id.as_str()));
        }
        if let Some(actor_id) = &filter.actor_id {
            select = select.filter(audit_record::Column::ActorId.eq(actor_id.as_str()));
        }
        if let Some(since) = filter.since {
            select = select.filter(audit_record::Column::CreatedAt.gte(since));
        }
        if let Some(until) = filter.until {
            select = select.filter(audit_record::Column::CreatedAt.lte(until));
        }

        select
            .order_by_desc(audit_record::Column::CreatedAt)
            .order_by_desc(audit_record::Column::Id)
            .limit(limit)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("query_audit_records", e))
    }
}

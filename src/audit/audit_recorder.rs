use std::sync::Arc;

use sea_orm::{ConnectionTrait, DatabaseConnection};

use crate::errors::InternalError;
use crate::errors::internal::AuditError;
use crate::providers::Clock;
use crate::stores::AuditStore;
use crate::types::db::audit_record;
use crate::types::internal::audit::{AuditAction, AuditActor, AuditFilter, AuditTarget};

pub const DEFAULT_AUDIT_QUERY_LIMIT: u64 = 50;
pub const MAX_AUDIT_QUERY_LIMIT: u64 = 200;

/// Clamp a requested page size to 1..=200, defaulting to 50
pub fn clamp_limit(requested: Option<u64>) -> u64 {
    requested
        .unwrap_or(DEFAULT_AUDIT_QUERY_LIMIT)
        .clamp(1, MAX_AUDIT_QUERY_LIMIT)
}

/// Records privileged actions and serves the administrative review
///
/// `record` never opens its own transaction: callers pass the transaction
/// of the state change so that both commit or neither does.
pub struct AuditRecorder {
    db: DatabaseConnection,
    store: AuditStore,
    clock: Arc<dyn Clock>,
}

impl AuditRecorder {
    pub fn new(db: DatabaseConnection, store: AuditStore, clock: Arc<dyn Clock>) -> Self {
        Self { db, store, clock }
    }

    /// Append an audit record on the given connection
    ///
    /// # Arguments
    /// * `conn` - The open transaction of the transition being documented
    /// * `action` - What happened
    /// * `target` - The account acted on
    /// * `actor` - Who did it (`system/system` for the sweeper)
    pub async fn record<C: ConnectionTrait>(
        &self,
        conn: &C,
        action: AuditAction,
        target: &AuditTarget,
        actor: &AuditActor,
    ) -> Result<audit_record::Model, InternalError> {
        let record = self
            .store
            .append(conn, action, target, actor, self.clock.now_timestamp())
            .await?;

        tracing::info!(
            action = %action,
            target_id = %target.id,
            actor_id = %actor.id,
            actor_role = %actor.role,
            "Audit record appended"
        );

        Ok(record)
    }

    /// Filtered audit review, newest first
    ///
    /// # Errors
    /// `AuditError::InvalidQuery` when `since` is after `until`
    pub async fn query(
        &self,
        filter: &AuditFilter,
        limit: Option<u64>,
    ) -> Result<Vec<audit_record::Model>, InternalError> {
        if let (Some(since), Some(until)) = (filter.since, filter.until) {
            if since > until {
                return Err(AuditError::InvalidQuery("since is after until".to_string()).into());
            }
        }

        self.store.query(&self.db, filter, clamp_limit(limit)).await
    }
}

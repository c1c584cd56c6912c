use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::app_data::AppData;
use crate::audit::AuditRecorder;
use crate::auth::{Operation, require_operation};
use crate::coordinators::GatedError;
use crate::services::LifecycleService;
use crate::stores::UserStore;
use crate::types::db::{audit_record, user};
use crate::types::internal::audit::AuditFilter;
use crate::types::internal::auth::{Principal, Role};
use crate::types::internal::context::RequestContext;
use crate::types::internal::lifecycle::PurgeOutcome;

/// Admin coordinator that orchestrates user administration workflows
///
/// Every workflow first passes the gate for its declared operation, using
/// the principal freshly resolved into the request context.
pub struct AdminCoordinator {
    db: DatabaseConnection,
    user_store: UserStore,
    lifecycle_service: Arc<LifecycleService>,
    audit_recorder: Arc<AuditRecorder>,
}

impl AdminCoordinator {
    /// Create AdminCoordinator from AppData
    ///
    /// # Arguments
    /// * `app_data` - Application data containing all stores and services
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            db: app_data.db.clone(),
            user_store: app_data.user_store,
            lifecycle_service: app_data.lifecycle_service.clone(),
            audit_recorder: app_data.audit_recorder.clone(),
        }
    }

    fn gate(&self, ctx: &RequestContext, operation: Operation) -> Result<Principal, GatedError> {
        let principal = require_operation(ctx.principal.clone(), operation).map_err(|denied| {
            tracing::info!(
                operation = %operation,
                actor = %ctx.actor_label(),
                request_id = %ctx.request_id,
                denied = %denied,
                "Admin operation denied"
            );
            denied
        })?;
        Ok(principal)
    }

    /// Active accounts, ordered by email
    pub async fn list_users(&self, ctx: &RequestContext) -> Result<Vec<user::Model>, GatedError> {
        self.gate(ctx, Operation::ListUsers)?;
        Ok(self.user_store.list_active(&self.db).await?)
    }

    /// Soft-deleted accounts, most recently deleted first
    pub async fn list_deleted_users(&self, ctx: &RequestContext) -> Result<Vec<user::Model>, GatedError> {
        self.gate(ctx, Operation::ListDeletedUsers)?;
        Ok(self.user_store.list_soft_deleted(&self.db).await?)
    }

    pub async fn soft_delete_user(
        &self,
        ctx: &RequestContext,
        target_id: &str,
    ) -> Result<user::Model, GatedError> {
        let actor = self.gate(ctx, Operation::SoftDeleteUser)?;
        Ok(self.lifecycle_service.soft_delete(&actor, target_id).await?)
    }

    pub async fn restore_user(
        &self,
        ctx: &RequestContext,
        target_id: &str,
    ) -> Result<user::Model, GatedError> {
        let actor = self.gate(ctx, Operation::RestoreUser)?;
        Ok(self.lifecycle_service.restore(&actor, target_id).await?)
    }

    pub async fn purge_user(
        &self,
        ctx: &RequestContext,
        target_id: &str,
    ) -> Result<PurgeOutcome, GatedError> {
        let actor = self.gate(ctx, Operation::PurgeUser)?;
        Ok(self.lifecycle_service.purge(&actor, target_id).await?)
    }

    pub async fn change_user_role(
        &self,
        ctx: &RequestContext,
        target_id: &str,
        role: Role,
    ) -> Result<user::Model, GatedError> {
        let actor = self.gate(ctx, Operation::ChangeUserRole)?;
        Ok(self.lifecycle_service.change_role(&actor, target_id, role).await?)
    }

    /// Filtered audit review, newest first
    pub async fn review_audit_log(
        &self,
        ctx: &RequestContext,
        filter: &AuditFilter,
        limit: Option<u64>,
    ) -> Result<Vec<audit_record::Model>, GatedError> {
        self.gate(ctx, Operation::ReviewAuditLog)?;
        Ok(self.audit_recorder.query(filter, limit).await?)
    }
}

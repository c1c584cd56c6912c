use std::sync::Arc;

use poem::Request;
use poem_openapi::param::{Path, Query};
use poem_openapi::{OpenApi, Tags, payload::Json};

use crate::api::helpers;
use crate::auth::SessionResolver;
use crate::coordinators::AdminCoordinator;
use crate::errors::api::AdminError;
use crate::types::dto::admin::{ChangeRoleRequest, PurgeResponse, UserResponse};
use crate::types::dto::audit::AuditRecordResponse;
use crate::types::internal::audit::{AuditAction, AuditFilter};
use crate::types::internal::context::RequestContext;

/// User administration API endpoints
///
/// Mounted behind the edge guard; each handler still resolves the session
/// fully and passes the gate for its operation.
pub struct AdminApi {
    admin_coordinator: Arc<AdminCoordinator>,
    session_resolver: Arc<SessionResolver>,
}

impl AdminApi {
    /// Create a new AdminApi with the given AdminCoordinator
    pub fn new(admin_coordinator: Arc<AdminCoordinator>, session_resolver: Arc<SessionResolver>) -> Self {
        Self {
            admin_coordinator,
            session_resolver,
        }
    }

    async fn context(&self, req: &Request) -> Result<RequestContext, AdminError> {
        helpers::create_request_context(req, &self.session_resolver)
            .await
            .map_err(AdminError::from_internal_error)
    }
}

/// API tags for admin endpoints
#[derive(Tags)]
enum AdminTags {
    /// User administration
    Admin,
}

#[OpenApi(prefix_path = "/admin")]
impl AdminApi {
    /// List active users
    #[oai(path = "/users", method = "get", tag = "AdminTags::Admin")]
    async fn list_users(&self, req: &Request) -> Result<Json<Vec<UserResponse>>, AdminError> {
        let ctx = self.context(req).await?;

        let users = self.admin_coordinator.list_users(&ctx).await?;

        Ok(Json(users.into_iter().map(UserResponse::from).collect()))
    }

    /// List soft-deleted users awaiting purge
    #[oai(path = "/users/deleted", method = "get", tag = "AdminTags::Admin")]
    async fn list_deleted_users(&self, req: &Request) -> Result<Json<Vec<UserResponse>>, AdminError> {
        let ctx = self.context(req).await?;

        let users = self.admin_coordinator.list_deleted_users(&ctx).await?;

        Ok(Json(users.into_iter().map(UserResponse::from).collect()))
    }

    /// Soft-delete a user; their sessions stop working immediately
    #[oai(path = "/users/:id/soft-delete", method = "post", tag = "AdminTags::Admin")]
    async fn soft_delete_user(&self, req: &Request, id: Path<String>) -> Result<Json<UserResponse>, AdminError> {
        let ctx = self.context(req).await?;

        let user = self.admin_coordinator.soft_delete_user(&ctx, &id.0).await?;

        Ok(Json(user.into()))
    }

    /// Restore a soft-deleted user
    #[oai(path = "/users/:id/restore", method = "post", tag = "AdminTags::Admin")]
    async fn restore_user(&self, req: &Request, id: Path<String>) -> Result<Json<UserResponse>, AdminError> {
        let ctx = self.context(req).await?;

        let user = self.admin_coordinator.restore_user(&ctx, &id.0).await?;

        Ok(Json(user.into()))
    }

    /// Permanently remove a soft-deleted user and their audit history
    #[oai(path = "/users/:id", method = "delete", tag = "AdminTags::Admin")]
    async fn purge_user(&self, req: &Request, id: Path<String>) -> Result<Json<PurgeResponse>, AdminError> {
        let ctx = self.context(req).await?;

        let outcome = self.admin_coordinator.purge_user(&ctx, &id.0).await?;

        Ok(Json(outcome.into()))
    }

    /// Change an active user's role
    #[oai(path = "/users/:id/role", method = "put", tag = "AdminTags::Admin")]
    async fn change_user_role(
        &self,
        req: &Request,
        id: Path<String>,
        body: Json<ChangeRoleRequest>,
    ) -> Result<Json<UserResponse>, AdminError> {
        let ctx = self.context(req).await?;

        let user = self
            .admin_coordinator
            .change_user_role(&ctx, &id.0, body.0.role)
            .await?;

        Ok(Json(user.into()))
    }

    /// Review the audit log, newest first
    ///
    /// `since` and `until` are inclusive Unix timestamps. `limit` defaults
    /// to 50 and is capped at 200.
    #[oai(path = "/audit", method = "get", tag = "AdminTags::Admin")]
    async fn review_audit_log(
        &self,
        req: &Request,
        action: Query<Option<AuditAction>>,
        target_id: Query<Option<String>>,
        actor_id: Query<Option<String>>,
        since: Query<Option<i64>>,
        until: Query<Option<i64>>,
        limit: Query<Option<u64>>,
    ) -> Result<Json<Vec<AuditRecordResponse>>, AdminError> {
        let ctx = self.context(req).await?;

        let filter = AuditFilter {
            action: action.0,
            target_id: target_id.0,
            actor_id: actor_id.0,
            since: since.0,
            until: until.0,
        };
        let records = self
            .admin_coordinator
            .review_audit_log(&ctx, &filter, limit.0)
            .await?;

        Ok(Json(records.into_iter().map(AuditRecordResponse::from).collect()))
    }
}

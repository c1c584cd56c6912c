use std::sync::Arc;

use sea_orm::{DatabaseConnection, DatabaseTransaction};

use crate::audit::AuditRecorder;
use crate::config::{begin_transaction, commit_transaction};
use crate::errors::InternalError;
use crate::errors::internal::LifecycleError;
use crate::providers::Clock;
use crate::stores::{AuditStore, UserStore};
use crate::types::db::user;
use crate::types::internal::audit::{AuditAction, AuditActor, AuditTarget};
use crate::types::internal::auth::{Principal, Role};
use crate::types::internal::lifecycle::{LifecycleState, PurgeOutcome};

const SOFT_DELETE: &str = "soft-delete";
const RESTORE: &str = "restore";
const PURGE: &str = "purge";
const AUTO_PURGE: &str = "auto-purge";
const CHANGE_ROLE: &str = "change the role of";

/// Applies account state transitions
///
/// Every transition is one transaction: the guarded write and its audit
/// record commit together or not at all. A transition that loses a race
/// sees `NotEligible` and leaves the row as the winner wrote it.
///
/// Callers are responsible for authorization; `actor` is only used for
/// the self-modification check and the audit record.
pub struct LifecycleService {
    db: DatabaseConnection,
    user_store: UserStore,
    audit_store: AuditStore,
    audit_recorder: Arc<AuditRecorder>,
    clock: Arc<dyn Clock>,
}

impl LifecycleService {
    pub fn new(
        db: DatabaseConnection,
        user_store: UserStore,
        audit_store: AuditStore,
        audit_recorder: Arc<AuditRecorder>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            db,
            user_store,
            audit_store,
            audit_recorder,
            clock,
        }
    }

    /// Active → SoftDeleted
    ///
    /// # Returns
    /// * `Ok(user::Model)` - The account as stored after the transition
    /// * `Err(InternalError)` - `SelfModification`, `NotFound`, `NotEligible` or a store failure
    pub async fn soft_delete(
        &self,
        actor: &Principal,
        target_id: &str,
    ) -> Result<user::Model, InternalError> {
        reject_self(actor, target_id, SOFT_DELETE)?;

        let txn = begin_transaction(&self.db).await?;
        let user = self.load(&txn, target_id).await?;
        if !user.is_active() {
            return Err(not_eligible(&user, SOFT_DELETE));
        }

        let now = self.clock.now_timestamp();
        if !self.user_store.mark_soft_deleted(&txn, target_id, now).await? {
            return Err(LifecycleError::not_eligible(target_id, SOFT_DELETE, LifecycleState::SoftDeleted).into());
        }

        self.audit_recorder
            .record(&txn, AuditAction::SoftDelete, &target_of(&user), &AuditActor::from(actor))
            .await?;

        commit_transaction(txn).await?;

        tracing::info!(user_id = %target_id, actor_id = %actor.user_id, "User soft-deleted");

        Ok(user::Model {
            deleted_at: Some(now),
            updated_at: now,
            ..user
        })
    }

    /// SoftDeleted → Active
    pub async fn restore(
        &self,
        actor: &Principal,
        target_id: &str,
    ) -> Result<user::Model, InternalError> {
        let txn = begin_transaction(&self.db).await?;
        let user = self.load(&txn, target_id).await?;
        if user.is_active() {
            return Err(not_eligible(&user, RESTORE));
        }

        let now = self.clock.now_timestamp();
        if !self.user_store.clear_soft_deleted(&txn, target_id, now).await? {
            return Err(LifecycleError::not_eligible(target_id, RESTORE, LifecycleState::Active).into());
        }

        self.audit_recorder
            .record(&txn, AuditAction::Restore, &target_of(&user), &AuditActor::from(actor))
            .await?;

        commit_transaction(txn).await?;

        tracing::info!(user_id = %target_id, actor_id = %actor.user_id, "User restored");

        Ok(user::Model {
            deleted_at: None,
            updated_at: now,
            ..user
        })
    }

    /// SoftDeleted → Purged, on administrator request
    ///
    /// Removes every audit record targeting the account together with the
    /// account itself. No persistent record is written for the purge; it is
    /// logged instead.
    pub async fn purge(
        &self,
        actor: &Principal,
        target_id: &str,
    ) -> Result<PurgeOutcome, InternalError> {
        reject_self(actor, target_id, PURGE)?;

        let txn = begin_transaction(&self.db).await?;
        let user = self.load(&txn, target_id).await?;
        if user.is_active() {
            return Err(not_eligible(&user, PURGE));
        }

        let audit_records_deleted = self.audit_store.delete_by_target(&txn, target_id).await?;

        if !self.user_store.delete_soft_deleted(&txn, target_id, None).await? {
            return Err(LifecycleError::not_eligible(target_id, PURGE, LifecycleState::Active).into());
        }

        commit_transaction(txn).await?;

        tracing::warn!(
            user_id = %target_id,
            actor_id = %actor.user_id,
            actor_role = %actor.role,
            audit_records_deleted,
            "User purged"
        );

        Ok(PurgeOutcome {
            user_id: user.id,
            email: user.email,
            audit_records_deleted,
        })
    }

    /// SoftDeleted → Purged, driven by the sweeper
    ///
    /// Eligibility (`deleted_at <= cutoff`) is re-checked inside the
    /// transaction, so a restore that lands after candidate selection wins.
    /// The `AUTO_PURGE` record is written after the prior records are
    /// removed and survives the purge.
    pub async fn auto_purge(
        &self,
        target_id: &str,
        cutoff: i64,
    ) -> Result<PurgeOutcome, InternalError> {
        let txn = begin_transaction(&self.db).await?;
        let user = self.load(&txn, target_id).await?;
        match user.deleted_at {
            None => return Err(not_eligible(&user, AUTO_PURGE)),
            Some(deleted_at) if deleted_at > cutoff => return Err(not_eligible(&user, AUTO_PURGE)),
            Some(_) => {}
        }

        let audit_records_deleted = self.audit_store.delete_by_target(&txn, target_id).await?;

        self.audit_recorder
            .record(&txn, AuditAction::AutoPurge, &target_of(&user), &AuditActor::system())
            .await?;

        if !self.user_store.delete_soft_deleted(&txn, target_id, Some(cutoff)).await? {
            return Err(LifecycleError::not_eligible(target_id, AUTO_PURGE, LifecycleState::Active).into());
        }

        commit_transaction(txn).await?;

        tracing::info!(user_id = %target_id, cutoff, audit_records_deleted, "User auto-purged");

        Ok(PurgeOutcome {
            user_id: user.id,
            email: user.email,
            audit_records_deleted,
        })
    }

    /// Change the role of an active account
    ///
    /// Requesting the current role is a no-op that writes nothing. The new
    /// role applies on the target's next request.
    pub async fn change_role(
        &self,
        actor: &Principal,
        target_id: &str,
        role: Role,
    ) -> Result<user::Model, InternalError> {
        reject_self(actor, target_id, CHANGE_ROLE)?;

        let txn = begin_transaction(&self.db).await?;
        let user = self.load(&txn, target_id).await?;
        if !user.is_active() {
            return Err(not_eligible(&user, CHANGE_ROLE));
        }
        if user.role == role {
            return Ok(user);
        }

        let now = self.clock.now_timestamp();
        if !self.user_store.update_role(&txn, target_id, role, now).await? {
            return Err(LifecycleError::not_eligible(target_id, CHANGE_ROLE, LifecycleState::SoftDeleted).into());
        }

        self.audit_recorder
            .record(&txn, AuditAction::RoleChange, &target_of(&user), &AuditActor::from(actor))
            .await?;

        commit_transaction(txn).await?;

        tracing::info!(
            user_id = %target_id,
            actor_id = %actor.user_id,
            from = %user.role,
            to = %role,
            "User role changed"
        );

        Ok(user::Model {
            role,
            updated_at: now,
            ..user
        })
    }

    async fn load(
        &self,
        txn: &DatabaseTransaction,
        target_id: &str,
    ) -> Result<user::Model, InternalError> {
        self.user_store
            .find_by_id(txn, target_id)
            .await?
            .ok_or_else(|| LifecycleError::not_found(target_id).into())
    }
}

fn reject_self(actor: &Principal, target_id: &str, transition: &'static str) -> Result<(), InternalError> {
    if actor.user_id == target_id {
        return Err(LifecycleError::SelfModification {
            user_id: actor.user_id.clone(),
            transition,
        }
        .into());
    }
    Ok(())
}

fn not_eligible(user: &user::Model, transition: &'static str) -> InternalError {
    LifecycleError::not_eligible(&user.id, transition, user.lifecycle_state()).into()
}

fn target_of(user: &user::Model) -> AuditTarget {
    AuditTarget {
        id: user.id.clone(),
        email: user.email.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_data::AppData;
    use crate::providers::ManualClock;
    use crate::test::utils::{TEST_NOW, create_test_user, setup_test_app};
    use crate::types::internal::audit::{AuditFilter, SYSTEM_ACTOR};
    use sea_orm::ConnectionTrait;

    struct Fixture {
        app: Arc<AppData>,
        clock: Arc<ManualClock>,
        admin: Principal,
    }

    async fn setup() -> Fixture {
        let (clock, app) = setup_test_app().await;
        let admin_row = create_test_user(&app.db, "admin@x.org", Role::Admin).await;
        let admin = Principal {
            user_id: admin_row.id,
            email: admin_row.email,
            role: admin_row.role,
        };
        Fixture { app, clock, admin }
    }

    async fn audit_for(app: &AppData, target_id: &str) -> Vec<crate::types::db::audit_record::Model> {
        app.audit_recorder
            .query(
                &AuditFilter {
                    target_id: Some(target_id.to_string()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap()
    }

    fn lifecycle_err(err: InternalError) -> LifecycleError {
        match err {
            InternalError::Lifecycle(e) => e,
            other => panic!("Expected lifecycle error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_soft_delete_sets_deleted_at_and_records_audit() {
        let f = setup().await;
        let user = create_test_user(&f.app.db, "u1@x.org", Role::Viewer).await;

        let updated = f.app.lifecycle_service.soft_delete(&f.admin, &user.id).await.unwrap();
        assert_eq!(updated.deleted_at, Some(TEST_NOW));

        let stored = f.app.user_store.find_by_id(&f.app.db, &user.id).await.unwrap().unwrap();
        assert_eq!(stored.deleted_at, Some(TEST_NOW));

        let records = audit_for(&f.app, &user.id).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, AuditAction::SoftDelete);
        assert_eq!(records[0].actor_id, f.admin.user_id);
        assert_eq!(records[0].actor_role, "admin");
        assert_eq!(records[0].target_email, "u1@x.org");
    }

    #[tokio::test]
    async fn test_soft_delete_twice_is_not_eligible() {
        let f = setup().await;
        let user = create_test_user(&f.app.db, "u1@x.org", Role::Viewer).await;
        f.app.lifecycle_service.soft_delete(&f.admin, &user.id).await.unwrap();

        f.clock.advance(chrono::Duration::seconds(10));
        let err = f.app.lifecycle_service.soft_delete(&f.admin, &user.id).await.unwrap_err();

        assert!(matches!(
            lifecycle_err(err),
            LifecycleError::NotEligible { state: LifecycleState::SoftDeleted, .. }
        ));
        let stored = f.app.user_store.find_by_id(&f.app.db, &user.id).await.unwrap().unwrap();
        assert_eq!(stored.deleted_at, Some(TEST_NOW));
        assert_eq!(audit_for(&f.app, &user.id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_target_is_not_found() {
        let f = setup().await;

        let err = f.app.lifecycle_service.soft_delete(&f.admin, "missing").await.unwrap_err();
        assert!(matches!(lifecycle_err(err), LifecycleError::NotFound { .. }));

        let err = f.app.lifecycle_service.restore(&f.admin, "missing").await.unwrap_err();
        assert!(matches!(lifecycle_err(err), LifecycleError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_actor_cannot_soft_delete_or_purge_self() {
        let f = setup().await;
        let admin_id = f.admin.user_id.clone();

        let err = f.app.lifecycle_service.soft_delete(&f.admin, &admin_id).await.unwrap_err();
        assert!(matches!(lifecycle_err(err), LifecycleError::SelfModification { .. }));

        let err = f.app.lifecycle_service.purge(&f.admin, &admin_id).await.unwrap_err();
        assert!(matches!(lifecycle_err(err), LifecycleError::SelfModification { .. }));

        let stored = f.app.user_store.find_by_id(&f.app.db, &admin_id).await.unwrap().unwrap();
        assert!(stored.is_active());
    }

    #[tokio::test]
    async fn test_restore_clears_deleted_at_and_records_audit() {
        let f = setup().await;
        let user = create_test_user(&f.app.db, "u1@x.org", Role::Editor).await;
        f.app.lifecycle_service.soft_delete(&f.admin, &user.id).await.unwrap();

        f.clock.advance(chrono::Duration::days(3));
        let restored = f.app.lifecycle_service.restore(&f.admin, &user.id).await.unwrap();
        assert!(restored.is_active());

        let records = audit_for(&f.app, &user.id).await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].action, AuditAction::Restore);
        assert_eq!(records[0].created_at, TEST_NOW + 3 * 86_400);
        assert_eq!(records[1].action, AuditAction::SoftDelete);
    }

    #[tokio::test]
    async fn test_restore_active_user_is_not_eligible_and_changes_nothing() {
        let f = setup().await;
        let user = create_test_user(&f.app.db, "u1@x.org", Role::Editor).await;

        let err = f.app.lifecycle_service.restore(&f.admin, &user.id).await.unwrap_err();
        assert!(matches!(
            lifecycle_err(err),
            LifecycleError::NotEligible { state: LifecycleState::Active, .. }
        ));

        let stored = f.app.user_store.find_by_id(&f.app.db, &user.id).await.unwrap().unwrap();
        assert_eq!(stored, user);
        assert!(audit_for(&f.app, &user.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_purge_active_user_is_not_eligible_and_changes_nothing() {
        let f = setup().await;
        let user = create_test_user(&f.app.db, "u1@x.org", Role::Editor).await;

        let err = f.app.lifecycle_service.purge(&f.admin, &user.id).await.unwrap_err();
        assert!(matches!(
            lifecycle_err(err),
            LifecycleError::NotEligible { state: LifecycleState::Active, .. }
        ));

        assert!(f.app.user_store.find_by_id(&f.app.db, &user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_purge_removes_user_and_its_audit_records() {
        let f = setup().await;
        let user = create_test_user(&f.app.db, "u1@x.org", Role::Editor).await;
        let other = create_test_user(&f.app.db, "u2@x.org", Role::Editor).await;
        f.app.lifecycle_service.soft_delete(&f.admin, &user.id).await.unwrap();
        f.app.lifecycle_service.restore(&f.admin, &user.id).await.unwrap();
        f.app.lifecycle_service.soft_delete(&f.admin, &user.id).await.unwrap();
        f.app.lifecycle_service.soft_delete(&f.admin, &other.id).await.unwrap();

        let outcome = f.app.lifecycle_service.purge(&f.admin, &user.id).await.unwrap();
        assert_eq!(outcome.user_id, user.id);
        assert_eq!(outcome.email, "u1@x.org");
        assert_eq!(outcome.audit_records_deleted, 3);

        assert!(f.app.user_store.find_by_id(&f.app.db, &user.id).await.unwrap().is_none());
        assert!(audit_for(&f.app, &user.id).await.is_empty());
        // Other accounts' history is untouched
        assert_eq!(audit_for(&f.app, &other.id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_purge_is_terminal() {
        let f = setup().await;
        let user = create_test_user(&f.app.db, "u1@x.org", Role::Editor).await;
        f.app.lifecycle_service.soft_delete(&f.admin, &user.id).await.unwrap();
        f.app.lifecycle_service.purge(&f.admin, &user.id).await.unwrap();

        let err = f.app.lifecycle_service.restore(&f.admin, &user.id).await.unwrap_err();
        assert!(matches!(lifecycle_err(err), LifecycleError::NotFound { .. }));
        let err = f.app.lifecycle_service.purge(&f.admin, &user.id).await.unwrap_err();
        assert!(matches!(lifecycle_err(err), LifecycleError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_failed_user_delete_rolls_back_audit_deletion() {
        let f = setup().await;
        let user = create_test_user(&f.app.db, "bad@x.org", Role::Editor).await;
        f.app.lifecycle_service.soft_delete(&f.admin, &user.id).await.unwrap();

        f.app
            .db
            .execute_unprepared(
                "CREATE TRIGGER fail_purge BEFORE DELETE ON users WHEN OLD.email = 'bad@x.org' \
                 BEGIN SELECT RAISE(ABORT, 'simulated failure'); END;",
            )
            .await
            .unwrap();

        let err = f.app.lifecycle_service.purge(&f.admin, &user.id).await.unwrap_err();
        assert!(err.is_transient());

        let stored = f.app.user_store.find_by_id(&f.app.db, &user.id).await.unwrap().unwrap();
        assert_eq!(stored.deleted_at, Some(TEST_NOW));
        assert_eq!(audit_for(&f.app, &user.id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_auto_purge_keeps_only_the_auto_purge_record() {
        let f = setup().await;
        let user = create_test_user(&f.app.db, "u1@x.org", Role::Member).await;
        f.app.lifecycle_service.soft_delete(&f.admin, &user.id).await.unwrap();

        f.clock.advance(chrono::Duration::days(31));
        let cutoff = f.clock.now_timestamp() - 30 * 86_400;
        let outcome = f.app.lifecycle_service.auto_purge(&user.id, cutoff).await.unwrap();
        assert_eq!(outcome.audit_records_deleted, 1);

        assert!(f.app.user_store.find_by_id(&f.app.db, &user.id).await.unwrap().is_none());
        let records = audit_for(&f.app, &user.id).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, AuditAction::AutoPurge);
        assert_eq!(records[0].actor_id, SYSTEM_ACTOR);
        assert_eq!(records[0].actor_role, SYSTEM_ACTOR);
        assert_eq!(records[0].target_email, "u1@x.org");
    }

    #[tokio::test]
    async fn test_auto_purge_rechecks_cutoff_and_state() {
        let f = setup().await;
        let recent = create_test_user(&f.app.db, "recent@x.org", Role::Member).await;
        let active = create_test_user(&f.app.db, "active@x.org", Role::Member).await;
        f.app.lifecycle_service.soft_delete(&f.admin, &recent.id).await.unwrap();

        let cutoff = TEST_NOW - 1;
        let err = f.app.lifecycle_service.auto_purge(&recent.id, cutoff).await.unwrap_err();
        assert!(matches!(
            lifecycle_err(err),
            LifecycleError::NotEligible { state: LifecycleState::SoftDeleted, .. }
        ));

        let err = f.app.lifecycle_service.auto_purge(&active.id, TEST_NOW).await.unwrap_err();
        assert!(matches!(
            lifecycle_err(err),
            LifecycleError::NotEligible { state: LifecycleState::Active, .. }
        ));

        assert!(f.app.user_store.find_by_id(&f.app.db, &recent.id).await.unwrap().is_some());
        assert_eq!(audit_for(&f.app, &recent.id).await.len(), 1);
    }

    #[tokio::test]
    async fn test_change_role_updates_and_records() {
        let f = setup().await;
        let user = create_test_user(&f.app.db, "u1@x.org", Role::Viewer).await;

        let updated = f
            .app
            .lifecycle_service
            .change_role(&f.admin, &user.id, Role::Editor)
            .await
            .unwrap();
        assert_eq!(updated.role, Role::Editor);

        let stored = f.app.user_store.find_by_id(&f.app.db, &user.id).await.unwrap().unwrap();
        assert_eq!(stored.role, Role::Editor);

        let records = audit_for(&f.app, &user.id).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, AuditAction::RoleChange);
    }

    #[tokio::test]
    async fn test_change_role_to_same_role_writes_nothing() {
        let f = setup().await;
        let user = create_test_user(&f.app.db, "u1@x.org", Role::Viewer).await;

        let unchanged = f
            .app
            .lifecycle_service
            .change_role(&f.admin, &user.id, Role::Viewer)
            .await
            .unwrap();

        assert_eq!(unchanged, user);
        assert!(audit_for(&f.app, &user.id).await.is_empty());
    }

    #[tokio::test]
    async fn test_change_role_rejects_soft_deleted_and_self() {
        let f = setup().await;
        let user = create_test_user(&f.app.db, "u1@x.org", Role::Viewer).await;
        f.app.lifecycle_service.soft_delete(&f.admin, &user.id).await.unwrap();

        let err = f
            .app
            .lifecycle_service
            .change_role(&f.admin, &user.id, Role::Admin)
            .await
            .unwrap_err();
        assert!(matches!(lifecycle_err(err), LifecycleError::NotEligible { .. }));

        let admin_id = f.admin.user_id.clone();
        let err = f
            .app
            .lifecycle_service
            .change_role(&f.admin, &admin_id, Role::Viewer)
            .await
            .unwrap_err();
        assert!(matches!(lifecycle_err(err), LifecycleError::SelfModification { .. }));
    }
}

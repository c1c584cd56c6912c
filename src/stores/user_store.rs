use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::errors::internal::CredentialError;
use crate::types::db::user::{self, Entity as User};
use crate::types::internal::auth::Role;

/// Canonical form used for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Repository for user records
///
/// Every method takes the connection to run on, so lifecycle transitions
/// can compose several calls inside one transaction. Guarded writes return
/// `false` when their state precondition no longer holds.
#[derive(Debug, Default, Clone, Copy)]
pub struct UserStore;

impl UserStore {
    pub fn new() -> Self {
        Self
    }

    /// Create a user
    ///
    /// # Returns
    /// * `Ok(user::Model)` - The stored record
    /// * `Err(InternalError)` - `DuplicateEmail` on a uniqueness violation
    pub async fn create<C: ConnectionTrait>(
        &self,
        conn: &C,
        email: &str,
        password_hash: String,
        role: Role,
        now: i64,
    ) -> Result<user::Model, InternalError> {
        let email = normalize_email(email);

        let new_user = user::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            email: Set(email.clone()),
            password_hash: Set(password_hash),
            role: Set(role),
            deleted_at: Set(None),
            reset_token: Set(None),
            reset_token_expiry: Set(None),
            online_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        new_user.insert(conn).await.map_err(|e| {
            if is_unique_violation(&e) {
                InternalError::from(CredentialError::DuplicateEmail(email))
            } else {
                InternalError::database("create_user", e)
            }
        })
    }

    pub async fn find_by_id<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        User::find_by_id(user_id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_id", e))
    }

    pub async fn find_by_email<C: ConnectionTrait>(
        &self,
        conn: &C,
        email: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        User::find()
            .filter(user::Column::Email.eq(normalize_email(email)))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_email", e))
    }

    /// Active users ordered by email
    pub async fn list_active<C: ConnectionTrait>(
        &self,
        conn: &C,
    ) -> Result<Vec<user::Model>, InternalError> {
        User::find()
            .filter(user::Column::DeletedAt.is_null())
            .order_by_asc(user::Column::Email)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_active_users", e))
    }

    /// Soft-deleted users, most recently deleted first
    pub async fn list_soft_deleted<C: ConnectionTrait>(
        &self,
        conn: &C,
    ) -> Result<Vec<user::Model>, InternalError> {
        User::find()
            .filter(user::Column::DeletedAt.is_not_null())
            .order_by_desc(user::Column::DeletedAt)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_soft_deleted_users", e))
    }

    /// Users soft-deleted at or before `cutoff`, oldest first
    pub async fn find_soft_deleted_before<C: ConnectionTrait>(
        &self,
        conn: &C,
        cutoff: i64,
    ) -> Result<Vec<user::Model>, InternalError> {
        User::find()
            .filter(user::Column::DeletedAt.is_not_null())
            .filter(user::Column::DeletedAt.lte(cutoff))
            .order_by_asc(user::Column::DeletedAt)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("find_soft_deleted_before", e))
    }

    /// Set `deleted_at` if the user is currently active
    pub async fn mark_soft_deleted<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        now: i64,
    ) -> Result<bool, InternalError> {
        let result = User::update_many()
            .col_expr(user::Column::DeletedAt, Expr::value(now))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(user_id))
            .filter(user::Column::DeletedAt.is_null())
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("mark_soft_deleted", e))?;

        Ok(result.rows_affected == 1)
    }

    /// Clear `deleted_at` if the user is currently soft-deleted
    pub async fn clear_soft_deleted<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        now: i64,
    ) -> Result<bool, InternalError> {
        let result = User::update_many()
            .col_expr(user::Column::DeletedAt, Expr::value(Option::<i64>::None))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(user_id))
            .filter(user::Column::DeletedAt.is_not_null())
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("clear_soft_deleted", e))?;

        Ok(result.rows_affected == 1)
    }

    /// Physically delete the user if it is soft-deleted
    ///
    /// With `cutoff`, additionally requires `deleted_at <= cutoff`.
    pub async fn delete_soft_deleted<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        cutoff: Option<i64>,
    ) -> Result<bool, InternalError> {
        let mut delete = User::delete_many()
            .filter(user::Column::Id.eq(user_id))
            .filter(user::Column::DeletedAt.is_not_null());
        if let Some(cutoff) = cutoff {
            delete = delete.filter(user::Column::DeletedAt.lte(cutoff));
        }

        let result = delete
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_soft_deleted_user", e))?;

        Ok(result.rows_affected == 1)
    }

    /// Change the role of an active user
    pub async fn update_role<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        role: Role,
        now: i64,
    ) -> Result<bool, InternalError> {
        let result = User::update_many()
            .col_expr(user::Column::Role, Expr::value(role.as_str()))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(user_id))
            .filter(user::Column::DeletedAt.is_null())
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("update_role", e))?;

        Ok(result.rows_affected == 1)
    }

    /// Store a reset token hash and expiry on an active user
    pub async fn set_reset_token<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        token_hash: &str,
        expires_at: i64,
        now: i64,
    ) -> Result<bool, InternalError> {
        let result = User::update_many()
            .col_expr(user::Column::ResetToken, Expr::value(token_hash))
            .col_expr(user::Column::ResetTokenExpiry, Expr::value(expires_at))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(user_id))
            .filter(user::Column::DeletedAt.is_null())
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("set_reset_token", e))?;

        Ok(result.rows_affected == 1)
    }

    /// Look a user up by email and stored reset token hash
    ///
    /// Returns the row regardless of state or expiry; callers decide.
    pub async fn find_by_email_and_reset_token<C: ConnectionTrait>(
        &self,
        conn: &C,
        email: &str,
        token_hash: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        User::find()
            .filter(user::Column::Email.eq(normalize_email(email)))
            .filter(user::Column::ResetToken.eq(token_hash))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_by_email_and_reset_token", e))
    }

    /// Replace the password hash and clear reset token fields on an active user
    ///
    /// Guarded on the token hash so a token can be consumed only once.
    pub async fn complete_password_reset<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        token_hash: &str,
        password_hash: String,
        now: i64,
    ) -> Result<bool, InternalError> {
        let result = User::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(user::Column::ResetToken, Expr::value(Option::<String>::None))
            .col_expr(user::Column::ResetTokenExpiry, Expr::value(Option::<i64>::None))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(user_id))
            .filter(user::Column::ResetToken.eq(token_hash))
            .filter(user::Column::DeletedAt.is_null())
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("complete_password_reset", e))?;

        Ok(result.rows_affected == 1)
    }

    /// Record a heartbeat for an active user
    pub async fn touch_online<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: &str,
        now: i64,
    ) -> Result<bool, InternalError> {
        let result = User::update_many()
            .col_expr(user::Column::OnlineAt, Expr::value(now))
            .filter(user::Column::Id.eq(user_id))
            .filter(user::Column::DeletedAt.is_null())
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("touch_online", e))?;

        Ok(result.rows_affected == 1)
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        || err.to_string().contains("UNIQUE")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::{TEST_NOW, setup_test_db};

    #[tokio::test]
    async fn test_create_normalizes_email() {
        let db = setup_test_db().await;
        let store = UserStore::new();

        let user = store
            .create(&db, "  Admin@X.org ", "hash".to_string(), Role::Admin, TEST_NOW)
            .await
            .unwrap();

        assert_eq!(user.email, "admin@x.org");
        assert!(user.is_active());
        let found = store.find_by_email(&db, "ADMIN@x.org").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_credential_error() {
        let db = setup_test_db().await;
        let store = UserStore::new();
        store.create(&db, "a@x.org", "h".to_string(), Role::Member, TEST_NOW).await.unwrap();

        let err = store
            .create(&db, "A@x.org", "h".to_string(), Role::Member, TEST_NOW)
            .await
            .unwrap_err();

        assert!(matches!(err, InternalError::Credential(CredentialError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_soft_delete_guards() {
        let db = setup_test_db().await;
        let store = UserStore::new();
        let user = store.create(&db, "a@x.org", "h".to_string(), Role::Member, TEST_NOW).await.unwrap();

        assert!(!store.clear_soft_deleted(&db, &user.id, TEST_NOW).await.unwrap());
        assert!(!store.delete_soft_deleted(&db, &user.id, None).await.unwrap());

        assert!(store.mark_soft_deleted(&db, &user.id, TEST_NOW).await.unwrap());
        assert!(!store.mark_soft_deleted(&db, &user.id, TEST_NOW + 1).await.unwrap());

        let stored = store.find_by_id(&db, &user.id).await.unwrap().unwrap();
        assert_eq!(stored.deleted_at, Some(TEST_NOW));

        assert!(store.clear_soft_deleted(&db, &user.id, TEST_NOW + 2).await.unwrap());
        let stored = store.find_by_id(&db, &user.id).await.unwrap().unwrap();
        assert_eq!(stored.deleted_at, None);
        assert_eq!(stored.updated_at, TEST_NOW + 2);
    }

    #[tokio::test]
    async fn test_delete_respects_cutoff() {
        let db = setup_test_db().await;
        let store = UserStore::new();
        let user = store.create(&db, "a@x.org", "h".to_string(), Role::Member, TEST_NOW).await.unwrap();
        store.mark_soft_deleted(&db, &user.id, TEST_NOW).await.unwrap();

        assert!(!store.delete_soft_deleted(&db, &user.id, Some(TEST_NOW - 1)).await.unwrap());
        assert!(store.delete_soft_deleted(&db, &user.id, Some(TEST_NOW)).await.unwrap());
        assert!(store.find_by_id(&db, &user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_soft_deleted_before_and_listings() {
        let db = setup_test_db().await;
        let store = UserStore::new();
        let old = store.create(&db, "old@x.org", "h".to_string(), Role::Member, TEST_NOW).await.unwrap();
        let recent = store.create(&db, "recent@x.org", "h".to_string(), Role::Member, TEST_NOW).await.unwrap();
        let active = store.create(&db, "active@x.org", "h".to_string(), Role::Viewer, TEST_NOW).await.unwrap();
        store.mark_soft_deleted(&db, &old.id, TEST_NOW - 100).await.unwrap();
        store.mark_soft_deleted(&db, &recent.id, TEST_NOW).await.unwrap();

        let candidates = store.find_soft_deleted_before(&db, TEST_NOW - 50).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, old.id);

        let active_list = store.list_active(&db).await.unwrap();
        assert_eq!(active_list.len(), 1);
        assert_eq!(active_list[0].id, active.id);

        let deleted = store.list_soft_deleted(&db).await.unwrap();
        assert_eq!(deleted.iter().map(|u| u.id.as_str()).collect::<Vec<_>>(), vec![recent.id.as_str(), old.id.as_str()]);
    }

    #[tokio::test]
    async fn test_update_role_only_on_active_user() {
        let db = setup_test_db().await;
        let store = UserStore::new();
        let user = store.create(&db, "a@x.org", "h".to_string(), Role::Viewer, TEST_NOW).await.unwrap();

        assert!(store.update_role(&db, &user.id, Role::Editor, TEST_NOW).await.unwrap());
        assert_eq!(store.find_by_id(&db, &user.id).await.unwrap().unwrap().role, Role::Editor);

        store.mark_soft_deleted(&db, &user.id, TEST_NOW).await.unwrap();
        assert!(!store.update_role(&db, &user.id, Role::Admin, TEST_NOW).await.unwrap());
    }

    #[tokio::test]
    async fn test_reset_token_round() {
        let db = setup_test_db().await;
        let store = UserStore::new();
        let user = store.create(&db, "a@x.org", "old".to_string(), Role::Member, TEST_NOW).await.unwrap();

        assert!(store.set_reset_token(&db, &user.id, "tokenhash", TEST_NOW + 3600, TEST_NOW).await.unwrap());
        let found = store.find_by_email_and_reset_token(&db, "A@X.org", "tokenhash").await.unwrap().unwrap();
        assert_eq!(found.reset_token_expiry, Some(TEST_NOW + 3600));
        assert!(store.find_by_email_and_reset_token(&db, "a@x.org", "other").await.unwrap().is_none());

        assert!(store.complete_password_reset(&db, &user.id, "tokenhash", "new".to_string(), TEST_NOW).await.unwrap());
        assert!(!store.complete_password_reset(&db, &user.id, "tokenhash", "again".to_string(), TEST_NOW).await.unwrap());

        let stored = store.find_by_id(&db, &user.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "new");
        assert!(stored.reset_token.is_none());
        assert!(stored.reset_token_expiry.is_none());
    }

    #[tokio::test]
    async fn test_touch_online() {
        let db = setup_test_db().await;
        let store = UserStore::new();
        let user = store.create(&db, "a@x.org", "h".to_string(), Role::Member, TEST_NOW).await.unwrap();

        assert!(store.touch_online(&db, &user.id, TEST_NOW + 5).await.unwrap());
        assert_eq!(store.find_by_id(&db, &user.id).await.unwrap().unwrap().online_at, Some(TEST_NOW + 5));
        assert!(!store.touch_online(&db, "missing", TEST_NOW).await.unwrap());
    }
}

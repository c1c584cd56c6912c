use sea_orm::entity::prelude::*;

use crate::types::internal::auth::Role;
use crate::types::internal::lifecycle::LifecycleState;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Lowercased, trimmed
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub role: Role,

    /// NULL = active, otherwise soft-deleted at this Unix timestamp
    pub deleted_at: Option<i64>,

    // Password reset (reset_token holds the HMAC of the raw token)
    pub reset_token: Option<String>,
    pub reset_token_expiry: Option<i64>,

    /// Last heartbeat
    pub online_at: Option<i64>,

    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn lifecycle_state(&self) -> LifecycleState {
        LifecycleState::from_deleted_at(self.deleted_at)
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

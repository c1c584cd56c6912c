use sea_orm::entity::prelude::*;

use crate::types::internal::audit::AuditAction;

/// SeaORM entity for audit_records table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub action: AuditAction,
    pub target_id: String,
    pub target_email: String,
    pub actor_id: String,
    pub actor_role: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

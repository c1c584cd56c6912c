use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuditRecords::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AuditRecords::Id).big_integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(AuditRecords::Action).string().not_null())
                    .col(ColumnDef::new(AuditRecords::TargetId).string().not_null())
                    .col(ColumnDef::new(AuditRecords::TargetEmail).string().not_null())
                    .col(ColumnDef::new(AuditRecords::ActorId).string().not_null())
                    .col(ColumnDef::new(AuditRecords::ActorRole).string().not_null())
                    .col(ColumnDef::new(AuditRecords::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_audit_records_target_id")
                    .table(AuditRecords::Table)
                    .col(AuditRecords::TargetId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_audit_records_action")
                    .table(AuditRecords::Table)
                    .col(AuditRecords::Action)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_audit_records_created_at")
                    .table(AuditRecords::Table)
                    .col(AuditRecords::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditRecords::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum AuditRecords {
    Table,
    Id,
    Action,
    TargetId,
    TargetEmail,
    ActorId,
    ActorRole,
    CreatedAt,
}

pub use sea_orm_migration::prelude::*;

mod m20251001_000001_create_users;
mod m20251001_000002_create_audit_records;

/// Migrator for the roster database
///
/// Users and audit records share one database so that a lifecycle
/// transition and its audit record commit in the same transaction.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_users::Migration),
            Box::new(m20251001_000002_create_audit_records::Migration),
        ]
    }
}

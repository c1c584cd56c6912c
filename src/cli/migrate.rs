use crate::config::{BootstrapSettings, init_database, migrate_database};

/// Run database migrations
///
/// Connects with `DATABASE_URL` and runs all pending migrations. Does not
/// load secrets or build AppData.
pub async fn run_migrations(settings: &BootstrapSettings) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Running database migrations...");

    let db = init_database(settings).await?;
    migrate_database(&db).await?;

    tracing::info!("All migrations completed successfully");
    println!("✅ Migrations completed");

    Ok(())
}

// Test utilities shared across unit tests
// Only compiled when running tests

use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};

use crate::app_data::AppData;
use crate::config::{
    PASSWORD_PEPPER_VAR, RESET_TOKEN_SECRET_VAR, SESSION_SECRET_VAR, SecretManager,
    StaticEnvironment,
};
use crate::providers::ManualClock;
use crate::stores::UserStore;
use crate::types::db::user;
use crate::types::internal::auth::{Role, TokenSubject};

/// Fixed "now" for deterministic tests (2025-06-15T15:06:40Z)
pub const TEST_NOW: i64 = 1_750_000_000;

pub const TEST_SESSION_SECRET: &str = "test-session-secret-minimum-32-characters";
pub const TEST_PASSWORD_PEPPER: &str = "test-pepper-for-unit-tests";
pub const TEST_RESET_TOKEN_SECRET: &str = "test-reset-secret-minimum-32-characters";

/// Password stored (hashed) for users made by `create_test_user_with_password`
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// SecretManager loaded from fixed test values, no process env involved
pub fn test_secret_manager() -> Arc<SecretManager> {
    let env = StaticEnvironment::empty().with_vars(&[
        (SESSION_SECRET_VAR, TEST_SESSION_SECRET),
        (PASSWORD_PEPPER_VAR, TEST_PASSWORD_PEPPER),
        (RESET_TOKEN_SECRET_VAR, TEST_RESET_TOKEN_SECRET),
    ]);

    Arc::new(SecretManager::from_env_provider(&env).expect("Failed to load test secrets"))
}

/// Creates a migrated in-memory database
///
/// The in-memory pool holds a single connection: inside a transaction,
/// query through the transaction, never through `db`.
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

pub fn token_subject(user_id: &str, email: &str, role: Role) -> TokenSubject {
    TokenSubject {
        user_id: user_id.to_string(),
        email: email.to_string(),
        role,
    }
}

/// Inserts an active user with a placeholder password hash
pub async fn create_test_user(db: &DatabaseConnection, email: &str, role: Role) -> user::Model {
    UserStore::new()
        .create(db, email, "not-a-real-hash".to_string(), role, TEST_NOW)
        .await
        .expect("Failed to create test user")
}

/// Inserts an active user whose password is `TEST_PASSWORD`
pub async fn create_test_user_with_password(
    app_data: &AppData,
    email: &str,
    role: Role,
) -> user::Model {
    let hash = app_data
        .crypto_provider
        .hash_password(TEST_PASSWORD)
        .expect("Failed to hash test password");

    app_data
        .user_store
        .create(&app_data.db, email, hash, role, TEST_NOW)
        .await
        .expect("Failed to create test user")
}

/// Full application wiring on an in-memory database and a manual clock
pub async fn setup_test_app() -> (Arc<ManualClock>, Arc<AppData>) {
    let db = setup_test_db().await;
    let clock = Arc::new(ManualClock::at_timestamp(TEST_NOW));
    let app_data = Arc::new(AppData::new(db, test_secret_manager(), clock.clone(), false));

    (clock, app_data)
}

// Common test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use migration::{Migrator, MigratorTrait};
use roster_backend::app_data::AppData;
use roster_backend::config::{
    PASSWORD_PEPPER_VAR, RESET_TOKEN_SECRET_VAR, SESSION_SECRET_VAR, SecretManager,
    StaticEnvironment,
};
use roster_backend::providers::ManualClock;
use roster_backend::types::db::user;
use roster_backend::types::internal::auth::{Principal, Role};
use roster_backend::types::internal::context::RequestContext;
use sea_orm::{Database, DatabaseConnection};

/// 2025-06-15T15:06:40Z
pub const START: i64 = 1_750_000_000;

pub const SESSION_SECRET: &str = "integration-session-secret-32-characters";
pub const PASSWORD: &str = "integration-password";

pub fn secret_manager() -> Arc<SecretManager> {
    let env = StaticEnvironment::empty().with_vars(&[
        (SESSION_SECRET_VAR, SESSION_SECRET),
        (PASSWORD_PEPPER_VAR, "integration-pepper-16"),
        (RESET_TOKEN_SECRET_VAR, "integration-reset-secret-32-characters"),
    ]);

    Arc::new(SecretManager::from_env_provider(&env).expect("Failed to load test secrets"))
}

/// Creates an in-memory database with migrations applied
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Full application wiring driven by a manual clock
pub async fn setup_app() -> (Arc<ManualClock>, Arc<AppData>) {
    let db = setup_test_db().await;
    let clock = Arc::new(ManualClock::at_timestamp(START));
    let app = Arc::new(AppData::new(db, secret_manager(), clock.clone(), false));
    (clock, app)
}

/// Inserts an active user whose password is `PASSWORD`
pub async fn create_user(app: &AppData, email: &str, role: Role) -> user::Model {
    let hash = app
        .crypto_provider
        .hash_password(PASSWORD)
        .expect("Failed to hash password");

    app.user_store
        .create(&app.db, email, hash, role, START)
        .await
        .expect("Failed to create user")
}

pub fn principal(row: &user::Model) -> Principal {
    Principal {
        user_id: row.id.clone(),
        email: row.email.clone(),
        role: row.role,
    }
}

pub fn context_for(row: &user::Model) -> RequestContext {
    RequestContext::for_api(None).with_principal(Some(principal(row)))
}

/// Helper to manage environment variables in tests
///
/// Cleans up specified environment variables on creation and drop,
/// ensuring test isolation when dealing with global environment state.
pub struct EnvGuard {
    vars: Vec<String>,
}

impl EnvGuard {
    pub fn new(vars: Vec<&str>) -> Self {
        for var in &vars {
            unsafe {
                std::env::remove_var(var);
            }
        }
        Self {
            vars: vars.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for var in &self.vars {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }
}

/// Global mutex for tests that modify environment variables
pub static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

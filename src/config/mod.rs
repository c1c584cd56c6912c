mod bootstrap_settings;
mod database;
mod env_provider;
mod errors;
mod logging;
mod secret_config;
mod secret_manager;

pub use bootstrap_settings::{AppEnvironment, BootstrapSettings};
pub use database::{begin_transaction, commit_transaction, init_database, migrate_database};
pub use env_provider::{EnvironmentProvider, StaticEnvironment, SystemEnvironment};
pub use errors::ApplicationError;
pub use logging::{init_logging, LoggingConfig, LoggingError};
pub use secret_config::{SecretConfig, SecretType};
pub use secret_manager::{
    SecretError, SecretManager, PASSWORD_PEPPER_VAR, RESET_TOKEN_SECRET_VAR, SESSION_SECRET_VAR,
};

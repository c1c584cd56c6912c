use std::fmt;

use crate::config::{EnvironmentProvider, SecretConfig, SecretType, SystemEnvironment};

pub const SESSION_SECRET_VAR: &str = "SESSION_SECRET";
pub const PASSWORD_PEPPER_VAR: &str = "PASSWORD_PEPPER";
pub const RESET_TOKEN_SECRET_VAR: &str = "RESET_TOKEN_SECRET";

/// Custom error type for secret-related failures
///
/// Always fatal: the server refuses to start without valid secrets.
#[derive(Debug)]
pub enum SecretError {
    Missing { secret_name: String },
    InvalidLength { secret_name: String, expected: usize, actual: usize },
}

impl SecretError {
    pub fn missing(secret_name: &str) -> Self {
        Self::Missing {
            secret_name: secret_name.to_string(),
        }
    }

    pub fn invalid_length(secret_name: &str, expected: usize, actual: usize) -> Self {
        Self::InvalidLength {
            secret_name: secret_name.to_string(),
            expected,
            actual,
        }
    }
}

impl fmt::Display for SecretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { secret_name } => {
                write!(f, "Required secret '{}' is missing", secret_name)
            }
            Self::InvalidLength { secret_name, expected, actual } => {
                write!(
                    f,
                    "Secret '{}' must be at least {} characters, got {}",
                    secret_name, expected, actual
                )
            }
        }
    }
}

impl std::error::Error for SecretError {}

/// Centralized manager for application secrets
///
/// Loaded once at startup and never mutated; share it through `Arc`.
pub struct SecretManager {
    session_secret: String,
    password_pepper: String,
    reset_token_secret: String,
}

impl SecretManager {
    /// Initialize the SecretManager from the process environment
    ///
    /// # Errors
    /// Returns `SecretError` if any required secret is missing or fails validation
    pub fn init() -> Result<Self, SecretError> {
        Self::from_env_provider(&SystemEnvironment)
    }

    /// Initialize the SecretManager from an explicit environment source
    pub fn from_env_provider(env: &dyn EnvironmentProvider) -> Result<Self, SecretError> {
        let session_secret = Self::load_secret(env, &Self::session_secret_config())?;
        let password_pepper = Self::load_secret(env, &Self::password_pepper_config())?;
        let reset_token_secret = Self::load_secret(env, &Self::reset_token_secret_config())?;

        Ok(Self {
            session_secret,
            password_pepper,
            reset_token_secret,
        })
    }

    /// Configuration for the session token signing secret
    fn session_secret_config() -> SecretConfig {
        SecretConfig::new(SecretType::env_var(SESSION_SECRET_VAR))
            .required(true)
            .min_length(32)
    }

    /// Configuration for the password hashing pepper
    fn password_pepper_config() -> SecretConfig {
        SecretConfig::new(SecretType::env_var(PASSWORD_PEPPER_VAR))
            .required(true)
            .min_length(16)
    }

    /// Configuration for the password reset token HMAC key
    fn reset_token_secret_config() -> SecretConfig {
        SecretConfig::new(SecretType::env_var(RESET_TOKEN_SECRET_VAR))
            .required(true)
            .min_length(32)
    }

    /// Get the session token signing secret
    pub fn session_secret(&self) -> &str {
        &self.session_secret
    }

    /// Get the pepper for password hashing
    pub fn password_pepper(&self) -> &str {
        &self.password_pepper
    }

    /// Get the key used to hash password reset tokens
    pub fn reset_token_secret(&self) -> &str {
        &self.reset_token_secret
    }

    /// Load a secret based on its configuration
    pub(crate) fn load_secret(
        env: &dyn EnvironmentProvider,
        config: &SecretConfig,
    ) -> Result<String, SecretError> {
        let name = config.secret_type.name();

        let value = match &config.secret_type {
            SecretType::EnvVar { name } => match env.get_var(name) {
                Some(v) if !v.is_empty() => v,
                _ if !config.required => return Ok(String::new()),
                _ => return Err(SecretError::missing(name)),
            },
        };

        if let Some(min_len) = config.min_length {
            if value.len() < min_len {
                return Err(SecretError::invalid_length(name, min_len, value.len()));
            }
        }

        Ok(value)
    }
}

impl fmt::Debug for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretManager")
            .field("session_secret", &"<redacted>")
            .field("password_pepper", &"<redacted>")
            .field("reset_token_secret", &"<redacted>")
            .finish()
    }
}

impl fmt::Display for SecretManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretManager {{ secrets_loaded: 3 }}")
    }
}

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use crate::config::errors::ApplicationError;
use crate::config::{EnvironmentProvider, SystemEnvironment};

const DEFAULT_DATABASE_URL: &str = "sqlite://roster.db?mode=rwc";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_APP_ENV: &str = "development";
const DEFAULT_SWEEP_INTERVAL_MINUTES: u64 = 60;

/// Deployment environment, drives secure-cookie defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Result<Self, ApplicationError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ApplicationError::invalid_setting(
                "APP_ENV",
                format!("expected development, test or production, got '{}'", other),
            )),
        }
    }
}

/// Bootstrap settings for infrastructure configuration
pub struct BootstrapSettings {
    database_url: String,
    server_host: String,
    server_port: u16,
    app_env: AppEnvironment,
    cookie_secure: bool,
    purge_sweep_interval_minutes: u64,
}

impl BootstrapSettings {
    /// Load bootstrap settings from the given environment source
    ///
    /// Every setting has a default; only malformed values fail.
    pub fn from_env_provider(
        env_provider: Arc<dyn EnvironmentProvider + Send + Sync>,
    ) -> Result<Self, ApplicationError> {
        let read = |name: &str| env_provider.get_var(name).map(|v| v.trim().to_string());

        let database_url = read("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        if database_url.is_empty() {
            return Err(ApplicationError::invalid_setting("DATABASE_URL", "must not be empty"));
        }

        let server_host = read("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        Self::validate_host_address(&server_host)?;

        let server_port = match read("PORT") {
            Some(value) => Self::parse_port(&value)?,
            None => DEFAULT_PORT,
        };

        let app_env = match read("APP_ENV") {
            Some(value) => AppEnvironment::parse(&value)?,
            None => AppEnvironment::parse(DEFAULT_APP_ENV)?,
        };

        // An explicit COOKIE_SECURE wins over the environment default
        let cookie_secure = match read("COOKIE_SECURE") {
            Some(value) => Self::parse_bool("COOKIE_SECURE", &value)?,
            None => app_env == AppEnvironment::Production,
        };

        let purge_sweep_interval_minutes = match read("PURGE_SWEEP_INTERVAL_MINUTES") {
            Some(value) => value.parse::<u64>().map_err(|e| {
                ApplicationError::invalid_setting("PURGE_SWEEP_INTERVAL_MINUTES", e.to_string())
            })?,
            None => DEFAULT_SWEEP_INTERVAL_MINUTES,
        };

        Ok(Self {
            database_url,
            server_host,
            server_port,
            app_env,
            cookie_secure,
            purge_sweep_interval_minutes,
        })
    }

    /// Convenience method that uses the system environment provider
    pub fn from_env() -> Result<Self, ApplicationError> {
        Self::from_env_provider(Arc::new(SystemEnvironment))
    }

    fn validate_host_address(value: &str) -> Result<(), ApplicationError> {
        if value.is_empty() {
            return Err(ApplicationError::invalid_setting("HOST", "must not be empty"));
        }
        if value.parse::<IpAddr>().is_ok() || value == "localhost" {
            return Ok(());
        }
        let is_hostname = value
            .split('.')
            .all(|label| !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
        if is_hostname {
            Ok(())
        } else {
            Err(ApplicationError::invalid_setting(
                "HOST",
                format!("'{}' is not a valid IP address or hostname", value),
            ))
        }
    }

    fn parse_port(value: &str) -> Result<u16, ApplicationError> {
        let port = value
            .parse::<u32>()
            .map_err(|e| ApplicationError::invalid_setting("PORT", format!("'{}': {}", value, e)))?;
        if !(1..=65535).contains(&port) {
            return Err(ApplicationError::invalid_setting(
                "PORT",
                format!("{} is outside 1..=65535", port),
            ));
        }
        Ok(port as u16)
    }

    fn parse_bool(setting_name: &str, value: &str) -> Result<bool, ApplicationError> {
        match value.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            other => Err(ApplicationError::invalid_setting(
                setting_name,
                format!("expected true or false, got '{}'", other),
            )),
        }
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn server_host(&self) -> &str {
        &self.server_host
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn app_env(&self) -> AppEnvironment {
        self.app_env
    }

    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    /// Zero disables the in-process sweeper
    pub fn purge_sweep_interval_minutes(&self) -> u64 {
        self.purge_sweep_interval_minutes
    }
}

impl fmt::Debug for BootstrapSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapSettings")
            .field("database_url", &self.database_url)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("app_env", &self.app_env)
            .field("cookie_secure", &self.cookie_secure)
            .field("purge_sweep_interval_minutes", &self.purge_sweep_interval_minutes)
            .finish()
    }
}

use std::path::PathBuf;

use crate::config::{EnvironmentProvider, SystemEnvironment};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Configuration for application logging
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_level: String,
    pub app_log_file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Load logging configuration from an environment source
    pub fn from_env_provider(env: &dyn EnvironmentProvider) -> Self {
        let log_level = env.get_var("LOG_LEVEL").unwrap_or_else(|| "INFO".to_string());

        let app_log_file = env
            .get_var("APP_LOG_FILE")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Self {
            log_level,
            app_log_file,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize logging: {0}")]
    InitializationError(String),

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("File system error: {0}")]
    FileSystemError(#[from] std::io::Error),
}

/// Initialize the tracing subscriber with console and optional file output
///
/// Reads `LOG_LEVEL` (default INFO) and `APP_LOG_FILE` from the process
/// environment. The file layer rotates daily.
pub fn init_logging() -> Result<(), LoggingError> {
    let config = LoggingConfig::from_env_provider(&SystemEnvironment);

    let build_filter = || {
        EnvFilter::try_new(&config.log_level)
            .map_err(|e| LoggingError::InvalidLogLevel(format!("{}: {}", config.log_level, e)))
    };

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .with_filter(build_filter()?);

    let subscriber = tracing_subscriber::registry()
        .with(console_layer);

    // Add file layer if configured
    if let Some(log_file_path) = &config.app_log_file {
        if let Some(parent) = log_file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file_appender = tracing_appender::rolling::daily(
            log_file_path.parent().unwrap_or_else(|| std::path::Path::new(".")),
            log_file_path.file_name()
                .ok_or_else(|| LoggingError::InitializationError("Invalid log file path".to_string()))?,
        );

        let file_layer = fmt::layer()
            .with_writer(file_appender)
            .with_target(true)
            .with_ansi(false)
            .with_file(true)
            .with_line_number(true)
            .with_filter(build_filter()?);

        subscriber
            .with(file_layer)
            .try_init()
            .map_err(|e| LoggingError::InitializationError(e.to_string()))?;
    } else {
        subscriber
            .try_init()
            .map_err(|e| LoggingError::InitializationError(e.to_string()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticEnvironment;

    #[test]
    fn test_logging_config_defaults() {
        let config = LoggingConfig::from_env_provider(&StaticEnvironment::empty());

        assert_eq!(config.log_level, "INFO");
        assert!(config.app_log_file.is_none());
    }

    #[test]
    fn test_logging_config_reads_file_path() {
        let env = StaticEnvironment::empty()
            .with_vars(&[("LOG_LEVEL", "roster_backend=debug"), ("APP_LOG_FILE", "logs/roster.log")]);
        let config = LoggingConfig::from_env_provider(&env);

        assert_eq!(config.log_level, "roster_backend=debug");
        assert_eq!(config.app_log_file, Some(PathBuf::from("logs/roster.log")));
    }

    #[test]
    fn test_empty_log_file_is_ignored() {
        let env = StaticEnvironment::empty().with_var("APP_LOG_FILE", "");
        assert!(LoggingConfig::from_env_provider(&env).app_log_file.is_none());
    }
}

use std::fmt;

#[derive(Debug)]
pub enum ApplicationError {
    InvalidSetting { setting_name: String, reason: String },
}

impl ApplicationError {
    pub fn invalid_setting(setting_name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            setting_name: setting_name.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSetting { setting_name, reason } => {
                write!(f, "Invalid setting '{}': {}", setting_name, reason)
            }
        }
    }
}

impl std::error::Error for ApplicationError {}

use std::collections::HashMap;

/// Source of bootstrap, logging and secret variables
///
/// Bootstrap settings, the secret manager and logging all read through it.
pub trait EnvironmentProvider {
    fn get_var(&self, key: &str) -> Option<String>;
}

/// The process environment, after `.env` has been loaded
pub struct SystemEnvironment;

impl EnvironmentProvider for SystemEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory variables; the test app and parallel unit tests use this
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    vars: HashMap<String, String>,
}

impl StaticEnvironment {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_vars(self, vars: &[(&str, &str)]) -> Self {
        vars.iter().fold(self, |env, (key, value)| env.with_var(key, value))
    }
}

impl EnvironmentProvider for StaticEnvironment {
    fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

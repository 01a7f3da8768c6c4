//! Activation override sources.

use crate::api::collaborators::FlagSource;
use crate::api::flags::FlagError;
use crate::sync::mutex::Mutex;

/// Environment variable consulted on activation unless configured otherwise.
pub const DEFAULT_OPTIONS_VAR: &str = "HEAPGUARD_ACTIVATION_OPTIONS";

/// Reads overrides from an environment variable at the moment of activation.
#[derive(Debug, Clone)]
pub struct EnvFlagSource {
    var: String,
}

impl EnvFlagSource {
    /// Read overrides from `var`.
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// Variable name.
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvFlagSource {
    fn default() -> Self {
        Self::new(DEFAULT_OPTIONS_VAR)
    }
}

impl FlagSource for EnvFlagSource {
    fn activation_options(&self) -> Result<Option<String>, FlagError> {
        match std::env::var_os(&self.var) {
            None => Ok(None),
            Some(value) if value.is_empty() => Ok(None),
            Some(value) => value.into_string().map(Some).map_err(|_| FlagError::NotUnicode {
                source_name: format!("${}", self.var),
            }),
        }
    }
}

/// Overrides set programmatically.
#[derive(Debug, Default)]
pub struct FixedFlagSource {
    options: Mutex<Option<String>>,
}

impl FixedFlagSource {
    /// Source returning `options` until changed.
    pub fn new(options: Option<String>) -> Self {
        Self {
            options: Mutex::new(options),
        }
    }

    /// Replace the override string.
    pub fn set(&self, options: Option<&str>) {
        *self.options.lock() = options.map(str::to_string);
    }
}

impl FlagSource for FixedFlagSource {
    fn activation_options(&self) -> Result<Option<String>, FlagError> {
        Ok(self.options.lock().clone().filter(|value| !value.is_empty()))
    }
}

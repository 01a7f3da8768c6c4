//! Controller configuration.

use crate::api::flags::DEFAULT_MAX_INCLUDE_DEPTH;

/// Configuration for an [`ActivationController`](crate::ActivationController).
#[derive(Debug, Clone)]
pub struct ActivationConfig {
    /// Deactivate immediately on construction (default: false).
    pub start_deactivated: bool,

    /// Nesting limit for `include=` in activation options (default: 8).
    pub max_include_depth: usize,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            start_deactivated: false,
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }
}

impl ActivationConfig {
    /// Builder pattern: start with instrumentation off.
    pub fn with_start_deactivated(mut self, enable: bool) -> Self {
        self.start_deactivated = enable;
        self
    }

    /// Builder pattern: set the include nesting limit.
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }
}

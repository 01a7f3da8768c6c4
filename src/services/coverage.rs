//! Coverage settings cell.

use crate::api::collaborators::{CoverageConfig, CoverageControl};
use crate::sync::mutex::Mutex;

/// Coverage settings as last (re)initialized.
#[derive(Debug, Default)]
pub struct CoverageSettings {
    config: Mutex<CoverageConfig>,
}

impl CoverageSettings {
    /// Create settings holding `config`.
    pub fn new(config: CoverageConfig) -> Self {
        Self {
            config: Mutex::new(config),
        }
    }
}

impl CoverageControl for CoverageSettings {
    fn coverage(&self) -> CoverageConfig {
        self.config.lock().clone()
    }

    fn reinitialize(&self, config: &CoverageConfig) {
        log::trace!("coverage reinitialized: enabled={} dir={:?}", config.enabled, config.dir);
        *self.config.lock() = config.clone();
    }
}

//! Interfaces to the subsystems the controller reconfigures.
//!
//! The controller never allocates, poisons, or unwinds itself. It reads and
//! rewrites configuration through these traits. Implementations are shared
//! with allocating threads, so they must be `Send + Sync` and do their own
//! synchronization.

use crate::api::flags::FlagError;
use crate::api::options::AllocatorOptions;

/// Allocator policy, readable and re-initializable at runtime.
pub trait AllocatorControl: Send + Sync {
    /// Options currently in effect.
    fn options(&self) -> AllocatorOptions;

    /// Re-initialize the allocator with new options.
    fn reinitialize(&self, options: &AllocatorOptions);
}

/// Global heap poisoning switch.
pub trait PoisonControl: Send + Sync {
    /// Whether poisoning is currently permitted.
    fn can_poison(&self) -> bool;

    /// Permit or forbid poisoning.
    fn set_can_poison(&self, enabled: bool);
}

/// Code coverage settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageConfig {
    /// Whether coverage is recorded.
    pub enabled: bool,
    /// Output directory. Only meaningful when `enabled`.
    pub dir: String,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: ".".to_string(),
        }
    }
}

impl CoverageConfig {
    /// Coverage on, writing to `dir`.
    pub fn enabled(dir: impl Into<String>) -> Self {
        Self {
            enabled: true,
            dir: dir.into(),
        }
    }

    /// Coverage off with no output directory.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            dir: String::new(),
        }
    }
}

/// Code coverage instrumentation.
pub trait CoverageControl: Send + Sync {
    /// Settings currently in effect.
    fn coverage(&self) -> CoverageConfig;

    /// Re-initialize coverage with new settings.
    fn reinitialize(&self, config: &CoverageConfig);
}

/// Cached process identity used when reporting.
pub trait ProcessIdentity: Send + Sync {
    /// Re-read the process name and id.
    fn refresh(&self);

    /// Short label for report prefixes, such as `name:pid`.
    fn label(&self) -> String;
}

/// Line-oriented diagnostic output.
pub trait Reporter: Send + Sync {
    /// Write one line of output.
    fn report_line(&self, line: &str);
}

/// Where activation overrides come from.
pub trait FlagSource: Send + Sync {
    /// Raw `key=value` override string, if one is set.
    ///
    /// A value that is set but unusable (not valid UTF-8, for instance) is
    /// an error, not `None`.
    fn activation_options(&self) -> Result<Option<String>, FlagError>;
}

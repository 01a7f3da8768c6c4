//! Configuration captured at deactivation time.

use std::fmt;

use crate::api::collaborators::CoverageConfig;
use crate::api::options::AllocatorOptions;
use crate::sync::atomics::DEFAULT_TRACE_DEPTH;

/// Everything [`deactivate`](crate::ActivationController::deactivate) turns
/// off, as it was just before it did so.
///
/// Owned by the controller. On activation it seeds the override flags and
/// whatever comes back out is restored into the live subsystems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeactivatedSnapshot {
    /// Allocator policy to restore.
    pub allocator_options: AllocatorOptions,

    /// Frames captured per allocation-site record.
    pub trace_depth: u32,

    /// Whether heap poisoning was enabled.
    pub poison_heap: bool,

    /// Coverage instrumentation settings.
    pub coverage: CoverageConfig,
}

impl Default for DeactivatedSnapshot {
    fn default() -> Self {
        Self {
            allocator_options: AllocatorOptions::default(),
            trace_depth: DEFAULT_TRACE_DEPTH,
            poison_heap: true,
            coverage: CoverageConfig::default(),
        }
    }
}

impl fmt::Display for DeactivatedSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = &self.allocator_options;
        write!(
            f,
            "quarantine_size_mb {}, max_redzone {}, poison_heap {}, \
             malloc_context_size {}, alloc_dealloc_mismatch {}, \
             allocator_may_return_null {}, coverage {}, coverage_dir {}",
            options.quarantine_size_mb,
            options.max_redzone,
            u8::from(self.poison_heap),
            self.trace_depth,
            u8::from(options.alloc_dealloc_mismatch),
            u8::from(options.may_return_null),
            u8::from(self.coverage.enabled),
            self.coverage.dir,
        )
    }
}

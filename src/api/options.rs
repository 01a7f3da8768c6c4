//! Allocator policy options.

/// Redzone size used while the runtime is deactivated.
///
/// Smallest redzone that still fits the allocator's chunk header and keeps
/// user memory aligned.
pub const DISABLED_REDZONE: u32 = 16;

/// Policy knobs the allocator is (re)initialized with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatorOptions {
    /// Size of the deferred-free quarantine in megabytes (0 = no quarantine).
    pub quarantine_size_mb: u64,

    /// Minimum redzone around each allocation, in bytes.
    pub min_redzone: u32,

    /// Maximum redzone around each allocation, in bytes.
    pub max_redzone: u32,

    /// Report malloc/delete style alloc-dealloc mismatches.
    pub alloc_dealloc_mismatch: bool,

    /// Return null on allocation failure instead of aborting.
    pub may_return_null: bool,
}

impl Default for AllocatorOptions {
    fn default() -> Self {
        Self {
            quarantine_size_mb: 256,
            min_redzone: 16,
            max_redzone: 2048,
            alloc_dealloc_mismatch: true,
            may_return_null: false,
        }
    }
}

impl AllocatorOptions {
    /// Options applied while the runtime is deactivated.
    ///
    /// Everything not listed here is inherited from `self`: no quarantine,
    /// both redzone bounds at [`DISABLED_REDZONE`], no mismatch checking, and
    /// allocation failure returns null.
    pub fn disabled(&self) -> Self {
        let mut disabled = self.clone();
        disabled.quarantine_size_mb = 0;
        disabled.min_redzone = DISABLED_REDZONE;
        disabled.max_redzone = DISABLED_REDZONE;
        disabled.alloc_dealloc_mismatch = false;
        disabled.may_return_null = true;
        disabled
    }

    /// Builder pattern: set quarantine size.
    pub fn with_quarantine_size_mb(mut self, size: u64) -> Self {
        self.quarantine_size_mb = size;
        self
    }

    /// Builder pattern: set redzone bounds.
    pub fn with_redzone(mut self, min: u32, max: u32) -> Self {
        self.min_redzone = min;
        self.max_redzone = max;
        self
    }

    /// Builder pattern: enable alloc/dealloc mismatch checking.
    pub fn with_alloc_dealloc_mismatch(mut self, enable: bool) -> Self {
        self.alloc_dealloc_mismatch = enable;
        self
    }

    /// Builder pattern: return null on allocation failure.
    pub fn with_may_return_null(mut self, enable: bool) -> Self {
        self.may_return_null = enable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_ignores_source_values() {
        let strict = AllocatorOptions::default()
            .with_quarantine_size_mb(1024)
            .with_redzone(128, 4096)
            .with_alloc_dealloc_mismatch(true)
            .with_may_return_null(false);

        for source in [strict, AllocatorOptions::default()] {
            let disabled = source.disabled();
            assert_eq!(disabled.quarantine_size_mb, 0);
            assert_eq!(disabled.min_redzone, DISABLED_REDZONE);
            assert_eq!(disabled.max_redzone, DISABLED_REDZONE);
            assert!(!disabled.alloc_dealloc_mismatch);
            assert!(disabled.may_return_null);
        }
    }
}

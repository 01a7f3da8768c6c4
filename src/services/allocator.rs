//! Allocator policy cell.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::api::collaborators::AllocatorControl;
use crate::api::options::AllocatorOptions;
use crate::sync::mutex::Mutex;

/// Current allocator options plus a count of re-initializations.
///
/// The mutex is only taken on reconfiguration and on slow-path reads.
#[derive(Debug)]
pub struct AllocatorSettings {
    options: Mutex<AllocatorOptions>,
    generation: AtomicU64,
}

impl AllocatorSettings {
    /// Create settings holding `options`.
    pub fn new(options: AllocatorOptions) -> Self {
        Self {
            options: Mutex::new(options),
            generation: AtomicU64::new(0),
        }
    }

    /// Number of times the allocator has been re-initialized.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

impl Default for AllocatorSettings {
    fn default() -> Self {
        Self::new(AllocatorOptions::default())
    }
}

impl AllocatorControl for AllocatorSettings {
    fn options(&self) -> AllocatorOptions {
        self.options.lock().clone()
    }

    fn reinitialize(&self, options: &AllocatorOptions) {
        *self.options.lock() = options.clone();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        log::trace!("allocator reinitialized (generation {}): {:?}", generation, options);
    }
}

//! Global heap poisoning switch.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::api::collaborators::PoisonControl;

/// Whether allocation and free paths may poison memory.
///
/// Read on every poisoning decision, so it is a single atomic flag.
#[derive(Debug)]
pub struct PoisonSwitch(AtomicBool);

impl PoisonSwitch {
    /// Create a switch in the given state.
    pub const fn new(enabled: bool) -> Self {
        Self(AtomicBool::new(enabled))
    }
}

impl Default for PoisonSwitch {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PoisonControl for PoisonSwitch {
    #[inline]
    fn can_poison(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn set_can_poison(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Release);
    }
}

//! Atomic registers read on allocation fast paths.
//!
//! Both registers are written rarely (by the activation controller or a flag
//! override) and read constantly, so they are plain atomics with
//! release/acquire ordering rather than anything lock-based.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

/// Frames captured per allocation-site record when nothing else is configured.
pub const DEFAULT_TRACE_DEPTH: u32 = 30;

/// Number of stack frames to capture per tracked allocation event.
///
/// A store is published with `Release` and every load uses `Acquire`, so a
/// thread that observes a new depth also observes everything the writer did
/// before storing it. `0` is legal and means "no stack capture".
#[derive(Debug)]
pub struct TraceDepth(AtomicU32);

impl TraceDepth {
    /// Create a register holding `depth`.
    pub const fn new(depth: u32) -> Self {
        Self(AtomicU32::new(depth))
    }

    /// Store a new depth. No validation is performed.
    #[inline]
    pub fn set(&self, depth: u32) {
        self.0.store(depth, Ordering::Release);
    }

    /// Last stored depth.
    #[inline]
    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for TraceDepth {
    fn default() -> Self {
        Self::new(DEFAULT_TRACE_DEPTH)
    }
}

/// Diagnostic verbosity level. `0` is quiet.
#[derive(Debug, Default)]
pub struct Verbosity(AtomicU32);

impl Verbosity {
    /// Create a register holding `level`.
    pub const fn new(level: u32) -> Self {
        Self(AtomicU32::new(level))
    }

    /// Set the level.
    pub fn set(&self, level: u32) {
        self.0.store(level, Ordering::Release);
    }

    /// Current level.
    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }

    /// True when reports at `level` should be emitted.
    pub fn at_least(&self, level: u32) -> bool {
        self.get() >= level
    }
}

static GLOBAL_TRACE_DEPTH: OnceLock<Arc<TraceDepth>> = OnceLock::new();
static GLOBAL_VERBOSITY: OnceLock<Arc<Verbosity>> = OnceLock::new();

/// The process-wide trace-depth register consulted by stack capture.
pub fn trace_depth() -> &'static Arc<TraceDepth> {
    GLOBAL_TRACE_DEPTH.get_or_init(|| Arc::new(TraceDepth::default()))
}

/// The process-wide verbosity register.
pub fn verbosity() -> &'static Arc<Verbosity> {
    GLOBAL_VERBOSITY.get_or_init(|| Arc::new(Verbosity::default()))
}

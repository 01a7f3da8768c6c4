//! # heapguard
//!
//! Runtime activation control for heap memory-safety instrumentation.
//!
//! A long-running process pays for full heap checking only while it needs
//! it. [`ActivationController::deactivate`] stashes the live configuration
//! and drops the allocator to a minimal-checking mode; [`activate`]
//! restores it, optionally overridden from an environment variable read at
//! that moment. Nothing is recompiled or relinked.
//!
//! ## Features
//!
//! - Exact restore of allocator options, poisoning, trace depth and coverage
//! - Disabled mode: no quarantine, 16-byte redzones, no mismatch checks,
//!   null on allocation failure
//! - Lock-free trace-depth register for the allocation fast path
//! - `key=value` overrides with `include=` files and `help=1`
//! - Subsystems behind traits, with in-process implementations
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use heapguard::{ActivationConfig, ActivationController, Runtime};
//!
//! let mut controller = ActivationController::new(Runtime::in_process(), ActivationConfig::default());
//!
//! controller.deactivate();
//! // ... hot loop that is known to be safe ...
//!
//! // HEAPGUARD_ACTIVATION_OPTIONS="quarantine_size_mb=64 verbosity=1"
//! controller.activate();
//! ```
//!
//! [`activate`]: ActivationController::activate

pub mod api;
pub mod diagnostics;
pub mod services;
pub mod sync;

// Re-export public API at crate root for convenience
pub use api::collaborators::{
    AllocatorControl, CoverageConfig, CoverageControl, FlagSource, PoisonControl, ProcessIdentity,
    Reporter,
};
pub use api::config::ActivationConfig;
pub use api::controller::{ActivationController, DEACTIVATED_TRACE_DEPTH};
pub use api::flags::{ActivationFlags, FlagAction, FlagError, FlagParser, FlagSpec, ACTIVATION_FLAGS};
pub use api::options::{AllocatorOptions, DISABLED_REDZONE};
pub use api::runtime::Runtime;
pub use api::snapshot::DeactivatedSnapshot;

// Hot-path registers
pub use sync::atomics::{trace_depth, verbosity, TraceDepth, Verbosity, DEFAULT_TRACE_DEPTH};

// In-process collaborators
pub use services::{
    AllocatorSettings, CollectingReporter, CoverageSettings, EnvFlagSource, FixedFlagSource,
    LogReporter, PoisonSwitch, ProcessName, StderrReporter, DEFAULT_OPTIONS_VAR,
};

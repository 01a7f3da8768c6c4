//! In-process implementations of the controller's collaborators.
//!
//! These hold configuration only. An allocator that wants its policy driven
//! by [`ActivationController`](crate::ActivationController) can read from
//! them on its slow paths, or implement the traits directly instead.

pub mod allocator;
pub mod coverage;
pub mod identity;
pub mod poison;
pub mod report;
pub mod source;

pub use allocator::AllocatorSettings;
pub use coverage::CoverageSettings;
pub use identity::ProcessName;
pub use poison::PoisonSwitch;
pub use report::{CollectingReporter, LogReporter, StderrReporter};
pub use source::{EnvFlagSource, FixedFlagSource, DEFAULT_OPTIONS_VAR};

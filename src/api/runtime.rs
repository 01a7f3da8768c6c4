//! The set of subsystems a controller drives.

use std::sync::Arc;

use crate::api::collaborators::{
    AllocatorControl, CoverageControl, FlagSource, PoisonControl, ProcessIdentity, Reporter,
};
use crate::services::{
    AllocatorSettings, CoverageSettings, EnvFlagSource, PoisonSwitch, ProcessName, StderrReporter,
};
use crate::sync::atomics::{self, TraceDepth, Verbosity};

/// Handles to every subsystem touched by activation and deactivation.
///
/// Cloning shares the handles. A runtime is itself a [`Reporter`]: lines go
/// to the reporter set with [`with_reporter`](Self::with_reporter), or to
/// stderr prefixed with the current identity's label.
#[derive(Clone)]
pub struct Runtime {
    pub(crate) allocator: Arc<dyn AllocatorControl>,
    pub(crate) poisoning: Arc<dyn PoisonControl>,
    pub(crate) coverage: Arc<dyn CoverageControl>,
    pub(crate) identity: Arc<dyn ProcessIdentity>,
    pub(crate) reporter: Option<Arc<dyn Reporter>>,
    pub(crate) flag_source: Arc<dyn FlagSource>,
    pub(crate) trace_depth: Arc<TraceDepth>,
    pub(crate) verbosity: Arc<Verbosity>,
}

impl Runtime {
    /// Runtime over the given allocator, poisoning and coverage subsystems.
    ///
    /// The rest defaults to the process-wide trace-depth and verbosity
    /// registers, overrides from `HEAPGUARD_ACTIVATION_OPTIONS`, and reports
    /// on stderr.
    pub fn new(
        allocator: Arc<dyn AllocatorControl>,
        poisoning: Arc<dyn PoisonControl>,
        coverage: Arc<dyn CoverageControl>,
    ) -> Self {
        Self {
            allocator,
            poisoning,
            coverage,
            identity: Arc::new(ProcessName::new()),
            reporter: None,
            flag_source: Arc::new(EnvFlagSource::default()),
            trace_depth: Arc::clone(atomics::trace_depth()),
            verbosity: Arc::clone(atomics::verbosity()),
        }
    }

    /// Runtime backed entirely by the in-process services.
    pub fn in_process() -> Self {
        Self::new(
            Arc::new(AllocatorSettings::default()),
            Arc::new(PoisonSwitch::default()),
            Arc::new(CoverageSettings::default()),
        )
    }

    /// Builder pattern: set the process identity cache.
    pub fn with_identity(mut self, identity: Arc<dyn ProcessIdentity>) -> Self {
        self.identity = identity;
        self
    }

    /// Builder pattern: set the report sink.
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Builder pattern: set where activation overrides are read from.
    pub fn with_flag_source(mut self, source: Arc<dyn FlagSource>) -> Self {
        self.flag_source = source;
        self
    }

    /// Builder pattern: use a private trace-depth register.
    pub fn with_trace_depth(mut self, trace_depth: Arc<TraceDepth>) -> Self {
        self.trace_depth = trace_depth;
        self
    }

    /// Builder pattern: use a private verbosity register.
    pub fn with_verbosity(mut self, verbosity: Arc<Verbosity>) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// The process identity refreshed on activation.
    pub fn identity(&self) -> &Arc<dyn ProcessIdentity> {
        &self.identity
    }

    /// The trace-depth register this runtime drives.
    pub fn trace_depth(&self) -> &Arc<TraceDepth> {
        &self.trace_depth
    }

    /// The verbosity register this runtime reads.
    pub fn verbosity(&self) -> &Arc<Verbosity> {
        &self.verbosity
    }
}

impl Reporter for Runtime {
    fn report_line(&self, line: &str) {
        match &self.reporter {
            Some(reporter) => reporter.report_line(line),
            None => StderrReporter::write_line(self.identity.as_ref(), line),
        }
    }
}

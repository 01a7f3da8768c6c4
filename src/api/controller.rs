//! Activation state machine.

use crate::api::collaborators::{CoverageConfig, Reporter};
use crate::api::config::ActivationConfig;
use crate::api::flags::{ActivationFlags, FlagParser, ACTIVATION_FLAGS};
use crate::api::runtime::Runtime;
use crate::api::snapshot::DeactivatedSnapshot;
use crate::diagnostics::{self, HG001, HG002, HG901};

/// Trace depth kept while deactivated: enough to name the immediate caller.
pub const DEACTIVATED_TRACE_DEPTH: u32 = 1;

/// Switches heap instrumentation between full checking and near-native
/// allocator behavior without restarting the process.
///
/// The controller exclusively owns the configuration captured by
/// [`deactivate`](Self::deactivate) and restores it on
/// [`activate`](Self::activate). Both take `&mut self`: one control path
/// drives the state machine while other threads keep allocating, and the
/// collaborators synchronize their own reconfiguration.
///
/// # Example
///
/// ```rust,no_run
/// use heapguard::{ActivationConfig, ActivationController, Runtime};
///
/// let mut controller = ActivationController::new(Runtime::in_process(), ActivationConfig::default());
///
/// controller.deactivate();
/// // ... known-safe hot loop ...
/// controller.activate();
/// ```
pub struct ActivationController {
    runtime: Runtime,
    config: ActivationConfig,
    snapshot: DeactivatedSnapshot,
    is_deactivated: bool,
}

impl ActivationController {
    /// Create a controller for `runtime`, active unless
    /// `config.start_deactivated` is set.
    pub fn new(runtime: Runtime, config: ActivationConfig) -> Self {
        let start_deactivated = config.start_deactivated;
        let mut controller = Self {
            runtime,
            config,
            snapshot: DeactivatedSnapshot::default(),
            is_deactivated: false,
        };
        if start_deactivated {
            controller.deactivate();
        }
        controller
    }

    /// Whether the runtime is currently deactivated.
    pub fn is_deactivated(&self) -> bool {
        self.is_deactivated
    }

    /// The subsystems this controller drives.
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Stash the live configuration and switch to disabled mode.
    ///
    /// # Panics
    ///
    /// Panics if the runtime is already deactivated.
    #[track_caller]
    pub fn deactivate(&mut self) {
        if self.is_deactivated {
            diagnostics::fatal(&HG901, "deactivate() called while already deactivated");
        }
        log::debug!("deactivating heap instrumentation");

        let rt = &self.runtime;
        if rt.verbosity.at_least(1) {
            rt.report_line("Deactivating heap instrumentation");
        }
        self.snapshot = DeactivatedSnapshot {
            allocator_options: rt.allocator.options(),
            trace_depth: rt.trace_depth.get(),
            poison_heap: rt.poisoning.can_poison(),
            coverage: rt.coverage.coverage(),
        };

        rt.poisoning.set_can_poison(false);
        rt.trace_depth.set(DEACTIVATED_TRACE_DEPTH);
        rt.coverage.reinitialize(&CoverageConfig::disabled());
        rt.allocator
            .reinitialize(&self.snapshot.allocator_options.disabled());

        self.is_deactivated = true;
    }

    /// Restore the stashed configuration, overlaid with any overrides from
    /// the flag source. Does nothing if already active.
    pub fn activate(&mut self) {
        if !self.is_deactivated {
            return;
        }
        log::debug!("activating heap instrumentation");
        if self.runtime.verbosity.at_least(1) {
            self.runtime.report_line("Activating heap instrumentation");
        }

        self.runtime.identity.refresh();
        self.override_from_activation_flags();

        let rt = &self.runtime;
        let snapshot = &self.snapshot;
        rt.poisoning.set_can_poison(snapshot.poison_heap);
        rt.trace_depth.set(snapshot.trace_depth);
        rt.coverage.reinitialize(&snapshot.coverage);
        rt.allocator.reinitialize(&snapshot.allocator_options);

        self.is_deactivated = false;

        if rt.verbosity.at_least(1) {
            rt.report_line("Activated with flags:");
            rt.report_line(&snapshot.to_string());
        }
    }

    /// Overlay the flag source's overrides onto the snapshot.
    ///
    /// Overrides apply all-or-nothing: if the options cannot be read or
    /// parsed, a warning is reported and the snapshot is left as it was.
    fn override_from_activation_flags(&mut self) {
        let rt = &self.runtime;
        let mut flags = ActivationFlags::new(self.snapshot.clone(), rt.verbosity.get());
        let mut parser =
            FlagParser::new(ACTIVATION_FLAGS).with_max_include_depth(self.config.max_include_depth);

        let parsed = rt.flag_source.activation_options().and_then(|options| match options {
            Some(options) => parser.parse(&options, &mut flags),
            None => Ok(()),
        });
        if let Err(err) = parsed {
            let diag = if err.is_include() { &HG002 } else { &HG001 };
            diagnostics::report(rt, diag, &err.to_string());
            return;
        }

        rt.verbosity.set(flags.verbosity);
        if flags.verbosity > 0 {
            parser.report_unrecognized(rt);
        }
        if flags.help {
            parser.print_flag_descriptions(rt);
        }

        self.snapshot = flags.restore;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::api::collaborators::{
        AllocatorControl, CoverageControl, FlagSource, PoisonControl, ProcessIdentity,
    };
    use crate::api::flags::FlagError;
    use crate::api::options::{AllocatorOptions, DISABLED_REDZONE};
    use crate::services::{
        AllocatorSettings, CollectingReporter, CoverageSettings, FixedFlagSource, PoisonSwitch,
        StderrReporter,
    };
    use crate::sync::atomics::{TraceDepth, Verbosity};

    struct Fixture {
        allocator: Arc<AllocatorSettings>,
        poisoning: Arc<PoisonSwitch>,
        coverage: Arc<CoverageSettings>,
        reporter: Arc<CollectingReporter>,
        source: Arc<FixedFlagSource>,
        trace_depth: Arc<TraceDepth>,
        verbosity: Arc<Verbosity>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                allocator: Arc::new(AllocatorSettings::new(
                    AllocatorOptions::default()
                        .with_quarantine_size_mb(128)
                        .with_redzone(32, 1024),
                )),
                poisoning: Arc::new(PoisonSwitch::new(true)),
                coverage: Arc::new(CoverageSettings::new(CoverageConfig::enabled("/tmp/cov"))),
                reporter: Arc::new(CollectingReporter::new()),
                source: Arc::new(FixedFlagSource::default()),
                trace_depth: Arc::new(TraceDepth::new(20)),
                verbosity: Arc::new(Verbosity::new(0)),
            }
        }

        fn controller(&self, config: ActivationConfig) -> ActivationController {
            let runtime = Runtime::new(
                self.allocator.clone(),
                self.poisoning.clone(),
                self.coverage.clone(),
            )
            .with_reporter(self.reporter.clone())
            .with_flag_source(self.source.clone())
            .with_trace_depth(self.trace_depth.clone())
            .with_verbosity(self.verbosity.clone());
            ActivationController::new(runtime, config)
        }

        fn live(&self) -> DeactivatedSnapshot {
            DeactivatedSnapshot {
                allocator_options: self.allocator.options(),
                trace_depth: self.trace_depth.get(),
                poison_heap: self.poisoning.can_poison(),
                coverage: self.coverage.coverage(),
            }
        }
    }

    #[test]
    fn test_activate_when_active_is_noop() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller(ActivationConfig::default());
        fixture.source.set(Some("poison_heap=0 verbosity=1"));

        let before = fixture.live();
        controller.activate();

        assert!(!controller.is_deactivated());
        assert_eq!(fixture.live(), before);
        assert_eq!(fixture.allocator.generation(), 0);
        assert!(fixture.reporter.lines().is_empty());
    }

    #[test]
    fn test_deactivate_applies_disabled_mode() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller(ActivationConfig::default());

        controller.deactivate();
        assert!(controller.is_deactivated());

        let options = fixture.allocator.options();
        assert_eq!(options.quarantine_size_mb, 0);
        assert_eq!(options.min_redzone, DISABLED_REDZONE);
        assert_eq!(options.max_redzone, DISABLED_REDZONE);
        assert!(!options.alloc_dealloc_mismatch);
        assert!(options.may_return_null);

        assert!(!fixture.poisoning.can_poison());
        assert_eq!(fixture.trace_depth.get(), DEACTIVATED_TRACE_DEPTH);
        assert!(!fixture.coverage.coverage().enabled);
    }

    #[test]
    fn test_round_trip_restores_snapshot() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller(ActivationConfig::default());
        let before = fixture.live();

        controller.deactivate();
        controller.activate();

        assert!(!controller.is_deactivated());
        assert_eq!(fixture.live(), before);
        assert_eq!(fixture.trace_depth.get(), 20);
    }

    #[test]
    #[should_panic(expected = "HG901")]
    fn test_double_deactivate_panics() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller(ActivationConfig::default());
        controller.deactivate();
        controller.deactivate();
    }

    #[test]
    fn test_start_deactivated() {
        let fixture = Fixture::new();
        let before = fixture.live();
        let mut controller = fixture.controller(ActivationConfig::default().with_start_deactivated(true));

        assert!(controller.is_deactivated());
        assert_eq!(fixture.allocator.options().quarantine_size_mb, 0);

        controller.activate();
        assert_eq!(fixture.live(), before);
    }

    #[test]
    fn test_selective_override() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller(ActivationConfig::default());
        let before = fixture.live();

        controller.deactivate();
        fixture.source.set(Some("quarantine_size_mb=64 poison_heap=0"));
        controller.activate();

        let mut expected = before;
        expected.allocator_options.quarantine_size_mb = 64;
        expected.poison_heap = false;
        assert_eq!(fixture.live(), expected);
    }

    #[test]
    fn test_overrides_persist_into_next_cycle() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller(ActivationConfig::default());

        controller.deactivate();
        fixture.source.set(Some("malloc_context_size=4"));
        controller.activate();
        assert_eq!(fixture.trace_depth.get(), 4);

        fixture.source.set(None);
        controller.deactivate();
        controller.activate();
        assert_eq!(fixture.trace_depth.get(), 4);
    }

    #[test]
    fn test_verbose_activation_reports_flags() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller(ActivationConfig::default());

        controller.deactivate();
        fixture.source.set(Some("verbosity=1 bogus_key=1 max_redzone=512"));
        controller.activate();

        assert_eq!(fixture.verbosity.get(), 1);
        assert_eq!(fixture.allocator.options().max_redzone, 512);
        assert!(fixture.reporter.contains("found 1 unrecognized flag(s)"));
        assert!(fixture.reporter.contains("    bogus_key"));
        assert!(fixture.reporter.contains("Activated with flags:"));
        assert!(fixture.reporter.contains(
            "quarantine_size_mb 128, max_redzone 512, poison_heap 1, malloc_context_size 20"
        ));
    }

    #[test]
    fn test_quiet_activation_reports_nothing() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller(ActivationConfig::default());

        controller.deactivate();
        fixture.source.set(Some("bogus_key=1"));
        controller.activate();

        assert!(fixture.reporter.lines().is_empty());
    }

    #[test]
    fn test_help_lists_flags() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller(ActivationConfig::default());

        controller.deactivate();
        fixture.source.set(Some("help=1"));
        controller.activate();

        assert!(!controller.is_deactivated());
        assert!(fixture.reporter.contains("Available flags for heapguard activation:"));
        assert!(fixture.reporter.contains("\tmalloc_context_size"));

        // help is not sticky
        fixture.reporter.clear();
        fixture.source.set(None);
        controller.deactivate();
        controller.activate();
        assert!(fixture.reporter.lines().is_empty());
    }

    #[test]
    fn test_malformed_options_apply_nothing() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller(ActivationConfig::default());
        let before = fixture.live();

        controller.deactivate();
        fixture.source.set(Some("poison_heap=0 redzone=abc quarantine_size_mb=64"));
        controller.activate();

        assert!(!controller.is_deactivated());
        assert_eq!(fixture.live(), before);
        assert_eq!(fixture.verbosity.get(), 0);
    }

    #[test]
    fn test_malformed_options_report_warning() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller(ActivationConfig::default());

        controller.deactivate();
        fixture.source.set(Some("verbosity=1 redzone=abc"));
        controller.activate();

        let lines = fixture.reporter.lines();
        assert_eq!(lines[0], "[heapguard][HG001] warning: malformed activation options");
        assert_eq!(
            lines[1],
            "  context: invalid value 'abc' for flag 'redzone', expected an unsigned 32-bit integer"
        );
        // the verbosity override was discarded with the rest
        assert!(!fixture.reporter.contains("Activated with flags:"));
    }

    #[test]
    fn test_missing_include_reports_warning() {
        let fixture = Fixture::new();
        let mut controller = fixture.controller(ActivationConfig::default());
        let before = fixture.live();

        controller.deactivate();
        fixture
            .source
            .set(Some("quarantine_size_mb=1 include=/nonexistent/heapguard/options"));
        controller.activate();

        assert_eq!(fixture.live(), before);
        assert!(fixture.reporter.contains("[heapguard][HG002]"));
    }

    #[test]
    fn test_unreadable_source_reports_warning() {
        struct NotUnicodeSource;

        impl FlagSource for NotUnicodeSource {
            fn activation_options(&self) -> Result<Option<String>, FlagError> {
                Err(FlagError::NotUnicode {
                    source_name: "$HEAPGUARD_ACTIVATION_OPTIONS".to_string(),
                })
            }
        }

        let fixture = Fixture::new();
        let runtime = Runtime::new(
            fixture.allocator.clone(),
            fixture.poisoning.clone(),
            fixture.coverage.clone(),
        )
        .with_reporter(fixture.reporter.clone())
        .with_flag_source(Arc::new(NotUnicodeSource))
        .with_trace_depth(fixture.trace_depth.clone())
        .with_verbosity(fixture.verbosity.clone());
        let mut controller = ActivationController::new(runtime, ActivationConfig::default());
        let before = fixture.live();

        controller.deactivate();
        controller.activate();

        assert_eq!(fixture.live(), before);
        assert!(fixture.reporter.contains("[heapguard][HG001]"));
        assert!(fixture.reporter.contains("not valid UTF-8"));
    }

    #[test]
    fn test_verbose_lifecycle_lines() {
        let fixture = Fixture::new();
        fixture.verbosity.set(1);
        let mut controller = fixture.controller(ActivationConfig::default());

        controller.deactivate();
        assert_eq!(
            fixture.reporter.lines(),
            vec!["Deactivating heap instrumentation".to_string()]
        );

        controller.activate();
        let lines = fixture.reporter.lines();
        assert_eq!(lines[1], "Activating heap instrumentation");
        assert_eq!(lines[2], "Activated with flags:");
    }

    #[test]
    fn test_activation_refreshes_custom_identity() {
        struct CountingIdentity {
            refreshes: AtomicUsize,
        }

        impl ProcessIdentity for CountingIdentity {
            fn refresh(&self) {
                self.refreshes.fetch_add(1, Ordering::Relaxed);
            }

            fn label(&self) -> String {
                format!("app:{}", self.refreshes.load(Ordering::Relaxed))
            }
        }

        let fixture = Fixture::new();
        let identity = Arc::new(CountingIdentity {
            refreshes: AtomicUsize::new(0),
        });
        let runtime = Runtime::new(
            fixture.allocator.clone(),
            fixture.poisoning.clone(),
            fixture.coverage.clone(),
        )
        .with_identity(identity.clone())
        .with_trace_depth(fixture.trace_depth.clone())
        .with_verbosity(fixture.verbosity.clone())
        .with_flag_source(fixture.source.clone());
        let mut controller = ActivationController::new(runtime, ActivationConfig::default());

        controller.deactivate();
        controller.activate();
        assert_eq!(identity.refreshes.load(Ordering::Relaxed), 1);

        // the default reporter prefixes with the refreshed label
        assert_eq!(
            StderrReporter::format_line(controller.runtime().identity().as_ref(), "x"),
            "==app:1== x"
        );
    }
}

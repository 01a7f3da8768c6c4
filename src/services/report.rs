//! Report sinks.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use crate::api::collaborators::{ProcessIdentity, Reporter};
use crate::sync::mutex::Mutex;

/// Writes `==name:pid== line` to stderr.
///
/// The label is read from the identity on every line, so a refresh on
/// activation shows up in the next report.
#[derive(Clone)]
pub struct StderrReporter {
    identity: Arc<dyn ProcessIdentity>,
}

impl StderrReporter {
    /// Create a reporter prefixing lines with `identity`.
    pub fn new(identity: Arc<dyn ProcessIdentity>) -> Self {
        Self { identity }
    }

    /// The line as written to stderr.
    pub fn format_line(identity: &dyn ProcessIdentity, line: &str) -> String {
        format!("=={}== {}", identity.label(), line)
    }

    /// Write `line` to stderr with `identity`'s prefix.
    pub fn write_line(identity: &dyn ProcessIdentity, line: &str) {
        let _ = writeln!(std::io::stderr().lock(), "{}", Self::format_line(identity, line));
    }
}

impl fmt::Debug for StderrReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StderrReporter")
            .field("label", &self.identity.label())
            .finish()
    }
}

impl Reporter for StderrReporter {
    fn report_line(&self, line: &str) {
        Self::write_line(self.identity.as_ref(), line);
    }
}

/// Forwards report lines to the `log` crate at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report_line(&self, line: &str) {
        log::info!("{}", line);
    }
}

/// Keeps every reported line in memory.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    lines: Mutex<Vec<String>>,
}

impl CollectingReporter {
    /// Create an empty reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines reported so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Forget collected lines.
    pub fn clear(&self) {
        self.lines.lock().clear();
    }

    /// True if any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|line| line.contains(needle))
    }
}

impl Reporter for CollectingReporter {
    fn report_line(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}

//! Diagnostic emission backend.
//!
//! Diagnostics always go to the `log` crate. Warnings are also written to the
//! runtime's [`Reporter`], regardless of verbosity. Fatal errors are written
//! to stderr in debug builds, or with the `diagnostics` feature, and then
//! panic.

use super::kind::{Diagnostic, DiagnosticKind};
use crate::api::collaborators::Reporter;

/// Render a diagnostic as report lines.
pub fn render(diag: &Diagnostic, context: &str) -> Vec<String> {
    let mut lines = vec![
        format!("[heapguard][{}] {}: {}", diag.code, diag.kind.prefix(), diag.message),
        format!("  context: {}", context),
    ];

    if let Some(note) = diag.note {
        lines.push(format!("  note: {}", note));
    }

    if let Some(help) = diag.help {
        lines.push(format!("  help: {}", help));
    }

    lines
}

/// Emit a diagnostic through `reporter` and the log.
pub fn report(reporter: &dyn Reporter, diag: &Diagnostic, context: &str) {
    emit_to_log(diag, context);
    for line in render(diag, context) {
        reporter.report_line(&line);
    }
}

/// Emit an error diagnostic and panic.
///
/// Used for contract violations, which are never recoverable.
#[cold]
#[track_caller]
pub fn fatal(diag: &Diagnostic, context: &str) -> ! {
    emit_to_log(diag, context);

    #[cfg(any(debug_assertions, feature = "diagnostics"))]
    {
        emit_to_stderr(diag, context);
    }

    panic!("[heapguard][{}] {}: {}", diag.code, diag.message, context);
}

fn emit_to_log(diag: &Diagnostic, context: &str) {
    match diag.kind {
        DiagnosticKind::Error => log::error!("[{}] {}: {}", diag.code, diag.message, context),
        DiagnosticKind::Warning => log::warn!("[{}] {}: {}", diag.code, diag.message, context),
    }

    if let Some(note) = diag.note {
        log::debug!("  note: {}", note);
    }
    if let Some(help) = diag.help {
        log::debug!("  help: {}", help);
    }
}

#[cfg(any(debug_assertions, feature = "diagnostics"))]
fn emit_to_stderr(diag: &Diagnostic, context: &str) {
    use std::io::Write;

    let mut stderr = std::io::stderr().lock();
    for line in render(diag, context) {
        let _ = writeln!(stderr, "{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::kind::{HG001, HG901};
    use crate::services::CollectingReporter;

    #[test]
    fn test_report_to_reporter() {
        let reporter = CollectingReporter::new();
        report(&reporter, &HG001, "expected '=' after flag name 'x'");

        let lines = reporter.lines();
        assert_eq!(lines[0], "[heapguard][HG001] warning: malformed activation options");
        assert_eq!(lines[1], "  context: expected '=' after flag name 'x'");
        assert!(lines[2].starts_with("  note: "));
        assert!(lines[3].starts_with("  help: "));
    }

    #[test]
    #[should_panic(expected = "[heapguard][HG901]")]
    fn test_fatal_panics() {
        fatal(&HG901, "test");
    }
}

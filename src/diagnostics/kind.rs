//! Diagnostic kinds and predefined codes.

/// The severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A hard error - the runtime cannot continue.
    Error,
    /// A warning - input was ignored.
    Warning,
}

impl DiagnosticKind {
    /// Get the display prefix for this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            DiagnosticKind::Error => "error",
            DiagnosticKind::Warning => "warning",
        }
    }
}

/// A diagnostic message with code, message, and optional context.
///
/// Diagnostic codes follow the pattern:
/// - `HG0xx` - Activation flag issues
/// - `HG9xx` - Contract violations
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity level.
    pub kind: DiagnosticKind,
    /// Diagnostic code (e.g., "HG001").
    pub code: &'static str,
    /// Primary message.
    pub message: &'static str,
    /// Optional additional context.
    pub note: Option<&'static str>,
    /// Optional fix suggestion.
    pub help: Option<&'static str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub const fn error(code: &'static str, message: &'static str) -> Self {
        Self {
            kind: DiagnosticKind::Error,
            code,
            message,
            note: None,
            help: None,
        }
    }

    /// Create a new warning diagnostic.
    pub const fn warning(code: &'static str, message: &'static str) -> Self {
        Self {
            kind: DiagnosticKind::Warning,
            code,
            message,
            note: None,
            help: None,
        }
    }

    /// Add a note to this diagnostic.
    pub const fn with_note(mut self, note: &'static str) -> Self {
        self.note = Some(note);
        self
    }

    /// Add a help message to this diagnostic.
    pub const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

// =============================================================================
// Predefined diagnostics (HG0xx - Activation flags)
// =============================================================================

/// HG001: Activation options could not be parsed.
pub const HG001: Diagnostic = Diagnostic::warning(
    "HG001",
    "malformed activation options"
).with_note("no overrides were applied; the deactivated configuration was restored unchanged")
 .with_help("use space-separated key=value pairs in UTF-8; quote values containing separators");

/// HG002: An included options file could not be read.
pub const HG002: Diagnostic = Diagnostic::warning(
    "HG002",
    "failed to read included activation options"
).with_note("no overrides were applied; the deactivated configuration was restored unchanged")
 .with_help("use include_if_exists= for optional files");

// =============================================================================
// Predefined diagnostics (HG9xx - Contract violations)
// =============================================================================

/// HG901: Deactivation requested while already deactivated.
pub const HG901: Diagnostic = Diagnostic::error(
    "HG901",
    "runtime deactivated twice without an intervening activation"
).with_note("the deactivated snapshot would be overwritten with disabled-mode settings")
 .with_help("call activate() before deactivating again");

//! Activation flag table and parser.
//!
//! Overrides use the same `key=value` grammar as startup options: tokens are
//! separated by spaces, tabs, newlines, `,`, `:` or `;`, and a value may be
//! wrapped in single or double quotes to include separators.
//!
//! ```text
//! quarantine_size_mb=64 poison_heap=0 coverage_dir="/tmp/cov dir"
//! ```

use std::fmt;
use std::io;

use crate::api::collaborators::Reporter;
use crate::api::snapshot::DeactivatedSnapshot;

/// Default limit on nested `include=` files.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 8;

/// Mutable record the overrides are applied to.
///
/// Starts as a copy of the deactivated snapshot plus the current verbosity,
/// with `help` cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationFlags {
    /// Values restored on activation.
    pub restore: DeactivatedSnapshot,
    /// Diagnostic verbosity.
    pub verbosity: u32,
    /// Print the flag table.
    pub help: bool,
}

impl ActivationFlags {
    /// Flags defaulted from a snapshot.
    pub fn new(restore: DeactivatedSnapshot, verbosity: u32) -> Self {
        Self {
            restore,
            verbosity,
            help: false,
        }
    }
}

/// Errors produced while parsing activation options.
#[derive(Debug)]
pub enum FlagError {
    /// A token had no `=`.
    MissingValue {
        /// The offending token.
        token: String,
    },
    /// A quoted value was never closed.
    UnterminatedQuote {
        /// Flag whose value was being read.
        name: String,
    },
    /// A value did not parse for its flag's type.
    InvalidValue {
        /// Flag name.
        name: &'static str,
        /// The rejected value.
        value: String,
        /// What the flag accepts.
        expected: &'static str,
    },
    /// An included file could not be read.
    Include {
        /// Path from the `include` flag.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Includes nested deeper than the configured limit.
    IncludeTooDeep {
        /// Path that would have exceeded the limit.
        path: String,
        /// The limit.
        limit: usize,
    },
    /// The options source held a value that is not valid UTF-8.
    NotUnicode {
        /// Where the value came from.
        source_name: String,
    },
}

impl FlagError {
    /// True for failures reading an included file.
    pub fn is_include(&self) -> bool {
        matches!(self, FlagError::Include { .. } | FlagError::IncludeTooDeep { .. })
    }
}

impl fmt::Display for FlagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagError::MissingValue { token } => {
                write!(f, "expected '=' after flag name '{}'", token)
            }
            FlagError::UnterminatedQuote { name } => {
                write!(f, "unterminated quoted value for flag '{}'", name)
            }
            FlagError::InvalidValue { name, value, expected } => {
                write!(f, "invalid value '{}' for flag '{}', expected {}", value, name, expected)
            }
            FlagError::Include { path, source } => {
                write!(f, "failed to read included options '{}': {}", path, source)
            }
            FlagError::IncludeTooDeep { path, limit } => {
                write!(f, "include of '{}' exceeds nesting limit of {}", path, limit)
            }
            FlagError::NotUnicode { source_name } => {
                write!(f, "activation options in {} are not valid UTF-8", source_name)
            }
        }
    }
}

impl std::error::Error for FlagError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FlagError::Include { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Failure to parse a single value; the parser attaches name and value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueError {
    /// What the flag accepts.
    pub expected: &'static str,
}

/// Setter invoked with the raw value of a recognized flag.
pub type ApplyFn = fn(&mut ActivationFlags, &str) -> Result<(), ValueError>;

/// What a recognized flag does.
#[derive(Clone, Copy)]
pub enum FlagAction {
    /// Parse the value and store it.
    Set(ApplyFn),
    /// Parse the named file as more options.
    Include {
        /// Whether a missing file is an error.
        required: bool,
    },
}

/// One row of the flag table.
#[derive(Clone, Copy)]
pub struct FlagSpec {
    /// Key as written in the options string.
    pub name: &'static str,
    /// One-line description for `help=1`.
    pub description: &'static str,
    /// Handler.
    pub action: FlagAction,
}

impl fmt::Debug for FlagSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagSpec").field("name", &self.name).finish()
    }
}

fn parse_bool(value: &str) -> Result<bool, ValueError> {
    match value {
        "0" | "no" | "false" => Ok(false),
        "1" | "yes" | "true" => Ok(true),
        _ => Err(ValueError { expected: "a boolean (0/1, no/yes, false/true)" }),
    }
}

fn parse_u32(value: &str) -> Result<u32, ValueError> {
    value
        .parse()
        .map_err(|_| ValueError { expected: "an unsigned 32-bit integer" })
}

fn parse_u64(value: &str) -> Result<u64, ValueError> {
    value
        .parse()
        .map_err(|_| ValueError { expected: "an unsigned integer" })
}

/// Every flag recognized at activation time.
pub static ACTIVATION_FLAGS: &[FlagSpec] = &[
    FlagSpec {
        name: "quarantine_size_mb",
        description: "Size of the freed-memory quarantine in megabytes.",
        action: FlagAction::Set(|f, v| {
            f.restore.allocator_options.quarantine_size_mb = parse_u64(v)?;
            Ok(())
        }),
    },
    FlagSpec {
        name: "redzone",
        description: "Minimal size in bytes of the redzone around heap objects.",
        action: FlagAction::Set(|f, v| {
            f.restore.allocator_options.min_redzone = parse_u32(v)?;
            Ok(())
        }),
    },
    FlagSpec {
        name: "max_redzone",
        description: "Maximal size in bytes of the redzone around heap objects.",
        action: FlagAction::Set(|f, v| {
            f.restore.allocator_options.max_redzone = parse_u32(v)?;
            Ok(())
        }),
    },
    FlagSpec {
        name: "alloc_dealloc_mismatch",
        description: "Report mismatched allocation and deallocation routines.",
        action: FlagAction::Set(|f, v| {
            f.restore.allocator_options.alloc_dealloc_mismatch = parse_bool(v)?;
            Ok(())
        }),
    },
    FlagSpec {
        name: "allocator_may_return_null",
        description: "Return null instead of aborting when an allocation fails.",
        action: FlagAction::Set(|f, v| {
            f.restore.allocator_options.may_return_null = parse_bool(v)?;
            Ok(())
        }),
    },
    FlagSpec {
        name: "malloc_context_size",
        description: "Stack frames captured for each allocation and deallocation.",
        action: FlagAction::Set(|f, v| {
            f.restore.trace_depth = parse_u32(v)?;
            Ok(())
        }),
    },
    FlagSpec {
        name: "poison_heap",
        description: "Poison heap memory on allocation and deallocation.",
        action: FlagAction::Set(|f, v| {
            f.restore.poison_heap = parse_bool(v)?;
            Ok(())
        }),
    },
    FlagSpec {
        name: "coverage",
        description: "Record code coverage.",
        action: FlagAction::Set(|f, v| {
            f.restore.coverage.enabled = parse_bool(v)?;
            Ok(())
        }),
    },
    FlagSpec {
        name: "coverage_dir",
        description: "Directory coverage data is written to.",
        action: FlagAction::Set(|f, v| {
            f.restore.coverage.dir = v.to_string();
            Ok(())
        }),
    },
    FlagSpec {
        name: "verbosity",
        description: "Verbosity level (0 = quiet).",
        action: FlagAction::Set(|f, v| {
            f.verbosity = parse_u32(v)?;
            Ok(())
        }),
    },
    FlagSpec {
        name: "help",
        description: "Print the activation flag descriptions.",
        action: FlagAction::Set(|f, v| {
            f.help = parse_bool(v)?;
            Ok(())
        }),
    },
    FlagSpec {
        name: "include",
        description: "Read more options from the given file.",
        action: FlagAction::Include { required: true },
    },
    FlagSpec {
        name: "include_if_exists",
        description: "Read more options from the given file, if it exists.",
        action: FlagAction::Include { required: false },
    },
];

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | ',' | ':' | ';' | '\n' | '\t' | '\r')
}

/// Splits an options string into `(name, value)` pairs.
struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<(&'a str, &'a str), FlagError>;

    fn next(&mut self) -> Option<Self::Item> {
        let input = self.rest.trim_start_matches(is_separator);
        if input.is_empty() {
            self.rest = input;
            return None;
        }

        let name_end = input
            .find(|c: char| c == '=' || is_separator(c))
            .unwrap_or(input.len());
        let name = &input[..name_end];
        if !input[name_end..].starts_with('=') {
            self.rest = "";
            return Some(Err(FlagError::MissingValue {
                token: name.to_string(),
            }));
        }

        let after = &input[name_end + 1..];
        let (value, rest) = match after.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let body = &after[1..];
                match body.find(quote) {
                    Some(close) => (&body[..close], &body[close + 1..]),
                    None => {
                        self.rest = "";
                        return Some(Err(FlagError::UnterminatedQuote {
                            name: name.to_string(),
                        }));
                    }
                }
            }
            _ => {
                let end = after.find(is_separator).unwrap_or(after.len());
                (&after[..end], &after[end..])
            }
        };

        self.rest = rest;
        Some(Ok((name, value)))
    }
}

/// Applies options strings to [`ActivationFlags`] through a flag table.
///
/// Unknown keys are collected rather than rejected. Parsing stops at the
/// first malformed token; overrides applied before it stay in `flags`, so
/// callers that need all-or-nothing discard `flags` on error.
pub struct FlagParser<'t> {
    table: &'t [FlagSpec],
    unrecognized: Vec<String>,
    max_include_depth: usize,
}

impl<'t> FlagParser<'t> {
    /// Create a parser over `table`.
    pub fn new(table: &'t [FlagSpec]) -> Self {
        Self {
            table,
            unrecognized: Vec::new(),
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
        }
    }

    /// Builder pattern: set the include nesting limit.
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    /// Apply every recognized `key=value` pair in `input` to `flags`.
    pub fn parse(&mut self, input: &str, flags: &mut ActivationFlags) -> Result<(), FlagError> {
        self.parse_nested(input, flags, 0)
    }

    fn parse_nested(
        &mut self,
        input: &str,
        flags: &mut ActivationFlags,
        depth: usize,
    ) -> Result<(), FlagError> {
        for token in (Tokens { rest: input }) {
            let (name, value) = token?;

            let Some(spec) = self.table.iter().find(|spec| spec.name == name) else {
                self.unrecognized.push(name.to_string());
                continue;
            };

            match spec.action {
                FlagAction::Set(apply) => {
                    apply(flags, value).map_err(|err| FlagError::InvalidValue {
                        name: spec.name,
                        value: value.to_string(),
                        expected: err.expected,
                    })?;
                }
                FlagAction::Include { required } => {
                    self.include(value, required, flags, depth)?;
                }
            }
        }
        Ok(())
    }

    fn include(
        &mut self,
        path: &str,
        required: bool,
        flags: &mut ActivationFlags,
        depth: usize,
    ) -> Result<(), FlagError> {
        if depth >= self.max_include_depth {
            return Err(FlagError::IncludeTooDeep {
                path: path.to_string(),
                limit: self.max_include_depth,
            });
        }

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if !required && err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(FlagError::Include {
                    path: path.to_string(),
                    source,
                })
            }
        };

        log::debug!("reading activation options from {}", path);
        self.parse_nested(&contents, flags, depth + 1)
    }

    /// Keys seen so far that are not in the table.
    pub fn unrecognized(&self) -> &[String] {
        &self.unrecognized
    }

    /// Report the unrecognized keys, if any.
    pub fn report_unrecognized(&self, reporter: &dyn Reporter) {
        if self.unrecognized.is_empty() {
            return;
        }
        reporter.report_line(&format!(
            "WARNING: found {} unrecognized flag(s):",
            self.unrecognized.len()
        ));
        for name in &self.unrecognized {
            reporter.report_line(&format!("    {}", name));
        }
    }

    /// Report a description of every flag in the table.
    pub fn print_flag_descriptions(&self, reporter: &dyn Reporter) {
        reporter.report_line("Available flags for heapguard activation:");
        for spec in self.table {
            reporter.report_line(&format!("\t{}", spec.name));
            reporter.report_line(&format!("\t\t- {}", spec.description));
        }
    }
}

//! Runtime diagnostics.
//!
//! Coded, rustc-style messages for problems the activation layer notices.
//! Warnings are written through the runtime's [`Reporter`](crate::Reporter);
//! fatal errors go to stderr and panic.
//!
//! ## Diagnostic Codes
//!
//! | Code  | Meaning                             |
//! |-------|-------------------------------------|
//! | HG001 | Malformed activation options        |
//! | HG002 | Included options file unreadable    |
//! | HG901 | Deactivated twice (fatal)           |

pub mod emit;
pub mod kind;

pub use emit::{fatal, render, report};
pub use kind::{Diagnostic, DiagnosticKind};
pub use kind::{HG001, HG002, HG901};

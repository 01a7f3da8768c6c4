//! Public API module.

pub mod collaborators;
pub mod config;
pub mod controller;
pub mod flags;
pub mod options;
pub mod runtime;
pub mod snapshot;

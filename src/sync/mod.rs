//! Synchronization primitives.
//!
//! Lock-free registers for the hot path, and a thin mutex wrapper over std or
//! parking_lot for the configuration cells.

pub mod atomics;
pub(crate) mod mutex;

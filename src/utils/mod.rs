//! Utils Module - Helper Functions & Shared Utilities
//!
//! Constants shared across the crate and in-process telemetry.

pub mod constants;
pub mod telemetry;

pub use constants::*;
pub use telemetry::*;

//! Core Module - Scan Pipeline
//!
//! Validation, provider fan-out, report rendering and the popularity ledger,
//! wired together by the request handler.

pub mod aggregator;
pub mod formatter;
pub mod handler;
pub mod ledger;
pub mod validator;

pub use aggregator::*;
pub use handler::*;
pub use ledger::*;
pub use validator::*;

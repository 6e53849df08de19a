//! Structured logging facility for logbind
//!
//! This module provides:
//! - Single initialization point via `init(profile)`
//! - Structured operation macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! Scanner, binder and projector diagnostics are plain `tracing` events at
//! trace/debug level carrying the canonical fields from
//! `logbind_core_types::schema`.
//!
//! # Usage
//!
//! ```rust
//! use logbind_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};

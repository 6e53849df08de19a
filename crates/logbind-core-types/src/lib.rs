//! Core types shared across logbind facilities
//!
//! This crate provides the small foundational pieces used by both the error
//! and logging facilities of `logbind-core`:
//!
//! - **Schema constants**: canonical field keys and event names
//! - **Sensitive data**: `Sensitive<T>` marker for redacting secret config values

pub mod schema;
pub mod sensitive;

pub use sensitive::{display_value, Sensitive, REDACTED};

//! logbind Core - configuration binding and property projection engine
//!
//! This crate provides the reflection-style machinery behind a logging
//! framework's configuration loader and structured event output:
//! - Compiled capability tables (`TypeShape`) in place of runtime reflection
//! - Per-type descriptors memoized in a two-generation recency cache
//! - Cycle-safe discovery of configuration objects by capability
//! - String-to-typed-value binding through an ordered conversion chain
//! - Lazy, failure-tolerant projection of objects into named values
//!
//! Everything hangs off an explicitly constructed [`Engine`].

pub mod bind;
pub mod cache;
pub mod config;
pub mod describe;
pub mod engine;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod project;
pub mod registry;
pub mod scan;
pub mod split;

pub use logbind_core_types as core_types;

// Re-export commonly used types
pub use bind::ValueBinder;
pub use cache::RecencyCache;
pub use config::EngineConfig;
pub use describe::{DescriptorCache, TypeDescriptor};
pub use engine::Engine;
pub use errors::{LbError, LbErrorKind, LogBindError, Result};
pub use model::{Capabilities, ObjectRef, PropertySpec, Reflect, TypeShape, Value, ValueKind};
pub use project::{PropertyList, PropertyProjector, PropertyValue};
pub use registry::{ConverterRegistry, ObjectTransformer};
pub use scan::GraphScanner;

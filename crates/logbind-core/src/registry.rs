//! Pluggable converter registry
//!
//! Holds extra string converters keyed by kind name, type names that must be
//! projected as opaque strings, and an optional object transformer applied
//! before projection.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::model::Value;

/// Registered string converter; `Err` carries the failure cause
pub type ConvertFn = Arc<dyn Fn(&str) -> Result<Value, String> + Send + Sync>;

/// Substitutes an object before it is projected
pub trait ObjectTransformer: Send + Sync {
    /// Return `None` to keep the original value
    fn transform(&self, value: &Value) -> Option<Value>;
}

#[derive(Default)]
pub struct ConverterRegistry {
    converters: RwLock<HashMap<String, ConvertFn>>,
    opaque_types: RwLock<HashSet<String>>,
    generation: AtomicU64,
    transformer: RwLock<Option<Arc<dyn ObjectTransformer>>>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converter consulted before every built-in rule for `kind_name`
    pub fn register_converter<F>(&self, kind_name: impl Into<String>, converter: F)
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.converters
            .write()
            .insert(kind_name.into(), Arc::new(converter));
    }

    pub fn converter(&self, kind_name: &str) -> Option<ConvertFn> {
        self.converters.read().get(kind_name).cloned()
    }

    /// Project values of `type_name` through `render()` only
    ///
    /// Bumps the classification generation, so descriptors built earlier are
    /// rebuilt on their next lookup.
    pub fn register_opaque(&self, type_name: impl Into<String>) {
        self.opaque_types.write().insert(type_name.into());
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Changes whenever a registration affects type classification
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn is_opaque(&self, type_name: &str) -> bool {
        self.opaque_types.read().contains(type_name)
    }

    pub fn set_transformer(&self, transformer: Option<Arc<dyn ObjectTransformer>>) {
        *self.transformer.write() = transformer;
    }

    pub fn transformer(&self) -> Option<Arc<dyn ObjectTransformer>> {
        self.transformer.read().clone()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut converters: Vec<String> = self.converters.read().keys().cloned().collect();
        converters.sort();
        f.debug_struct("ConverterRegistry")
            .field("converters", &converters)
            .field("opaque_types", &self.opaque_types.read().len())
            .field("transformer", &self.transformer.read().is_some())
            .finish()
    }
}

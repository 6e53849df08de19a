//! Engine service
//!
//! One `Engine` owns the converter registry and the descriptor cache shared by
//! the scanner, binder and projector. Construct one per configuration context
//! and share it by reference or `Arc`.

use std::any::Any;
use std::sync::Arc;

use crate::bind::ValueBinder;
use crate::config::EngineConfig;
use crate::describe::{DescriptorCache, TypeDescriptor};
use crate::errors::Result;
use crate::model::{Capabilities, ObjectRef, Reflect, Value, ValueKind};
use crate::project::{PropertyList, PropertyProjector};
use crate::registry::{ConverterRegistry, ObjectTransformer};
use crate::scan::GraphScanner;

pub struct Engine {
    config: EngineConfig,
    registry: Arc<ConverterRegistry>,
    descriptors: Arc<DescriptorCache>,
    scanner: GraphScanner,
    binder: ValueBinder,
    projector: PropertyProjector,
}

impl Engine {
    /// Build an engine from validated configuration
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when `config` fails validation.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config))
    }

    fn assemble(config: EngineConfig) -> Self {
        let registry = Arc::new(ConverterRegistry::new());
        let descriptors = Arc::new(DescriptorCache::new(
            config.descriptor_cache_capacity,
            registry.clone(),
        ));

        tracing::debug!(
            op = "engine_new",
            descriptor_cache_capacity = config.descriptor_cache_capacity,
            "engine created"
        );

        Self {
            scanner: GraphScanner::new(descriptors.clone()),
            binder: ValueBinder::new(descriptors.clone(), config.list_syntax()),
            projector: PropertyProjector::new(descriptors.clone()),
            config,
            registry,
            descriptors,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ConverterRegistry> {
        &self.registry
    }

    // ---------- registry ----------

    /// Register a converter tried before the built-in rules for `kind_name`
    pub fn register_converter<F>(&self, kind_name: impl Into<String>, converter: F)
    where
        F: Fn(&str) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        self.registry.register_converter(kind_name, converter);
    }

    /// Classify a type name as opaque; cached descriptors are rebuilt on next use
    pub fn register_opaque(&self, type_name: impl Into<String>) {
        self.registry.register_opaque(type_name);
    }

    pub fn set_transformer(&self, transformer: Option<Arc<dyn ObjectTransformer>>) {
        self.registry.set_transformer(transformer);
    }

    // ---------- scanning ----------

    pub fn find_reachable<T: Any + Send + Sync>(
        &self,
        roots: &[Value],
        aggressive: bool,
    ) -> Vec<Arc<T>> {
        self.scanner.find_reachable::<T>(roots, aggressive)
    }

    pub fn find_reachable_with(
        &self,
        roots: &[Value],
        aggressive: bool,
        capability: Capabilities,
    ) -> Vec<ObjectRef> {
        self.scanner.find_reachable_with(roots, aggressive, capability)
    }

    // ---------- binding ----------

    /// # Errors
    ///
    /// See [`ValueBinder::bind`].
    pub fn bind(&self, target: &mut dyn Reflect, property: &str, raw: &str) -> Result<()> {
        self.binder.bind(target, property, raw)
    }

    /// # Errors
    ///
    /// See [`ValueBinder::bind_all`].
    pub fn bind_all(&self, target: &mut dyn Reflect, values: &[(&str, &str)]) -> Result<()> {
        self.binder.bind_all(target, values)
    }

    /// # Errors
    ///
    /// See [`ValueBinder::add_element`].
    pub fn add_element(&self, target: &dyn Reflect, property: &str, element: Value) -> Result<()> {
        self.binder.add_element(target, property, element)
    }

    /// # Errors
    ///
    /// Returns `MissingRequiredParameter` for the first required property
    /// without a value.
    pub fn validate_required(&self, target: &dyn Reflect) -> Result<()> {
        self.binder.validate_required(target)
    }

    /// Convert a raw string without assigning it
    ///
    /// # Errors
    ///
    /// Returns the conversion failure cause.
    pub fn convert(&self, kind: &ValueKind, raw: &str) -> std::result::Result<Value, String> {
        self.binder.convert(kind, raw)
    }

    pub fn format_value(&self, value: &Value) -> String {
        self.binder.format_value(value)
    }

    // ---------- projection ----------

    pub fn project(&self, value: &Value) -> PropertyList {
        self.projector.project(value)
    }

    pub fn lookup_path(&self, value: &Value, path: &[&str]) -> Option<Value> {
        self.projector.lookup_path(value, path)
    }

    pub fn describe(&self, obj: &dyn Reflect) -> Arc<TypeDescriptor> {
        self.descriptors.describe(obj)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::assemble(EngineConfig::default())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("descriptors", &self.descriptors)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LogBindError;
    use crate::model::{PropertySpec, TypeShape};
    use crate::{field_getter, field_setter};

    #[derive(Default)]
    struct Counter {
        name: String,
    }

    static COUNTER: TypeShape = TypeShape {
        name: "Counter",
        capabilities: Capabilities::LAYOUT_RENDERER,
        properties: &[PropertySpec::new("Name", ValueKind::String)
            .get(field_getter!(Counter, name))
            .set(field_setter!(Counter, name: String))],
    };

    impl Reflect for Counter {
        fn shape(&self) -> &'static TypeShape {
            &COUNTER
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = EngineConfig {
            descriptor_cache_capacity: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            Engine::new(config),
            Err(LogBindError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_register_opaque_invalidates_descriptors() {
        let engine = Engine::default();
        assert!(!engine.describe(&Counter::default()).is_opaque());

        engine.register_opaque("Counter");
        assert!(engine.describe(&Counter::default()).is_opaque());
    }

    #[test]
    fn test_opaque_registered_through_registry_handle_is_not_stale() {
        let engine = Engine::default();
        let value = Value::Object(Arc::new(Counter {
            name: "requests".to_string(),
        }));
        assert!(!engine.project(&value).is_opaque());

        engine.registry().register_opaque("Counter");
        assert!(engine.describe(&Counter::default()).is_opaque());
        assert!(engine.project(&value).is_opaque());
    }

    #[test]
    fn test_bind_then_project() {
        let engine = Engine::default();
        let mut counter = Counter::default();
        engine.bind(&mut counter, "name", "requests").unwrap();

        let value = Value::Object(Arc::new(counter));
        assert_eq!(
            engine.lookup_path(&value, &["Name"]),
            Some(Value::from("requests"))
        );
    }
}

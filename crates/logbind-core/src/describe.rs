//! Per-type descriptors
//!
//! A descriptor is built once per concrete type from its [`TypeShape`], then
//! published as an immutable `Arc<TypeDescriptor>` in a [`RecencyCache`].

use std::any::TypeId;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::cache::RecencyCache;
use crate::model::{
    type_key, AccessError, Capabilities, Getter, PropertySpec, Reflect, Setter, TypeShape, Value,
    ValueKind,
};
use crate::registry::ConverterRegistry;

/// Name of the synthetic leading property on exception types
pub const EXCEPTION_TYPE_PROPERTY: &str = "Type";

/// Default number of descriptors kept per generation
pub const DEFAULT_DESCRIPTOR_CAPACITY: usize = 10_000;

/// Metadata for one declared property
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    pub name: &'static str,
    pub kind: ValueKind,
    pub getter: Option<Getter>,
    pub setter: Option<Setter>,
    /// Readable, no index parameters, not excluded from configuration
    pub bindable: bool,
    pub required: bool,
    pub element_name: Option<&'static str>,
    pub default_parameter: bool,
    pub sensitive: bool,
    pub array: bool,
}

impl From<&PropertySpec> for PropertyDescriptor {
    fn from(spec: &PropertySpec) -> Self {
        Self {
            name: spec.name,
            kind: spec.kind,
            getter: spec.getter,
            setter: spec.setter,
            bindable: spec.is_readable() && !spec.is_ignored(),
            required: spec.is_required(),
            element_name: spec.element_name,
            default_parameter: spec.is_default_parameter(),
            sensitive: spec.is_sensitive(),
            array: spec.is_array(),
        }
    }
}

/// Coarse value kind; scalar values never need cycle checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindTag {
    Scalar,
    Object,
}

/// Compiled getter plus the data needed for fast name lookup
#[derive(Debug, Clone)]
pub struct FastAccessor {
    pub name: &'static str,
    pub name_hash: u64,
    pub tag: KindTag,
    pub getter: Getter,
}

impl FastAccessor {
    fn new(name: &'static str, kind: &ValueKind, getter: Getter) -> Self {
        Self {
            name,
            name_hash: name_hash(name),
            tag: if kind.is_scalar() {
                KindTag::Scalar
            } else {
                KindTag::Object
            },
            getter,
        }
    }
}

/// Hash used by accessor lookup; equal names always hash equal
pub fn name_hash(name: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    hasher.finish()
}

fn exception_type_name(obj: &dyn Reflect) -> Result<Value, AccessError> {
    Ok(Value::from(obj.type_name()))
}

/// Immutable per-type metadata
#[derive(Debug)]
pub struct TypeDescriptor {
    type_id: TypeId,
    type_name: &'static str,
    capabilities: Capabilities,
    properties: Vec<PropertyDescriptor>,
    accessors: Arc<[FastAccessor]>,
    opaque: bool,
    is_exception: bool,
    /// Lower-cased configuration name to index in `properties`
    config_lookup: HashMap<String, usize>,
}

impl TypeDescriptor {
    /// Build a descriptor from a shape
    ///
    /// Classification, first match wins:
    /// 1. opaque capabilities or a registry opaque entry: no properties
    /// 2. exception types: synthetic `Type` accessor, then declared properties
    /// 3. no readable properties: opaque
    /// 4. everything else: full property list
    pub fn build(type_id: TypeId, shape: &'static TypeShape, registry: &ConverterRegistry) -> Self {
        let capabilities = shape.capabilities;
        let mut descriptor = Self {
            type_id,
            type_name: shape.name,
            capabilities,
            properties: Vec::new(),
            accessors: Arc::from(Vec::new()),
            opaque: true,
            is_exception: false,
            config_lookup: HashMap::new(),
        };

        if capabilities.is_opaque() || registry.is_opaque(shape.name) {
            return descriptor;
        }

        let properties: Vec<PropertyDescriptor> =
            shape.properties.iter().map(PropertyDescriptor::from).collect();

        let mut accessors: Vec<FastAccessor> = shape
            .properties
            .iter()
            .filter(|p| p.is_readable())
            .filter_map(|p| p.getter.map(|g| FastAccessor::new(p.name, &p.kind, g)))
            .collect();

        let is_exception = capabilities.contains(Capabilities::EXCEPTION);
        if is_exception {
            accessors.insert(
                0,
                FastAccessor::new(
                    EXCEPTION_TYPE_PROPERTY,
                    &ValueKind::String,
                    exception_type_name,
                ),
            );
        } else if accessors.is_empty() {
            return descriptor;
        }

        let mut config_lookup = HashMap::new();
        for (index, property) in properties.iter().enumerate() {
            if !property.bindable {
                continue;
            }
            config_lookup.insert(property.name.to_lowercase(), index);
            if let Some(element) = property.element_name {
                config_lookup.insert(element.to_lowercase(), index);
            }
            if property.default_parameter {
                config_lookup.insert(String::new(), index);
            }
        }

        descriptor.properties = properties;
        descriptor.accessors = accessors.into();
        descriptor.opaque = false;
        descriptor.is_exception = is_exception;
        descriptor.config_lookup = config_lookup;
        descriptor
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn accessors(&self) -> &Arc<[FastAccessor]> {
        &self.accessors
    }

    /// Rendered as a single string, never traversed
    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    pub fn is_exception(&self) -> bool {
        self.is_exception
    }

    pub fn is_config_item(&self) -> bool {
        self.capabilities.is_config_item()
    }

    /// Case-insensitive lookup by name, array element alias, or `""` for the
    /// default parameter
    pub fn config_property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.config_lookup
            .get(&name.to_lowercase())
            .map(|&index| &self.properties[index])
    }

    /// Bindable properties in declaration order
    pub fn config_properties(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter().filter(|p| p.bindable)
    }
}

/// Memoizes descriptors by concrete type identity
///
/// Building the same descriptor twice under a race is harmless: both results
/// are equivalent and one of them wins the cache slot. Each entry records the
/// registry generation it was built under and is rebuilt once that changes.
pub struct DescriptorCache {
    cache: RecencyCache<TypeId, (u64, Arc<TypeDescriptor>)>,
    registry: Arc<ConverterRegistry>,
}

impl DescriptorCache {
    pub fn new(capacity: usize, registry: Arc<ConverterRegistry>) -> Self {
        Self {
            cache: RecencyCache::new(capacity),
            registry,
        }
    }

    /// Descriptor for the runtime type of `obj`
    pub fn describe(&self, obj: &dyn Reflect) -> Arc<TypeDescriptor> {
        let type_id = type_key(obj);
        let generation = self.registry.generation();
        if let Some((built_under, descriptor)) = self.cache.get(&type_id) {
            if built_under == generation {
                return descriptor;
            }
        }

        let descriptor = Arc::new(TypeDescriptor::build(type_id, obj.shape(), &self.registry));
        tracing::trace!(
            op = "describe",
            type_name = descriptor.type_name(),
            accessors = descriptor.accessors().len(),
            opaque = descriptor.is_opaque(),
            "built type descriptor"
        );
        self.cache.insert(type_id, (generation, descriptor.clone()));
        descriptor
    }

    /// Object values of configuration-item types, and every enumerable
    pub fn is_config_item(&self, value: &Value) -> bool {
        match value {
            Value::Object(obj) => obj.shape().capabilities.is_config_item(),
            Value::Seq(_) | Value::List(_) | Value::Set(_) => true,
            _ => false,
        }
    }

    pub fn registry(&self) -> &Arc<ConverterRegistry> {
        &self.registry
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Drop every descriptor; the next `describe` rebuilds from the registry
    pub fn clear(&self) {
        self.cache.clear();
    }
}

impl std::fmt::Debug for DescriptorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorCache")
            .field("cache", &self.cache)
            .finish()
    }
}

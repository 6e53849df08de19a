//! Property projector
//!
//! Turns an arbitrary runtime value into a sequence of named values for
//! structured event output. Projection never fails: unreadable properties are
//! dropped and reported through `tracing` at debug level.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use logbind_core_types::schema::EVENT_PROPERTY_OMITTED;

use crate::describe::{name_hash, DescriptorCache, FastAccessor, KindTag};
use crate::model::{ObjectRef, Value};

/// One projected property
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValue {
    pub name: Arc<str>,
    pub value: Value,
    pub tag: KindTag,
}

#[derive(Clone)]
enum Source {
    Empty,
    Entries(Arc<[(Arc<str>, Value)]>),
    Accessors {
        object: ObjectRef,
        accessors: Arc<[FastAccessor]>,
    },
}

/// Projected view of one value
///
/// Accessor-backed lists compute values lazily during iteration; each call to
/// [`iter`](Self::iter) starts over and re-reads the getters.
#[derive(Clone)]
pub struct PropertyList {
    source: Source,
    opaque: Option<ObjectRef>,
}

impl PropertyList {
    fn empty() -> Self {
        Self {
            source: Source::Empty,
            opaque: None,
        }
    }

    fn opaque(object: ObjectRef) -> Self {
        Self {
            source: Source::Empty,
            opaque: Some(object),
        }
    }

    fn entries(entries: Vec<(String, Value)>) -> Self {
        let entries: Vec<(Arc<str>, Value)> = entries
            .into_iter()
            .map(|(name, value)| (Arc::from(name), value))
            .collect();
        Self {
            source: Source::Entries(entries.into()),
            opaque: None,
        }
    }

    /// The object renders as a single string instead of properties
    pub fn is_opaque(&self) -> bool {
        self.opaque.is_some()
    }

    /// String form of an opaque object; `None` when rendering panicked
    pub fn render(&self) -> Option<String> {
        let obj = self.opaque.as_ref()?;
        guard_hook(obj.type_name(), "render", || obj.render())
    }

    /// Number of declared entries; readable values may be fewer
    pub fn declared_len(&self) -> usize {
        match &self.source {
            Source::Empty => 0,
            Source::Entries(entries) => entries.len(),
            Source::Accessors { accessors, .. } => accessors.len(),
        }
    }

    pub fn iter(&self) -> PropertyIter<'_> {
        PropertyIter {
            list: self,
            position: 0,
        }
    }

    /// Look up one property by exact name
    ///
    /// Accessor names are compared by precomputed hash before string equality.
    pub fn try_get_value(&self, name: &str) -> Option<Value> {
        match &self.source {
            Source::Empty => None,
            Source::Entries(entries) => entries
                .iter()
                .find(|(key, _)| key.as_ref() == name)
                .map(|(_, value)| value.clone()),
            Source::Accessors { object, accessors } => {
                let hash = name_hash(name);
                accessors
                    .iter()
                    .filter(|a| a.name_hash == hash && a.name == name)
                    .find_map(|a| read_accessor(object, a))
            }
        }
    }
}

impl std::fmt::Debug for PropertyList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyList")
            .field("declared_len", &self.declared_len())
            .field("opaque", &self.is_opaque())
            .finish()
    }
}

impl<'a> IntoIterator for &'a PropertyList {
    type Item = PropertyValue;
    type IntoIter = PropertyIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct PropertyIter<'a> {
    list: &'a PropertyList,
    position: usize,
}

impl Iterator for PropertyIter<'_> {
    type Item = PropertyValue;

    fn next(&mut self) -> Option<Self::Item> {
        match &self.list.source {
            Source::Empty => None,
            Source::Entries(entries) => {
                let (name, value) = entries.get(self.position)?;
                self.position += 1;
                Some(PropertyValue {
                    name: name.clone(),
                    tag: tag_of(value),
                    value: value.clone(),
                })
            }
            Source::Accessors { object, accessors } => loop {
                let accessor = accessors.get(self.position)?;
                self.position += 1;
                if let Some(value) = read_accessor(object, accessor) {
                    return Some(PropertyValue {
                        name: Arc::from(accessor.name),
                        value,
                        tag: accessor.tag,
                    });
                }
            },
        }
    }
}

fn tag_of(value: &Value) -> KindTag {
    match value {
        Value::Object(_) | Value::Seq(_) | Value::List(_) | Value::Set(_) | Value::Map(_) => {
            KindTag::Object
        }
        _ => KindTag::Scalar,
    }
}

/// Run one getter, turning errors and panics into an omitted property
fn read_accessor(object: &ObjectRef, accessor: &FastAccessor) -> Option<Value> {
    let outcome = catch_unwind(AssertUnwindSafe(|| (accessor.getter)(object.as_ref())));
    let reason = match outcome {
        Ok(Ok(value)) => return Some(value),
        Ok(Err(err)) => err.to_string(),
        Err(panic) => panic_message(panic.as_ref()),
    };

    tracing::debug!(
        op = "project",
        event = EVENT_PROPERTY_OMITTED,
        type_name = object.type_name(),
        property = accessor.name,
        error = %reason,
    );
    None
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = panic.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = panic.downcast_ref::<String>() {
        text.clone()
    } else {
        "panicked".to_string()
    }
}

/// Run a user hook, turning a panic into `None` and a debug event
fn guard_hook<T>(type_name: &str, hook: &'static str, f: impl FnOnce() -> T) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(out) => Some(out),
        Err(panic) => {
            tracing::debug!(
                op = "project",
                type_name = type_name,
                hook = hook,
                error = %panic_message(panic.as_ref()),
                "projection hook panicked"
            );
            None
        }
    }
}

/// Projects values through the shared descriptor cache
pub struct PropertyProjector {
    descriptors: Arc<DescriptorCache>,
}

impl PropertyProjector {
    pub fn new(descriptors: Arc<DescriptorCache>) -> Self {
        Self { descriptors }
    }

    /// Project `value` into named properties
    ///
    /// Checks run in order:
    /// 1. the registry transformer may substitute the value
    /// 2. string-keyed maps yield their entries
    /// 3. dynamic-member objects yield their materialized members
    /// 4. opaque types yield nothing; use [`PropertyList::render`]
    /// 5. everything else yields its accessors, read lazily
    ///
    /// A panic in any of these user hooks yields an empty list.
    pub fn project(&self, value: &Value) -> PropertyList {
        let transformed = match self.descriptors.registry().transformer() {
            Some(transformer) => {
                let type_name = value.as_object().map_or("value", |obj| obj.type_name());
                match guard_hook(type_name, "transform", || transformer.transform(value)) {
                    Some(out) => out,
                    None => return PropertyList::empty(),
                }
            }
            None => None,
        };
        let value = transformed.as_ref().unwrap_or(value);

        match value {
            Value::Map(entries) => PropertyList {
                source: Source::Entries(entries.clone()),
                opaque: None,
            },
            Value::Object(object) => self.project_object(object),
            _ => PropertyList::empty(),
        }
    }

    fn project_object(&self, object: &ObjectRef) -> PropertyList {
        let type_name = object.type_name();
        let Some(map) = guard_hook(type_name, "string_map", || object.string_map()) else {
            return PropertyList::empty();
        };
        if let Some(entries) = map {
            return PropertyList::entries(entries);
        }
        let Some(members) = guard_hook(type_name, "dynamic_members", || object.dynamic_members())
        else {
            return PropertyList::empty();
        };
        if let Some(members) = members {
            return PropertyList::entries(members);
        }

        let descriptor = self.descriptors.describe(object.as_ref());
        if descriptor.is_opaque() {
            return PropertyList::opaque(object.clone());
        }

        PropertyList {
            source: Source::Accessors {
                object: object.clone(),
                accessors: descriptor.accessors().clone(),
            },
            opaque: None,
        }
    }

    /// Follow `path` through nested properties
    ///
    /// Returns `None` as soon as a segment is missing or unreadable.
    pub fn lookup_path(&self, value: &Value, path: &[&str]) -> Option<Value> {
        let mut current = value.clone();
        for segment in path {
            current = self.project(&current).try_get_value(segment)?;
        }
        Some(current)
    }
}

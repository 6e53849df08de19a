//! Configuration graph scanner
//!
//! Walks nested configuration objects and enumerables from a set of roots and
//! collects every reachable object with a wanted capability.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use logbind_core_types::schema::EVENT_SCAN_NODE;

use crate::describe::DescriptorCache;
use crate::model::{Capabilities, ObjectRef, Value};
use crate::{log_op_end, log_op_start};

/// Per-scan visited set, keyed by reference identity
///
/// Marked values are retained until the walk ends, so a container built by a
/// getter cannot be freed and its address handed to a later sibling.
#[derive(Debug, Default)]
pub struct WalkState {
    visited: HashMap<usize, Value>,
}

impl WalkState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the value was already recorded or has no identity
    pub fn mark(&mut self, value: &Value) -> bool {
        let Some(identity) = value.identity() else {
            return false;
        };
        if self.visited.contains_key(&identity) {
            return false;
        }
        self.visited.insert(identity, value.clone());
        true
    }

    pub fn is_visited(&self, value: &Value) -> bool {
        value
            .identity()
            .is_some_and(|identity| self.visited.contains_key(&identity))
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}

/// Traverses configuration graphs using the shared descriptor cache
pub struct GraphScanner {
    descriptors: Arc<DescriptorCache>,
}

impl GraphScanner {
    pub fn new(descriptors: Arc<DescriptorCache>) -> Self {
        Self { descriptors }
    }

    /// Collect reachable objects of concrete type `T`
    ///
    /// Results are in pre-order discovery order with no duplicates. Without
    /// `aggressive`, the scan does not descend below a match.
    pub fn find_reachable<T: Any + Send + Sync>(
        &self,
        roots: &[Value],
        aggressive: bool,
    ) -> Vec<Arc<T>> {
        self.collect(roots, aggressive, &|obj: &ObjectRef| {
            obj.as_ref().as_any().is::<T>()
        })
        .into_iter()
        .filter_map(|obj| obj.into_any_arc().downcast::<T>().ok())
        .collect()
    }

    /// Collect reachable objects declaring every bit of `capability`
    pub fn find_reachable_with(
        &self,
        roots: &[Value],
        aggressive: bool,
        capability: Capabilities,
    ) -> Vec<ObjectRef> {
        self.collect(roots, aggressive, &|obj: &ObjectRef| {
            obj.shape().capabilities.contains(capability)
        })
    }

    fn collect(
        &self,
        roots: &[Value],
        aggressive: bool,
        matches: &dyn Fn(&ObjectRef) -> bool,
    ) -> Vec<ObjectRef> {
        let start = Instant::now();
        log_op_start!("find_reachable", root_count = roots.len(), aggressive = aggressive);

        let mut walk = Walk {
            descriptors: &self.descriptors,
            aggressive,
            matches,
            state: WalkState::new(),
            found: Vec::new(),
        };

        for root in roots {
            let Value::Object(obj) = root else {
                continue;
            };
            if !obj.shape().capabilities.is_config_item() {
                tracing::trace!(
                    op = "find_reachable",
                    type_name = obj.type_name(),
                    "skipping root that is not a configuration item"
                );
                continue;
            }
            walk.scan_object(obj, 0);
        }

        let found = walk.found;
        log_op_end!(
            "find_reachable",
            duration_ms = start.elapsed().as_millis() as u64,
            found_count = found.len()
        );
        found
    }
}

struct Walk<'a> {
    descriptors: &'a DescriptorCache,
    aggressive: bool,
    matches: &'a dyn Fn(&ObjectRef) -> bool,
    state: WalkState,
    found: Vec<ObjectRef>,
}

impl Walk<'_> {
    fn scan_object(&mut self, obj: &ObjectRef, depth: usize) {
        if !self.state.mark(&Value::Object(obj.clone())) {
            return;
        }

        tracing::trace!(
            op = "find_reachable",
            event = EVENT_SCAN_NODE,
            depth = depth,
            type_name = obj.type_name()
        );

        if (self.matches)(obj) {
            self.found.push(obj.clone());
            if !self.aggressive {
                return;
            }
        }

        let descriptor = self.descriptors.describe(obj.as_ref());
        if descriptor.is_opaque() {
            return;
        }

        for property in descriptor.config_properties() {
            if !property.kind.is_config_item_kind() {
                continue;
            }
            let Some(getter) = property.getter else {
                continue;
            };
            let value = match getter(obj.as_ref()) {
                Ok(value) => value,
                Err(err) => {
                    tracing::debug!(
                        op = "find_reachable",
                        type_name = descriptor.type_name(),
                        property = property.name,
                        error = %err,
                        "skipping unreadable property"
                    );
                    continue;
                }
            };
            self.scan_value(&value, depth + 1);
        }
    }

    fn scan_value(&mut self, value: &Value, depth: usize) {
        match value {
            Value::Object(obj) => self.scan_object(obj, depth),
            Value::Seq(_) | Value::List(_) | Value::Set(_) => self.scan_items(value, depth),
            _ => {}
        }
    }

    fn scan_items(&mut self, value: &Value, depth: usize) {
        if !self.state.mark(value) {
            return;
        }

        let Some(items) = value.snapshot_items() else {
            return;
        };
        let Some(first) = items.first() else {
            return;
        };
        if !first.is_null() && !self.descriptors.is_config_item(first) {
            return;
        }

        for item in &items {
            self.scan_value(item, depth);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PropertySpec, Reflect, TypeShape, ValueKind};
    use crate::registry::ConverterRegistry;

    struct Leaf;

    static LEAF: TypeShape = TypeShape {
        name: "Leaf",
        capabilities: Capabilities::LAYOUT,
        properties: &[],
    };

    impl Reflect for Leaf {
        fn shape(&self) -> &'static TypeShape {
            &LEAF
        }
    }

    struct Branch {
        children: Vec<Value>,
    }

    static BRANCH: TypeShape = TypeShape {
        name: "Branch",
        capabilities: Capabilities::TARGET,
        properties: &[PropertySpec::new("Children", ValueKind::List(&ValueKind::Any))
            .get(crate::getter!(Branch, |b| b.children.clone()))],
    };

    impl Reflect for Branch {
        fn shape(&self) -> &'static TypeShape {
            &BRANCH
        }
    }

    fn scanner() -> GraphScanner {
        GraphScanner::new(Arc::new(DescriptorCache::new(
            32,
            Arc::new(ConverterRegistry::new()),
        )))
    }

    #[test]
    fn test_finds_leaves_below_branch() {
        let leaf_a: ObjectRef = Arc::new(Leaf);
        let leaf_b: ObjectRef = Arc::new(Leaf);
        let branch: ObjectRef = Arc::new(Branch {
            children: vec![Value::Object(leaf_a), Value::Null, Value::Object(leaf_b)],
        });

        let found = scanner().find_reachable::<Leaf>(&[Value::Object(branch)], false);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_non_aggressive_stops_at_match() {
        let inner: ObjectRef = Arc::new(Branch {
            children: vec![Value::Object(Arc::new(Leaf))],
        });
        let outer: ObjectRef = Arc::new(Branch {
            children: vec![Value::Object(inner)],
        });
        let roots = [Value::Object(outer)];

        let scanner = scanner();
        assert_eq!(scanner.find_reachable::<Branch>(&roots, false).len(), 1);
        assert_eq!(scanner.find_reachable::<Branch>(&roots, true).len(), 2);
    }

    #[test]
    fn test_null_and_scalar_roots_are_skipped() {
        let found = scanner().find_reachable::<Leaf>(&[Value::Null, Value::from("x")], true);
        assert!(found.is_empty());
    }

    #[test]
    fn test_list_with_scalar_first_element_is_not_walked() {
        let branch: ObjectRef = Arc::new(Branch {
            children: vec![Value::from("text"), Value::Object(Arc::new(Leaf))],
        });
        let found = scanner().find_reachable::<Leaf>(&[Value::Object(branch)], true);
        assert!(found.is_empty());
    }

    #[test]
    fn test_walk_state_marks_once() {
        let mut state = WalkState::new();
        let leaf = Value::Object(Arc::new(Leaf));
        assert!(state.mark(&leaf));
        assert!(!state.mark(&leaf.clone()));
        assert!(state.is_visited(&leaf));
        assert!(!state.mark(&Value::from("scalar")));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_getter_built_children_of_siblings_are_all_found() {
        let groups: Vec<Value> = (0..8)
            .map(|_| {
                let group: ObjectRef = Arc::new(Branch {
                    children: vec![Value::Object(Arc::new(Leaf))],
                });
                Value::Object(group)
            })
            .collect();
        let root: ObjectRef = Arc::new(Branch { children: groups });

        let found = scanner().find_reachable::<Leaf>(&[Value::Object(root)], false);
        assert_eq!(found.len(), 8);
    }
}

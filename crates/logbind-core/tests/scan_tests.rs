#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use common::*;
use logbind_core::core_types::schema::EVENT_SCAN_NODE;
use logbind_core::logging_facility::init_test_capture;
use logbind_core::model::object_id;
use logbind_core::{Capabilities, ObjectRef, Value};

fn file(name: &str) -> ObjectRef {
    let mut target = FileTarget::new();
    target.name = name.to_string();
    object(target)
}

#[test]
fn test_cycle_terminates_and_visits_each_node_once() {
    let a = ChainFilter::new("a");
    let b = ChainFilter::new("b");
    let c = ChainFilter::new("c");
    a.link(b.clone());
    b.link(c.clone());
    c.link(a.clone());

    let engine = new_engine();
    let roots = [Value::Object(a.clone())];
    let found = engine.find_reachable::<ChainFilter>(&roots, true);

    let names: Vec<&str> = found.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn test_self_reference_is_found_once() {
    let node = ChainFilter::new("self");
    node.link(node.clone());

    let engine = new_engine();
    let found = engine.find_reachable::<ChainFilter>(&[Value::Object(node.clone())], true);
    assert_eq!(found.len(), 1);

    // Break the cycle so the test does not leak
    *node.next.write() = None;
}

#[test]
fn test_list_containing_itself_terminates() {
    let group = Arc::new(SplitGroupTarget::new(vec![file("inside")]));
    let own_list = Value::List(group.targets.clone());
    group.targets.lock().push(own_list);

    let engine = new_engine();
    let found = engine.find_reachable::<FileTarget>(&[Value::Object(group.clone())], false);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "inside");

    group.targets.lock().clear();
}

#[test]
fn test_list_holding_its_owner_terminates() {
    let group = Arc::new(SplitGroupTarget::new(vec![file("member")]));
    let owner: ObjectRef = group.clone();
    group.targets.lock().push(Value::Object(owner));

    let engine = new_engine();
    let roots = [Value::Object(group.clone())];
    let groups = engine.find_reachable::<SplitGroupTarget>(&roots, true);
    assert_eq!(groups.len(), 1);
    let files = engine.find_reachable::<FileTarget>(&roots, false);
    assert_eq!(files.len(), 1);

    group.targets.lock().clear();
}

#[test]
fn test_getter_built_lists_on_siblings_are_all_scanned() {
    let pools: Vec<ObjectRef> = (0..8)
        .map(|i| {
            object(TargetPool {
                members: vec![file(&format!("pooled-{}", i))],
            })
        })
        .collect();
    let root = object(TargetPool { members: pools });

    let engine = new_engine();
    let found = engine.find_reachable::<FileTarget>(&[Value::Object(root)], false);
    let names: Vec<&str> = found.iter().map(|t| t.name.as_str()).collect();
    let expected: Vec<String> = (0..8).map(|i| format!("pooled-{}", i)).collect();
    assert_eq!(names, expected);
}

#[test]
fn test_shared_child_is_reported_once() {
    let shared = file("shared");
    let group = object(SplitGroupTarget::new(vec![shared.clone(), shared.clone()]));

    let engine = new_engine();
    let found = engine.find_reachable::<FileTarget>(&[Value::Object(group)], false);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "shared");
}

#[test]
fn test_value_equal_objects_are_distinct_nodes() {
    let group = object(SplitGroupTarget::new(vec![file("same"), file("same")]));

    let engine = new_engine();
    let found = engine.find_reachable::<FileTarget>(&[Value::Object(group)], false);
    assert_eq!(found.len(), 2);
}

#[test]
fn test_discovery_is_pre_order() {
    let inner = object(SplitGroupTarget::new(vec![file("deep")]));
    let wrapper = object(AsyncWrapper {
        wrapped: Some(file("wrapped")),
    });
    let root = object(SplitGroupTarget::new(vec![file("first"), inner, wrapper]));

    let engine = new_engine();
    let found = engine.find_reachable::<FileTarget>(&[Value::Object(root)], false);
    let names: Vec<&str> = found.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["first", "deep", "wrapped"]);
}

#[test]
fn test_aggressive_scan_descends_into_matches() {
    let inner = object(SplitGroupTarget::new(vec![file("leaf")]));
    let root = object(AsyncWrapper {
        wrapped: Some(inner),
    });
    let roots = [Value::Object(root)];

    let engine = new_engine();
    let shallow = engine.find_reachable_with(&roots, false, Capabilities::TARGET);
    assert_eq!(shallow.len(), 1);

    let deep = engine.find_reachable_with(&roots, true, Capabilities::TARGET);
    assert_eq!(deep.len(), 3);
    let ids: std::collections::HashSet<usize> = deep.iter().map(object_id).collect();
    assert_eq!(ids.len(), 3);
}

#[test]
fn test_roots_that_are_not_config_items_are_skipped() {
    let customer = object(Customer {
        name: "ana".to_string(),
    });
    let engine = new_engine();
    let found = engine.find_reachable_with(
        &[Value::Null, Value::Object(customer)],
        true,
        Capabilities::NONE,
    );
    assert!(found.is_empty());
}

#[test]
fn test_empty_and_mutated_lists() {
    let group = Arc::new(SplitGroupTarget::new(Vec::new()));
    let engine = new_engine();
    let roots = [Value::Object(group.clone())];
    assert!(engine.find_reachable::<FileTarget>(&roots, false).is_empty());

    group.targets.lock().push(Value::Object(file("late")));
    assert_eq!(engine.find_reachable::<FileTarget>(&roots, false).len(), 1);
}

#[test]
fn test_scan_emits_node_events() {
    let capture = init_test_capture();
    let root = ChainFilter::new("traced-root-unique");

    let engine = new_engine();
    engine.find_reachable::<ChainFilter>(&[Value::Object(root)], true);

    let count = capture.count_events(|e| {
        e.event.as_deref() == Some(EVENT_SCAN_NODE)
            && e.field("type_name") == Some("ChainFilter")
    });
    assert!(count >= 1);
    capture.assert_event_exists("find_reachable", "end");
}

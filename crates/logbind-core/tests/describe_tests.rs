#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;
use std::thread;

use common::*;
use logbind_core::describe::{DescriptorCache, KindTag, EXCEPTION_TYPE_PROPERTY};
use logbind_core::{ConverterRegistry, Value};

#[test]
fn test_descriptor_lists_bindable_properties_in_order() {
    let engine = new_engine();
    let descriptor = engine.describe(&FileTarget::new());

    let names: Vec<&str> = descriptor.config_properties().map(|p| p.name).collect();
    assert_eq!(names[0], "Name");
    assert_eq!(names[1], "FileName");
    assert!(descriptor.is_config_item());
    assert!(!descriptor.is_opaque());
}

#[test]
fn test_config_lookup_accepts_aliases() {
    let engine = new_engine();
    let target = FileTarget::new();
    let descriptor = engine.describe(&target);
    assert_eq!(descriptor.config_property("keepfileopen").unwrap().name, "KeepFileOpen");
    assert_eq!(descriptor.config_property("").unwrap().name, "Layout");

    let group = SplitGroupTarget::new(Vec::new());
    let descriptor = engine.describe(&group);
    assert_eq!(descriptor.config_property("target").unwrap().name, "Targets");
}

#[test]
fn test_exception_gets_leading_type_accessor() {
    let engine = new_engine();
    let descriptor = engine.describe(&AppException {
        message: "boom".to_string(),
        source: "tests".to_string(),
    });

    let names: Vec<&str> = descriptor.accessors().iter().map(|a| a.name).collect();
    assert_eq!(names, vec![EXCEPTION_TYPE_PROPERTY, "Message", "Source"]);
    assert!(descriptor.is_exception());
}

#[test]
fn test_formattable_type_is_opaque() {
    let engine = new_engine();
    let descriptor = engine.describe(&WallClock { hour: 9, minute: 5 });
    assert!(descriptor.is_opaque());
    assert!(descriptor.accessors().is_empty());
}

#[test]
fn test_type_without_properties_is_opaque() {
    let engine = new_engine();
    let descriptor = engine.describe(&PropertyBag {
        entries: Vec::new(),
    });
    assert!(descriptor.is_opaque());
}

#[test]
fn test_accessor_tags_separate_scalars_from_objects() {
    let engine = new_engine();
    let descriptor = engine.describe(&AsyncWrapper { wrapped: None });
    assert_eq!(descriptor.accessors()[0].tag, KindTag::Object);

    let descriptor = engine.describe(&Customer {
        name: "ana".to_string(),
    });
    assert_eq!(descriptor.accessors()[0].tag, KindTag::Scalar);
}

#[test]
fn test_is_config_item_value_classification() {
    let cache = DescriptorCache::new(8, Arc::new(ConverterRegistry::new()));
    assert!(cache.is_config_item(&Value::Object(object(FileTarget::new()))));
    assert!(cache.is_config_item(&Value::list(Vec::new())));
    assert!(!cache.is_config_item(&Value::from("text")));
    assert!(!cache.is_config_item(&Value::Object(object(Customer {
        name: String::new()
    }))));
}

#[test]
fn test_concurrent_describe_yields_equivalent_descriptors() {
    let cache = Arc::new(DescriptorCache::new(8, Arc::new(ConverterRegistry::new())));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            thread::spawn(move || {
                let descriptor = cache.describe(&FileTarget::new());
                descriptor
                    .accessors()
                    .iter()
                    .map(|a| a.name)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let results: Vec<Vec<&str>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for result in &results[1..] {
        assert_eq!(result, &results[0]);
    }
    assert_eq!(cache.len(), 1);
}

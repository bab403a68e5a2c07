//! Integration tests for the descriptor Node tree
//!
//! Tests attribute accessors, typed parsing, and identifier segments.

use proptest::prelude::*;
use rowmap_foundation::{ErrorKind, Node};

fn cache() -> Node {
    Node::new("cache")
        .with_attr("size", "512")
        .with_attr("flushInterval", "60000")
        .with_attr("readOnly", "True")
        .with_attr("blocking", "")
        .with_child(Node::new("property").with_attr("name", "a").with_attr("value", "1"))
        .with_child(Node::new("property").with_attr("name", "b"))
}

// =============================================================================
// Attributes
// =============================================================================

#[test]
fn typed_attributes() {
    let node = cache();
    assert_eq!(node.attr_i32("size").unwrap(), Some(512));
    assert_eq!(node.attr_i64("flushInterval").unwrap(), Some(60_000));
    assert_eq!(node.attr_bool("readOnly").unwrap(), Some(true));
    assert_eq!(node.attr_bool("blocking").unwrap(), None);
    assert!(!node.attr_bool_or("blocking", false).unwrap());
    assert_eq!(node.attr_i32("missing").unwrap(), None);
}

#[test]
fn invalid_typed_attribute_names_element_and_attribute() {
    let node = Node::new("cache").with_attr("size", "big");
    let err = node.attr_i32("size").unwrap_err();
    match err.kind {
        ErrorKind::InvalidAttribute { element, attribute, value, .. } => {
            assert_eq!(element, "cache");
            assert_eq!(attribute, "size");
            assert_eq!(value, "big");
        }
        other => panic!("unexpected error kind: {other:?}"),
    }
}

#[test]
fn empty_attributes_are_absent_for_lookups() {
    let node = Node::new("resultMap").with_attr("type", "").with_attr("ofType", "Blog");
    assert_eq!(node.attr("type"), Some(""));
    assert_eq!(node.non_empty_attr("type"), None);
    assert_eq!(node.first_attr(&["type", "ofType"]), Some("Blog"));
    assert!(node.has_attr("type"));
}

#[test]
fn children_as_properties_keeps_order() {
    let properties = cache().children_as_properties().unwrap();
    let keys: Vec<_> = properties.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["a", "b"]);
    assert_eq!(properties["b"], "");
}

// =============================================================================
// Identifier Segments
// =============================================================================

#[test]
fn identifier_segment_prefers_id_value_property() {
    let with_id = Node::new("resultMap").with_attr("id", "blog.result").with_attr("property", "x");
    assert_eq!(with_id.identifier_segment(3), "resultMap[blog%2Eresult]");

    let case = Node::new("case").with_attr("value", "1");
    assert_eq!(case.identifier_segment(0), "case[1]");

    let discriminator = Node::new("discriminator").with_attr("column", "kind");
    assert_eq!(discriminator.identifier_segment(2), "discriminator@2");
}

#[test]
fn dots_and_underscores_stay_distinct() {
    let dotted = Node::new("case").with_attr("value", "1.5");
    let underscored = Node::new("case").with_attr("value", "1_5");
    assert_eq!(dotted.identifier_segment(0), "case[1%2E5]");
    assert_eq!(underscored.identifier_segment(1), "case[1_5]");

    let bracketed = Node::new("case").with_attr("value", "a]_case[b");
    assert_eq!(bracketed.identifier_segment(0), "case[a%5D_case%5Bb]");
}

proptest! {
    #[test]
    fn identifier_segments_never_contain_dots(value in "[a-z.]{1,12}", index in 0usize..64) {
        let node = Node::new("association").with_attr("property", value);
        let segment = node.identifier_segment(index);
        prop_assert!(!segment.contains('.'));
        prop_assert!(segment.starts_with("association["));
    }
}

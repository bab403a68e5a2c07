//! Integration tests for Error types
//!
//! Tests error construction, display, and resource/activity context.

use rowmap_foundation::{Dependency, Error, ErrorContext, ErrorKind};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_missing_attribute() {
    let err = Error::missing_attribute("sql", "id");
    assert!(matches!(err.kind, ErrorKind::MissingAttribute { .. }));
    let msg = format!("{err}");
    assert!(msg.contains("<sql>"));
    assert!(msg.contains("'id'"));
}

#[test]
fn error_ambiguous_collection() {
    let err = Error::ambiguous_collection("comments");
    let msg = format!("{err}");
    assert!(msg.contains("comments"));
    assert!(msg.contains("javaType"));
}

#[test]
fn error_duplicate() {
    let err = Error::duplicate("result shape", "blog.blogResult");
    assert!(format!("{err}").contains("blog.blogResult"));
    assert!(err.is_structural());
}

#[test]
fn error_unresolved_lists_items() {
    let err = Error::unresolved(vec![
        ("result shape blog.A".to_string(), Dependency::ResultShape("blog.B".to_string())),
        ("statement blog.find".to_string(), Dependency::Fragment("blog.cols".to_string())),
    ]);
    assert!(!err.is_structural());
    let msg = format!("{err}");
    assert!(msg.starts_with("2 unresolved item(s)"));
    assert!(msg.contains("result shape 'blog.B'"));
    assert!(msg.contains("fragment 'blog.cols'"));
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn error_display_with_resource_and_activity() {
    let err = Error::empty_namespace().in_resource("blog.xml", Some("processing cache"));
    let msg = format!("{err}");
    assert!(msg.contains("in resource 'blog.xml'"));
    assert!(msg.contains("while processing cache"));
}

#[test]
fn in_resource_keeps_the_first_resource() {
    let err = Error::empty_namespace()
        .in_resource("inner.xml", Some("inner"))
        .in_resource("outer.xml", Some("outer"));
    let context = err.context.unwrap();
    assert_eq!(context.resource.as_deref(), Some("inner.xml"));
    assert_eq!(context.activity.as_deref(), Some("inner"));
}

#[test]
fn activity_frames_read_inside_out() {
    let err = Error::ambiguous_collection("posts")
        .in_activity("association[author]")
        .in_activity("resultMap[blogResult]");
    let context = err.context.clone().unwrap();
    assert_eq!(context.stack, vec!["association[author]", "resultMap[blogResult]"]);

    let msg = format!("{err}");
    let inner = msg.find("association[author]").unwrap();
    let outer = msg.find("resultMap[blogResult]").unwrap();
    assert!(inner < outer);
}

#[test]
fn explicit_context() {
    let context = ErrorContext::new()
        .with_resource("a.xml")
        .with_activity("processing statements")
        .with_frame("select[find]");
    let err = Error::new(ErrorKind::Internal("boom".to_string())).with_context(context);
    let msg = format!("{err}");
    assert!(msg.contains("internal error: boom"));
    assert!(msg.contains("select[find]"));
}

//! Integration tests for the result and parameter shape builders
//!
//! Builders are pure: they return what they built and never touch a registry.

use std::sync::Arc;

use rowmap_compiler::{BuildContext, CompilerConfig, NamespaceScope, ParameterShapeBuilder, ResultShapeBuilder};
use rowmap_foundation::{
    ErrorKind, JdbcType, Node, ParameterMode, Result, TypeCatalog, TypeInfo, TypeName, TypeResolver,
};
use rowmap_registry::{FieldFlags, ParameterShape, ResultShape};

fn catalog() -> TypeCatalog {
    TypeCatalog::new()
        .with_type(
            TypeInfo::new("Blog")
                .with_property("id", "Integer")
                .with_property("title", "String")
                .with_property("author", "Author")
                .with_property("posts", "List"),
        )
        .with_type(
            TypeInfo::new("Author")
                .with_property("id", "Integer")
                .with_property("name", "String"),
        )
        .with_type(TypeInfo::new("Vehicle").with_property("kind", "Integer"))
}

fn build_shapes(node: &Node, config: &CompilerConfig) -> Result<Vec<ResultShape>> {
    let catalog = catalog();
    let scope = NamespaceScope::new("blog.mapper")?;
    let types = TypeResolver::new(Arc::new(catalog.clone()));
    let cx = BuildContext::new(&scope, &types, &catalog, config);
    ResultShapeBuilder::new(cx).build_top_level("mapper", 0, node)
}

fn build_parameters(node: &Node) -> Result<ParameterShape> {
    let catalog = catalog();
    let config = CompilerConfig::default();
    let scope = NamespaceScope::new("blog.mapper")?;
    let types = TypeResolver::new(Arc::new(catalog.clone()));
    ParameterShapeBuilder::new(BuildContext::new(&scope, &types, &catalog, &config)).build(node)
}

fn field(element: &str, property: &str, column: &str) -> Node {
    Node::new(element)
        .with_attr("property", property)
        .with_attr("column", column)
}

// =============================================================================
// Result Shapes
// =============================================================================

#[test]
fn nested_shapes_come_before_their_owner() {
    let node = Node::new("resultMap")
        .with_attr("id", "blogResult")
        .with_attr("type", "Blog")
        .with_child(field("id", "id", "blog_id"))
        .with_child(
            Node::new("association")
                .with_attr("property", "author")
                .with_child(field("id", "id", "author_id"))
                .with_child(field("result", "name", "author_name")),
        );

    let shapes = build_shapes(&node, &CompilerConfig::default()).unwrap();
    let ids: Vec<_> = shapes.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["blog.mapper.mapper_resultMap[blogResult]_association[author]", "blog.mapper.blogResult"]
    );

    let author = &shapes[0];
    assert_eq!(author.type_name, Some(TypeName::new("Author")));
    assert_eq!(author.fields[1].java_type, Some(TypeName::new("String")));

    let blog = &shapes[1];
    assert_eq!(blog.fields[0].flags, FieldFlags::ID);
    assert_eq!(blog.fields[1].nested_shape.as_deref(), Some(author.id.as_str()));
}

#[test]
fn discriminator_cases_get_the_preceding_fields() {
    let node = Node::new("resultMap")
        .with_attr("id", "vehicleResult")
        .with_attr("type", "Vehicle")
        .with_child(field("id", "kind", "kind"))
        .with_child(
            Node::new("discriminator")
                .with_attr("column", "kind")
                .with_attr("javaType", "int")
                .with_child(
                    Node::new("case")
                        .with_attr("value", "1")
                        .with_child(field("result", "doors", "door_count")),
                )
                .with_child(
                    Node::new("case")
                        .with_attr("value", "2")
                        .with_attr("resultMap", "truckResult"),
                ),
        );

    let shapes = build_shapes(&node, &CompilerConfig::default()).unwrap();
    let vehicle = shapes.last().unwrap();
    let discriminator = vehicle.discriminator.as_ref().unwrap();
    assert_eq!(discriminator.java_type, Some(TypeName::new("Integer")));

    let car_id = "blog.mapper.mapper_resultMap[vehicleResult]_discriminator@1_case[1]";
    assert_eq!(discriminator.case("1"), Some(car_id));
    assert_eq!(discriminator.case("2"), Some("blog.mapper.truckResult"));

    let car = shapes.iter().find(|s| s.id == car_id).unwrap();
    let properties: Vec<_> = car.fields.iter().filter_map(|f| f.property.as_deref()).collect();
    assert_eq!(properties, vec!["kind", "doors"]);
    assert_eq!(car.type_name, Some(TypeName::new("Vehicle")));
}

#[test]
fn ambiguous_collection_reports_the_enclosing_shape() {
    let node = Node::new("resultMap")
        .with_attr("id", "authorResult")
        .with_attr("type", "Author")
        .with_child(Node::new("collection").with_attr("property", "posts"));

    let err = build_shapes(&node, &CompilerConfig::default()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::AmbiguousCollection { ref property } if property == "posts"));
    assert_eq!(err.context.unwrap().stack, vec!["resultMap[authorResult]"]);
}

#[test]
fn foreign_dotted_ids_are_rejected() {
    let node = Node::new("resultMap").with_attr("id", "other.blogResult");
    let err = build_shapes(&node, &CompilerConfig::default()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DottedIdentifier(_)));

    let own = Node::new("resultMap").with_attr("id", "blog.mapper.blogResult");
    assert_eq!(build_shapes(&own, &CompilerConfig::default()).unwrap()[0].id, "blog.mapper.blogResult");
}

#[test]
fn nested_selects_honor_the_lazy_default() {
    let node = Node::new("resultMap")
        .with_attr("id", "blogResult")
        .with_attr("type", "Blog")
        .with_child(
            Node::new("collection")
                .with_attr("property", "posts")
                .with_attr("column", "{blogId=id, title=title}")
                .with_attr("select", "selectPosts"),
        );

    let lazy = build_shapes(&node, &CompilerConfig::new().with_lazy_loading(true)).unwrap();
    let posts = &lazy[0].fields[0];
    assert!(posts.lazy);
    assert_eq!(posts.nested_select.as_deref(), Some("blog.mapper.selectPosts"));
    assert_eq!(posts.nested_shape, None);
    assert_eq!(posts.column, None);
    assert_eq!(posts.composites.len(), 2);

    let eager = build_shapes(&node, &CompilerConfig::default()).unwrap();
    assert!(!eager[0].fields[0].lazy);
}

// =============================================================================
// Parameter Shapes
// =============================================================================

#[test]
fn parameter_shape_reads_modes_and_types() {
    let node = Node::new("parameterMap")
        .with_attr("id", "blogParams")
        .with_attr("type", "Blog")
        .with_child(Node::new("parameter").with_attr("property", "title").with_attr("jdbcType", "VARCHAR"))
        .with_child(
            Node::new("parameter")
                .with_attr("property", "rows")
                .with_attr("mode", "OUT")
                .with_attr("jdbcType", "CURSOR"),
        );

    let shape = build_parameters(&node).unwrap();
    assert_eq!(shape.id, "blog.mapper.blogParams");
    assert_eq!(shape.mappings[0].java_type, Some(TypeName::new("String")));
    assert_eq!(shape.mappings[0].jdbc_type, Some(JdbcType::Varchar));
    assert_eq!(shape.mappings[1].mode, ParameterMode::Out);
    assert_eq!(shape.mappings[1].java_type, Some(TypeName::new(TypeName::RESULT_SET)));
}

#[test]
fn parameter_without_property_is_structural() {
    let node = Node::new("parameterMap")
        .with_attr("id", "blogParams")
        .with_attr("type", "Blog")
        .with_child(Node::new("parameter"));

    let err = build_parameters(&node).unwrap_err();
    assert!(err.is_structural());
    assert!(matches!(err.kind, ErrorKind::MissingAttribute { .. }));
}

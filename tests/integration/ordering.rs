//! Order independence of multi-document sessions
//!
//! Any compile order of a closed set of documents settles to the same registry.

use proptest::prelude::*;
use rowmap_compiler::{CompileSession, CompilerConfig};
use rowmap_foundation::{Node, TypeCatalog, TypeInfo};
use rowmap_registry::RegistrySnapshot;

fn catalog() -> TypeCatalog {
    TypeCatalog::new().with_type(
        TypeInfo::new("Blog")
            .with_property("id", "Integer")
            .with_property("title", "String"),
    )
}

fn documents() -> Vec<(String, Node)> {
    let blog = Node::new("mapper")
        .with_attr("namespace", "blog")
        .with_child(Node::new("cache"))
        .with_child(
            Node::new("resultMap")
                .with_attr("id", "blogResult")
                .with_attr("type", "Blog")
                .with_attr("extends", "base.row"),
        )
        .with_child(
            Node::new("select")
                .with_attr("id", "selectBlog")
                .with_attr("resultMap", "blogResult")
                .with_child(Node::new("include").with_attr("refid", "base.cols")),
        );
    let base = Node::new("mapper")
        .with_attr("namespace", "base")
        .with_child(
            Node::new("resultMap")
                .with_attr("id", "row")
                .with_attr("type", "Blog")
                .with_child(Node::new("id").with_attr("property", "id").with_attr("column", "id")),
        )
        .with_child(Node::new("sql").with_attr("id", "cols"));
    let author = Node::new("mapper")
        .with_attr("namespace", "author")
        .with_child(Node::new("cache-ref").with_attr("namespace", "blog"))
        .with_child(
            Node::new("select")
                .with_attr("id", "selectAuthor")
                .with_attr("resultMap", "blog.blogResult"),
        );
    let post = Node::new("mapper")
        .with_attr("namespace", "post")
        .with_child(
            Node::new("resultMap")
                .with_attr("id", "postResult")
                .with_attr("extends", "blog.blogResult")
                .with_child(
                    Node::new("result")
                        .with_attr("property", "title")
                        .with_attr("column", "post_title"),
                ),
        );

    vec![
        ("blog.xml".to_string(), blog),
        ("base.xml".to_string(), base),
        ("author.xml".to_string(), author),
        ("post.xml".to_string(), post),
    ]
}

fn compile_in(order: &[usize]) -> RegistrySnapshot {
    let documents = documents();
    let session = CompileSession::new(CompilerConfig::default()).with_catalog(catalog());
    for &index in order {
        let (resource, doc) = &documents[index];
        session.compile(doc, resource).unwrap();
    }
    session.ensure_resolved().unwrap();
    session.registry().snapshot().unwrap()
}

proptest! {
    #[test]
    fn compile_order_does_not_change_the_result(
        order in Just(vec![0usize, 1, 2, 3]).prop_shuffle()
    ) {
        prop_assert_eq!(compile_in(&order), compile_in(&[1, 0, 2, 3]));
    }

    #[test]
    fn recompiling_a_loaded_resource_changes_nothing(
        order in Just(vec![0usize, 1, 2, 3]).prop_shuffle(),
        repeat in 0usize..4
    ) {
        let documents = documents();
        let session = CompileSession::new(CompilerConfig::default()).with_catalog(catalog());
        for &index in &order {
            let (resource, doc) = &documents[index];
            session.compile(doc, resource).unwrap();
        }
        session.settle().unwrap();
        let settled = session.registry().snapshot().unwrap();

        let (resource, doc) = &documents[order[repeat]];
        session.compile(doc, resource).unwrap();
        prop_assert_eq!(session.registry().snapshot().unwrap(), settled);
    }
}

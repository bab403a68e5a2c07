//! Whole-session behavior
//!
//! Multi-document sessions, concurrent compilation, interface binding, and
//! the end-of-session report.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use rowmap_compiler::{
    CompileSession, CompilerConfig, KnownInterfaces, PendingKind, StatementBuilder,
    StatementRequest, StatementUnit,
};
use rowmap_foundation::{Dependency, ErrorKind, Node, Resolution, Result};
use rowmap_registry::Registry;

fn mapper(namespace: &str) -> Node {
    Node::new("mapper").with_attr("namespace", namespace)
}

/// A document whose shape extends and whose statement uses the next namespace.
fn linked_document(index: usize, count: usize) -> Node {
    let namespace = format!("ns{index}");
    let mut shape = Node::new("resultMap").with_attr("id", "row").with_child(
        Node::new("result")
            .with_attr("property", format!("p{index}"))
            .with_attr("column", format!("c{index}")),
    );
    let mut select = Node::new("select").with_attr("id", "find");
    if index + 1 < count {
        let next = format!("ns{}", index + 1);
        shape = shape.with_attr("extends", format!("{next}.row"));
        select = select.with_child(Node::new("include").with_attr("refid", format!("{next}.cols")));
    }
    mapper(&namespace)
        .with_child(shape)
        .with_child(Node::new("sql").with_attr("id", "cols"))
        .with_child(select.with_attr("resultMap", "row"))
}

// =============================================================================
// Multi-Document Sessions
// =============================================================================

#[test]
fn reverse_chain_across_documents_resolves() {
    let count = 5;
    let session = CompileSession::default();
    for index in 0..count {
        session
            .compile(&linked_document(index, count), &format!("ns{index}.xml"))
            .unwrap();
    }
    session.ensure_resolved().unwrap();

    let head = session.registry().result_shape("ns0.row").unwrap().unwrap();
    let columns: Vec<_> = head.fields.iter().filter_map(|f| f.column.as_deref()).collect();
    assert_eq!(columns, vec!["c4", "c3", "c2", "c1", "c0"]);
}

#[test]
fn ensure_resolved_lists_what_never_arrived() {
    let session = CompileSession::default();
    let doc = mapper("blog").with_child(
        Node::new("select")
            .with_attr("id", "find")
            .with_attr("resultMap", "missing.row"),
    );
    session.compile(&doc, "blog.xml").unwrap();

    let residuals = session.residuals().unwrap();
    assert_eq!(residuals[0].kind, PendingKind::Statement);

    let err = session.ensure_resolved().unwrap_err();
    assert!(!err.is_structural());
    let ErrorKind::Unresolved(items) = err.kind else {
        panic!("expected an unresolved error");
    };
    assert_eq!(
        items,
        vec![(
            "statement blog.find".to_string(),
            Dependency::ResultShape("missing.row".to_string())
        )]
    );
}

#[test]
fn sessions_can_share_a_registry() {
    let registry = Arc::new(Registry::new());
    let first = CompileSession::default().with_registry(Arc::clone(&registry));
    let second = CompileSession::default().with_registry(Arc::clone(&registry));

    first
        .compile(&mapper("blog").with_child(Node::new("resultMap").with_attr("id", "row")), "blog.xml")
        .unwrap();
    second
        .compile(&mapper("blog").with_child(Node::new("resultMap").with_attr("id", "row")), "blog.xml")
        .unwrap();

    assert_eq!(registry.result_shape_ids().unwrap(), vec!["blog.row".to_string()]);
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn concurrent_compiles_share_one_session() {
    let count = 8;
    let session = CompileSession::default();
    thread::scope(|scope| {
        for index in 0..count {
            let session = &session;
            scope.spawn(move || {
                session
                    .compile(&linked_document(index, count), &format!("ns{index}.xml"))
                    .unwrap();
            });
        }
    });
    session.ensure_resolved().unwrap();

    let registry = session.registry();
    for index in 0..count {
        assert!(registry.has_statement(&format!("ns{index}.find")).unwrap());
        assert!(registry.has_fragment(&format!("ns{index}.cols")).unwrap());
    }
    let head = registry.result_shape("ns0.row").unwrap().unwrap();
    assert_eq!(head.fields.len(), count);
}

#[test]
fn concurrent_compiles_of_one_resource_parse_it_once() {
    let session = CompileSession::default();
    let doc = mapper("blog").with_child(Node::new("cache"));
    let outcomes: Vec<bool> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| session.compile(&doc, "blog.xml").is_ok()))
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert!(outcomes.iter().all(|ok| *ok));
    assert!(session.registry().has_cache("blog").unwrap());
    assert!(session.registry().is_resource_loaded("blog.xml").unwrap());
}

/// Holds the first statement it parses until the test lets it go.
struct GatedBuilder {
    units: Arc<AtomicUsize>,
    entered: Arc<Barrier>,
    release: Arc<Barrier>,
}

struct GatedUnit {
    id: String,
    gate: Option<(Arc<Barrier>, Arc<Barrier>)>,
}

impl StatementBuilder for GatedBuilder {
    fn unit(&self, request: StatementRequest<'_>) -> Box<dyn StatementUnit> {
        let gate = (self.units.fetch_add(1, Ordering::SeqCst) == 0)
            .then(|| (Arc::clone(&self.entered), Arc::clone(&self.release)));
        Box::new(GatedUnit {
            id: request.scope.qualify_reference(request.node.attr("id").unwrap_or_default()),
            gate,
        })
    }
}

impl StatementUnit for GatedUnit {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn parse(&mut self, _registry: &Registry) -> Result<Resolution<()>> {
        if let Some((entered, release)) = self.gate.take() {
            entered.wait();
            release.wait();
        }
        Ok(Resolution::Resolved(()))
    }
}

#[test]
fn a_resource_being_compiled_is_not_parsed_again() {
    let units = Arc::new(AtomicUsize::new(0));
    let entered = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));
    let session = CompileSession::default().with_statement_builder(Arc::new(GatedBuilder {
        units: Arc::clone(&units),
        entered: Arc::clone(&entered),
        release: Arc::clone(&release),
    }));
    let doc = mapper("blog")
        .with_child(Node::new("cache"))
        .with_child(Node::new("select").with_attr("id", "find"));

    thread::scope(|scope| {
        let first = scope.spawn(|| session.compile(&doc, "blog.xml"));

        entered.wait();
        assert!(session.registry().is_resource_loading("blog.xml").unwrap());
        session.compile(&doc, "blog.xml").unwrap();
        assert!(!session.registry().is_resource_loaded("blog.xml").unwrap());
        release.wait();

        first.join().unwrap().unwrap();
    });

    assert_eq!(units.load(Ordering::SeqCst), 1);
    assert!(session.registry().is_resource_loaded("blog.xml").unwrap());
    assert!(!session.registry().is_resource_loading("blog.xml").unwrap());
    assert!(session.registry().has_cache("blog").unwrap());
}

#[test]
fn a_failed_compile_releases_the_resource() {
    let session = CompileSession::default();
    let broken = mapper("blog").with_child(Node::new("sql"));
    assert!(session.compile(&broken, "blog.xml").is_err());
    assert!(!session.registry().is_resource_loading("blog.xml").unwrap());
    assert!(!session.registry().is_resource_loaded("blog.xml").unwrap());

    let fixed = mapper("blog").with_child(Node::new("sql").with_attr("id", "cols"));
    session.compile(&fixed, "blog.xml").unwrap();
    assert!(session.registry().is_resource_loaded("blog.xml").unwrap());
    assert!(session.registry().has_fragment("blog.cols").unwrap());
}

/// Waits on its first parse and panics when retried.
struct PanickingBuilder;

struct PanickingUnit {
    attempts: usize,
}

impl StatementBuilder for PanickingBuilder {
    fn unit(&self, _request: StatementRequest<'_>) -> Box<dyn StatementUnit> {
        Box::new(PanickingUnit { attempts: 0 })
    }
}

impl StatementUnit for PanickingUnit {
    fn id(&self) -> String {
        "blog.find".to_string()
    }

    fn parse(&mut self, _registry: &Registry) -> Result<Resolution<()>> {
        self.attempts += 1;
        if self.attempts > 1 {
            panic!("statement failed on retry");
        }
        Ok(Resolution::Missing(Dependency::Fragment("blog.cols".to_string())))
    }
}

#[test]
fn a_panic_during_a_sweep_fails_later_compiles() {
    let session = CompileSession::default().with_statement_builder(Arc::new(PanickingBuilder));
    let doc = mapper("blog").with_child(Node::new("select").with_attr("id", "find"));

    thread::scope(|scope| {
        let compile = scope.spawn(|| session.compile(&doc, "blog.xml"));
        assert!(compile.join().is_err());
    });

    let err = session.compile(&mapper("author"), "author.xml").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Internal(_)));
    let context = err.context.unwrap();
    assert_eq!(context.resource.as_deref(), Some("author.xml"));
    assert_eq!(context.activity.as_deref(), Some("resolving pending items"));
    assert!(session.residuals().is_err());
    assert!(session.ensure_resolved().is_err());
}

// =============================================================================
// Interface Binding
// =============================================================================

#[test]
fn known_interface_is_bound_after_compile() {
    let session = CompileSession::new(CompilerConfig::default())
        .with_interfaces(Arc::new(KnownInterfaces::new().with("blog.BlogMapper")));

    session.compile(&mapper("blog.BlogMapper"), "blog.xml").unwrap();
    session.compile(&mapper("author.AuthorMapper"), "author.xml").unwrap();

    let registry = session.registry();
    assert!(registry.has_binding("blog.BlogMapper").unwrap());
    assert!(registry.is_resource_loaded("namespace:blog.BlogMapper").unwrap());
    assert!(!registry.has_binding("author.AuthorMapper").unwrap());
}

#[test]
fn binding_can_be_disabled() {
    let session = CompileSession::new(CompilerConfig::new().with_bind_interfaces(false))
        .with_interfaces(Arc::new(KnownInterfaces::new().with("blog.BlogMapper")));

    session.compile(&mapper("blog.BlogMapper"), "blog.xml").unwrap();
    assert!(!session.registry().has_binding("blog.BlogMapper").unwrap());
}

//! The descriptor compiler.
//!
//! Compiles one document into the session: sections are processed in a
//! fixed order (`cache-ref`, `cache`, `parameterMap`, `resultMap`, `sql`,
//! statements), anything waiting on a missing dependency is queued, and
//! every compile ends with a retry sweep of all pending queues.

use rowmap_foundation::{Node, Resolution, Result};
use rowmap_registry::StatementKind;
use tracing::{debug, trace};

use crate::binding::bind_namespace;
use crate::builder::{BuildContext, ParameterShapeBuilder, ResultShapeBuilder};
use crate::cache::{configure_cache, link_cache};
use crate::fragment::register_fragments;
use crate::pending::PendingShape;
use crate::scope::NamespaceScope;
use crate::session::CompileSession;
use crate::statement::StatementRequest;

/// Compiles a single descriptor document into a session.
#[derive(Debug)]
pub struct DescriptorCompiler<'s> {
    session: &'s CompileSession,
    resource: String,
}

impl<'s> DescriptorCompiler<'s> {
    /// Creates a compiler for the document identified by `resource`.
    #[must_use]
    pub fn new(session: &'s CompileSession, resource: impl Into<String>) -> Self {
        Self {
            session,
            resource: resource.into(),
        }
    }

    /// Compiles the document rooted at `root`.
    ///
    /// The resource is claimed before parsing, so of several callers
    /// compiling it at once exactly one parses it. A resource that is
    /// already compiled or being compiled is skipped, but the pending queues
    /// are still swept. A failed compile releases the claim.
    pub fn compile(&self, root: &Node) -> Result<()> {
        let registry = self.session.registry();
        if registry
            .begin_loading(&self.resource)
            .map_err(|e| e.in_resource(&self.resource, None))?
        {
            if let Err(err) = self.load(root) {
                registry
                    .abandon_loading(&self.resource)
                    .map_err(|e| e.in_resource(&self.resource, None))?;
                return Err(err);
            }
        } else {
            debug!(resource = %self.resource, "resource already loaded or loading");
        }
        self.session
            .sweep()
            .map_err(|e| e.in_resource(&self.resource, Some("resolving pending items")))?;
        Ok(())
    }

    fn load(&self, root: &Node) -> Result<()> {
        let registry = self.session.registry();
        let scope = NamespaceScope::from_document(root)
            .map_err(|e| e.in_resource(&self.resource, None))?;
        debug!(resource = %self.resource, namespace = scope.namespace(), "compiling descriptor");
        self.compile_sections(root, &scope)?;
        registry
            .finish_loading(&self.resource)
            .map_err(|e| e.in_resource(&self.resource, None))?;
        if self.session.config().bind_interfaces {
            bind_namespace(registry, self.session.interfaces(), scope.namespace())
                .map_err(|e| e.in_resource(&self.resource, Some("binding interface")))?;
        }
        Ok(())
    }

    fn compile_sections(&self, root: &Node, scope: &NamespaceScope) -> Result<()> {
        let session = self.session;
        let cx = BuildContext::new(scope, session.types(), session.metadata(), session.config());

        if let Some(node) = root.first_child("cache-ref") {
            self.step("processing cache-ref", || self.cache_ref(node, scope))?;
        }
        if let Some(node) = root.first_child("cache") {
            self.step("processing cache", || {
                configure_cache(node, scope, session.types(), session.registry())
            })?;
        }
        self.step("processing parameterMap elements", || self.parameter_shapes(root, cx))?;
        self.step("processing resultMap elements", || self.result_shapes(root, cx))?;
        self.step("processing sql elements", || {
            for required in self.dialect_passes() {
                register_fragments(root, scope, session.registry(), required)?;
            }
            Ok(())
        })?;
        self.step("processing statements", || self.statements(root, scope))
    }

    /// Runs one section, attaching the resource and activity to its errors.
    fn step<T>(&self, activity: &str, section: impl FnOnce() -> Result<T>) -> Result<T> {
        debug!(resource = %self.resource, activity, "section");
        section().map_err(|e| e.in_resource(&self.resource, Some(activity)))
    }

    /// The session dialect (if any) followed by the dialect-agnostic pass.
    fn dialect_passes(&self) -> Vec<Option<&'s str>> {
        match self.session.config().dialect() {
            Some(dialect) => vec![Some(dialect), None],
            None => vec![None],
        }
    }

    fn cache_ref(&self, node: &Node, scope: &NamespaceScope) -> Result<()> {
        let registry = self.session.registry();
        let pending = link_cache(node, scope, registry)?;
        if let Resolution::Missing(dependency) = pending.resolve(registry)? {
            trace!(namespace = scope.namespace(), waiting_for = %dependency, "cache link queued");
            self.session.pending().cache_links().push(pending, dependency)?;
        }
        Ok(())
    }

    fn parameter_shapes(&self, root: &Node, cx: BuildContext<'_>) -> Result<()> {
        let builder = ParameterShapeBuilder::new(cx);
        for node in root.children_named("parameterMap") {
            self.session.registry().add_parameter_shape(builder.build(node)?)?;
        }
        Ok(())
    }

    fn result_shapes(&self, root: &Node, cx: BuildContext<'_>) -> Result<()> {
        let registry = self.session.registry();
        for (index, node) in root.children().iter().enumerate() {
            if node.name() != "resultMap" {
                continue;
            }
            let shapes = ResultShapeBuilder::new(cx).build_top_level(root.name(), index, node)?;
            for shape in shapes {
                let pending = PendingShape::new(shape);
                if let Resolution::Missing(dependency) = pending.resolve(registry)? {
                    trace!(shape = %pending.shape().id, waiting_for = %dependency, "result shape queued");
                    self.session.pending().shapes().push(pending, dependency)?;
                }
            }
        }
        Ok(())
    }

    fn statements(&self, root: &Node, scope: &NamespaceScope) -> Result<()> {
        let session = self.session;
        for required in self.dialect_passes() {
            let statements = root
                .children()
                .iter()
                .filter(|node| StatementKind::from_element(node.name()).is_some());
            for node in statements {
                let mut unit = session.statement_builder().unit(StatementRequest {
                    node,
                    scope,
                    required_dialect: required,
                    types: session.types(),
                    config: session.config(),
                });
                if let Resolution::Missing(dependency) = unit.parse(session.registry())? {
                    trace!(statement = %unit.id(), waiting_for = %dependency, "statement queued");
                    session.pending().statements().push(unit, dependency)?;
                }
            }
        }
        Ok(())
    }
}

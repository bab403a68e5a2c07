//! The statement seam.
//!
//! Statement elements (`select|insert|update|delete`) are handed to a
//! [`StatementBuilder`], which wraps each one in a [`StatementUnit`]. A unit's
//! [`parse`](StatementUnit::parse) may report [`Resolution::Missing`], in
//! which case the compiler queues the unit and parses it again on later
//! sweeps. [`MappedStatementBuilder`] is the built-in implementation.

use std::sync::Arc;

use rowmap_foundation::{Dependency, Error, Node, Resolution, Result, TypeResolver};
use rowmap_registry::{Registry, StatementDef, StatementKind};

use crate::config::CompilerConfig;
use crate::fragment::dialect_matches;
use crate::scope::NamespaceScope;

/// What a statement builder receives for one statement element.
#[derive(Clone, Copy, Debug)]
pub struct StatementRequest<'a> {
    /// The statement element.
    pub node: &'a Node,
    /// Namespace of the document.
    pub scope: &'a NamespaceScope,
    /// Dialect the current pass registers, if any.
    pub required_dialect: Option<&'a str>,
    /// Type-name resolver.
    pub types: &'a Arc<TypeResolver>,
    /// Session configuration.
    pub config: &'a CompilerConfig,
}

/// Creates parse units for statement elements.
pub trait StatementBuilder: Send + Sync {
    /// Wraps one statement element; nothing is parsed yet.
    fn unit(&self, request: StatementRequest<'_>) -> Box<dyn StatementUnit>;
}

/// One statement element, parsed (and re-parsed) against the registry.
pub trait StatementUnit: Send {
    /// Identifier used when reporting the unit as unresolved.
    fn id(&self) -> String;

    /// Parses the statement and registers it.
    ///
    /// Returns `Missing` when something it references is not registered
    /// yet; the unit must then be safe to parse again.
    fn parse(&mut self, registry: &Registry) -> Result<Resolution<()>>;
}

impl std::fmt::Debug for dyn StatementUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StatementUnit({})", self.id())
    }
}

// =============================================================================
// MappedStatementBuilder
// =============================================================================

/// Builds [`StatementDef`]s straight from statement elements.
#[derive(Clone, Copy, Debug, Default)]
pub struct MappedStatementBuilder;

impl StatementBuilder for MappedStatementBuilder {
    fn unit(&self, request: StatementRequest<'_>) -> Box<dyn StatementUnit> {
        Box::new(MappedStatement {
            node: request.node.clone(),
            scope: request.scope.clone(),
            required_dialect: request.required_dialect.map(String::from),
            types: Arc::clone(request.types),
            cache_enabled: request.config.cache_enabled,
        })
    }
}

struct MappedStatement {
    node: Node,
    scope: NamespaceScope,
    required_dialect: Option<String>,
    types: Arc<TypeResolver>,
    cache_enabled: bool,
}

impl MappedStatement {
    fn accepts(&self, own: Option<&str>, existing: Option<&StatementDef>) -> bool {
        dialect_matches(
            own,
            self.required_dialect.as_deref(),
            existing.is_some_and(|s| s.dialect.is_some()),
        )
    }

    /// Qualified `refid`s of every `include` under `node`, in document order.
    fn collect_includes(&self, node: &Node, includes: &mut Vec<String>) {
        for child in node.children() {
            if child.name() == "include" {
                if let Some(refid) = child.non_empty_attr("refid") {
                    let refid = self.scope.qualify_reference(refid);
                    if !includes.contains(&refid) {
                        includes.push(refid);
                    }
                }
            }
            self.collect_includes(child, includes);
        }
    }

    /// Checks includes transitively; fragments may include fragments.
    fn resolve_includes(&self, registry: &Registry) -> Result<Resolution<Vec<String>>> {
        let mut includes = Vec::new();
        self.collect_includes(&self.node, &mut includes);
        let mut checked = 0;
        while checked < includes.len() {
            let Some(fragment) = registry.fragment(&includes[checked])? else {
                return Ok(Resolution::Missing(Dependency::Fragment(
                    includes[checked].clone(),
                )));
            };
            self.collect_includes(&fragment.node, &mut includes);
            checked += 1;
        }
        Ok(Resolution::Resolved(includes))
    }

    /// A namespace sharing a cache that does not exist yet cannot build
    /// statements.
    fn unresolved_cache(&self, registry: &Registry) -> Result<Option<Dependency>> {
        let Some(link) = registry.cache_link(self.scope.namespace())? else {
            return Ok(None);
        };
        if registry.has_cache(&link.referenced)? {
            return Ok(None);
        }
        Ok(Some(Dependency::Cache(link.referenced.clone())))
    }

    fn build(&self, registry: &Registry, kind: StatementKind, id: String) -> Result<Resolution<StatementDef>> {
        let node = &self.node;

        let includes = match self.resolve_includes(registry)? {
            Resolution::Resolved(includes) => includes,
            Resolution::Missing(dependency) => return Ok(Resolution::Missing(dependency)),
        };
        if let Some(dependency) = self.unresolved_cache(registry)? {
            return Ok(Resolution::Missing(dependency));
        }

        let parameter_shape = node
            .non_empty_attr("parameterMap")
            .map(|shape| self.scope.qualify_reference(shape));
        if let Some(shape) = &parameter_shape {
            if !registry.has_parameter_shape(shape)? {
                return Ok(Resolution::Missing(Dependency::ParameterShape(shape.clone())));
            }
        }

        let result_shapes: Vec<String> = node
            .non_empty_attr("resultMap")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|shape| !shape.is_empty())
                    .map(|shape| self.scope.qualify_reference(shape))
                    .collect()
            })
            .unwrap_or_default();
        for shape in &result_shapes {
            if !registry.has_result_shape(shape)? {
                return Ok(Resolution::Missing(Dependency::ResultShape(shape.clone())));
            }
        }

        let cache = if self.cache_enabled {
            registry
                .effective_cache(self.scope.namespace())?
                .map(|cache| cache.namespace.clone())
        } else {
            None
        };

        Ok(Resolution::Resolved(StatementDef {
            id,
            kind,
            dialect: node.non_empty_attr("databaseId").map(String::from),
            result_shapes,
            parameter_shape,
            result_type: self.types.resolve(node.non_empty_attr("resultType"))?,
            parameter_type: self.types.resolve(node.non_empty_attr("parameterType"))?,
            cache,
            use_cache: node.attr_bool_or("useCache", kind.is_select())?,
            flush_cache: node.attr_bool_or("flushCache", !kind.is_select())?,
            timeout: node.attr_i32("timeout")?,
            fetch_size: node.attr_i32("fetchSize")?,
            includes,
            body: node.clone(),
        }))
    }
}

impl StatementUnit for MappedStatement {
    fn id(&self) -> String {
        self.scope
            .qualify_reference(self.node.attr("id").unwrap_or_default())
    }

    fn parse(&mut self, registry: &Registry) -> Result<Resolution<()>> {
        let kind = StatementKind::from_element(self.node.name()).ok_or_else(|| {
            Error::internal(format!("'{}' is not a statement element", self.node.name()))
        })?;
        let local_id = self
            .node
            .non_empty_attr("id")
            .ok_or_else(|| Error::missing_attribute(self.node.name(), "id"))?;
        let id = self.scope.qualify_definition(local_id)?;
        let dialect = self.node.non_empty_attr("databaseId");

        let existing = registry.statement(&id)?;
        if !self.accepts(dialect, existing.as_deref()) {
            return Ok(Resolution::Resolved(()));
        }

        match self.build(registry, kind, id)? {
            Resolution::Resolved(statement) => {
                registry.add_statement_if(statement, |existing| self.accepts(dialect, existing))?;
                Ok(Resolution::Resolved(()))
            }
            Resolution::Missing(dependency) => Ok(Resolution::Missing(dependency)),
        }
    }
}

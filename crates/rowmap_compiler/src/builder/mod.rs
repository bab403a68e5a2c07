//! Metadata builders.
//!
//! Builders turn descriptor nodes into registry entities. They read the
//! registry only for type information they are handed and never register
//! anything themselves: the compiler decides whether a built entity is
//! registered now or queued for later.

mod parameter;
mod result;

pub use parameter::ParameterShapeBuilder;
pub use result::ResultShapeBuilder;

use rowmap_foundation::{JdbcType, Node, Result, TypeMetadata, TypeName, TypeResolver};

use crate::config::CompilerConfig;
use crate::scope::NamespaceScope;

/// Everything a builder consults while building one document's entities.
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    /// Namespace of the document.
    pub scope: &'a NamespaceScope,
    /// Type-name resolver.
    pub types: &'a TypeResolver,
    /// Property metadata of known types.
    pub metadata: &'a dyn TypeMetadata,
    /// Session configuration.
    pub config: &'a CompilerConfig,
}

impl<'a> BuildContext<'a> {
    /// Creates a context.
    #[must_use]
    pub fn new(
        scope: &'a NamespaceScope,
        types: &'a TypeResolver,
        metadata: &'a dyn TypeMetadata,
        config: &'a CompilerConfig,
    ) -> Self {
        Self {
            scope,
            types,
            metadata,
            config,
        }
    }

    /// Resolves the type named by an attribute, if present.
    pub fn type_attr(&self, node: &Node, key: &str) -> Result<Option<TypeName>> {
        self.types.resolve(node.non_empty_attr(key))
    }

    /// Parses a `jdbcType` attribute, if present.
    pub fn jdbc_type(node: &Node) -> Result<Option<JdbcType>> {
        node.non_empty_attr("jdbcType")
            .map(str::parse)
            .transpose()
    }
}

impl std::fmt::Debug for BuildContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("scope", self.scope)
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

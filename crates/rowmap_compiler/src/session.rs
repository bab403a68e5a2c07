//! Compilation sessions.
//!
//! A [`CompileSession`] is everything documents compiled together share:
//! the registry, the pending queues and the collaborators the builders
//! consult. It is `Sync`; callers may compile documents from several
//! threads against one session.

use std::sync::Arc;

use rowmap_foundation::{Error, Node, Result, TypeCatalog, TypeMetadata, TypeResolver};
use rowmap_registry::Registry;

use crate::binding::{InterfaceCatalog, NoInterfaces};
use crate::compiler::DescriptorCompiler;
use crate::config::CompilerConfig;
use crate::pending::{PendingWork, Residual};
use crate::statement::{MappedStatementBuilder, StatementBuilder};

/// Shared state of one compilation session.
pub struct CompileSession {
    config: CompilerConfig,
    registry: Arc<Registry>,
    types: Arc<TypeResolver>,
    metadata: Arc<dyn TypeMetadata>,
    statements: Arc<dyn StatementBuilder>,
    interfaces: Arc<dyn InterfaceCatalog>,
    pending: PendingWork,
}

impl Default for CompileSession {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

impl CompileSession {
    /// Creates a session with an empty registry and no known types.
    #[must_use]
    pub fn new(config: CompilerConfig) -> Self {
        let catalog = Arc::new(TypeCatalog::new());
        Self {
            config,
            registry: Arc::new(Registry::new()),
            types: Arc::new(TypeResolver::new(catalog.clone())),
            metadata: catalog,
            statements: Arc::new(MappedStatementBuilder),
            interfaces: Arc::new(NoInterfaces),
            pending: PendingWork::new(),
        }
    }

    /// Builder method to load types and their properties from a catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: TypeCatalog) -> Self {
        let catalog = Arc::new(catalog);
        self.types = Arc::new(TypeResolver::new(catalog.clone()));
        self.metadata = catalog;
        self
    }

    /// Builder method to replace the type-name resolver.
    #[must_use]
    pub fn with_type_resolver(mut self, types: TypeResolver) -> Self {
        self.types = Arc::new(types);
        self
    }

    /// Builder method to replace the property metadata source.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Arc<dyn TypeMetadata>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Builder method to replace the statement builder.
    #[must_use]
    pub fn with_statement_builder(mut self, statements: Arc<dyn StatementBuilder>) -> Self {
        self.statements = statements;
        self
    }

    /// Builder method to set the interfaces namespaces are bound to.
    #[must_use]
    pub fn with_interfaces(mut self, interfaces: Arc<dyn InterfaceCatalog>) -> Self {
        self.interfaces = interfaces;
        self
    }

    /// Builder method to compile into an existing registry.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// The shared registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// The type-name resolver.
    #[must_use]
    pub fn types(&self) -> &Arc<TypeResolver> {
        &self.types
    }

    /// Property metadata of known types.
    #[must_use]
    pub fn metadata(&self) -> &dyn TypeMetadata {
        self.metadata.as_ref()
    }

    /// The statement builder.
    #[must_use]
    pub fn statement_builder(&self) -> &dyn StatementBuilder {
        self.statements.as_ref()
    }

    /// The interfaces namespaces are bound to.
    #[must_use]
    pub fn interfaces(&self) -> &dyn InterfaceCatalog {
        self.interfaces.as_ref()
    }

    /// The pending queues.
    #[must_use]
    pub fn pending(&self) -> &PendingWork {
        &self.pending
    }

    /// Compiles one document identified by `resource`.
    pub fn compile(&self, document: &Node, resource: &str) -> Result<()> {
        DescriptorCompiler::new(self, resource).compile(document)
    }

    /// Runs one retry sweep of every queue; returns the number resolved.
    pub fn sweep(&self) -> Result<usize> {
        self.pending.sweep_all(&self.registry)
    }

    /// Sweeps until nothing more resolves; returns the number resolved.
    pub fn settle(&self) -> Result<usize> {
        self.pending.settle(&self.registry)
    }

    /// Items still queued, with what each is waiting for.
    pub fn residuals(&self) -> Result<Vec<Residual>> {
        self.pending.residuals()
    }

    /// Settles the queues and fails if anything is still unresolved.
    ///
    /// Meant for callers that have fed the session every document.
    pub fn ensure_resolved(&self) -> Result<()> {
        self.settle()?;
        let residuals = self.residuals()?;
        if residuals.is_empty() {
            return Ok(());
        }
        Err(Error::unresolved(
            residuals
                .into_iter()
                .map(|residual| (format!("{} {}", residual.kind, residual.item), residual.waiting_for))
                .collect(),
        ))
    }
}

impl std::fmt::Debug for CompileSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompileSession")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

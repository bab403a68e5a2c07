//! Descriptor compiler and deferred resolution engine for rowmap.
//!
//! This crate provides:
//! - [`CompileSession`] - Registry, pending queues and collaborators shared by a session
//! - [`DescriptorCompiler`] - Compiles one descriptor document into a session
//! - [`ResultShapeBuilder`], [`ParameterShapeBuilder`] - Metadata builders
//! - [`PendingQueue`], [`PendingWork`] - Retry-until-success queues
//! - [`StatementBuilder`], [`StatementUnit`] - The statement seam, with [`MappedStatementBuilder`]
//! - [`InterfaceCatalog`] - Interfaces namespaces are bound to
//!
//! # Example
//!
//! ```
//! use rowmap_compiler::{CompileSession, CompilerConfig};
//! use rowmap_foundation::Node;
//!
//! let session = CompileSession::new(CompilerConfig::default());
//! let document = Node::new("mapper")
//!     .with_attr("namespace", "blog")
//!     .with_child(
//!         Node::new("resultMap")
//!             .with_attr("id", "postResult")
//!             .with_attr("extends", "baseResult"),
//!     )
//!     .with_child(Node::new("resultMap").with_attr("id", "baseResult"));
//!
//! session.compile(&document, "blog.xml")?;
//! assert!(session.registry().has_result_shape("blog.postResult")?);
//! assert!(session.residuals()?.is_empty());
//! # Ok::<(), rowmap_foundation::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod binding;
pub mod builder;
pub mod cache;
pub mod compiler;
pub mod config;
pub mod fragment;
pub mod pending;
pub mod scope;
pub mod session;
pub mod statement;

pub use binding::{InterfaceCatalog, KnownInterfaces, NoInterfaces, bind_namespace};
pub use builder::{BuildContext, ParameterShapeBuilder, ResultShapeBuilder};
pub use compiler::DescriptorCompiler;
pub use config::CompilerConfig;
pub use fragment::dialect_matches;
pub use pending::{
    PendingCacheLink, PendingKind, PendingQueue, PendingShape, PendingWork, Residual, SweepOutcome,
};
pub use scope::NamespaceScope;
pub use session::CompileSession;
pub use statement::{MappedStatementBuilder, StatementBuilder, StatementRequest, StatementUnit};

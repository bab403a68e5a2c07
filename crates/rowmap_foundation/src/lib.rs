//! Core types, descriptor nodes, and errors for rowmap.
//!
//! This crate provides:
//! - [`Node`] - The attributed descriptor tree consumed by the compiler
//! - [`Error`] - Rich error types with resource/activity context
//! - [`Resolution`] and [`Dependency`] - The retryable "not registered yet" signal
//! - [`TypeName`], [`JdbcType`], [`ParameterMode`], [`FetchType`] - Mapping vocabulary
//! - [`TypeResolver`], [`TypeMetadata`], [`TypeCatalog`] - Type-name resolution

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod node;
pub mod resolution;
pub mod resolve;
pub mod types;

pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use node::Node;
pub use resolution::{Dependency, Resolution};
pub use resolve::{PropertyInfo, TypeCatalog, TypeInfo, TypeLoader, TypeMetadata, TypeResolver};
pub use types::{FetchType, JdbcType, ParameterMode, TypeName};

//! Compiled mapping metadata and the shared registry for rowmap.
//!
//! This crate provides:
//! - [`ResultShape`], [`FieldMapping`], [`Discriminator`] - Row-to-value mappings
//! - [`ParameterShape`], [`ParameterMapping`] - Value-to-parameter mappings
//! - [`CacheConfig`], [`CacheLink`] - Per-namespace caching and sharing
//! - [`Fragment`], [`StatementDef`] - Statement text and compiled statements
//! - [`Registry`] - The shared, per-kind locked store of all of the above

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cache;
pub mod fragment;
pub mod registry;
pub mod shape;
pub mod statement;

pub use cache::{CacheConfig, CacheLink};
pub use fragment::Fragment;
pub use registry::{Registry, RegistrySnapshot};
pub use shape::{
    CompositeColumn, Discriminator, FieldFlags, FieldMapping, ParameterMapping, ParameterShape,
    ResultShape,
};
pub use statement::{StatementDef, StatementKind};

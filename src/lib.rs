//! Rowmap - Result-mapping descriptor compiler
//!
//! This crate re-exports all layers of the rowmap system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: rowmap_compiler   - Builders, pending queues, descriptor compiler
//! Layer 1: rowmap_registry   - Metadata entities, shared registry
//! Layer 0: rowmap_foundation - Node tree, types, Resolution, Error
//! ```

pub use rowmap_compiler as compiler;
pub use rowmap_foundation as foundation;
pub use rowmap_registry as registry;

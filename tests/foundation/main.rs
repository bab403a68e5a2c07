//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Node, TypeResolver, Resolution, and Error.

mod errors;
mod nodes;

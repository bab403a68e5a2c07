//! Binding namespaces to externally registered interfaces.

use std::collections::HashSet;

use rowmap_foundation::Result;
use rowmap_registry::Registry;
use tracing::debug;

/// Prefix of the pseudo-resource marked loaded when a namespace is bound.
pub const NAMESPACE_RESOURCE_PREFIX: &str = "namespace:";

/// Knows which interfaces exist, by qualified name.
pub trait InterfaceCatalog: Send + Sync {
    /// Returns true if an interface with this qualified name exists.
    fn contains(&self, name: &str) -> bool;
}

/// A catalog without interfaces; every namespace is left unbound.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInterfaces;

impl InterfaceCatalog for NoInterfaces {
    fn contains(&self, _name: &str) -> bool {
        false
    }
}

/// A fixed set of interface names.
#[derive(Clone, Debug, Default)]
pub struct KnownInterfaces {
    names: HashSet<String>,
}

impl KnownInterfaces {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to add an interface name.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }
}

impl InterfaceCatalog for KnownInterfaces {
    fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

/// Binds the interface named like `namespace`, if there is one.
///
/// A namespace without a matching interface is not an error. Returns true
/// if a new binding was added.
pub fn bind_namespace(
    registry: &Registry,
    interfaces: &dyn InterfaceCatalog,
    namespace: &str,
) -> Result<bool> {
    if !interfaces.contains(namespace) || !registry.add_binding(namespace)? {
        return Ok(false);
    }
    registry.mark_resource_loaded(&format!("{NAMESPACE_RESOURCE_PREFIX}{namespace}"))?;
    debug!(namespace, "bound interface");
    Ok(true)
}

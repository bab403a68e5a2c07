//! `cache` and `cache-ref` sections.

use rowmap_foundation::{Error, Node, Result, TypeResolver};
use rowmap_registry::{CacheConfig, CacheLink, Registry};

use crate::pending::PendingCacheLink;
use crate::scope::NamespaceScope;

/// Logical name of the default cache implementation.
pub const DEFAULT_CACHE: &str = "PERPETUAL";

/// Logical name of the default eviction policy.
pub const DEFAULT_EVICTION: &str = "LRU";

/// Records a `cache-ref` declaration and returns it for resolution.
///
/// The link is registered right away; whether the referenced cache exists
/// yet is the caller's business.
pub fn link_cache(node: &Node, scope: &NamespaceScope, registry: &Registry) -> Result<PendingCacheLink> {
    let referenced = node
        .non_empty_attr("namespace")
        .ok_or_else(|| Error::missing_attribute("cache-ref", "namespace"))?;
    let link = CacheLink::new(scope.namespace(), referenced);
    registry.add_cache_link(link.clone())?;
    Ok(PendingCacheLink::new(link))
}

/// Builds the namespace's own cache from a `cache` element and registers it.
pub fn configure_cache(
    node: &Node,
    scope: &NamespaceScope,
    types: &TypeResolver,
    registry: &Registry,
) -> Result<()> {
    let kind = types.resolve_name(node.non_empty_attr("type").unwrap_or(DEFAULT_CACHE))?;
    let eviction = types.resolve_name(node.non_empty_attr("eviction").unwrap_or(DEFAULT_EVICTION))?;

    let mut cache = CacheConfig::new(scope.namespace(), kind, eviction);
    cache.flush_interval = node.attr_i64("flushInterval")?;
    cache.size = node.attr_i32("size")?;
    cache.read_write = !node.attr_bool_or("readOnly", false)?;
    cache.blocking = node.attr_bool_or("blocking", false)?;
    cache.properties = node.children_as_properties()?;
    registry.add_cache(cache)
}

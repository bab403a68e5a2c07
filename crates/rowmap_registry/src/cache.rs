//! Second-level cache configuration and cross-namespace sharing.

use indexmap::IndexMap;
use rowmap_foundation::TypeName;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-namespace cache settings.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CacheConfig {
    /// Owning namespace; also the cache id.
    pub namespace: String,
    /// Cache implementation.
    pub kind: TypeName,
    /// Eviction policy decorator.
    pub eviction: TypeName,
    /// Flush interval in milliseconds.
    pub flush_interval: Option<i64>,
    /// Maximum number of entries.
    pub size: Option<i32>,
    /// Whether cached values are copied on read.
    pub read_write: bool,
    /// Whether concurrent misses on a key block each other.
    pub blocking: bool,
    /// Free-form implementation properties.
    pub properties: IndexMap<String, String>,
}

impl CacheConfig {
    /// Creates a configuration with the standard defaults.
    #[must_use]
    pub fn new(namespace: impl Into<String>, kind: TypeName, eviction: TypeName) -> Self {
        Self {
            namespace: namespace.into(),
            kind,
            eviction,
            flush_interval: None,
            size: None,
            read_write: true,
            blocking: false,
            properties: IndexMap::new(),
        }
    }
}

/// Declares that one namespace shares another namespace's cache.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CacheLink {
    /// Namespace declaring the link.
    pub namespace: String,
    /// Namespace whose cache is shared.
    pub referenced: String,
}

impl CacheLink {
    /// Creates a link.
    #[must_use]
    pub fn new(namespace: impl Into<String>, referenced: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            referenced: referenced.into(),
        }
    }
}

//! Configuration for a compilation session.

/// Session-wide settings consulted while compiling descriptors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Dialect (database id) of the target data source, if any.
    ///
    /// When set, fragments and statements are considered twice: once for
    /// this dialect and once for dialect-agnostic variants.
    pub dialect: Option<String>,

    /// Default fetch mode of nested mappings without `fetchType`.
    pub lazy_loading: bool,

    /// Whether statements are wired to their namespace cache.
    pub cache_enabled: bool,

    /// Whether namespaces are bound to matching registered interfaces.
    pub bind_interfaces: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            dialect: None,
            lazy_loading: false,
            cache_enabled: true,
            bind_interfaces: true,
        }
    }
}

impl CompilerConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session dialect, ignoring an empty value.
    #[must_use]
    pub fn dialect(&self) -> Option<&str> {
        self.dialect.as_deref().filter(|d| !d.is_empty())
    }

    /// Builder method to set the session dialect.
    #[must_use]
    pub fn with_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect = Some(dialect.into());
        self
    }

    /// Builder method to set the default fetch mode.
    #[must_use]
    pub fn with_lazy_loading(mut self, lazy: bool) -> Self {
        self.lazy_loading = lazy;
        self
    }

    /// Builder method to enable/disable statement caching.
    #[must_use]
    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Builder method to enable/disable interface binding.
    #[must_use]
    pub fn with_bind_interfaces(mut self, bind: bool) -> Self {
        self.bind_interfaces = bind;
        self
    }
}

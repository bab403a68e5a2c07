//! Type-name resolution and static type metadata.
//!
//! Logical names in descriptors (`Blog`, `string`, `LRU`) are resolved in
//! two tiers: a case-insensitive alias table first, then a pluggable
//! [`TypeLoader`] supplied by the environment. Property types of target
//! types are answered by a [`TypeMetadata`] implementation, typically a
//! [`TypeCatalog`] built once up front instead of reflecting at runtime.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::types::TypeName;

// =============================================================================
// Capabilities
// =============================================================================

/// Loads a type by its fully qualified name.
pub trait TypeLoader: Send + Sync {
    /// Returns the type if the environment knows it.
    fn load(&self, qualified_name: &str) -> Option<TypeName>;
}

/// Answers questions about the properties of a known type.
pub trait TypeMetadata: Send + Sync {
    /// Declared value type of the property's setter, if it is writable.
    fn setter_type(&self, ty: &TypeName, property: &str) -> Option<TypeName>;

    /// Declared value type of the property's getter, if it is readable.
    fn getter_type(&self, ty: &TypeName, property: &str) -> Option<TypeName>;

    /// Returns true if the property is writable.
    fn has_setter(&self, ty: &TypeName, property: &str) -> bool {
        self.setter_type(ty, property).is_some()
    }
}

// =============================================================================
// TypeCatalog
// =============================================================================

/// Accessors of a single property.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertyInfo {
    /// Value type accepted by the setter, if writable.
    pub setter: Option<TypeName>,
    /// Value type returned by the getter, if readable.
    pub getter: Option<TypeName>,
}

impl PropertyInfo {
    /// A read-write property of the given type.
    #[must_use]
    pub fn read_write(ty: &str) -> Self {
        Self {
            setter: Some(TypeName::new(ty)),
            getter: Some(TypeName::new(ty)),
        }
    }

    /// A read-only property of the given type.
    #[must_use]
    pub fn read_only(ty: &str) -> Self {
        Self {
            setter: None,
            getter: Some(TypeName::new(ty)),
        }
    }
}

/// Static description of a target type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeInfo {
    /// The type's qualified name.
    pub name: TypeName,
    /// Properties in declaration order.
    pub properties: IndexMap<String, PropertyInfo>,
}

impl TypeInfo {
    /// Creates a type with no properties.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: TypeName::new(name),
            properties: IndexMap::new(),
        }
    }

    /// Builder method to add a read-write property.
    #[must_use]
    pub fn with_property(mut self, name: &str, ty: &str) -> Self {
        self.properties
            .insert(name.to_string(), PropertyInfo::read_write(ty));
        self
    }

    /// Builder method to add a read-only property.
    #[must_use]
    pub fn with_read_only(mut self, name: &str, ty: &str) -> Self {
        self.properties
            .insert(name.to_string(), PropertyInfo::read_only(ty));
        self
    }
}

/// Registry of statically described types.
///
/// Serves both as a [`TypeLoader`] (every registered type loads by name) and
/// as [`TypeMetadata`].
#[derive(Clone, Debug, Default)]
pub struct TypeCatalog {
    types: HashMap<TypeName, TypeInfo>,
}

impl TypeCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to register a type.
    #[must_use]
    pub fn with_type(mut self, info: TypeInfo) -> Self {
        self.register(info);
        self
    }

    /// Registers (or replaces) a type description.
    pub fn register(&mut self, info: TypeInfo) {
        self.types.insert(info.name.clone(), info);
    }

    /// Returns the description of a type.
    #[must_use]
    pub fn get(&self, ty: &TypeName) -> Option<&TypeInfo> {
        self.types.get(ty)
    }

    fn property(&self, ty: &TypeName, property: &str) -> Option<&PropertyInfo> {
        self.types.get(ty)?.properties.get(property)
    }
}

impl TypeLoader for TypeCatalog {
    fn load(&self, qualified_name: &str) -> Option<TypeName> {
        self.types
            .get_key_value(&TypeName::new(qualified_name))
            .map(|(name, _)| name.clone())
    }
}

impl TypeMetadata for TypeCatalog {
    fn setter_type(&self, ty: &TypeName, property: &str) -> Option<TypeName> {
        self.property(ty, property)?.setter.clone()
    }

    fn getter_type(&self, ty: &TypeName, property: &str) -> Option<TypeName> {
        self.property(ty, property)?.getter.clone()
    }
}

// =============================================================================
// TypeResolver
// =============================================================================

/// Built-in aliases, keyed in lower case.
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("string", "String"),
    ("byte", "Byte"),
    ("short", "Short"),
    ("int", "Integer"),
    ("integer", "Integer"),
    ("long", "Long"),
    ("float", "Float"),
    ("double", "Double"),
    ("boolean", "Boolean"),
    ("char", "Character"),
    ("date", "Date"),
    ("decimal", "BigDecimal"),
    ("bigdecimal", "BigDecimal"),
    ("biginteger", "BigInteger"),
    ("object", TypeName::OBJECT),
    ("map", TypeName::MAP),
    ("hashmap", TypeName::MAP),
    ("list", "List"),
    ("arraylist", "List"),
    ("collection", "Collection"),
    ("iterator", "Iterator"),
    ("resultset", TypeName::RESULT_SET),
    ("perpetual", "PerpetualCache"),
    ("lru", "LruCache"),
    ("fifo", "FifoCache"),
    ("soft", "SoftCache"),
    ("weak", "WeakCache"),
];

/// Two-tier type-name resolver: alias table, then an injected loader.
#[derive(Clone)]
pub struct TypeResolver {
    aliases: HashMap<String, TypeName>,
    loader: Arc<dyn TypeLoader>,
}

impl TypeResolver {
    /// Creates a resolver with the built-in aliases and the given loader.
    #[must_use]
    pub fn new(loader: Arc<dyn TypeLoader>) -> Self {
        let aliases = DEFAULT_ALIASES
            .iter()
            .map(|(alias, name)| ((*alias).to_string(), TypeName::new(name)))
            .collect();
        Self { aliases, loader }
    }

    /// Registers an alias; alias lookup is case-insensitive.
    pub fn register_alias(&mut self, alias: &str, ty: &str) {
        self.aliases
            .insert(alias.to_ascii_lowercase(), TypeName::new(ty));
    }

    /// Builder method to register an alias.
    #[must_use]
    pub fn with_alias(mut self, alias: &str, ty: &str) -> Self {
        self.register_alias(alias, ty);
        self
    }

    /// Resolves an optional name; absent or empty names resolve to `None`.
    pub fn resolve(&self, name: Option<&str>) -> Result<Option<TypeName>> {
        match name {
            None | Some("") => Ok(None),
            Some(name) => self.resolve_name(name).map(Some),
        }
    }

    /// Resolves a name that must be known.
    pub fn resolve_name(&self, name: &str) -> Result<TypeName> {
        if let Some(ty) = self.aliases.get(&name.to_ascii_lowercase()) {
            return Ok(ty.clone());
        }
        self.loader
            .load(name)
            .ok_or_else(|| Error::unknown_type(name))
    }
}

impl std::fmt::Debug for TypeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeResolver")
            .field("aliases", &self.aliases.len())
            .finish_non_exhaustive()
    }
}

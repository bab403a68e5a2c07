//! The shared registry holding every compiled entity.
//!
//! Each entity kind lives behind its own lock so documents compiled on
//! different threads only contend on the kind they are writing. Maps are
//! persistent (`im`), which makes [`Registry::snapshot`] a cheap copy.
//!
//! Registration is exclusive per id: adding an id that is already present is
//! a [`rowmap_foundation::ErrorKind::Duplicate`] error, except for fragments
//! and cache links, whose replacement rules are decided by the caller.
//!
//! A lock poisoned by a panicking writer is reported as
//! [`rowmap_foundation::ErrorKind::Internal`] on every later access.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rowmap_foundation::{Error, Result};

use crate::cache::{CacheConfig, CacheLink};
use crate::fragment::Fragment;
use crate::shape::{ParameterShape, ResultShape};
use crate::statement::StatementDef;

type Table<T> = RwLock<im::HashMap<String, Arc<T>>>;

fn poison_err<T>(_: PoisonError<T>) -> Error {
    Error::internal("registry lock poisoned")
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read().map_err(poison_err)
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(poison_err)
}

fn insert_exclusive<T>(table: &Table<T>, entity: &'static str, id: String, value: T) -> Result<()> {
    let mut map = write(table)?;
    if map.contains_key(&id) {
        return Err(Error::duplicate(entity, id));
    }
    map.insert(id, Arc::new(value));
    Ok(())
}

fn insert_if<T>(
    table: &Table<T>,
    id: String,
    value: T,
    accept: impl FnOnce(Option<&T>) -> bool,
) -> Result<bool> {
    let mut map = write(table)?;
    if !accept(map.get(&id).map(|entry| &**entry)) {
        return Ok(false);
    }
    map.insert(id, Arc::new(value));
    Ok(true)
}

fn get<T>(table: &Table<T>, id: &str) -> Result<Option<Arc<T>>> {
    Ok(read(table)?.get(id).cloned())
}

fn contains<T>(table: &Table<T>, id: &str) -> Result<bool> {
    Ok(read(table)?.contains_key(id))
}

/// Resources that finished compiling and those a caller has claimed.
#[derive(Debug, Default)]
struct Resources {
    loaded: im::HashSet<String>,
    loading: im::HashSet<String>,
}

/// Shared store of compiled metadata for one compilation session.
#[derive(Debug, Default)]
pub struct Registry {
    result_shapes: Table<ResultShape>,
    parameter_shapes: Table<ParameterShape>,
    caches: Table<CacheConfig>,
    cache_links: Table<CacheLink>,
    /// Namespace to the namespace whose cache it uses.
    cache_usage: RwLock<im::HashMap<String, String>>,
    fragments: Table<Fragment>,
    statements: Table<StatementDef>,
    resources: RwLock<Resources>,
    bindings: RwLock<im::HashSet<String>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Result and parameter shapes
    // =========================================================================

    /// Registers a fully resolved result shape.
    pub fn add_result_shape(&self, shape: ResultShape) -> Result<()> {
        insert_exclusive(&self.result_shapes, "result shape", shape.id.clone(), shape)
    }

    /// Looks up a result shape.
    pub fn result_shape(&self, id: &str) -> Result<Option<Arc<ResultShape>>> {
        get(&self.result_shapes, id)
    }

    /// Returns true if the result shape is registered.
    pub fn has_result_shape(&self, id: &str) -> Result<bool> {
        contains(&self.result_shapes, id)
    }

    /// Returns all registered result shape ids, sorted.
    pub fn result_shape_ids(&self) -> Result<Vec<String>> {
        let mut ids: Vec<_> = read(&self.result_shapes)?.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    /// Registers a parameter shape.
    pub fn add_parameter_shape(&self, shape: ParameterShape) -> Result<()> {
        insert_exclusive(
            &self.parameter_shapes,
            "parameter shape",
            shape.id.clone(),
            shape,
        )
    }

    /// Looks up a parameter shape.
    pub fn parameter_shape(&self, id: &str) -> Result<Option<Arc<ParameterShape>>> {
        get(&self.parameter_shapes, id)
    }

    /// Returns true if the parameter shape is registered.
    pub fn has_parameter_shape(&self, id: &str) -> Result<bool> {
        contains(&self.parameter_shapes, id)
    }

    // =========================================================================
    // Caches
    // =========================================================================

    /// Registers a namespace's cache and makes the namespace use it.
    pub fn add_cache(&self, cache: CacheConfig) -> Result<()> {
        let namespace = cache.namespace.clone();
        insert_exclusive(&self.caches, "cache", namespace.clone(), cache)?;
        self.use_cache(&namespace, &namespace)
    }

    /// Looks up the cache declared by a namespace.
    pub fn cache(&self, namespace: &str) -> Result<Option<Arc<CacheConfig>>> {
        get(&self.caches, namespace)
    }

    /// Returns true if the namespace declares its own cache.
    pub fn has_cache(&self, namespace: &str) -> Result<bool> {
        contains(&self.caches, namespace)
    }

    /// Records a cache-sharing declaration; a later declaration replaces it.
    pub fn add_cache_link(&self, link: CacheLink) -> Result<()> {
        write(&self.cache_links)?.insert(link.namespace.clone(), Arc::new(link));
        Ok(())
    }

    /// Looks up the cache-sharing declaration of a namespace.
    pub fn cache_link(&self, namespace: &str) -> Result<Option<Arc<CacheLink>>> {
        get(&self.cache_links, namespace)
    }

    /// Points `namespace` at the cache declared by `cache_namespace`.
    pub fn use_cache(&self, namespace: &str, cache_namespace: &str) -> Result<()> {
        write(&self.cache_usage)?.insert(namespace.to_string(), cache_namespace.to_string());
        Ok(())
    }

    /// Returns the cache a namespace currently uses, own or shared.
    pub fn effective_cache(&self, namespace: &str) -> Result<Option<Arc<CacheConfig>>> {
        let Some(target) = read(&self.cache_usage)?.get(namespace).cloned() else {
            return Ok(None);
        };
        self.cache(&target)
    }

    // =========================================================================
    // Fragments and statements
    // =========================================================================

    /// Registers a fragment if `accept` approves of the current entry.
    ///
    /// The check and the write happen under one lock.
    pub fn register_fragment_if(
        &self,
        fragment: Fragment,
        accept: impl FnOnce(Option<&Fragment>) -> bool,
    ) -> Result<bool> {
        insert_if(&self.fragments, fragment.id.clone(), fragment, accept)
    }

    /// Looks up a fragment.
    pub fn fragment(&self, id: &str) -> Result<Option<Arc<Fragment>>> {
        get(&self.fragments, id)
    }

    /// Returns true if the fragment is registered.
    pub fn has_fragment(&self, id: &str) -> Result<bool> {
        contains(&self.fragments, id)
    }

    /// Registers a statement.
    pub fn add_statement(&self, statement: StatementDef) -> Result<()> {
        insert_exclusive(
            &self.statements,
            "statement",
            statement.id.clone(),
            statement,
        )
    }

    /// Registers a statement unless `accept` rejects the current entry.
    ///
    /// Returns `Ok(false)` when rejected; an accepted statement whose id is
    /// already taken is still a duplicate.
    pub fn add_statement_if(
        &self,
        statement: StatementDef,
        accept: impl FnOnce(Option<&StatementDef>) -> bool,
    ) -> Result<bool> {
        let mut map = write(&self.statements)?;
        let existing = map.get(&statement.id);
        if !accept(existing.map(|entry| &**entry)) {
            return Ok(false);
        }
        if existing.is_some() {
            return Err(Error::duplicate("statement", statement.id));
        }
        map.insert(statement.id.clone(), Arc::new(statement));
        Ok(true)
    }

    /// Looks up a statement.
    pub fn statement(&self, id: &str) -> Result<Option<Arc<StatementDef>>> {
        get(&self.statements, id)
    }

    /// Returns true if the statement is registered.
    pub fn has_statement(&self, id: &str) -> Result<bool> {
        contains(&self.statements, id)
    }

    // =========================================================================
    // Resources and bindings
    // =========================================================================

    /// Returns true if the resource has been compiled.
    pub fn is_resource_loaded(&self, resource: &str) -> Result<bool> {
        Ok(read(&self.resources)?.loaded.contains(resource))
    }

    /// Returns true if a caller has claimed the resource and not finished it.
    pub fn is_resource_loading(&self, resource: &str) -> Result<bool> {
        Ok(read(&self.resources)?.loading.contains(resource))
    }

    /// Claims a resource for compilation.
    ///
    /// Returns false if the resource is already compiled or claimed by
    /// another caller. A successful claim must end in
    /// [`finish_loading`](Self::finish_loading) or
    /// [`abandon_loading`](Self::abandon_loading).
    pub fn begin_loading(&self, resource: &str) -> Result<bool> {
        let mut resources = write(&self.resources)?;
        if resources.loaded.contains(resource) || resources.loading.contains(resource) {
            return Ok(false);
        }
        resources.loading.insert(resource.to_string());
        Ok(true)
    }

    /// Moves a claimed resource to the compiled set.
    pub fn finish_loading(&self, resource: &str) -> Result<()> {
        let mut resources = write(&self.resources)?;
        resources.loading.remove(resource);
        resources.loaded.insert(resource.to_string());
        Ok(())
    }

    /// Releases a claim without marking the resource compiled.
    pub fn abandon_loading(&self, resource: &str) -> Result<()> {
        write(&self.resources)?.loading.remove(resource);
        Ok(())
    }

    /// Marks a resource as compiled; returns false if it already was.
    pub fn mark_resource_loaded(&self, resource: &str) -> Result<bool> {
        Ok(write(&self.resources)?
            .loaded
            .insert(resource.to_string())
            .is_none())
    }

    /// Returns true if an interface is bound to the namespace.
    pub fn has_binding(&self, namespace: &str) -> Result<bool> {
        Ok(read(&self.bindings)?.contains(namespace))
    }

    /// Binds an interface to a namespace; returns false if one already was.
    pub fn add_binding(&self, namespace: &str) -> Result<bool> {
        Ok(write(&self.bindings)?
            .insert(namespace.to_string())
            .is_none())
    }

    /// Takes a consistent-per-kind copy of the registry contents.
    pub fn snapshot(&self) -> Result<RegistrySnapshot> {
        Ok(RegistrySnapshot {
            result_shapes: read(&self.result_shapes)?.clone(),
            parameter_shapes: read(&self.parameter_shapes)?.clone(),
            caches: read(&self.caches)?.clone(),
            cache_links: read(&self.cache_links)?.clone(),
            cache_usage: read(&self.cache_usage)?.clone(),
            fragments: read(&self.fragments)?.clone(),
            statements: read(&self.statements)?.clone(),
            loaded_resources: read(&self.resources)?.loaded.clone(),
            bindings: read(&self.bindings)?.clone(),
        })
    }
}

/// Immutable copy of a [`Registry`]'s contents.
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct RegistrySnapshot {
    pub result_shapes: im::HashMap<String, Arc<ResultShape>>,
    pub parameter_shapes: im::HashMap<String, Arc<ParameterShape>>,
    pub caches: im::HashMap<String, Arc<CacheConfig>>,
    pub cache_links: im::HashMap<String, Arc<CacheLink>>,
    pub cache_usage: im::HashMap<String, String>,
    pub fragments: im::HashMap<String, Arc<Fragment>>,
    pub statements: im::HashMap<String, Arc<StatementDef>>,
    pub loaded_resources: im::HashSet<String>,
    pub bindings: im::HashSet<String>,
}

//! Deferred resolution engine.
//!
//! Items whose dependencies are not registered yet wait in one of three
//! session-wide queues. A sweep walks a queue once under its lock, retrying
//! every item: success removes it, [`Resolution::Missing`] keeps it (with the
//! latest missing dependency), and any error aborts the sweep immediately.
//! Nothing is ever dropped for being unresolved; what is left when the caller
//! decides the session is over is reported by [`PendingWork::residuals`].
//! A queue whose lock was poisoned by a panicking item reports
//! [`rowmap_foundation::ErrorKind::Internal`] from then on.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rowmap_foundation::{Dependency, Error, Resolution, Result};
use rowmap_registry::{CacheLink, Registry, ResultShape};
use tracing::{debug, trace};

use crate::statement::StatementUnit;

// =============================================================================
// PendingQueue
// =============================================================================

fn poison_err<T>(_: PoisonError<T>) -> Error {
    Error::internal("pending queue lock poisoned")
}

struct Pending<T> {
    item: T,
    waiting_for: Dependency,
}

/// Counts reported by a single sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Items that resolved and left the queue.
    pub resolved: usize,
    /// Items still waiting.
    pub remaining: usize,
}

/// Retry-until-success work list for one entity kind.
pub struct PendingQueue<T> {
    items: Mutex<Vec<Pending<T>>>,
}

impl<T> Default for PendingQueue<T> {
    fn default() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }
}

impl<T> PendingQueue<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Pending<T>>>> {
        self.items.lock().map_err(poison_err)
    }

    /// Queues an item blocked on `waiting_for`.
    pub fn push(&self, item: T, waiting_for: Dependency) -> Result<()> {
        self.lock()?.push(Pending { item, waiting_for });
        Ok(())
    }

    /// Number of queued items.
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Retries every queued item once, in queue order.
    ///
    /// The queue stays locked for the whole sweep, so items pushed from
    /// other threads wait for the next one.
    pub fn sweep(
        &self,
        mut attempt: impl FnMut(&mut T) -> Result<Resolution<()>>,
    ) -> Result<SweepOutcome> {
        let mut items = self.lock()?;
        let mut resolved = 0;
        let mut index = 0;
        while index < items.len() {
            match attempt(&mut items[index].item)? {
                Resolution::Resolved(()) => {
                    items.remove(index);
                    resolved += 1;
                }
                Resolution::Missing(dependency) => {
                    items[index].waiting_for = dependency;
                    index += 1;
                }
            }
        }
        Ok(SweepOutcome {
            resolved,
            remaining: items.len(),
        })
    }

    /// Describes every queued item with what it waits for.
    pub fn describe(&self, describe: impl Fn(&T) -> String) -> Result<Vec<(String, Dependency)>> {
        Ok(self
            .lock()?
            .iter()
            .map(|pending| (describe(&pending.item), pending.waiting_for.clone()))
            .collect())
    }
}

impl<T> fmt::Debug for PendingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingQueue")
            .field("len", &self.len().ok())
            .finish()
    }
}

// =============================================================================
// Queue items
// =============================================================================

/// A result shape waiting for its parent shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingShape {
    shape: ResultShape,
}

impl PendingShape {
    /// Wraps a freshly built shape; its `fields` hold only its own mappings.
    #[must_use]
    pub fn new(shape: ResultShape) -> Self {
        Self { shape }
    }

    /// The shape as declared, before inheritance.
    #[must_use]
    pub fn shape(&self) -> &ResultShape {
        &self.shape
    }

    /// Registers the shape once its parent (if any) is registered.
    ///
    /// Inherited mappings come first; a parent mapping is dropped when the
    /// shape maps the same property itself, and all parent constructor
    /// arguments are dropped when the shape declares its own.
    pub fn resolve(&self, registry: &Registry) -> Result<Resolution<()>> {
        let effective = match &self.shape.extends {
            None => self.shape.clone(),
            Some(parent_id) => match registry.result_shape(parent_id)? {
                Some(parent) => self.inherit(&parent),
                None => {
                    return Ok(Resolution::Missing(Dependency::ResultShape(
                        parent_id.clone(),
                    )));
                }
            },
        };
        registry.add_result_shape(effective)?;
        Ok(Resolution::Resolved(()))
    }

    fn inherit(&self, parent: &ResultShape) -> ResultShape {
        let own = &self.shape.fields;
        let declares_constructor = own.iter().any(|f| f.flags.constructor);
        let inherited = parent
            .fields
            .iter()
            .filter(|p| !(declares_constructor && p.flags.constructor))
            .filter(|p| !own.iter().any(|f| f.same_property(p)));
        ResultShape {
            fields: inherited.chain(own.iter()).cloned().collect(),
            ..self.shape.clone()
        }
    }
}

/// A cache-sharing declaration waiting for the referenced cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingCacheLink {
    link: CacheLink,
}

impl PendingCacheLink {
    /// Wraps a declaration.
    #[must_use]
    pub fn new(link: CacheLink) -> Self {
        Self { link }
    }

    /// The declaration.
    #[must_use]
    pub fn link(&self) -> &CacheLink {
        &self.link
    }

    /// Points the owning namespace at the referenced cache, once it exists.
    ///
    /// A namespace that declares its own cache keeps using it.
    pub fn resolve(&self, registry: &Registry) -> Result<Resolution<()>> {
        if !registry.has_cache(&self.link.referenced)? {
            return Ok(Resolution::Missing(Dependency::Cache(
                self.link.referenced.clone(),
            )));
        }
        if !registry.has_cache(&self.link.namespace)? {
            registry.use_cache(&self.link.namespace, &self.link.referenced)?;
        }
        Ok(Resolution::Resolved(()))
    }
}

// =============================================================================
// PendingWork
// =============================================================================

/// Which queue an item sits in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PendingKind {
    /// Result shapes awaiting a parent.
    ResultShape,
    /// Cache links awaiting the referenced cache.
    CacheLink,
    /// Statements awaiting anything the statement builder needs.
    Statement,
}

impl fmt::Display for PendingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ResultShape => "result shape",
            Self::CacheLink => "cache link",
            Self::Statement => "statement",
        })
    }
}

/// An item still queued, as reported at the end of a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Residual {
    /// Queue the item sits in.
    pub kind: PendingKind,
    /// Id or description of the item.
    pub item: String,
    /// What it was missing on its last attempt.
    pub waiting_for: Dependency,
}

impl fmt::Display for Residual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} (waiting for {})", self.kind, self.item, self.waiting_for)
    }
}

/// The three session-wide pending queues.
#[derive(Debug, Default)]
pub struct PendingWork {
    shapes: PendingQueue<PendingShape>,
    cache_links: PendingQueue<PendingCacheLink>,
    statements: PendingQueue<Box<dyn StatementUnit>>,
}

impl PendingWork {
    /// Creates empty queues.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Result shapes awaiting a parent.
    #[must_use]
    pub fn shapes(&self) -> &PendingQueue<PendingShape> {
        &self.shapes
    }

    /// Cache links awaiting the referenced cache.
    #[must_use]
    pub fn cache_links(&self) -> &PendingQueue<PendingCacheLink> {
        &self.cache_links
    }

    /// Statements awaiting a dependency.
    #[must_use]
    pub fn statements(&self) -> &PendingQueue<Box<dyn StatementUnit>> {
        &self.statements
    }

    /// Runs one sweep of each queue: shapes, then cache links, then statements.
    ///
    /// Returns the number of items resolved across all three.
    pub fn sweep_all(&self, registry: &Registry) -> Result<usize> {
        let shapes = self.shapes.sweep(|pending| pending.resolve(registry))?;
        let links = self.cache_links.sweep(|pending| pending.resolve(registry))?;
        let statements = self.statements.sweep(|unit| unit.parse(registry))?;

        let resolved = shapes.resolved + links.resolved + statements.resolved;
        if resolved > 0 || shapes.remaining + links.remaining + statements.remaining > 0 {
            debug!(
                resolved,
                shapes = shapes.remaining,
                cache_links = links.remaining,
                statements = statements.remaining,
                "pending sweep finished"
            );
        } else {
            trace!("pending sweep found nothing to do");
        }
        Ok(resolved)
    }

    /// Sweeps repeatedly until a sweep resolves nothing.
    ///
    /// Needed when dependencies chain inside one queue in reverse order,
    /// e.g. `A extends B extends C` queued as A, B and completed by C.
    pub fn settle(&self, registry: &Registry) -> Result<usize> {
        let mut total = 0;
        loop {
            let resolved = self.sweep_all(registry)?;
            if resolved == 0 {
                return Ok(total);
            }
            total += resolved;
        }
    }

    /// Returns true if all three queues are empty.
    pub fn is_drained(&self) -> Result<bool> {
        Ok(self.shapes.is_empty()?
            && self.cache_links.is_empty()?
            && self.statements.is_empty()?)
    }

    /// Lists every queued item across the three queues.
    pub fn residuals(&self) -> Result<Vec<Residual>> {
        let tag = |kind: PendingKind| {
            move |(item, waiting_for): (String, Dependency)| Residual {
                kind,
                item,
                waiting_for,
            }
        };
        let shapes = self
            .shapes
            .describe(|p| p.shape.id.clone())?
            .into_iter()
            .map(tag(PendingKind::ResultShape));
        let links = self
            .cache_links
            .describe(|p| p.link.namespace.clone())?
            .into_iter()
            .map(tag(PendingKind::CacheLink));
        let statements = self
            .statements
            .describe(|unit| unit.id())?
            .into_iter()
            .map(tag(PendingKind::Statement));
        Ok(shapes.chain(links).chain(statements).collect())
    }
}

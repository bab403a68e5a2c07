//! `sql` fragment registration and the dialect matching rule.

use rowmap_foundation::{Error, Node, Result};
use rowmap_registry::{Fragment, Registry};
use tracing::trace;

use crate::scope::NamespaceScope;

/// Decides whether an item tagged `own` may be registered.
///
/// With a required dialect, only items of exactly that dialect match. Without
/// one, only untagged items match, and only if the entry already registered
/// under the same id is not dialect-specific.
#[must_use]
pub fn dialect_matches(own: Option<&str>, required: Option<&str>, existing_is_specific: bool) -> bool {
    match required {
        Some(required) => own == Some(required),
        None => own.is_none() && !existing_is_specific,
    }
}

/// Registers the document's `sql` elements that match `required`.
///
/// Returns the number of fragments registered.
pub fn register_fragments(
    root: &Node,
    scope: &NamespaceScope,
    registry: &Registry,
    required: Option<&str>,
) -> Result<usize> {
    let mut registered = 0;
    for node in root.children_named("sql") {
        let local_id = node
            .non_empty_attr("id")
            .ok_or_else(|| Error::missing_attribute("sql", "id"))?;
        let id = scope.qualify_definition(local_id)?;
        let dialect = node.non_empty_attr("databaseId");
        let fragment = Fragment::new(id.as_str(), dialect, node.clone());

        let accepted = registry.register_fragment_if(fragment, |existing| {
            dialect_matches(dialect, required, existing.is_some_and(Fragment::is_dialect_specific))
        })?;
        if accepted {
            registered += 1;
        } else {
            trace!(fragment = %id, dialect = ?dialect, required = ?required, "fragment skipped");
        }
    }
    Ok(registered)
}

//! Reusable statement-text fragments.

use rowmap_foundation::Node;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A named chunk of statement text, optionally specific to one dialect.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Fragment {
    /// Qualified id.
    pub id: String,
    /// Dialect tag; `None` for dialect-agnostic text.
    pub dialect: Option<String>,
    /// The fragment's element, kept verbatim for the statement builder.
    pub node: Node,
}

impl Fragment {
    /// Creates a fragment.
    #[must_use]
    pub fn new(id: impl Into<String>, dialect: Option<&str>, node: Node) -> Self {
        Self {
            id: id.into(),
            dialect: dialect.filter(|d| !d.is_empty()).map(String::from),
            node,
        }
    }

    /// Returns true if the fragment is tied to a dialect.
    #[must_use]
    pub fn is_dialect_specific(&self) -> bool {
        self.dialect.is_some()
    }
}

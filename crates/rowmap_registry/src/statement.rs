//! Compiled statement definitions.

use std::fmt;

use rowmap_foundation::{Node, TypeName};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What a statement does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StatementKind {
    /// `select`
    Select,
    /// `insert`
    Insert,
    /// `update`
    Update,
    /// `delete`
    Delete,
}

impl StatementKind {
    /// Maps an element name to a statement kind.
    #[must_use]
    pub fn from_element(name: &str) -> Option<Self> {
        match name {
            "select" => Some(Self::Select),
            "insert" => Some(Self::Insert),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Returns true for `select`.
    #[must_use]
    pub const fn is_select(self) -> bool {
        matches!(self, Self::Select)
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// A statement ready for the execution layer.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StatementDef {
    /// Qualified id.
    pub id: String,
    /// Statement kind.
    pub kind: StatementKind,
    /// Dialect tag the statement was declared for.
    pub dialect: Option<String>,
    /// Qualified ids of the result shapes, in declaration order.
    pub result_shapes: Vec<String>,
    /// Qualified id of the legacy parameter shape.
    pub parameter_shape: Option<String>,
    /// Inline result type.
    pub result_type: Option<TypeName>,
    /// Inline parameter type.
    pub parameter_type: Option<TypeName>,
    /// Namespace whose cache serves this statement.
    pub cache: Option<String>,
    /// Whether results are stored in the cache.
    pub use_cache: bool,
    /// Whether executing flushes the cache.
    pub flush_cache: bool,
    /// Query timeout in seconds.
    pub timeout: Option<i32>,
    /// Driver fetch-size hint.
    pub fetch_size: Option<i32>,
    /// Qualified ids of the fragments included by the body.
    pub includes: Vec<String>,
    /// The statement element, kept for the execution layer.
    pub body: Node,
}

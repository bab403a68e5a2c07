//! Outcome of an attempt that may depend on not-yet-registered metadata.
//!
//! A missing dependency is an expected state while documents are still being
//! loaded, so it travels as a value ([`Resolution::Missing`]) next to the
//! fatal [`crate::Error`] channel rather than through it.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A named piece of metadata some item is waiting for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Dependency {
    /// A result shape by qualified id.
    ResultShape(String),
    /// A parameter shape by qualified id.
    ParameterShape(String),
    /// The cache configuration of a namespace.
    Cache(String),
    /// A reusable fragment by qualified id.
    Fragment(String),
    /// A statement by qualified id.
    Statement(String),
}

impl Dependency {
    /// Returns the id of the missing entity.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::ResultShape(id)
            | Self::ParameterShape(id)
            | Self::Cache(id)
            | Self::Fragment(id)
            | Self::Statement(id) => id,
        }
    }

    /// Returns a short name for the kind of entity.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ResultShape(_) => "result shape",
            Self::ParameterShape(_) => "parameter shape",
            Self::Cache(_) => "cache",
            Self::Fragment(_) => "fragment",
            Self::Statement(_) => "statement",
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind(), self.id())
    }
}

/// Either a finished value or the dependency that blocked it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub enum Resolution<T> {
    /// The attempt succeeded.
    Resolved(T),
    /// The attempt needs a dependency that is not registered yet.
    Missing(Dependency),
}

impl<T> Resolution<T> {
    /// Returns true if the attempt succeeded.
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Returns the missing dependency, if any.
    pub const fn missing(&self) -> Option<&Dependency> {
        match self {
            Self::Resolved(_) => None,
            Self::Missing(dependency) => Some(dependency),
        }
    }

    /// Maps the resolved value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Self::Resolved(value) => Resolution::Resolved(f(value)),
            Self::Missing(dependency) => Resolution::Missing(dependency),
        }
    }
}

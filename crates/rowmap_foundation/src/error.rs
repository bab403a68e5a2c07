//! Error types for the rowmap system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Every error here is fatal for the document being compiled; the retryable
//! "dependency not yet registered" signal is [`crate::Resolution::Missing`],
//! which is a value, not an error.

use std::fmt;

use thiserror::Error;

use crate::resolution::Dependency;

/// The main error type for rowmap operations.
#[derive(Debug, Error)]
#[error("{kind}{}", display_context(.context))]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error, replacing any existing context.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Pushes an activity frame onto this error's trail.
    ///
    /// Frames are pushed innermost first, so the trail reads from the
    /// failing element outwards.
    #[must_use]
    pub fn in_activity(mut self, activity: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_frame(activity));
        self
    }

    /// Attaches the resource being compiled and the activity under way.
    ///
    /// Keeps an already recorded resource, so wrapping twice is harmless.
    #[must_use]
    pub fn in_resource(mut self, resource: &str, activity: Option<&str>) -> Self {
        let mut context = self.context.take().unwrap_or_default();
        if context.resource.is_none() {
            context.resource = Some(resource.to_string());
        }
        if context.activity.is_none() {
            context.activity = activity.map(String::from);
        }
        self.context = Some(context);
        self
    }

    /// Creates an empty namespace error.
    #[must_use]
    pub fn empty_namespace() -> Self {
        Self::new(ErrorKind::EmptyNamespace)
    }

    /// Creates a missing attribute error.
    #[must_use]
    pub fn missing_attribute(element: &str, attribute: &str) -> Self {
        Self::new(ErrorKind::MissingAttribute {
            element: element.to_string(),
            attribute: attribute.to_string(),
        })
    }

    /// Creates an invalid attribute value error.
    #[must_use]
    pub fn invalid_attribute(element: &str, attribute: &str, value: &str, expected: &str) -> Self {
        Self::new(ErrorKind::InvalidAttribute {
            element: element.to_string(),
            attribute: attribute.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        })
    }

    /// Creates an unknown type error.
    #[must_use]
    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownType(name.into()))
    }

    /// Creates an ambiguous collection error.
    #[must_use]
    pub fn ambiguous_collection(property: impl Into<String>) -> Self {
        Self::new(ErrorKind::AmbiguousCollection {
            property: property.into(),
        })
    }

    /// Creates a duplicate registration error.
    #[must_use]
    pub fn duplicate(entity: &'static str, id: impl Into<String>) -> Self {
        Self::new(ErrorKind::Duplicate {
            entity,
            id: id.into(),
        })
    }

    /// Creates a residual unresolved error from the still-queued items.
    #[must_use]
    pub fn unresolved(items: Vec<(String, Dependency)>) -> Self {
        Self::new(ErrorKind::Unresolved(items))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns true if this is a structural error about the document itself
    /// rather than a session-level residual.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        !matches!(self.kind, ErrorKind::Unresolved(_))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// The root element has no `namespace`, or it is empty.
    #[error("descriptor namespace cannot be empty")]
    EmptyNamespace,

    /// A required attribute is absent.
    #[error("<{element}> requires a '{attribute}' attribute")]
    MissingAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
    },

    /// An attribute value could not be interpreted.
    #[error("invalid value '{value}' for {element}@{attribute}: expected {expected}")]
    InvalidAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
        /// The offending value.
        value: String,
        /// What was expected instead.
        expected: String,
    },

    /// A type name resolved through neither the alias table nor the loader.
    #[error("could not resolve type '{0}'")]
    UnknownType(String),

    /// A JDBC type tag is not recognised.
    #[error("unknown jdbc type '{0}'")]
    InvalidJdbcType(String),

    /// A parameter mode is not one of IN, OUT, INOUT.
    #[error("unknown parameter mode '{0}'")]
    InvalidParameterMode(String),

    /// A definition id contains dots that do not belong to the current namespace.
    #[error("dots are not allowed in element names, please remove it from '{0}'")]
    DottedIdentifier(String),

    /// A `collection` mapping whose element type cannot be determined.
    #[error("ambiguous collection type for property '{property}': specify 'javaType' or 'resultMap'")]
    AmbiguousCollection {
        /// The collection property.
        property: String,
    },

    /// An id is already registered for this entity kind.
    #[error("{entity} collection already contains value for '{id}'")]
    Duplicate {
        /// Entity kind, e.g. "result shape".
        entity: &'static str,
        /// The clashing id.
        id: String,
    },

    /// Items still queued when the caller declared the session finished.
    #[error("{} unresolved item(s): {}", .0.len(), describe_unresolved(.0))]
    Unresolved(Vec<(String, Dependency)>),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

fn describe_unresolved(items: &[(String, Dependency)]) -> String {
    items
        .iter()
        .map(|(item, dependency)| format!("{item} (waiting for {dependency})"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_context(context: &Option<ErrorContext>) -> String {
    context
        .as_ref()
        .map(|ctx| format!(" {ctx}"))
        .unwrap_or_default()
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Resource identifier of the descriptor document.
    pub resource: Option<String>,
    /// The section being processed when the error surfaced.
    pub activity: Option<String>,
    /// Trail of nested activities, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the resource identifier.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// Sets the activity.
    #[must_use]
    pub fn with_activity(mut self, activity: impl Into<String>) -> Self {
        self.activity = Some(activity.into());
        self
    }

    /// Adds a trail frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(resource) = &self.resource {
            write!(f, "in resource '{resource}'")?;
        }
        if let Some(activity) = &self.activity {
            if self.resource.is_some() {
                write!(f, ", ")?;
            }
            write!(f, "while {activity}")?;
        }
        for frame in &self.stack {
            write!(f, "\n  in {frame}")?;
        }
        Ok(())
    }
}

/// Result type alias using the rowmap [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

//! Namespace qualification of definitions and references.

use rowmap_foundation::{Error, ErrorKind, Node, Result};

/// The namespace of the document being compiled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespaceScope {
    namespace: String,
}

impl NamespaceScope {
    /// Creates a scope; an empty namespace is a structural error.
    pub fn new(namespace: &str) -> Result<Self> {
        if namespace.trim().is_empty() {
            return Err(Error::empty_namespace());
        }
        Ok(Self {
            namespace: namespace.to_string(),
        })
    }

    /// Reads the `namespace` attribute of a document's root element.
    pub fn from_document(root: &Node) -> Result<Self> {
        Self::new(root.attr("namespace").unwrap_or_default())
    }

    /// Returns the namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Qualifies the id of something this document defines.
    ///
    /// An id already prefixed with this namespace is kept as is; any other
    /// dotted id is rejected.
    pub fn qualify_definition(&self, id: &str) -> Result<String> {
        let already_qualified = id
            .strip_prefix(self.namespace.as_str())
            .is_some_and(|local| local.starts_with('.'));
        if already_qualified {
            return Ok(id.to_string());
        }
        if id.contains('.') {
            return Err(Error::new(ErrorKind::DottedIdentifier(id.to_string())));
        }
        Ok(format!("{}.{id}", self.namespace))
    }

    /// Qualifies a reference; dotted references are taken as qualified.
    #[must_use]
    pub fn qualify_reference(&self, id: &str) -> String {
        if id.contains('.') {
            id.to_string()
        } else {
            format!("{}.{id}", self.namespace)
        }
    }

    /// Builds the id of an anonymous shape from its element path.
    #[must_use]
    pub fn anonymous_id(&self, path: &str) -> String {
        format!("{}.{path}", self.namespace)
    }
}

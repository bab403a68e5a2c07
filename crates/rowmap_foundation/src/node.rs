//! Attributed descriptor tree.
//!
//! The compiler consumes documents that have already been tokenized into a
//! tree of elements: a name, string attributes in document order, ordered
//! children and optional text. Typed accessors interpret attribute strings
//! and report malformed values as structural errors.

use indexmap::IndexMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One element of a descriptor document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Node {
    name: String,
    attributes: IndexMap<String, String>,
    children: Vec<Node>,
    text: Option<String>,
}

impl Node {
    /// Creates an element with no attributes or children.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder method to set an attribute.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builder method to append a child element.
    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Builder method to append several child elements.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Builder method to set the element's text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Returns the element name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the element's text content.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns the children in document order.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Returns the children with the given element name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Returns the first child with the given element name.
    #[must_use]
    pub fn first_child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Returns all attributes in document order.
    #[must_use]
    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    /// Returns a string attribute as written, including empty values.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Returns a string attribute, treating an empty value as absent.
    #[must_use]
    pub fn non_empty_attr(&self, key: &str) -> Option<&str> {
        self.attr(key).filter(|value| !value.is_empty())
    }

    /// Returns the first non-empty attribute among `keys`.
    #[must_use]
    pub fn first_attr(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.non_empty_attr(key))
    }

    /// Returns true if the attribute is present.
    #[must_use]
    pub fn has_attr(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Parses an `i32` attribute.
    pub fn attr_i32(&self, key: &str) -> Result<Option<i32>> {
        self.parse_attr(key, "a 32-bit integer")
    }

    /// Parses an `i64` attribute.
    pub fn attr_i64(&self, key: &str) -> Result<Option<i64>> {
        self.parse_attr(key, "a 64-bit integer")
    }

    /// Parses a boolean attribute (`true`/`false`, case-insensitive).
    pub fn attr_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.non_empty_attr(key) {
            None => Ok(None),
            Some(value) if value.eq_ignore_ascii_case("true") => Ok(Some(true)),
            Some(value) if value.eq_ignore_ascii_case("false") => Ok(Some(false)),
            Some(value) => Err(Error::invalid_attribute(
                &self.name,
                key,
                value,
                "true or false",
            )),
        }
    }

    /// Parses a boolean attribute, falling back to `default` when absent.
    pub fn attr_bool_or(&self, key: &str, default: bool) -> Result<bool> {
        Ok(self.attr_bool(key)?.unwrap_or(default))
    }

    /// Reads `<property name=".." value=".."/>` children into an ordered map.
    pub fn children_as_properties(&self) -> Result<IndexMap<String, String>> {
        let mut properties = IndexMap::new();
        for child in self.children_named("property") {
            let name = child
                .non_empty_attr("name")
                .ok_or_else(|| Error::missing_attribute("property", "name"))?;
            let value = child.attr("value").unwrap_or_default();
            properties.insert(name.to_string(), value.to_string());
        }
        Ok(properties)
    }

    /// Returns the path segment identifying this element among its siblings.
    ///
    /// The segment is `name[value]`, where value is the first of `id`,
    /// `value` or `property`, or `name@index` when the element carries none
    /// of them. `%`, `.`, `[` and `]` in the value are percent-encoded, so
    /// distinct values give distinct segments and no segment contains a dot.
    #[must_use]
    pub fn identifier_segment(&self, index: usize) -> String {
        match self.first_attr(&["id", "value", "property"]) {
            Some(value) => format!("{}[{}]", self.name, escape_segment_value(value)),
            None => format!("{}@{index}", self.name),
        }
    }

    fn parse_attr<T: std::str::FromStr>(&self, key: &str, expected: &str) -> Result<Option<T>> {
        match self.non_empty_attr(key) {
            None => Ok(None),
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| Error::invalid_attribute(&self.name, key, value, expected)),
        }
    }
}

fn escape_segment_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            '.' => escaped.push_str("%2E"),
            '[' => escaped.push_str("%5B"),
            ']' => escaped.push_str("%5D"),
            c => escaped.push(c),
        }
    }
    escaped
}

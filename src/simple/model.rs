//! Simplified element graph
//!
//! The graph keeps only what structural autocomplete needs: for each element
//! its attributes (with their permitted literal values) and the names of its
//! direct children.

use indexmap::{IndexMap, IndexSet};

use crate::namespaces::QName;

/// Flattened element graph, one entry per distinct element name in the order
/// the elements were materialized
pub type SimpleGraph = IndexMap<QName, SimpleXmlElement>;

/// Simplified attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleXmlAttribute {
    /// Attribute name
    pub name: QName,
    /// Permitted literal values; empty means free text
    pub possible_values: IndexSet<String>,
}

impl SimpleXmlAttribute {
    /// Create an attribute accepting any value
    pub fn new(name: QName) -> Self {
        Self {
            name,
            possible_values: IndexSet::new(),
        }
    }

    /// Add a permitted value, returning whether it was new
    pub fn add_possible_value(&mut self, value: impl Into<String>) -> bool {
        self.possible_values.insert(value.into())
    }

    /// Whether any value is accepted
    pub fn is_free_text(&self) -> bool {
        self.possible_values.is_empty()
    }
}

/// Simplified element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleXmlElement {
    /// Element name
    pub name: QName,
    /// Whether the element is a document root candidate
    pub is_top_level: bool,
    attributes: IndexMap<QName, SimpleXmlAttribute>,
    children: IndexSet<QName>,
}

impl SimpleXmlElement {
    /// Create an element without attributes or children
    pub fn new(name: QName, is_top_level: bool) -> Self {
        Self {
            name,
            is_top_level,
            attributes: IndexMap::new(),
            children: IndexSet::new(),
        }
    }

    /// Insert an attribute unless one with the same name exists.
    ///
    /// Returns `false` and keeps the existing attribute when the name is
    /// already present.
    pub fn add_attribute(&mut self, attribute: SimpleXmlAttribute) -> bool {
        if self.attributes.contains_key(&attribute.name) {
            return false;
        }
        self.attributes.insert(attribute.name.clone(), attribute);
        true
    }

    /// Insert a child name, returning whether it was new
    pub fn add_child(&mut self, name: QName) -> bool {
        self.children.insert(name)
    }

    /// Attributes in insertion order
    pub fn attributes(&self) -> impl Iterator<Item = &SimpleXmlAttribute> {
        self.attributes.values()
    }

    /// Look up an attribute by name
    pub fn attribute(&self, name: &QName) -> Option<&SimpleXmlAttribute> {
        self.attributes.get(name)
    }

    /// Direct child names in discovery order
    pub fn children(&self) -> impl Iterator<Item = &QName> {
        self.children.iter()
    }

    /// Whether `name` is a direct child
    pub fn has_child(&self, name: &QName) -> bool {
        self.children.contains(name)
    }

    /// Number of attributes
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Number of direct children
    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

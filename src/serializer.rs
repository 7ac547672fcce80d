//! CodeMirror schema-info serialization
//!
//! Renders a [`SimpleGraph`] as the object CodeMirror's XML hint addon
//! expects:
//!
//! ```json
//! {
//!   "!top": ["book"],
//!   "book": {
//!     "attrs": { "id": null, "lang": ["de", "en"] },
//!     "children": ["author", "title"]
//!   },
//!   "title": {}
//! }
//! ```
//!
//! Key order is part of the format. `"!top"` comes first, elements and
//! children are sorted ordinally, and attribute names and values are sorted
//! ignoring case.

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::Result;
use crate::simple::{SimpleGraph, SimpleXmlAttribute, SimpleXmlElement};

/// Compare ignoring case, falling back to ordinal order so that sorting is
/// total and deterministic
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

/// Serializes a simplified element graph to CodeMirror schema info
#[derive(Debug, Clone, Copy)]
pub struct CodeMirrorSerializer<'g> {
    graph: &'g SimpleGraph,
    pretty: bool,
}

#[derive(Serialize)]
struct SchemaInfo {
    #[serde(rename = "!top", skip_serializing_if = "Vec::is_empty")]
    top: Vec<String>,
    #[serde(flatten)]
    elements: IndexMap<String, ElementInfo>,
}

#[derive(Serialize)]
struct ElementInfo {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    attrs: IndexMap<String, Option<Vec<String>>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<String>,
}

impl<'g> CodeMirrorSerializer<'g> {
    /// Create a compact serializer for `graph`
    pub fn new(graph: &'g SimpleGraph) -> Self {
        Self {
            graph,
            pretty: false,
        }
    }

    /// Indent the output with two spaces per level
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Render the graph
    pub fn to_json_string(&self) -> Result<String> {
        let info = self.schema_info();
        let json = if self.pretty {
            serde_json::to_string_pretty(&info)?
        } else {
            serde_json::to_string(&info)?
        };
        Ok(json)
    }

    fn schema_info(&self) -> SchemaInfo {
        let mut elements: Vec<&SimpleXmlElement> = self.graph.values().collect();
        elements.sort_by_cached_key(|element| element.name.to_string());

        let top = elements
            .iter()
            .filter(|element| element.is_top_level)
            .map(|element| element.name.to_string())
            .collect();

        SchemaInfo {
            top,
            elements: elements
                .into_iter()
                .map(|element| (element.name.to_string(), element_info(element)))
                .collect(),
        }
    }
}

fn element_info(element: &SimpleXmlElement) -> ElementInfo {
    let mut attributes: Vec<(String, &SimpleXmlAttribute)> = element
        .attributes()
        .map(|attribute| (attribute.name.to_string(), attribute))
        .collect();
    attributes.sort_by(|(a, _), (b, _)| cmp_ignore_case(a, b));

    let mut children: Vec<String> = element.children().map(|name| name.to_string()).collect();
    children.sort();

    ElementInfo {
        attrs: attributes
            .into_iter()
            .map(|(name, attribute)| (name, possible_values(attribute)))
            .collect(),
        children,
    }
}

/// `None` renders as null, meaning any value is accepted
fn possible_values(attribute: &SimpleXmlAttribute) -> Option<Vec<String>> {
    if attribute.is_free_text() {
        return None;
    }
    let mut values: Vec<String> = attribute.possible_values.iter().cloned().collect();
    values.sort_by(|a, b| cmp_ignore_case(a, b));
    Some(values)
}

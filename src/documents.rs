//! XML document handling
//!
//! Schema documents are read with quick-xml into an owned element tree.
//! Every element carries its full in-scope namespace context so that
//! QName-valued attributes (`type`, `ref`, `base`) can be resolved against
//! the declarations visible at that node.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::namespaces::{NamespaceContext, QName};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

/// XML Element in the document tree
#[derive(Debug, Clone)]
pub struct Element {
    /// Element qualified name
    pub qname: QName,
    /// Element attributes (namespace declarations excluded)
    pub attributes: HashMap<QName, String>,
    /// Child elements
    pub children: Vec<Element>,
    /// In-scope namespace context for this element
    pub namespaces: NamespaceContext,
}

impl Element {
    /// Create a new element
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            attributes: HashMap::new(),
            children: Vec::new(),
            namespaces: NamespaceContext::new(),
        }
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.qname.local_name
    }

    /// Get the namespace of the element
    pub fn namespace(&self) -> Option<&str> {
        self.qname.namespace()
    }

    /// Get an unprefixed attribute value by name
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(&QName::local(name))
            .map(|s| s.as_str())
    }

    /// Get an attribute value by qualified name
    pub fn get_attribute_qname(&self, qname: &QName) -> Option<&str> {
        self.attributes.get(qname).map(|s| s.as_str())
    }

    /// Resolve a QName-valued attribute against this element's namespaces
    pub fn resolve_qname(&self, prefixed_name: &str) -> Result<QName> {
        self.namespaces.resolve(prefixed_name.trim())
    }

    /// Add a child element
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Find child elements by local name
    pub fn find_children(&self, local_name: &str) -> Vec<&Element> {
        self.children
            .iter()
            .filter(|e| e.local_name() == local_name)
            .collect()
    }

    /// First child with the given local name
    pub fn find_child(&self, local_name: &str) -> Option<&Element> {
        self.children.iter().find(|e| e.local_name() == local_name)
    }
}

/// XML Document representation
#[derive(Debug, Default)]
pub struct Document {
    /// Root element of the document
    pub root: Option<Element>,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Parse an XML document from a string
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse(xml.as_bytes())
    }

    /// Parse an XML document from bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        Self::parse_with_limits(xml, &Limits::default())
    }

    /// Parse an XML document from bytes, enforcing the nesting limit
    pub fn parse_with_limits(xml: &[u8], limits: &Limits) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.trim_text(true);

        let mut doc = Document::new();
        let mut element_stack: Vec<Element> = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    limits.check_xml_depth(element_stack.len() + 1)?;
                    let element = Self::parse_element(&reader, &e, element_stack.last())?;
                    element_stack.push(element);
                }
                Ok(Event::End(_)) => {
                    if let Some(current) = element_stack.pop() {
                        if let Some(parent) = element_stack.last_mut() {
                            parent.add_child(current);
                        } else {
                            doc.root = Some(current);
                        }
                    }
                }
                Ok(Event::Empty(e)) => {
                    limits.check_xml_depth(element_stack.len() + 1)?;
                    let element = Self::parse_element(&reader, &e, element_stack.last())?;
                    if let Some(parent) = element_stack.last_mut() {
                        parent.add_child(element);
                    } else {
                        doc.root = Some(element);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!(
                        "Error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                // Text, comments, processing instructions and the like carry
                // nothing a schema reader needs.
                _ => {}
            }
            buf.clear();
        }

        if !element_stack.is_empty() {
            return Err(Error::Xml("Unexpected end of document: unclosed element".to_string()));
        }

        Ok(doc)
    }

    /// Parse element from BytesStart event, inheriting the parent's namespaces.
    ///
    /// Names and values are decoded with the encoding the reader detected
    /// from the byte order mark or the XML declaration.
    fn parse_element(
        reader: &Reader<&[u8]>,
        start: &BytesStart,
        parent: Option<&Element>,
    ) -> Result<Element> {
        let decoder = reader.decoder();
        let name_bytes = start.name();
        let name = decoder
            .decode(name_bytes.as_ref())
            .map_err(|e| Error::Xml(format!("Invalid element name: {}", e)))?
            .into_owned();

        let mut namespaces = parent
            .map(|p| p.namespaces.clone())
            .unwrap_or_default();
        let mut raw_attributes = Vec::new();

        for attr_result in start.attributes() {
            let attr = attr_result
                .map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;

            let attr_name = decoder
                .decode(attr.key.as_ref())
                .map_err(|e| Error::Xml(format!("Invalid attribute name: {}", e)))?
                .into_owned();

            let attr_value = attr
                .decode_and_unescape_value(reader)
                .map_err(|e| Error::Xml(format!("Failed to unescape attribute value: {}", e)))?
                .to_string();

            if attr_name == "xmlns" {
                namespaces.set_default_namespace(&attr_value);
            } else if let Some(prefix) = attr_name.strip_prefix("xmlns:") {
                namespaces.add_prefix(prefix, &attr_value);
            } else {
                raw_attributes.push((attr_name, attr_value));
            }
        }

        // Declarations on this element are in scope for its own name.
        let qname = match name.split_once(':') {
            Some((prefix, local)) => {
                let ns = namespaces.get_namespace(prefix).ok_or_else(|| {
                    Error::Namespace(format!("Unknown prefix '{}' on element '{}'", prefix, name))
                })?;
                QName::namespaced(ns, local)
            }
            None => QName::new(namespaces.get_default_namespace(), name.as_str()),
        };

        let mut element = Element::new(qname);
        for (attr_name, attr_value) in raw_attributes {
            // Unprefixed attributes are never in the default namespace.
            let attr_qname = match attr_name.split_once(':') {
                Some(_) => namespaces.resolve(&attr_name)?,
                None => QName::local(attr_name),
            };
            element.attributes.insert(attr_qname, attr_value);
        }
        element.namespaces = namespaces;

        Ok(element)
    }

    /// Get the root element
    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_creation() {
        let doc = Document::new();
        assert!(doc.root.is_none());
    }

    #[test]
    fn test_parse_simple_xml() {
        let xml = r#"<root><child>text</child></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.local_name(), "root");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].local_name(), "child");
    }

    #[test]
    fn test_parse_with_attributes() {
        let xml = r#"<root attr1="value1" attr2="a &amp; b"><child/></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.get_attribute("attr1"), Some("value1"));
        assert_eq!(root.get_attribute("attr2"), Some("a & b"));
    }

    #[test]
    fn test_namespaces_are_inherited_and_resolved() {
        let xml = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:t="urn:t">
            <xs:element name="a" type="t:aType"/>
        </xs:schema>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.namespace(), Some("http://www.w3.org/2001/XMLSchema"));
        let element = &root.children[0];
        assert_eq!(element.namespace(), Some("http://www.w3.org/2001/XMLSchema"));
        let type_name = element.resolve_qname(element.get_attribute("type").unwrap()).unwrap();
        assert_eq!(type_name, QName::namespaced("urn:t", "aType"));
    }

    #[test]
    fn test_default_namespace_applies_to_elements_only() {
        let xml = r#"<root xmlns="http://example.com" id="1"/>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.namespace(), Some("http://example.com"));
        assert_eq!(root.get_attribute("id"), Some("1"));
    }

    #[test]
    fn test_unknown_element_prefix_fails() {
        let result = Document::from_string(r#"<x:root/>"#);
        assert!(matches!(result, Err(Error::Namespace(_))));
    }

    #[test]
    fn test_unclosed_document_fails() {
        assert!(Document::from_string("<root><child>").is_err());
    }

    #[test]
    fn test_depth_limit() {
        let xml = "<a><b><c><d/></c></b></a>";
        let limits = Limits::default().with_max_xml_depth(2);
        assert!(matches!(
            Document::parse_with_limits(xml.as_bytes(), &limits),
            Err(Error::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_latin1_declaration_is_decoded() {
        let mut xml = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><root label=\"".to_vec();
        xml.extend_from_slice(&[b'G', 0xFC, b'r']);
        xml.extend_from_slice(b"\"/>");

        let doc = Document::parse(&xml).unwrap();
        assert_eq!(doc.root.unwrap().get_attribute("label"), Some("G\u{fc}r"));
    }

    #[test]
    fn test_find_children() {
        let xml = r#"<root><child1/><child2/><child1/></root>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root.unwrap();
        assert_eq!(root.find_children("child1").len(), 2);
        assert!(root.find_child("child2").is_some());
    }
}

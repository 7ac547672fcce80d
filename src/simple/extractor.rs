//! Element and attribute extraction
//!
//! Turns one element declaration into a [`SimpleXmlElement`], reporting the
//! child declarations the builder still has to visit.

use std::sync::Arc;

use super::model::{SimpleXmlAttribute, SimpleXmlElement};
use super::walker::ParticleWalker;
use crate::compiler::{AttributeDecl, CompiledSchema, ContentType, ElementDecl};
use crate::error::Result;
use crate::logger::Logger;

/// Builds simplified elements from declarations of one compiled schema
pub struct ElementExtractor<'s> {
    schema: &'s CompiledSchema,
    log: &'s Logger,
}

impl<'s> ElementExtractor<'s> {
    /// Create an extractor over `schema`
    pub fn new(schema: &'s CompiledSchema, log: &'s Logger) -> Self {
        Self { schema, log }
    }

    /// Build the simplified element for `decl`.
    ///
    /// Returns the element and the declarations of its direct children, one
    /// per distinct child name, in content-model order.
    pub fn extract(
        &self,
        decl: &ElementDecl,
        is_top_level: bool,
    ) -> Result<(SimpleXmlElement, Vec<Arc<ElementDecl>>)> {
        let mut element = SimpleXmlElement::new(decl.name.clone(), is_top_level);
        let mut pending = Vec::new();

        let content = match self.schema.content_type(decl)? {
            ContentType::Simple => return Ok((element, pending)),
            ContentType::Complex(content) => content,
        };

        let _indent = self.log.indent();
        self.log.write_line(format_args!("Attributes"));
        {
            let _indent = self.log.indent();
            for attribute in content.attribute_uses.values() {
                element.add_attribute(self.extract_attribute(attribute)?);
                self.log.write_line(format_args!("{}", attribute.name.local_name));
            }
        }

        self.log
            .write_line(format_args!("Child Particle {}", content.particle.describe()));
        let _indent = self.log.indent();
        for child in ParticleWalker::new(self.schema, self.log).walk(&content.particle)? {
            if element.add_child(child.name.clone()) {
                pending.push(child);
            }
        }

        Ok((element, pending))
    }

    /// Build the simplified attribute for `decl`, with its enumeration
    /// literals as possible values
    pub fn extract_attribute(&self, decl: &AttributeDecl) -> Result<SimpleXmlAttribute> {
        let mut attribute = SimpleXmlAttribute::new(decl.name.clone());
        for value in self.schema.enumeration(decl)? {
            attribute.add_possible_value(value);
        }
        Ok(attribute)
    }
}

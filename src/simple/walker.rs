//! Content-model particle walker
//!
//! Expands a content particle into the element declarations directly
//! reachable through it. Element declarations are leaves: their own content
//! is explored later, when the graph builder dequeues them.

use std::collections::HashSet;
use std::sync::Arc;

use crate::compiler::{CompiledSchema, ElementDecl, ElementParticle, Particle};
use crate::error::{Error, Result};
use crate::logger::Logger;
use crate::namespaces::QName;

/// Walks content-model particles of one compiled schema
pub struct ParticleWalker<'s> {
    schema: &'s CompiledSchema,
    log: &'s Logger,
}

impl<'s> ParticleWalker<'s> {
    /// Create a walker over `schema`
    pub fn new(schema: &'s CompiledSchema, log: &'s Logger) -> Self {
        Self { schema, log }
    }

    /// Element declarations directly reachable through `particle`, in
    /// document order.
    ///
    /// A named group is entered at most once per call, which cuts off
    /// mutually recursive groups.
    pub fn walk(&self, particle: &Particle) -> Result<Vec<Arc<ElementDecl>>> {
        let mut entered = HashSet::new();
        let mut elements = Vec::new();
        self.walk_particle(particle, &mut entered, &mut elements)?;
        Ok(elements)
    }

    fn walk_particle(
        &self,
        particle: &Particle,
        entered: &mut HashSet<QName>,
        elements: &mut Vec<Arc<ElementDecl>>,
    ) -> Result<()> {
        match particle {
            Particle::Group(group) => {
                self.log.write_line(format_args!("Parsing group {}", group.model));
                let _indent = self.log.indent();
                for item in &group.particles {
                    self.walk_particle(item, entered, elements)?;
                }
            }
            Particle::GroupRef(name) => {
                if !entered.insert(name.clone()) {
                    self.log.write_line(format_args!("Group {} already entered", name));
                    return Ok(());
                }
                self.log.write_line(format_args!("Parsing groupRef {}", name));
                let _indent = self.log.indent();
                let group = self.schema.group(name)?;
                self.walk_particle(group, entered, elements)?;
            }
            Particle::Element(element) => {
                let decl = self.schema.element_particle(element)?;
                if let ElementParticle::Ref(_) = element {
                    let members = self.schema.substitution_members(&decl);
                    if !members.is_empty() {
                        self.log.write_line(format_args!(
                            "Substitution group {} has {} member(s)",
                            decl.name,
                            members.len()
                        ));
                    }
                    elements.push(decl);
                    elements.extend(members);
                } else {
                    elements.push(decl);
                }
            }
            Particle::Any | Particle::Empty => {}
            Particle::Unsupported(tag) => {
                return Err(Error::UnsupportedConstruct(format!(
                    "content model particle xs:{}",
                    tag
                )));
            }
        }
        Ok(())
    }
}

//! XSD Document Parsing
//!
//! This module reads one `xs:schema` document into its schema components.
//! Includes and imports are only recorded here; loading them is the job of
//! the worklist in [`CompiledSchema`](super::CompiledSchema).

use std::sync::Arc;

use super::components::{
    AttributeDecl, AttributeItem, AttributeTarget, AttributeUse, ComplexTypeDef, Derivation,
    DerivationMethod, ElementDecl, ElementParticle, ModelGroup, ModelType, Particle,
    SimpleTypeDef, SimpleVariety, TypeDefinition, TypeRef,
};
use crate::documents::Element;
use crate::error::{Error, ParseError, Result};
use crate::namespaces::QName;
use crate::{XSD_1_0_NAMESPACE, XSD_1_1_NAMESPACE};

/// XSD element local names
mod xsd_elements {
    pub const SCHEMA: &str = "schema";
    pub const ELEMENT: &str = "element";
    pub const COMPLEX_TYPE: &str = "complexType";
    pub const SIMPLE_TYPE: &str = "simpleType";
    pub const ATTRIBUTE: &str = "attribute";
    pub const ATTRIBUTE_GROUP: &str = "attributeGroup";
    pub const GROUP: &str = "group";
    pub const SEQUENCE: &str = "sequence";
    pub const CHOICE: &str = "choice";
    pub const ALL: &str = "all";
    pub const ANNOTATION: &str = "annotation";
    pub const IMPORT: &str = "import";
    pub const INCLUDE: &str = "include";
    pub const REDEFINE: &str = "redefine";
    pub const OVERRIDE: &str = "override";
    pub const RESTRICTION: &str = "restriction";
    pub const EXTENSION: &str = "extension";
    pub const LIST: &str = "list";
    pub const UNION: &str = "union";
    pub const COMPLEX_CONTENT: &str = "complexContent";
    pub const SIMPLE_CONTENT: &str = "simpleContent";
    pub const ANY: &str = "any";
    pub const ANY_ATTRIBUTE: &str = "anyAttribute";
    pub const ASSERT: &str = "assert";
    pub const NOTATION: &str = "notation";
    pub const DEFAULT_OPEN_CONTENT: &str = "defaultOpenContent";
    pub const ENUMERATION: &str = "enumeration";
}

/// XSD attribute names
mod xsd_attrs {
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const REF: &str = "ref";
    pub const TARGET_NAMESPACE: &str = "targetNamespace";
    pub const ELEMENT_FORM_DEFAULT: &str = "elementFormDefault";
    pub const ATTRIBUTE_FORM_DEFAULT: &str = "attributeFormDefault";
    pub const FORM: &str = "form";
    pub const BASE: &str = "base";
    pub const VALUE: &str = "value";
    pub const SUBSTITUTION_GROUP: &str = "substitutionGroup";
    pub const NAMESPACE: &str = "namespace";
    pub const SCHEMA_LOCATION: &str = "schemaLocation";
    pub const MAX_OCCURS: &str = "maxOccurs";
    pub const USE: &str = "use";
    pub const BLOCK: &str = "block";
    pub const BLOCK_DEFAULT: &str = "blockDefault";
}

/// How a document entered the compilation
#[derive(Debug, Clone)]
pub(crate) enum DocumentRole {
    /// The primary schema
    Root,
    /// xs:include or xs:redefine from a schema with this target namespace
    Include(Option<String>),
    /// xs:import
    Import,
}

/// Kind of a reference to another schema document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReferenceKind {
    Include,
    Import,
    Redefine,
}

/// xs:include, xs:import or xs:redefine found in a document
#[derive(Debug, Clone)]
pub(crate) struct SchemaReference {
    pub kind: ReferenceKind,
    pub location: Option<String>,
    pub namespace: Option<String>,
}

/// Components declared by one schema document
#[derive(Debug, Default)]
pub(crate) struct SchemaDocument {
    /// Effective target namespace (after chameleon adoption)
    pub target_namespace: Option<String>,
    pub elements: Vec<Arc<ElementDecl>>,
    pub types: Vec<(QName, Arc<TypeDefinition>)>,
    pub groups: Vec<(QName, Arc<Particle>)>,
    pub attribute_groups: Vec<(QName, Arc<Vec<AttributeItem>>)>,
    pub attributes: Vec<(QName, Arc<AttributeDecl>)>,
    pub references: Vec<SchemaReference>,
    /// Top-level tags that were not understood
    pub skipped: Vec<String>,
}

/// Parse one `xs:schema` root element
pub(crate) fn parse_schema_document(
    root: &Element,
    location: &str,
    role: &DocumentRole,
) -> Result<SchemaDocument> {
    let parser = DocumentParser::new(root, location, role)?;
    parser.parse(root)
}

/// The target namespace a schema root declares
pub(crate) fn declared_target_namespace(root: &Element) -> Option<String> {
    root.get_attribute(xsd_attrs::TARGET_NAMESPACE)
        .map(str::trim)
        .filter(|ns| !ns.is_empty())
        .map(str::to_string)
}

/// Per-document parsing state
struct DocumentParser<'a> {
    location: &'a str,
    target_namespace: Option<String>,
    /// No-namespace references are rewritten into the includer's namespace
    chameleon: bool,
    element_form_qualified: bool,
    attribute_form_qualified: bool,
    block_default_substitution: bool,
}

impl<'a> DocumentParser<'a> {
    fn new(root: &Element, location: &'a str, role: &DocumentRole) -> Result<Self> {
        let is_xsd = matches!(root.namespace(), Some(XSD_1_0_NAMESPACE) | Some(XSD_1_1_NAMESPACE));
        if root.local_name() != xsd_elements::SCHEMA || !is_xsd {
            return Err(Error::Compile(
                ParseError::new(format!(
                    "Expected xs:schema root element, got {}",
                    root.qname
                ))
                .with_location(location),
            ));
        }

        let declared = declared_target_namespace(root);
        let (target_namespace, chameleon) = match role {
            DocumentRole::Root | DocumentRole::Import => (declared, false),
            DocumentRole::Include(includer) => match declared {
                None => (includer.clone(), includer.is_some()),
                Some(ns) if Some(&ns) == includer.as_ref() => (Some(ns), false),
                Some(ns) => {
                    return Err(Error::Compile(
                        ParseError::new(format!(
                            "Included schema has different targetNamespace '{}', expected '{}'",
                            ns,
                            includer.as_deref().unwrap_or("")
                        ))
                        .with_location(location),
                    ))
                }
            },
        };

        Ok(Self {
            location,
            target_namespace,
            chameleon,
            element_form_qualified: is_qualified(root.get_attribute(xsd_attrs::ELEMENT_FORM_DEFAULT)),
            attribute_form_qualified: is_qualified(root.get_attribute(xsd_attrs::ATTRIBUTE_FORM_DEFAULT)),
            block_default_substitution: blocks_substitution(root.get_attribute(xsd_attrs::BLOCK_DEFAULT)),
        })
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::Compile(ParseError::new(message).with_location(self.location))
    }

    /// Name of a global component
    fn global_name(&self, elem: &Element) -> Result<QName> {
        let name = self.required(elem, xsd_attrs::NAME)?;
        Ok(QName::new(self.target_namespace.clone(), name))
    }

    /// Name of a local element or attribute, qualified per its form
    fn local_name(&self, elem: &Element, form_default_qualified: bool) -> Result<QName> {
        let name = self.required(elem, xsd_attrs::NAME)?;
        let qualified = match elem.get_attribute(xsd_attrs::FORM) {
            Some(form) => is_qualified(Some(form)),
            None => form_default_qualified,
        };
        if qualified {
            Ok(QName::new(self.target_namespace.clone(), name))
        } else {
            Ok(QName::local(name))
        }
    }

    fn required<'e>(&self, elem: &'e Element, attr: &str) -> Result<&'e str> {
        elem.get_attribute(attr).map(str::trim).ok_or_else(|| {
            self.error(format!("xs:{} missing '{}' attribute", elem.local_name(), attr))
        })
    }

    /// Resolve a QName-valued attribute
    fn resolve(&self, elem: &Element, value: &str) -> Result<QName> {
        let name = elem
            .resolve_qname(value)
            .map_err(|e| self.error(format!("Cannot resolve '{}': {}", value, e)))?;
        if self.chameleon && name.namespace.is_none() {
            return Ok(QName::new(self.target_namespace.clone(), name.local_name));
        }
        Ok(name)
    }

    fn resolve_attr(&self, elem: &Element, attr: &str) -> Result<Option<QName>> {
        elem.get_attribute(attr)
            .map(|value| self.resolve(elem, value))
            .transpose()
    }

    fn parse(&self, root: &Element) -> Result<SchemaDocument> {
        let mut doc = SchemaDocument {
            target_namespace: self.target_namespace.clone(),
            ..Default::default()
        };

        for child in &root.children {
            match child.local_name() {
                xsd_elements::ELEMENT => {
                    doc.elements.push(Arc::new(self.parse_global_element(child)?));
                }
                xsd_elements::COMPLEX_TYPE => {
                    let name = self.global_name(child)?;
                    let ct = self.parse_complex_type(child, Some(name.clone()))?;
                    doc.types.push((name, Arc::new(TypeDefinition::Complex(ct))));
                }
                xsd_elements::SIMPLE_TYPE => {
                    let name = self.global_name(child)?;
                    let st = self.parse_simple_type(child, Some(name.clone()))?;
                    doc.types.push((name, Arc::new(TypeDefinition::Simple(st))));
                }
                xsd_elements::GROUP => {
                    let name = self.global_name(child)?;
                    doc.groups.push((name, Arc::new(self.parse_group_definition(child)?)));
                }
                xsd_elements::ATTRIBUTE_GROUP => {
                    let name = self.global_name(child)?;
                    doc.attribute_groups
                        .push((name, Arc::new(self.parse_attribute_items(child)?)));
                }
                xsd_elements::ATTRIBUTE => {
                    let name = self.global_name(child)?;
                    let decl = AttributeDecl {
                        name: name.clone(),
                        type_ref: self.parse_attribute_type(child)?,
                    };
                    doc.attributes.push((name, Arc::new(decl)));
                }
                xsd_elements::INCLUDE => doc.references.push(SchemaReference {
                    kind: ReferenceKind::Include,
                    location: Some(self.required(child, xsd_attrs::SCHEMA_LOCATION)?.to_string()),
                    namespace: None,
                }),
                xsd_elements::REDEFINE | xsd_elements::OVERRIDE => {
                    doc.references.push(SchemaReference {
                        kind: ReferenceKind::Redefine,
                        location: Some(
                            self.required(child, xsd_attrs::SCHEMA_LOCATION)?.to_string(),
                        ),
                        namespace: None,
                    })
                }
                xsd_elements::IMPORT => doc.references.push(SchemaReference {
                    kind: ReferenceKind::Import,
                    location: child
                        .get_attribute(xsd_attrs::SCHEMA_LOCATION)
                        .map(|s| s.trim().to_string()),
                    namespace: child.get_attribute(xsd_attrs::NAMESPACE).map(str::to_string),
                }),
                xsd_elements::ANNOTATION
                | xsd_elements::NOTATION
                | xsd_elements::DEFAULT_OPEN_CONTENT => {}
                other => doc.skipped.push(other.to_string()),
            }
        }

        Ok(doc)
    }

    fn parse_global_element(&self, elem: &Element) -> Result<ElementDecl> {
        let mut decl = ElementDecl::new(self.global_name(elem)?, self.parse_element_type(elem)?);
        decl.substitution_group = self.resolve_attr(elem, xsd_attrs::SUBSTITUTION_GROUP)?;
        decl.blocks_substitution = match elem.get_attribute(xsd_attrs::BLOCK) {
            Some(block) => blocks_substitution(Some(block)),
            None => self.block_default_substitution,
        };
        Ok(decl)
    }

    /// Declared type from `type` or an inline definition
    fn parse_element_type(&self, elem: &Element) -> Result<TypeRef> {
        if let Some(type_name) = self.resolve_attr(elem, xsd_attrs::TYPE)? {
            return Ok(named_type(type_name));
        }

        for child in &elem.children {
            match child.local_name() {
                xsd_elements::COMPLEX_TYPE => {
                    let ct = self.parse_complex_type(child, None)?;
                    return Ok(TypeRef::Inline(Arc::new(TypeDefinition::Complex(ct))));
                }
                xsd_elements::SIMPLE_TYPE => {
                    let st = self.parse_simple_type(child, None)?;
                    return Ok(TypeRef::Inline(Arc::new(TypeDefinition::Simple(st))));
                }
                _ => {}
            }
        }

        Ok(TypeRef::AnyType)
    }

    /// Parse one content-model child; `None` for annotations and particles
    /// with `maxOccurs="0"`
    fn parse_particle(&self, elem: &Element) -> Result<Option<Particle>> {
        if elem.get_attribute(xsd_attrs::MAX_OCCURS).map(str::trim) == Some("0") {
            return Ok(None);
        }

        let particle = match elem.local_name() {
            xsd_elements::ELEMENT => {
                if let Some(reference) = self.resolve_attr(elem, xsd_attrs::REF)? {
                    Particle::Element(ElementParticle::Ref(reference))
                } else {
                    let name = self.local_name(elem, self.element_form_qualified)?;
                    let decl = ElementDecl::new(name, self.parse_element_type(elem)?);
                    Particle::Element(ElementParticle::Local(Arc::new(decl)))
                }
            }
            tag @ (xsd_elements::SEQUENCE | xsd_elements::CHOICE | xsd_elements::ALL) => {
                let model = ModelType::from_tag(tag).unwrap_or_default();
                Particle::Group(self.parse_model_group(elem, model)?)
            }
            xsd_elements::GROUP => {
                let reference = self.required(elem, xsd_attrs::REF)?;
                Particle::GroupRef(self.resolve(elem, reference)?)
            }
            xsd_elements::ANY => Particle::Any,
            xsd_elements::ANNOTATION => return Ok(None),
            other => Particle::Unsupported(other.to_string()),
        };

        Ok(Some(particle))
    }

    fn parse_model_group(&self, elem: &Element, model: ModelType) -> Result<ModelGroup> {
        let mut particles = Vec::new();
        for child in &elem.children {
            if let Some(particle) = self.parse_particle(child)? {
                particles.push(particle);
            }
        }
        Ok(ModelGroup::new(model, particles))
    }

    /// Content of a named xs:group definition
    fn parse_group_definition(&self, elem: &Element) -> Result<Particle> {
        for child in &elem.children {
            if let Some(model) = ModelType::from_tag(child.local_name()) {
                return Ok(Particle::Group(self.parse_model_group(child, model)?));
            }
        }
        Ok(Particle::Empty)
    }

    fn parse_complex_type(&self, elem: &Element, name: Option<QName>) -> Result<ComplexTypeDef> {
        let mut complex_type = ComplexTypeDef::empty(name);
        let mut parts = Vec::new();

        for child in &elem.children {
            match child.local_name() {
                xsd_elements::SEQUENCE
                | xsd_elements::CHOICE
                | xsd_elements::ALL
                | xsd_elements::GROUP => parts.extend(self.parse_particle(child)?),
                xsd_elements::ATTRIBUTE | xsd_elements::ATTRIBUTE_GROUP => {
                    complex_type.attributes.extend(self.parse_attribute_item(child)?);
                }
                xsd_elements::COMPLEX_CONTENT | xsd_elements::SIMPLE_CONTENT => {
                    self.parse_derivation(child, &mut complex_type, &mut parts)?;
                }
                xsd_elements::ANNOTATION | xsd_elements::ANY_ATTRIBUTE | xsd_elements::ASSERT => {}
                other => parts.push(Particle::Unsupported(other.to_string())),
            }
        }

        complex_type.particle = combine_particles(parts);
        Ok(complex_type)
    }

    /// xs:complexContent / xs:simpleContent with their restriction or extension
    fn parse_derivation(
        &self,
        content: &Element,
        complex_type: &mut ComplexTypeDef,
        parts: &mut Vec<Particle>,
    ) -> Result<()> {
        let simple_content = content.local_name() == xsd_elements::SIMPLE_CONTENT;
        complex_type.simple_content = simple_content;

        for derivation in &content.children {
            let method = match derivation.local_name() {
                xsd_elements::EXTENSION => DerivationMethod::Extension,
                xsd_elements::RESTRICTION => DerivationMethod::Restriction,
                _ => continue,
            };
            let base = self.required(derivation, xsd_attrs::BASE)?;
            complex_type.derivation = Some(Derivation {
                method,
                base: self.resolve(derivation, base)?,
            });

            for child in &derivation.children {
                match child.local_name() {
                    xsd_elements::ATTRIBUTE | xsd_elements::ATTRIBUTE_GROUP => {
                        complex_type.attributes.extend(self.parse_attribute_item(child)?);
                    }
                    xsd_elements::ANNOTATION
                    | xsd_elements::ANY_ATTRIBUTE
                    | xsd_elements::ASSERT => {}
                    // Facets and inline base types of simple content
                    _ if simple_content => {}
                    _ => parts.extend(self.parse_particle(child)?),
                }
            }
        }

        Ok(())
    }

    fn parse_attribute_items(&self, elem: &Element) -> Result<Vec<AttributeItem>> {
        let mut items = Vec::new();
        for child in &elem.children {
            items.extend(self.parse_attribute_item(child)?);
        }
        Ok(items)
    }

    fn parse_attribute_item(&self, elem: &Element) -> Result<Option<AttributeItem>> {
        match elem.local_name() {
            xsd_elements::ATTRIBUTE => Ok(Some(AttributeItem::Attribute(self.parse_attribute_use(elem)?))),
            xsd_elements::ATTRIBUTE_GROUP => {
                let reference = self.required(elem, xsd_attrs::REF)?;
                Ok(Some(AttributeItem::GroupRef(self.resolve(elem, reference)?)))
            }
            _ => Ok(None),
        }
    }

    fn parse_attribute_use(&self, elem: &Element) -> Result<AttributeUse> {
        let prohibited = elem.get_attribute(xsd_attrs::USE).map(str::trim) == Some("prohibited");

        let target = if let Some(reference) = self.resolve_attr(elem, xsd_attrs::REF)? {
            AttributeTarget::Ref(reference)
        } else {
            AttributeTarget::Local(AttributeDecl {
                name: self.local_name(elem, self.attribute_form_qualified)?,
                type_ref: self.parse_attribute_type(elem)?,
            })
        };

        Ok(AttributeUse { target, prohibited })
    }

    fn parse_attribute_type(&self, elem: &Element) -> Result<Option<TypeRef>> {
        if let Some(type_name) = self.resolve_attr(elem, xsd_attrs::TYPE)? {
            return Ok(Some(named_type(type_name)));
        }
        match elem.find_child(xsd_elements::SIMPLE_TYPE) {
            Some(inline) => {
                let st = self.parse_simple_type(inline, None)?;
                Ok(Some(TypeRef::Inline(Arc::new(TypeDefinition::Simple(st)))))
            }
            None => Ok(None),
        }
    }

    fn parse_simple_type(&self, elem: &Element, name: Option<QName>) -> Result<SimpleTypeDef> {
        for child in &elem.children {
            let variety = match child.local_name() {
                xsd_elements::RESTRICTION => self.parse_simple_restriction(child)?,
                xsd_elements::LIST => SimpleVariety::List,
                xsd_elements::UNION => SimpleVariety::Union,
                _ => continue,
            };
            return Ok(SimpleTypeDef { name, variety });
        }

        Err(self.error(format!(
            "xs:simpleType {} has no restriction, list or union",
            name.map(|n| n.to_string()).unwrap_or_else(|| "(anonymous)".to_string())
        )))
    }

    fn parse_simple_restriction(&self, elem: &Element) -> Result<SimpleVariety> {
        let base = match self.resolve_attr(elem, xsd_attrs::BASE)? {
            Some(base) => Some(named_type(base)),
            None => match elem.find_child(xsd_elements::SIMPLE_TYPE) {
                Some(inline) => {
                    let st = self.parse_simple_type(inline, None)?;
                    Some(TypeRef::Inline(Arc::new(TypeDefinition::Simple(st))))
                }
                None => None,
            },
        };

        let enumeration = elem
            .find_children(xsd_elements::ENUMERATION)
            .into_iter()
            .filter_map(|facet| facet.get_attribute(xsd_attrs::VALUE))
            .map(str::to_string)
            .collect();

        Ok(SimpleVariety::Restriction { base, enumeration })
    }
}

fn is_qualified(form: Option<&str>) -> bool {
    form.map(str::trim) == Some("qualified")
}

fn blocks_substitution(block: Option<&str>) -> bool {
    block.map_or(false, |value| {
        value
            .split_whitespace()
            .any(|token| token == "substitution" || token == "#all")
    })
}

/// `xs:anyType` is the only built-in complex type
fn named_type(name: QName) -> TypeRef {
    let is_any_type = name.local_name == "anyType"
        && matches!(name.namespace(), Some(XSD_1_0_NAMESPACE) | Some(XSD_1_1_NAMESPACE));
    if is_any_type {
        TypeRef::AnyType
    } else {
        TypeRef::Named(name)
    }
}

fn combine_particles(mut parts: Vec<Particle>) -> Particle {
    match parts.len() {
        0 => Particle::Empty,
        1 => parts.remove(0),
        _ => Particle::Group(ModelGroup::new(ModelType::Sequence, parts)),
    }
}

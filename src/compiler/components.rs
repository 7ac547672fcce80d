//! Schema component model
//!
//! These are the declarations read out of XSD documents: element
//! declarations, type definitions, model groups, attribute groups and
//! attribute declarations. References between components are kept as
//! [`QName`]s and resolved lazily by [`CompiledSchema`](super::CompiledSchema),
//! so a component from an unreadable include only fails when it is used.

use std::fmt;
use std::sync::Arc;

use crate::namespaces::QName;

/// Model group compositor type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelType {
    /// Ordered sequence of particles
    #[default]
    Sequence,
    /// One of multiple alternatives
    Choice,
    /// Unordered set of particles
    All,
}

impl ModelType {
    /// Parse from element tag name
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "sequence" => Some(Self::Sequence),
            "choice" => Some(Self::Choice),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequence => write!(f, "Sequence"),
            Self::Choice => write!(f, "Choice"),
            Self::All => write!(f, "All"),
        }
    }
}

/// A node of a content-model grammar
#[derive(Debug, Clone)]
pub enum Particle {
    /// Inline xs:sequence, xs:choice or xs:all
    Group(ModelGroup),
    /// xs:group ref="..."
    GroupRef(QName),
    /// Element reference or local element declaration
    Element(ElementParticle),
    /// xs:any wildcard
    Any,
    /// No content model
    Empty,
    /// A content-model construct this crate does not model, by tag name
    Unsupported(String),
}

impl Particle {
    /// Sequence of two particles, dropping empty halves
    pub fn sequence_of(first: Particle, second: Particle) -> Particle {
        match (first, second) {
            (Particle::Empty, p) | (p, Particle::Empty) => p,
            (a, b) => Particle::Group(ModelGroup::new(ModelType::Sequence, vec![a, b])),
        }
    }

    /// Short description used in diagnostic log lines
    pub fn describe(&self) -> String {
        match self {
            Particle::Group(group) => group.model.to_string(),
            Particle::GroupRef(name) => format!("GroupRef({})", name),
            Particle::Element(element) => format!("Element({})", element.name()),
            Particle::Any => "Any".to_string(),
            Particle::Empty => "Empty".to_string(),
            Particle::Unsupported(tag) => format!("Unsupported({})", tag),
        }
    }
}

/// Inline model group
#[derive(Debug, Clone)]
pub struct ModelGroup {
    /// Compositor
    pub model: ModelType,
    /// Particles in document order
    pub particles: Vec<Particle>,
}

impl ModelGroup {
    /// Create a model group
    pub fn new(model: ModelType, particles: Vec<Particle>) -> Self {
        Self { model, particles }
    }
}

/// Element particle in a model group
#[derive(Debug, Clone)]
pub enum ElementParticle {
    /// `ref` to a global element declaration
    Ref(QName),
    /// Local element declaration
    Local(Arc<ElementDecl>),
}

impl ElementParticle {
    /// Name of the element this particle stands for
    pub fn name(&self) -> &QName {
        match self {
            ElementParticle::Ref(name) => name,
            ElementParticle::Local(decl) => &decl.name,
        }
    }
}

/// Reference from a declaration to its type
#[derive(Debug, Clone)]
pub enum TypeRef {
    /// `type="..."` naming a global or built-in type
    Named(QName),
    /// Anonymous type declared inline
    Inline(Arc<TypeDefinition>),
    /// No type given: xs:anyType (or the substitution group head's type)
    AnyType,
}

/// Element declaration, global or local
#[derive(Debug, Clone)]
pub struct ElementDecl {
    /// Qualified element name
    pub name: QName,
    /// Declared type
    pub type_ref: TypeRef,
    /// Head of the substitution group, if any
    pub substitution_group: Option<QName>,
    /// `block` (or the schema's `blockDefault`) includes `substitution`
    pub blocks_substitution: bool,
}

impl ElementDecl {
    /// Create an element declaration
    pub fn new(name: QName, type_ref: TypeRef) -> Self {
        Self {
            name,
            type_ref,
            substitution_group: None,
            blocks_substitution: false,
        }
    }
}

/// Simple or complex type definition
#[derive(Debug, Clone)]
pub enum TypeDefinition {
    /// xs:simpleType
    Simple(SimpleTypeDef),
    /// xs:complexType
    Complex(ComplexTypeDef),
}

/// Simple type definition
#[derive(Debug, Clone)]
pub struct SimpleTypeDef {
    /// Name for global types
    pub name: Option<QName>,
    /// How the type is derived
    pub variety: SimpleVariety,
}

/// Derivation of a simple type
#[derive(Debug, Clone)]
pub enum SimpleVariety {
    /// xs:restriction, with the enumeration facets declared on it
    Restriction {
        /// Base type
        base: Option<TypeRef>,
        /// Enumeration literals in document order
        enumeration: Vec<String>,
    },
    /// xs:list
    List,
    /// xs:union
    Union,
}

/// Complex type derivation method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivationMethod {
    /// xs:extension
    Extension,
    /// xs:restriction
    Restriction,
}

/// Base type reference of a derived complex type
#[derive(Debug, Clone)]
pub struct Derivation {
    /// Extension or restriction
    pub method: DerivationMethod,
    /// Base type name
    pub base: QName,
}

/// Complex type definition as written in the schema
#[derive(Debug, Clone)]
pub struct ComplexTypeDef {
    /// Name for global types
    pub name: Option<QName>,
    /// Base type, for complexContent and simpleContent derivations
    pub derivation: Option<Derivation>,
    /// Whether the type has simple content
    pub simple_content: bool,
    /// The type's own content particle
    pub particle: Particle,
    /// Attribute declarations and attribute group references
    pub attributes: Vec<AttributeItem>,
}

impl ComplexTypeDef {
    /// Complex type with no content and no attributes
    pub fn empty(name: Option<QName>) -> Self {
        Self {
            name,
            derivation: None,
            simple_content: false,
            particle: Particle::Empty,
            attributes: Vec::new(),
        }
    }
}

/// Attribute declaration
#[derive(Debug, Clone)]
pub struct AttributeDecl {
    /// Qualified attribute name
    pub name: QName,
    /// Declared type; `None` means xs:anySimpleType
    pub type_ref: Option<TypeRef>,
}

/// Attribute use on a complex type or attribute group
#[derive(Debug, Clone)]
pub struct AttributeUse {
    /// Local declaration or reference to a global attribute
    pub target: AttributeTarget,
    /// `use="prohibited"`
    pub prohibited: bool,
}

impl AttributeUse {
    /// Name of the attribute this use introduces
    pub fn name(&self) -> &QName {
        match &self.target {
            AttributeTarget::Local(decl) => &decl.name,
            AttributeTarget::Ref(name) => name,
        }
    }
}

/// What an attribute use points at
#[derive(Debug, Clone)]
pub enum AttributeTarget {
    /// Declared in place
    Local(AttributeDecl),
    /// `ref` to a global attribute
    Ref(QName),
}

/// Entry of a complex type's or attribute group's attribute list
#[derive(Debug, Clone)]
pub enum AttributeItem {
    /// xs:attribute
    Attribute(AttributeUse),
    /// xs:attributeGroup ref="..."
    GroupRef(QName),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_type_from_tag() {
        assert_eq!(ModelType::from_tag("sequence"), Some(ModelType::Sequence));
        assert_eq!(ModelType::from_tag("choice"), Some(ModelType::Choice));
        assert_eq!(ModelType::from_tag("all"), Some(ModelType::All));
        assert_eq!(ModelType::from_tag("group"), None);
    }

    #[test]
    fn test_sequence_of_drops_empty() {
        let a = Particle::Element(ElementParticle::Ref(QName::local("a")));
        assert!(matches!(Particle::sequence_of(Particle::Empty, a.clone()), Particle::Element(_)));
        assert!(matches!(Particle::sequence_of(a.clone(), Particle::Empty), Particle::Element(_)));

        match Particle::sequence_of(a.clone(), Particle::Any) {
            Particle::Group(group) => {
                assert_eq!(group.model, ModelType::Sequence);
                assert_eq!(group.particles.len(), 2);
            }
            other => panic!("expected sequence, got {:?}", other),
        }
    }

    #[test]
    fn test_describe() {
        let element = Particle::Element(ElementParticle::Ref(QName::namespaced("urn:x", "a")));
        assert_eq!(element.describe(), "Element({urn:x}a)");
        assert_eq!(Particle::GroupRef(QName::local("g")).describe(), "GroupRef(g)");
        let group = Particle::Group(ModelGroup::new(ModelType::Choice, vec![]));
        assert_eq!(group.describe(), "Choice");
    }
}

//! Compiled schema
//!
//! [`CompiledSchema`] merges the components of the primary schema document
//! and everything it includes or imports, and answers the questions the
//! graph builder asks: which elements are global, what an element's
//! effective content looks like, and which literal values an attribute
//! allows. References are resolved on demand, so a dangling reference only
//! fails the compilation of the element that actually uses it.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;

use super::components::{
    AttributeDecl, AttributeItem, AttributeTarget, ComplexTypeDef, DerivationMethod, ElementDecl,
    ElementParticle, Particle, SimpleTypeDef, SimpleVariety, TypeDefinition, TypeRef,
};
use super::parsing::{
    declared_target_namespace, parse_schema_document, DocumentRole, ReferenceKind, SchemaDocument,
};
use crate::documents::{Document, Element};
use crate::error::{Error, ParseError, Result};
use crate::limits::Limits;
use crate::loaders::{resolve_schema_location, Loader};
use crate::logger::Logger;
use crate::namespaces::QName;
use crate::{XML_NAMESPACE, XSD_1_0_NAMESPACE, XSD_1_1_NAMESPACE};

/// Options for schema compilation
#[derive(Debug, Clone, Default)]
pub struct CompilerOptions {
    /// Resource limits
    pub limits: Limits,
    /// If set, the primary schema must declare this target namespace
    pub target_namespace: Option<String>,
}

impl CompilerOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Require the primary schema to declare this target namespace
    pub fn with_target_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.target_namespace = Some(namespace.into());
        self
    }
}

/// Type an element or attribute resolves to
#[derive(Debug, Clone, Copy)]
pub enum ResolvedType<'a> {
    /// xs:anyType
    AnyType,
    /// A built-in simple type
    Builtin,
    /// A user-defined simple type
    Simple(&'a SimpleTypeDef),
    /// A user-defined complex type
    Complex(&'a ComplexTypeDef),
}

/// Effective content of an element
#[derive(Debug, Clone)]
pub enum ContentType {
    /// Text only: no attributes, no children
    Simple,
    /// Structured content
    Complex(ComplexContent),
}

/// Attribute uses and content particle of a complex type, with derivation
/// and attribute groups already applied
#[derive(Debug, Clone)]
pub struct ComplexContent {
    /// Attribute declarations keyed by name, in declaration order
    pub attribute_uses: IndexMap<QName, AttributeDecl>,
    /// Root particle of the content model
    pub particle: Particle,
}

impl ComplexContent {
    /// No attributes, no content
    pub fn empty() -> Self {
        Self {
            attribute_uses: IndexMap::new(),
            particle: Particle::Empty,
        }
    }
}

/// Schema document waiting in the compilation worklist
struct PendingDocument {
    path: PathBuf,
    role: DocumentRole,
}

/// The merged, queryable schema
#[derive(Debug, Default)]
pub struct CompiledSchema {
    target_namespace: Option<String>,
    elements: IndexMap<QName, Arc<ElementDecl>>,
    types: HashMap<QName, Arc<TypeDefinition>>,
    groups: HashMap<QName, Arc<Particle>>,
    attribute_groups: HashMap<QName, Arc<Vec<AttributeItem>>>,
    attributes: HashMap<QName, Arc<AttributeDecl>>,
    /// Substitution group heads and their direct members, in declaration order
    substitutions: IndexMap<QName, Vec<QName>>,
    imports_xml_namespace: bool,
    sources: Vec<PathBuf>,
}

impl CompiledSchema {
    /// Compile a schema file with default options
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file_with_options(path, &CompilerOptions::default(), &Logger::null())
    }

    /// Compile a schema from a string. Relative includes resolve against the
    /// working directory.
    pub fn from_string(xml: &str) -> Result<Self> {
        let doc = Document::from_string(xml).map_err(|e| e.into_compile_error("<string>"))?;
        let root = doc
            .root()
            .ok_or_else(|| Error::Compile(ParseError::new("Empty document")))?;

        let mut schema = CompiledSchema::default();
        let logger = Logger::null();
        let mut pending = VecDeque::new();
        schema.add_document(root, "<string>", None, &DocumentRole::Root, &mut pending, &logger)?;
        schema.load_pending(pending, &Loader::new(), &mut HashSet::new(), &logger)?;
        schema.finish(&Limits::default(), &logger)?;
        Ok(schema)
    }

    /// Compile a schema file, following includes and imports.
    ///
    /// Included documents that cannot be read are skipped. Components they
    /// would have declared fail to resolve only if they are used.
    pub fn from_file_with_options(
        path: impl AsRef<Path>,
        options: &CompilerOptions,
        log: &Logger,
    ) -> Result<Self> {
        let path = path.as_ref();
        let location = path.display().to_string();
        let loader = Loader::new().with_limits(options.limits.clone());

        let canonical = path.canonicalize().map_err(|e| {
            Error::Compile(
                ParseError::new(format!("Cannot read schema: {}", e)).with_location(&location),
            )
        })?;
        let doc = loader
            .load_document(&canonical)
            .map_err(|e| e.into_compile_error(&location))?;
        let root = doc.root().ok_or_else(|| {
            Error::Compile(ParseError::new("Empty document").with_location(&location))
        })?;

        if let Some(expected) = &options.target_namespace {
            let declared = declared_target_namespace(root);
            if declared.as_deref() != Some(expected.as_str()) {
                return Err(Error::Compile(
                    ParseError::new(format!(
                        "Schema targetNamespace '{}' does not match expected '{}'",
                        declared.unwrap_or_default(),
                        expected
                    ))
                    .with_location(&location),
                ));
            }
        }

        let mut schema = CompiledSchema::default();
        let mut loaded = HashSet::from([canonical.clone()]);
        let mut pending = VecDeque::new();
        schema.add_document(
            root,
            &location,
            canonical.parent(),
            &DocumentRole::Root,
            &mut pending,
            log,
        )?;
        schema.sources.push(canonical);
        log.write_line(format_args!("Schema read..."));

        schema.load_pending(pending, &loader, &mut loaded, log)?;
        schema.finish(&options.limits, log)?;
        log.write_line(format_args!("Schema compiled..."));

        Ok(schema)
    }

    /// Iteratively load included and imported documents
    fn load_pending(
        &mut self,
        mut pending: VecDeque<PendingDocument>,
        loader: &Loader,
        loaded: &mut HashSet<PathBuf>,
        log: &Logger,
    ) -> Result<()> {
        while let Some(work) = pending.pop_front() {
            let location = work.path.display().to_string();

            let canonical = match work.path.canonicalize() {
                Ok(canonical) => canonical,
                Err(e) => {
                    log.write_line(format_args!("Skipping unreadable schema {}: {}", location, e));
                    continue;
                }
            };
            if !loaded.insert(canonical.clone()) {
                continue;
            }
            loader
                .limits()
                .check_schema_documents(loaded.len())
                .map_err(|e| e.into_compile_error(&location))?;

            let content = match loader.load(&canonical) {
                Ok(content) => content,
                Err(Error::Resource(message)) => {
                    log.write_line(format_args!("Skipping unreadable schema: {}", message));
                    continue;
                }
                Err(e) => return Err(e.into_compile_error(&location)),
            };
            let doc = Document::parse_with_limits(&content, loader.limits())
                .map_err(|e| e.into_compile_error(&location))?;
            let root = doc.root().ok_or_else(|| {
                Error::Compile(ParseError::new("Empty document").with_location(&location))
            })?;

            self.add_document(root, &location, canonical.parent(), &work.role, &mut pending, log)?;
            self.sources.push(canonical);
        }
        Ok(())
    }

    /// Merge one document's components; the first declaration of a name wins
    fn add_document(
        &mut self,
        root: &Element,
        location: &str,
        base_dir: Option<&Path>,
        role: &DocumentRole,
        pending: &mut VecDeque<PendingDocument>,
        log: &Logger,
    ) -> Result<()> {
        let doc: SchemaDocument = parse_schema_document(root, location, role)?;
        log.write_line(format_args!("Read {}", location));
        let _indent = log.indent();

        if matches!(role, DocumentRole::Root) {
            self.target_namespace = doc.target_namespace.clone();
        }
        for tag in &doc.skipped {
            log.write_line(format_args!("Ignoring unknown schema child xs:{}", tag));
        }

        for element in doc.elements {
            self.elements.entry(element.name.clone()).or_insert(element);
        }
        for (name, definition) in doc.types {
            self.types.entry(name).or_insert(definition);
        }
        for (name, group) in doc.groups {
            self.groups.entry(name).or_insert(group);
        }
        for (name, items) in doc.attribute_groups {
            self.attribute_groups.entry(name).or_insert(items);
        }
        for (name, attribute) in doc.attributes {
            self.attributes.entry(name).or_insert(attribute);
        }

        for reference in doc.references {
            if reference.kind == ReferenceKind::Import
                && reference.namespace.as_deref() == Some(XML_NAMESPACE)
            {
                self.imports_xml_namespace = true;
            }
            let Some(location) = reference.location else {
                log.write_line(format_args!(
                    "Import of {} has no schemaLocation",
                    reference.namespace.as_deref().unwrap_or("(no namespace)")
                ));
                continue;
            };
            let Some(path) = resolve_schema_location(&location, base_dir) else {
                log.write_line(format_args!("Skipping remote schema {}", location));
                continue;
            };
            if reference.kind == ReferenceKind::Redefine {
                log.write_line(format_args!("Redefinitions in {} are not applied", location));
            }
            let role = match reference.kind {
                ReferenceKind::Include | ReferenceKind::Redefine => {
                    DocumentRole::Include(doc.target_namespace.clone())
                }
                ReferenceKind::Import => DocumentRole::Import,
            };
            pending.push_back(PendingDocument { path, role });
        }

        Ok(())
    }

    fn finish(&mut self, limits: &Limits, log: &Logger) -> Result<()> {
        limits
            .check_global_elements(self.elements.len())
            .map_err(|e| e.into_compile_error("global elements"))?;

        if self.imports_xml_namespace {
            for attribute in xml_namespace_attributes() {
                if !self.attributes.contains_key(&attribute.name) {
                    log.write_line(format_args!("Using built-in attribute {}", attribute.name));
                    self.attributes.insert(attribute.name.clone(), Arc::new(attribute));
                }
            }
        }

        self.substitutions.clear();
        for element in self.elements.values() {
            if let Some(head) = &element.substitution_group {
                self.substitutions
                    .entry(head.clone())
                    .or_default()
                    .push(element.name.clone());
            }
        }
        Ok(())
    }

    fn undefined(&self, kind: &str, name: &QName) -> Error {
        Error::Compile(ParseError::new(format!("Undefined {} '{}'", kind, name)))
    }

    /// Target namespace of the primary schema
    pub fn target_namespace(&self) -> Option<&str> {
        self.target_namespace.as_deref()
    }

    /// Global element declarations, one per distinct name, in declaration order
    pub fn global_elements(&self) -> impl Iterator<Item = &Arc<ElementDecl>> {
        self.elements.values()
    }

    /// Number of global element declarations
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Files that contributed components
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Look up a global element
    pub fn element(&self, name: &QName) -> Result<Arc<ElementDecl>> {
        self.elements
            .get(name)
            .cloned()
            .ok_or_else(|| self.undefined("element", name))
    }

    /// Resolve an element particle to its declaration
    pub fn element_particle(&self, particle: &ElementParticle) -> Result<Arc<ElementDecl>> {
        match particle {
            ElementParticle::Ref(name) => self.element(name),
            ElementParticle::Local(decl) => Ok(Arc::clone(decl)),
        }
    }

    /// Elements that may stand in for `head`: the transitive members of its
    /// substitution group, in declaration order. Empty when `head` blocks
    /// substitution.
    pub fn substitution_members(&self, head: &ElementDecl) -> Vec<Arc<ElementDecl>> {
        if head.blocks_substitution {
            return Vec::new();
        }

        let mut reachable = HashSet::new();
        let mut pending = vec![&head.name];
        while let Some(name) = pending.pop() {
            for member in self.substitutions.get(name).into_iter().flatten() {
                if member != &head.name && reachable.insert(member) {
                    pending.push(member);
                }
            }
        }

        self.elements
            .values()
            .filter(|element| reachable.contains(&element.name))
            .cloned()
            .collect()
    }

    /// Content particle of a named model group
    pub fn group(&self, name: &QName) -> Result<&Particle> {
        self.groups
            .get(name)
            .map(|group| group.as_ref())
            .ok_or_else(|| self.undefined("group", name))
    }

    /// Look up a global attribute
    pub fn attribute(&self, name: &QName) -> Result<&AttributeDecl> {
        self.attributes
            .get(name)
            .map(|attribute| attribute.as_ref())
            .ok_or_else(|| self.undefined("attribute", name))
    }

    /// Resolve a type name
    pub fn lookup_type(&self, name: &QName) -> Result<ResolvedType<'_>> {
        if matches!(name.namespace(), Some(XSD_1_0_NAMESPACE) | Some(XSD_1_1_NAMESPACE)) {
            return Ok(match name.local_name.as_str() {
                "anyType" => ResolvedType::AnyType,
                _ => ResolvedType::Builtin,
            });
        }
        match self.types.get(name).map(|definition| definition.as_ref()) {
            Some(TypeDefinition::Simple(st)) => Ok(ResolvedType::Simple(st)),
            Some(TypeDefinition::Complex(ct)) => Ok(ResolvedType::Complex(ct)),
            None => Err(self.undefined("type", name)),
        }
    }

    /// Resolve a type reference
    pub fn resolve_type<'a>(&'a self, type_ref: &'a TypeRef) -> Result<ResolvedType<'a>> {
        match type_ref {
            TypeRef::Named(name) => self.lookup_type(name),
            TypeRef::Inline(definition) => Ok(match definition.as_ref() {
                TypeDefinition::Simple(st) => ResolvedType::Simple(st),
                TypeDefinition::Complex(ct) => ResolvedType::Complex(ct),
            }),
            TypeRef::AnyType => Ok(ResolvedType::AnyType),
        }
    }

    /// Type of an element. An untyped member of a substitution group takes
    /// the type of its head.
    pub fn element_type<'a>(&'a self, decl: &'a ElementDecl) -> Result<ResolvedType<'a>> {
        if !matches!(decl.type_ref, TypeRef::AnyType) {
            return self.resolve_type(&decl.type_ref);
        }

        let mut seen = HashSet::from([&decl.name]);
        let mut head_name = decl.substitution_group.as_ref();
        while let Some(name) = head_name {
            if !seen.insert(name) {
                break;
            }
            let head = self
                .elements
                .get(name)
                .ok_or_else(|| self.undefined("substitution group head", name))?;
            if !matches!(head.type_ref, TypeRef::AnyType) {
                return self.resolve_type(&head.type_ref);
            }
            head_name = head.substitution_group.as_ref();
        }

        Ok(ResolvedType::AnyType)
    }

    /// Effective content of an element
    pub fn content_type(&self, decl: &ElementDecl) -> Result<ContentType> {
        match self.element_type(decl)? {
            ResolvedType::Builtin | ResolvedType::Simple(_) => Ok(ContentType::Simple),
            ResolvedType::AnyType => Ok(ContentType::Complex(ComplexContent::empty())),
            ResolvedType::Complex(ct) => {
                let mut derivation_chain = Vec::new();
                Ok(ContentType::Complex(self.complex_content(ct, &mut derivation_chain)?))
            }
        }
    }

    /// Apply derivation and attribute groups to a complex type
    fn complex_content<'a>(
        &'a self,
        ct: &'a ComplexTypeDef,
        derivation_chain: &mut Vec<&'a QName>,
    ) -> Result<ComplexContent> {
        if let Some(name) = &ct.name {
            if derivation_chain.contains(&name) {
                return Err(Error::Compile(ParseError::new(format!(
                    "Circular derivation of type '{}'",
                    name
                ))));
            }
            derivation_chain.push(name);
        }

        let mut content = ComplexContent::empty();

        if let Some(derivation) = &ct.derivation {
            if let ResolvedType::Complex(base) = self.lookup_type(&derivation.base)? {
                let inherited = self.complex_content(base, derivation_chain)?;
                content.attribute_uses = inherited.attribute_uses;
                if derivation.method == DerivationMethod::Extension && !ct.simple_content {
                    content.particle = inherited.particle;
                }
            }
        }

        let mut group_chain = Vec::new();
        self.collect_attributes(&ct.attributes, &mut content.attribute_uses, &mut group_chain)?;

        if !ct.simple_content {
            let own = ct.particle.clone();
            content.particle = Particle::sequence_of(content.particle, own);
        }

        if ct.name.is_some() {
            derivation_chain.pop();
        }
        Ok(content)
    }

    /// Flatten attribute uses and attribute group references
    fn collect_attributes<'a>(
        &'a self,
        items: &'a [AttributeItem],
        out: &mut IndexMap<QName, AttributeDecl>,
        group_chain: &mut Vec<&'a QName>,
    ) -> Result<()> {
        for item in items {
            match item {
                AttributeItem::Attribute(attribute_use) => {
                    if attribute_use.prohibited {
                        out.shift_remove(attribute_use.name());
                        continue;
                    }
                    let decl = match &attribute_use.target {
                        AttributeTarget::Local(decl) => decl.clone(),
                        AttributeTarget::Ref(name) => self.attribute(name)?.clone(),
                    };
                    out.insert(decl.name.clone(), decl);
                }
                AttributeItem::GroupRef(name) => {
                    if group_chain.contains(&name) {
                        continue;
                    }
                    let group = self
                        .attribute_groups
                        .get(name)
                        .ok_or_else(|| self.undefined("attribute group", name))?;
                    group_chain.push(name);
                    self.collect_attributes(group.as_slice(), out, group_chain)?;
                    group_chain.pop();
                }
            }
        }
        Ok(())
    }

    /// Enumeration literals restricting an attribute's values, in schema
    /// order. Empty when the type is not an enumerated restriction.
    pub fn enumeration(&self, attribute: &AttributeDecl) -> Result<Vec<String>> {
        let Some(type_ref) = &attribute.type_ref else {
            return Ok(Vec::new());
        };
        match self.resolve_type(type_ref)? {
            ResolvedType::Simple(SimpleTypeDef {
                variety: SimpleVariety::Restriction { enumeration, .. },
                ..
            }) => Ok(enumeration.clone()),
            ResolvedType::Complex(_) => Err(Error::Compile(ParseError::new(format!(
                "Attribute '{}' has a complex type",
                attribute.name
            )))),
            _ => Ok(Vec::new()),
        }
    }
}

/// Global attributes of the XML namespace, used when an import of that
/// namespace cannot be loaded
fn xml_namespace_attributes() -> Vec<AttributeDecl> {
    let builtin = |local: &str| Some(TypeRef::Named(QName::namespaced(XSD_1_0_NAMESPACE, local)));
    let space = SimpleTypeDef {
        name: None,
        variety: SimpleVariety::Restriction {
            base: builtin("NCName"),
            enumeration: vec!["default".to_string(), "preserve".to_string()],
        },
    };

    vec![
        AttributeDecl {
            name: QName::namespaced(XML_NAMESPACE, "lang"),
            type_ref: builtin("language"),
        },
        AttributeDecl {
            name: QName::namespaced(XML_NAMESPACE, "space"),
            type_ref: Some(TypeRef::Inline(Arc::new(TypeDefinition::Simple(space)))),
        },
        AttributeDecl {
            name: QName::namespaced(XML_NAMESPACE, "base"),
            type_ref: builtin("anyURI"),
        },
        AttributeDecl {
            name: QName::namespaced(XML_NAMESPACE, "id"),
            type_ref: builtin("ID"),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::components::ModelType;

    const DERIVED_XSD: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
    <xs:element name="base" type="baseType"/>
    <xs:element name="derived" type="derivedType"/>
    <xs:element name="restricted" type="restrictedType"/>
    <xs:element name="text" type="xs:string"/>
    <xs:element name="priced" type="pricedType"/>
    <xs:element name="anything"/>

    <xs:complexType name="baseType">
        <xs:sequence><xs:element name="a" type="xs:string"/></xs:sequence>
        <xs:attribute name="id" type="xs:ID"/>
        <xs:attribute name="legacy"/>
        <xs:attributeGroup ref="common"/>
    </xs:complexType>

    <xs:complexType name="derivedType">
        <xs:complexContent>
            <xs:extension base="baseType">
                <xs:sequence><xs:element name="b" type="xs:string"/></xs:sequence>
                <xs:attribute name="extra" type="yesNo"/>
            </xs:extension>
        </xs:complexContent>
    </xs:complexType>

    <xs:complexType name="restrictedType">
        <xs:complexContent>
            <xs:restriction base="baseType">
                <xs:sequence><xs:element name="a" type="xs:string"/></xs:sequence>
                <xs:attribute name="legacy" use="prohibited"/>
            </xs:restriction>
        </xs:complexContent>
    </xs:complexType>

    <xs:complexType name="pricedType">
        <xs:simpleContent>
            <xs:extension base="xs:decimal">
                <xs:attribute name="currency" type="yesNo"/>
            </xs:extension>
        </xs:simpleContent>
    </xs:complexType>

    <xs:attributeGroup name="common">
        <xs:attribute name="lang"/>
        <xs:attributeGroup ref="common"/>
    </xs:attributeGroup>

    <xs:simpleType name="yesNo">
        <xs:restriction base="xs:string">
            <xs:enumeration value="YES"/>
            <xs:enumeration value="no"/>
        </xs:restriction>
    </xs:simpleType>
</xs:schema>"#;

    fn complex(schema: &CompiledSchema, name: &str) -> ComplexContent {
        let decl = schema.element(&QName::local(name)).unwrap();
        match schema.content_type(&decl).unwrap() {
            ContentType::Complex(content) => content,
            ContentType::Simple => panic!("{} should be complex", name),
        }
    }

    fn attribute_names(content: &ComplexContent) -> Vec<String> {
        content.attribute_uses.keys().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_global_elements_in_declaration_order() {
        let schema = CompiledSchema::from_string(DERIVED_XSD).unwrap();
        let names: Vec<_> = schema.global_elements().map(|e| e.name.to_string()).collect();
        assert_eq!(names, vec!["base", "derived", "restricted", "text", "priced", "anything"]);
    }

    #[test]
    fn test_attribute_groups_are_flattened() {
        let schema = CompiledSchema::from_string(DERIVED_XSD).unwrap();
        let base = complex(&schema, "base");
        assert_eq!(attribute_names(&base), vec!["id", "legacy", "lang"]);
    }

    #[test]
    fn test_extension_inherits_content_and_attributes() {
        let schema = CompiledSchema::from_string(DERIVED_XSD).unwrap();
        let derived = complex(&schema, "derived");
        assert_eq!(attribute_names(&derived), vec!["id", "legacy", "lang", "extra"]);

        match &derived.particle {
            Particle::Group(group) => {
                assert_eq!(group.model, ModelType::Sequence);
                assert_eq!(group.particles.len(), 2);
            }
            other => panic!("expected sequence of base and extension, got {:?}", other),
        }
    }

    #[test]
    fn test_restriction_drops_prohibited_attributes() {
        let schema = CompiledSchema::from_string(DERIVED_XSD).unwrap();
        let restricted = complex(&schema, "restricted");
        assert_eq!(attribute_names(&restricted), vec!["id", "lang"]);
    }

    #[test]
    fn test_simple_content_has_attributes_only() {
        let schema = CompiledSchema::from_string(DERIVED_XSD).unwrap();
        let priced = complex(&schema, "priced");
        assert_eq!(attribute_names(&priced), vec!["currency"]);
        assert!(matches!(priced.particle, Particle::Empty));
    }

    #[test]
    fn test_simple_and_untyped_elements() {
        let schema = CompiledSchema::from_string(DERIVED_XSD).unwrap();
        let text = schema.element(&QName::local("text")).unwrap();
        assert!(matches!(schema.content_type(&text).unwrap(), ContentType::Simple));

        let anything = complex(&schema, "anything");
        assert!(anything.attribute_uses.is_empty());
        assert!(matches!(anything.particle, Particle::Empty));
    }

    #[test]
    fn test_enumeration() {
        let schema = CompiledSchema::from_string(DERIVED_XSD).unwrap();
        let derived = complex(&schema, "derived");

        let extra = &derived.attribute_uses[&QName::local("extra")];
        assert_eq!(schema.enumeration(extra).unwrap(), vec!["YES", "no"]);

        let id = &derived.attribute_uses[&QName::local("id")];
        assert!(schema.enumeration(id).unwrap().is_empty());

        let lang = &derived.attribute_uses[&QName::local("lang")];
        assert!(schema.enumeration(lang).unwrap().is_empty());
    }

    #[test]
    fn test_undefined_type_fails_on_use() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="ok" type="xs:string"/>
            <xs:element name="broken" type="missingType"/>
        </xs:schema>"#;
        let schema = CompiledSchema::from_string(xsd).unwrap();

        let ok = schema.element(&QName::local("ok")).unwrap();
        assert!(schema.content_type(&ok).is_ok());

        let broken = schema.element(&QName::local("broken")).unwrap();
        assert!(matches!(schema.content_type(&broken), Err(Error::Compile(_))));
    }

    #[test]
    fn test_circular_derivation_fails() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="loop" type="a"/>
            <xs:complexType name="a"><xs:complexContent><xs:extension base="b"/></xs:complexContent></xs:complexType>
            <xs:complexType name="b"><xs:complexContent><xs:extension base="a"/></xs:complexContent></xs:complexType>
        </xs:schema>"#;
        let schema = CompiledSchema::from_string(xsd).unwrap();
        let decl = schema.element(&QName::local("loop")).unwrap();
        assert!(matches!(schema.content_type(&decl), Err(Error::Compile(_))));
    }

    #[test]
    fn test_substitution_group_member_takes_head_type() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="head" type="xs:string"/>
            <xs:element name="member" substitutionGroup="head"/>
        </xs:schema>"#;
        let schema = CompiledSchema::from_string(xsd).unwrap();
        let member = schema.element(&QName::local("member")).unwrap();
        assert!(matches!(schema.content_type(&member).unwrap(), ContentType::Simple));
    }

    #[test]
    fn test_substitution_members_are_transitive() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="section" substitutionGroup="para"/>
            <xs:element name="block"/>
            <xs:element name="note" substitutionGroup="block"/>
            <xs:element name="para" substitutionGroup="block"/>
            <xs:element name="unrelated"/>
        </xs:schema>"#;
        let schema = CompiledSchema::from_string(xsd).unwrap();
        let block = schema.element(&QName::local("block")).unwrap();
        let members: Vec<_> = schema
            .substitution_members(&block)
            .iter()
            .map(|e| e.name.to_string())
            .collect();
        assert_eq!(members, vec!["section", "note", "para"]);

        let note = schema.element(&QName::local("note")).unwrap();
        assert!(schema.substitution_members(&note).is_empty());
    }

    #[test]
    fn test_xml_namespace_import_without_location() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:import namespace="http://www.w3.org/XML/1998/namespace"/>
        </xs:schema>"#;
        let schema = CompiledSchema::from_string(xsd).unwrap();

        let space = schema
            .attribute(&QName::namespaced(XML_NAMESPACE, "space"))
            .unwrap();
        assert_eq!(schema.enumeration(space).unwrap(), vec!["default", "preserve"]);
        for local in ["lang", "base", "id"] {
            let decl = schema.attribute(&QName::namespaced(XML_NAMESPACE, local)).unwrap();
            assert!(schema.enumeration(decl).unwrap().is_empty());
        }
    }

    #[test]
    fn test_xml_namespace_attributes_need_import() {
        let schema = CompiledSchema::from_string(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"/>"#,
        )
        .unwrap();
        let lang = QName::namespaced(XML_NAMESPACE, "lang");
        assert!(matches!(schema.attribute(&lang), Err(Error::Compile(_))));
    }

    #[test]
    fn test_first_global_declaration_wins() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
            <xs:element name="dup" type="xs:string"/>
            <xs:element name="dup"><xs:complexType/></xs:element>
        </xs:schema>"#;
        let schema = CompiledSchema::from_string(xsd).unwrap();
        assert_eq!(schema.element_count(), 1);
        let dup = schema.element(&QName::local("dup")).unwrap();
        assert!(matches!(schema.content_type(&dup).unwrap(), ContentType::Simple));
    }

    #[test]
    fn test_malformed_xml_is_compile_error() {
        let result = CompiledSchema::from_string("<xs:schema xmlns:xs=\"http://www.w3.org/2001/XMLSchema\">");
        assert!(matches!(result, Err(Error::Compile(_))));
    }

    #[test]
    fn test_missing_file_is_compile_error() {
        let result = CompiledSchema::from_file("/no/such/schema.xsd");
        assert!(matches!(result, Err(Error::Compile(_))));
    }
}

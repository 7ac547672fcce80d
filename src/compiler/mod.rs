//! XSD Schema Compiler
//!
//! This module reads XSD documents into a component model and merges them
//! into a [`CompiledSchema`]:
//!
//! - Global element, type, group, attribute group and attribute declarations
//! - `xs:include` (including chameleon includes), `xs:import` and
//!   `xs:redefine` loaded from the local filesystem
//! - Complex type extension and restriction with attribute inheritance
//! - Enumeration facets on attribute types
//!
//! ## Example
//!
//! ```no_run
//! use xsd2codemirror::compiler::{CompiledSchema, ContentType};
//!
//! let schema = CompiledSchema::from_file("book.xsd")?;
//! for element in schema.global_elements() {
//!     if let ContentType::Complex(content) = schema.content_type(element)? {
//!         println!("{}: {} attributes", element.name, content.attribute_uses.len());
//!     }
//! }
//! # Ok::<(), xsd2codemirror::Error>(())
//! ```

mod components;
mod parsing;
mod schema;

pub use components::{
    AttributeDecl, AttributeItem, AttributeTarget, AttributeUse, ComplexTypeDef, Derivation,
    DerivationMethod, ElementDecl, ElementParticle, ModelGroup, ModelType, Particle,
    SimpleTypeDef, SimpleVariety, TypeDefinition, TypeRef,
};
pub use schema::{CompiledSchema, CompilerOptions, ComplexContent, ContentType, ResolvedType};

//! Simplified element graph
//!
//! This module flattens a compiled schema into one [`SimpleXmlElement`] per
//! distinct element name:
//!
//! - [`model`] - the element and attribute containers
//! - [`walker`] - expansion of sequences, choices and group references
//! - [`extractor`] - attributes, enumeration values and direct children
//! - [`builder`] - breadth-first traversal from the global elements

pub mod builder;
pub mod extractor;
pub mod model;
pub mod walker;

pub use builder::{GraphBuilder, SchemaParser};
pub use extractor::ElementExtractor;
pub use model::{SimpleGraph, SimpleXmlAttribute, SimpleXmlElement};
pub use walker::ParticleWalker;

//! # xsd2codemirror
//!
//! Flattens an XML Schema (XSD) into the schema-info object used by
//! CodeMirror's XML autocompletion.
//!
//! The schema is compiled (following includes and imports), then walked
//! breadth-first from its global elements. Every distinct element name is
//! materialized exactly once with its attributes, their enumerated values and
//! its direct children. The result serializes to a JSON object with a fixed
//! key order, so output for the same schema is byte-identical across runs.
//!
//! ## Features
//!
//! - Sequences, choices, `xs:all` and named groups, including recursive groups
//! - Complex type extension and restriction, attribute groups
//! - Enumerated attribute values
//! - Chameleon includes, imports and redefines from the local filesystem
//! - Compact or pretty JSON
//!
//! ## Example
//!
//! ```no_run
//! use xsd2codemirror::{CodeMirrorSerializer, SchemaParser};
//!
//! let mut parser = SchemaParser::new("schema.xsd");
//! parser.compile()?;
//! let graph = parser.xml_elements()?;
//!
//! let json = CodeMirrorSerializer::new(&graph).pretty(true).to_json_string()?;
//! println!("{}", json);
//! # Ok::<(), xsd2codemirror::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;
pub mod logger;

// XML reading
pub mod namespaces;
pub mod documents;
pub mod loaders;

// Schema compilation
pub mod compiler;

// Graph construction and output
pub mod simple;
pub mod serializer;

// Re-exports for convenience
pub use compiler::{CompiledSchema, CompilerOptions};
pub use error::{Error, ParseError, Result};
pub use limits::Limits;
pub use logger::{LogSink, Logger};
pub use namespaces::QName;
pub use serializer::CodeMirrorSerializer;
pub use simple::{GraphBuilder, SchemaParser, SimpleGraph, SimpleXmlAttribute, SimpleXmlElement};

/// Version of the xsd2codemirror library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XSD 1.0 namespace
pub const XSD_1_0_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XSD 1.1 namespace
pub const XSD_1_1_NAMESPACE: &str = "http://www.w3.org/2009/XMLSchema";

/// XML namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

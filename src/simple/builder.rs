//! Graph construction
//!
//! [`GraphBuilder`] performs a breadth-first traversal from every global
//! element declaration and materializes each distinct element name exactly
//! once. [`SchemaParser`] ties compilation and graph construction together.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::extractor::ElementExtractor;
use super::model::SimpleGraph;
use crate::compiler::{CompiledSchema, CompilerOptions, ElementDecl};
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::logger::Logger;

/// Breadth-first builder of the simplified element graph
pub struct GraphBuilder<'s> {
    schema: &'s CompiledSchema,
    log: &'s Logger,
}

impl<'s> GraphBuilder<'s> {
    /// Create a builder over `schema`
    pub fn new(schema: &'s CompiledSchema, log: &'s Logger) -> Self {
        Self { schema, log }
    }

    /// Build the graph.
    ///
    /// The first declaration dequeued for a name defines that element; later
    /// declarations of the same name are ignored. An element is flagged
    /// top-level while fewer elements than there are global declarations
    /// have been materialized.
    pub fn build(&self) -> Result<SimpleGraph> {
        let mut pending: VecDeque<Arc<ElementDecl>> =
            self.schema.global_elements().cloned().collect();
        let top_level_count = pending.len();
        let extractor = ElementExtractor::new(self.schema, self.log);
        let mut graph = SimpleGraph::new();

        while let Some(decl) = pending.pop_front() {
            if graph.contains_key(&decl.name) {
                continue;
            }

            let is_top_level = graph.len() < top_level_count;
            self.log.write_line(format_args!(
                "Element {}{}",
                decl.name,
                if is_top_level { " (top)" } else { "" }
            ));

            let (element, children) = extractor.extract(&decl, is_top_level)?;
            pending.extend(children);
            graph.insert(element.name.clone(), element);
        }

        Ok(graph)
    }
}

/// Compiles a schema file and builds its simplified element graph
///
/// # Example
///
/// ```no_run
/// use xsd2codemirror::{CodeMirrorSerializer, SchemaParser};
///
/// let mut parser = SchemaParser::new("book.xsd");
/// parser.compile()?;
/// let graph = parser.xml_elements()?;
/// println!("{}", CodeMirrorSerializer::new(&graph).pretty(true).to_json_string()?);
/// # Ok::<(), xsd2codemirror::Error>(())
/// ```
#[derive(Debug)]
pub struct SchemaParser {
    path: PathBuf,
    options: CompilerOptions,
    log: Logger,
    schema: Option<CompiledSchema>,
}

impl SchemaParser {
    /// Create a parser for the schema at `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options: CompilerOptions::default(),
            log: Logger::null(),
            schema: None,
        }
    }

    /// Set the diagnostic logger
    pub fn with_logger(mut self, log: Logger) -> Self {
        self.log = log;
        self
    }

    /// Require the schema to declare this target namespace
    pub fn with_target_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.options = self.options.with_target_namespace(namespace);
        self
    }

    /// Set the resource limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.options = self.options.with_limits(limits);
        self
    }

    /// Path of the primary schema
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Diagnostic logger
    pub fn logger(&self) -> &Logger {
        &self.log
    }

    /// Compile the schema. Includes resolve relative to the schema's own
    /// location; an unreadable include only fails once one of its components
    /// is used.
    pub fn compile(&mut self) -> Result<&CompiledSchema> {
        self.schema = None;
        match CompiledSchema::from_file_with_options(&self.path, &self.options, &self.log) {
            Ok(schema) => Ok(&*self.schema.insert(schema)),
            Err(e) => {
                self.log
                    .write_line(format_args!("Could not compile schema: {}", e));
                Err(e)
            }
        }
    }

    /// The compiled schema, once [`compile`](Self::compile) succeeded
    pub fn schema(&self) -> Option<&CompiledSchema> {
        self.schema.as_ref()
    }

    /// Build the simplified element graph
    pub fn xml_elements(&self) -> Result<SimpleGraph> {
        let schema = self
            .schema
            .as_ref()
            .ok_or_else(|| Error::InvalidUsage("Schema is not compiled yet.".to_string()))?;
        GraphBuilder::new(schema, &self.log).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::QName;

    fn build(xsd: &str) -> SimpleGraph {
        let schema = CompiledSchema::from_string(xsd).unwrap();
        let log = Logger::null();
        GraphBuilder::new(&schema, &log).build().unwrap()
    }

    #[test]
    fn test_xml_elements_before_compile() {
        let parser = SchemaParser::new("never-compiled.xsd");
        assert!(matches!(parser.xml_elements(), Err(Error::InvalidUsage(_))));
    }

    #[test]
    fn test_top_level_flags() {
        let graph = build(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="library">
                    <xs:complexType><xs:sequence>
                        <xs:element name="shelf" type="xs:string"/>
                    </xs:sequence></xs:complexType>
                </xs:element>
                <xs:element name="book" type="xs:string"/>
            </xs:schema>"#,
        );

        let names: Vec<_> = graph.keys().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["library", "book", "shelf"]);
        assert!(graph[&QName::local("library")].is_top_level);
        assert!(graph[&QName::local("book")].is_top_level);
        assert!(!graph[&QName::local("shelf")].is_top_level);
    }

    #[test]
    fn test_first_discovered_shape_wins() {
        let graph = build(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="a">
                    <xs:complexType><xs:sequence>
                        <xs:element name="item">
                            <xs:complexType><xs:attribute name="first"/></xs:complexType>
                        </xs:element>
                    </xs:sequence></xs:complexType>
                </xs:element>
                <xs:element name="b">
                    <xs:complexType><xs:sequence>
                        <xs:element name="item">
                            <xs:complexType><xs:attribute name="second"/></xs:complexType>
                        </xs:element>
                    </xs:sequence></xs:complexType>
                </xs:element>
            </xs:schema>"#,
        );

        assert_eq!(graph.len(), 3);
        let item = &graph[&QName::local("item")];
        assert!(item.attribute(&QName::local("first")).is_some());
        assert!(item.attribute(&QName::local("second")).is_none());
    }

    #[test]
    fn test_self_referential_element() {
        let graph = build(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="item">
                    <xs:complexType><xs:sequence>
                        <xs:element ref="item" minOccurs="0" maxOccurs="unbounded"/>
                    </xs:sequence></xs:complexType>
                </xs:element>
            </xs:schema>"#,
        );

        assert_eq!(graph.len(), 1);
        assert!(graph[&QName::local("item")].has_child(&QName::local("item")));
    }

    #[test]
    fn test_unsupported_construct_aborts() {
        let schema = CompiledSchema::from_string(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
                <xs:element name="open">
                    <xs:complexType>
                        <xs:openContent><xs:any/></xs:openContent>
                        <xs:sequence><xs:element name="x"/></xs:sequence>
                    </xs:complexType>
                </xs:element>
            </xs:schema>"#,
        )
        .unwrap();
        let log = Logger::null();
        let result = GraphBuilder::new(&schema, &log).build();
        assert!(matches!(result, Err(Error::UnsupportedConstruct(_))));
    }
}

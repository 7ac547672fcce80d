//! Resource loading utilities
//!
//! This module reads schema documents from disk and resolves
//! `schemaLocation` values of includes and imports.

use crate::documents::Document;
use crate::error::{Error, Result};
use crate::limits::Limits;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Resource loader for schema documents
#[derive(Debug, Clone, Default)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
}

impl Loader {
    /// Create a new loader with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// The limits this loader enforces
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Load a file's raw bytes. Decoding is left to the XML reader, which
    /// honors the document's declared encoding.
    pub fn load(&self, path: &Path) -> Result<Vec<u8>> {
        let content = fs::read(path).map_err(|e| {
            Error::Resource(format!("Failed to read file '{}': {}", path.display(), e))
        })?;

        self.limits.check_xml_size(content.len())?;

        Ok(content)
    }

    /// Load and parse an XML document
    pub fn load_document(&self, path: &Path) -> Result<Document> {
        let content = self.load(path)?;
        Document::parse_with_limits(&content, &self.limits)
    }
}

/// Resolve a `schemaLocation` against the directory of the referencing schema.
///
/// Returns `None` for remote locations, which are treated as unreadable.
pub fn resolve_schema_location(location: &str, base_dir: Option<&Path>) -> Option<PathBuf> {
    let location = location.trim();

    if let Ok(url) = Url::parse(location) {
        // Single letters are Windows drive prefixes, not schemes.
        if url.scheme().len() > 1 {
            return if url.scheme() == "file" {
                url.to_file_path().ok()
            } else {
                None
            };
        }
    }

    let location_path = Path::new(location);
    if location_path.is_absolute() {
        return Some(location_path.to_path_buf());
    }

    match base_dir {
        Some(base) => Some(base.join(location_path)),
        None => Some(location_path.to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "<root>test</root>").unwrap();

        let content = Loader::new().load(file.path()).unwrap();
        assert!(content.starts_with(b"<root>test</root>"));
    }

    #[test]
    fn test_load_non_utf8_document() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<root name=\"caf")
            .unwrap();
        file.write_all(&[0xE9]).unwrap();
        file.write_all(b"\"/>").unwrap();

        let doc = Loader::new().load_document(file.path()).unwrap();
        assert_eq!(doc.root().unwrap().get_attribute("name"), Some("caf\u{e9}"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Loader::new().load(Path::new("/definitely/not/here.xsd"));
        assert!(matches!(result, Err(Error::Resource(_))));
    }

    #[test]
    fn test_size_limit() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", "x".repeat(2048)).unwrap();

        let loader = Loader::new().with_limits(Limits::default().with_max_xml_size(1024));
        assert!(matches!(loader.load(file.path()), Err(Error::LimitExceeded(_))));
    }

    #[test]
    fn test_resolve_relative_location() {
        let resolved = resolve_schema_location("common/types.xsd", Some(Path::new("/schemas")));
        assert_eq!(resolved, Some(PathBuf::from("/schemas/common/types.xsd")));
    }

    #[test]
    fn test_resolve_absolute_and_file_url() {
        assert_eq!(
            resolve_schema_location("/abs/a.xsd", Some(Path::new("/schemas"))),
            Some(PathBuf::from("/abs/a.xsd"))
        );
        assert_eq!(
            resolve_schema_location("file:///abs/b.xsd", None),
            Some(PathBuf::from("/abs/b.xsd"))
        );
    }

    #[test]
    fn test_resolve_remote_location() {
        assert_eq!(resolve_schema_location("http://example.com/a.xsd", None), None);
    }
}

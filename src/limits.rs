//! Limits for schema loading
//!
//! These bound how much input a single compilation will accept, so a
//! pathological include graph or an oversized document fails with a clear
//! error instead of exhausting memory.

use crate::error::{Error, Result};

/// Resource limits applied while reading and compiling schemas
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum element nesting depth of a schema document
    pub max_xml_depth: usize,

    /// Maximum size of one schema document in bytes
    pub max_xml_size: usize,

    /// Maximum number of schema documents (primary + includes/imports)
    pub max_schema_documents: usize,

    /// Maximum number of global element declarations
    pub max_global_elements: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_xml_depth: 1000,
            max_xml_size: 100 * 1024 * 1024, // 100 MB
            max_schema_documents: 1000,
            max_global_elements: 100_000,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_xml_depth: 100,
            max_xml_size: 10 * 1024 * 1024, // 10 MB
            max_schema_documents: 100,
            max_global_elements: 10_000,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_xml_depth: 10_000,
            max_xml_size: 1024 * 1024 * 1024, // 1 GB
            max_schema_documents: 100_000,
            max_global_elements: 10_000_000,
        }
    }

    /// Set the maximum nesting depth
    pub fn with_max_xml_depth(mut self, depth: usize) -> Self {
        self.max_xml_depth = depth;
        self
    }

    /// Set the maximum document size
    pub fn with_max_xml_size(mut self, size: usize) -> Self {
        self.max_xml_size = size;
        self
    }

    /// Set the maximum number of schema documents
    pub fn with_max_schema_documents(mut self, count: usize) -> Self {
        self.max_schema_documents = count;
        self
    }

    /// Check if XML depth is within limits
    pub fn check_xml_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_xml_depth {
            Err(Error::LimitExceeded(format!(
                "XML depth {} exceeds maximum {}",
                depth, self.max_xml_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if XML size is within limits
    pub fn check_xml_size(&self, size: usize) -> Result<()> {
        if size > self.max_xml_size {
            Err(Error::LimitExceeded(format!(
                "XML size {} bytes exceeds maximum {} bytes",
                size, self.max_xml_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the number of loaded schema documents is within limits
    pub fn check_schema_documents(&self, count: usize) -> Result<()> {
        if count > self.max_schema_documents {
            Err(Error::LimitExceeded(format!(
                "Schema document count {} exceeds maximum {}",
                count, self.max_schema_documents
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the number of global elements is within limits
    pub fn check_global_elements(&self, count: usize) -> Result<()> {
        if count > self.max_global_elements {
            Err(Error::LimitExceeded(format!(
                "Global element count {} exceeds maximum {}",
                count, self.max_global_elements
            )))
        } else {
            Ok(())
        }
    }
}

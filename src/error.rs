//! Error types for xsd-bind
//!
//! This module defines all error types used throughout the library.
//! Errors raised while walking data carry the [`FieldPath`] at which
//! they occurred so nested failures can be located.

use std::fmt;
use thiserror::Error;

/// Result type alias using xsd-bind Error
pub type Result<T> = std::result::Result<T, Error>;

/// Kind of schema component named by a reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    /// Element declaration
    Element,
    /// Attribute declaration
    Attribute,
    /// Complex type definition
    ComplexType,
    /// Simple type definition
    SimpleType,
    /// Complex or simple type (unknown which)
    Type,
    /// Named model group
    Group,
    /// Named attribute group
    AttributeGroup,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Element => "element",
            Self::Attribute => "attribute",
            Self::ComplexType => "complexType",
            Self::SimpleType => "simpleType",
            Self::Type => "type",
            Self::Group => "group",
            Self::AttributeGroup => "attributeGroup",
        };
        f.write_str(name)
    }
}

/// Path of element/attribute names leading to a value, e.g. `entry/link[1]/href`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Create an empty path
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a path starting at the given root name
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            segments: vec![name.into()],
        }
    }

    /// Path of a named child
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    /// Path of an array member of the current field
    pub fn index(&self, index: usize) -> Self {
        self.child(format!("[{}]", index))
    }

    /// Attribute path (rendered with a leading `@`)
    pub fn attribute(&self, name: &str) -> Self {
        self.child(format!("@{}", name))
    }

    /// Check whether the path has no segments
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("(root)");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 && !segment.starts_with('[') {
                f.write_str("/")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

/// Main error type for xsd-bind operations
#[derive(Error, Debug)]
pub enum Error {
    /// Input XML or XSD text is not well-formed
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// A named reference cannot be resolved in the schema graph
    #[error("unresolved {kind} reference '{name}' at {path}")]
    SchemaReference {
        /// Kind of the referenced component
        kind: ComponentKind,
        /// Reference as written in the schema
        name: String,
        /// Data path being processed
        path: FieldPath,
    },

    /// A reference cycle was found while walking the schema
    #[error("circular {kind} reference '{name}' at {path}")]
    CircularReference {
        /// Kind of the referenced component
        kind: ComponentKind,
        /// Reference closing the cycle
        name: String,
        /// Data path being processed
        path: FieldPath,
    },

    /// Data is incompatible with the schema shape
    #[error("type mismatch at {path}: {message}")]
    TypeMismatch {
        /// Offending field
        path: FieldPath,
        /// What was expected
        message: String,
    },

    /// Required data is absent
    #[error("missing required value at {path}")]
    MissingValue {
        /// Missing field
        path: FieldPath,
    },

    /// Schema carries a value that cannot be interpreted
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// Name error (invalid XML name)
    #[error("name error: {0}")]
    Name(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// XML writing error
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON dump or load error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Unresolved reference with an empty path
    pub fn reference(kind: ComponentKind, name: impl Into<String>) -> Self {
        Self::SchemaReference {
            kind,
            name: name.into(),
            path: FieldPath::new(),
        }
    }

    /// Circular reference with an empty path
    pub fn circular(kind: ComponentKind, name: impl Into<String>) -> Self {
        Self::CircularReference {
            kind,
            name: name.into(),
            path: FieldPath::new(),
        }
    }

    /// Type mismatch at a path
    pub fn type_mismatch(path: &FieldPath, message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            path: path.clone(),
            message: message.into(),
        }
    }

    /// Missing required value at a path
    pub fn missing(path: &FieldPath) -> Self {
        Self::MissingValue { path: path.clone() }
    }

    /// Stamp the path on errors raised without one
    pub fn at(mut self, at: &FieldPath) -> Self {
        match &mut self {
            Self::SchemaReference { path, .. }
            | Self::CircularReference { path, .. }
            | Self::TypeMismatch { path, .. }
            | Self::MissingValue { path } => {
                if path.is_empty() {
                    *path = at.clone();
                }
            }
            _ => {}
        }
        self
    }

    /// Data path carried by the error, if any
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            Self::SchemaReference { path, .. }
            | Self::CircularReference { path, .. }
            | Self::TypeMismatch { path, .. }
            | Self::MissingValue { path } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_path_display() {
        let path = FieldPath::root("entry").child("link").index(1).attribute("href");
        assert_eq!(path.to_string(), "entry/link[1]/@href");
        assert_eq!(FieldPath::new().to_string(), "(root)");
    }

    #[test]
    fn test_error_display() {
        let err = Error::type_mismatch(&FieldPath::root("entry").child("link"), "expected an array");
        let msg = format!("{}", err);
        assert!(msg.contains("entry/link"));
        assert!(msg.contains("expected an array"));
    }

    #[test]
    fn test_at_fills_empty_path_only() {
        let err = Error::reference(ComponentKind::Group, "tns:missing").at(&FieldPath::root("a"));
        assert_eq!(err.path().map(|p| p.to_string()).as_deref(), Some("a"));

        let err = Error::missing(&FieldPath::root("b")).at(&FieldPath::root("a"));
        assert_eq!(err.path().map(|p| p.to_string()).as_deref(), Some("b"));
    }

    #[test]
    fn test_component_kind_display() {
        let err = Error::circular(ComponentKind::AttributeGroup, "attrs");
        assert!(err.to_string().starts_with("circular attributeGroup reference 'attrs'"));
    }
}

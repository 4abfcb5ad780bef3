//! Converter options
//!
//! Builder-style configuration for the XML builder and the schema-driven
//! XML parser.

use crate::documents::WriteOptions;
use crate::limits::Limits;

/// Options for [`build`](super::build)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Top-level element to build (name or prefixed name)
    root_element: Option<String>,
    /// Prefix bound to the root element's namespace
    prefix: Option<String>,
    /// Emit an XML declaration
    xml_decl: bool,
    /// Encoding named in the XML declaration
    encoding: String,
    /// Indent the output
    pretty: bool,
    /// Indentation width when pretty printing
    indent: usize,
    /// Write `<root></root>` instead of `<root/>` for an empty root
    force_root_close_tag: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            root_element: None,
            prefix: None,
            xml_decl: true,
            encoding: "UTF-8".to_string(),
            pretty: false,
            indent: 2,
            force_root_close_tag: false,
        }
    }
}

impl BuildOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the explicit root element
    pub fn root_element(&self) -> Option<&str> {
        self.root_element.as_deref()
    }

    /// Get the root namespace prefix override
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Check if an XML declaration is written
    pub fn xml_decl(&self) -> bool {
        self.xml_decl
    }

    /// Get the declared encoding
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Check if output is indented
    pub fn pretty(&self) -> bool {
        self.pretty
    }

    /// Get the indentation width
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Check if an empty root keeps its close tag
    pub fn force_root_close_tag(&self) -> bool {
        self.force_root_close_tag
    }

    /// Build this top-level element instead of guessing from the data
    pub fn with_root_element(mut self, name: impl Into<String>) -> Self {
        self.root_element = Some(name.into());
        self
    }

    /// Bind this prefix to the root element's namespace
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set whether an XML declaration is written
    pub fn with_xml_decl(mut self, xml_decl: bool) -> Self {
        self.xml_decl = xml_decl;
        self
    }

    /// Set the encoding named in the XML declaration
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Set pretty printing
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Set indentation width (implies pretty printing)
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self.pretty = true;
        self
    }

    /// Keep an explicit close tag on an empty root element
    pub fn with_force_root_close_tag(mut self, force: bool) -> Self {
        self.force_root_close_tag = force;
        self
    }

    /// Document writer options
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            xml_decl: self.xml_decl,
            encoding: self.encoding.clone(),
            indent: self.pretty.then_some(self.indent),
        }
    }
}

/// Options for [`parse_with`](super::parse_with)
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Top-level element expected at the document root
    root_element: Option<String>,
    /// Return `{ rootName: content }` instead of the bare content
    wrap_root: bool,
    /// Limits applied while reading the document
    limits: Limits,
}

impl ParseOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the expected root element
    pub fn root_element(&self) -> Option<&str> {
        self.root_element.as_deref()
    }

    /// Check if the result is wrapped in the root element name
    pub fn wrap_root(&self) -> bool {
        self.wrap_root
    }

    /// Get the reading limits
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Decode the root with this top-level element declaration
    pub fn with_root_element(mut self, name: impl Into<String>) -> Self {
        self.root_element = Some(name.into());
        self
    }

    /// Wrap the result in an object keyed by the root element name
    pub fn with_wrap_root(mut self, wrap: bool) -> Self {
        self.wrap_root = wrap;
        self
    }

    /// Set reading limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}

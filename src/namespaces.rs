//! XML namespace handling
//!
//! This module provides qualified names (QNames) and the prefix tables used
//! both by schemas (their `xmlns` declarations) and by the XML builder, which
//! allocates prefixes for every namespace it writes.

use crate::error::{Error, Result};
use crate::XML_NAMESPACE;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// XML Namespace URI
pub type NamespaceUri = String;

/// Namespace prefix
pub type Prefix = String;

/// Qualified name (QName) - combination of namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<NamespaceUri>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(|s| s.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }

    /// Namespace as a string slice
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Check if this name matches a namespace and local name exactly
    pub fn matches(&self, namespace: Option<&str>, local_name: &str) -> bool {
        self.local_name == local_name && self.namespace.as_deref() == namespace
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => f.write_str(&self.local_name),
        }
    }
}

/// Namespace context for resolving prefixes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI, in declaration order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    prefixes: IndexMap<Prefix, NamespaceUri>,
    /// Default namespace (no prefix)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_namespace: Option<NamespaceUri>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Set the default namespace
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        self.default_namespace = Some(namespace.into());
    }

    /// Get the namespace for a prefix
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE);
        }
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Get the default namespace
    pub fn get_default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// First prefix bound to a namespace
    pub fn prefix_for(&self, namespace: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|(_, uri)| uri.as_str() == namespace)
            .map(|(prefix, _)| prefix.as_str())
    }

    /// Iterate over prefixed declarations
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    /// Check if no namespace is declared
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty() && self.default_namespace.is_none()
    }

    /// Copy declarations from another context, keeping existing prefixes
    pub fn merge(&mut self, other: &NamespaceContext) {
        for (prefix, uri) in other.iter() {
            if !self.prefixes.contains_key(prefix) {
                self.add_prefix(prefix, uri);
            }
        }
        if self.default_namespace.is_none() {
            self.default_namespace = other.default_namespace.clone();
        }
    }

    /// Resolve a prefixed name to a QName
    pub fn resolve(&self, prefixed_name: &str) -> Result<QName> {
        if let Some((prefix, local)) = prefixed_name.split_once(':') {
            let namespace = self
                .get_namespace(prefix)
                .ok_or_else(|| Error::Name(format!("Unknown prefix: {}", prefix)))?;
            Ok(QName::namespaced(namespace, local))
        } else {
            Ok(QName::new(self.default_namespace.clone(), prefixed_name))
        }
    }

    /// Prefix for a namespace, declaring one if the namespace is new.
    ///
    /// An existing binding always wins. Otherwise `preferred` is used when
    /// free, and a numbered variant of it (or of `ns`) when taken.
    pub fn declare(&mut self, namespace: &str, preferred: Option<&str>) -> String {
        if namespace == XML_NAMESPACE {
            return "xml".to_string();
        }
        if let Some(prefix) = self.prefix_for(namespace) {
            return prefix.to_string();
        }
        let base = preferred
            .filter(|p| !p.is_empty() && !p.starts_with("xml"))
            .unwrap_or("ns");
        let mut candidate = base.to_string();
        let mut counter = 0;
        while self.prefixes.contains_key(&candidate) {
            counter += 1;
            candidate = format!("{}{}", base, counter);
        }
        self.add_prefix(candidate.clone(), namespace);
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qname_display() {
        let qname = QName::namespaced("http://example.com", "element");
        assert_eq!(qname.to_string(), "{http://example.com}element");
        assert_eq!(QName::local("element").to_string(), "element");
    }

    #[test]
    fn test_resolve_prefixed_name() {
        let mut ctx = NamespaceContext::new();
        ctx.add_prefix("xs", "http://www.w3.org/2001/XMLSchema");
        ctx.set_default_namespace("http://example.com");

        let qname = ctx.resolve("xs:element").unwrap();
        assert!(qname.matches(Some("http://www.w3.org/2001/XMLSchema"), "element"));

        let qname = ctx.resolve("item").unwrap();
        assert!(qname.matches(Some("http://example.com"), "item"));

        assert!(ctx.resolve("nope:item").is_err());
    }

    #[test]
    fn test_declare_reuses_and_numbers_prefixes() {
        let mut ctx = NamespaceContext::new();
        assert_eq!(ctx.declare("urn:a", Some("a")), "a");
        assert_eq!(ctx.declare("urn:a", Some("other")), "a");
        assert_eq!(ctx.declare("urn:b", Some("a")), "a1");
        assert_eq!(ctx.declare("urn:c", None), "ns");
        assert_eq!(ctx.declare(XML_NAMESPACE, None), "xml");
        assert_eq!(ctx.iter().count(), 3);
    }

    #[test]
    fn test_merge_keeps_first_binding() {
        let mut first = NamespaceContext::new();
        first.add_prefix("a", "urn:a");
        let mut second = NamespaceContext::new();
        second.add_prefix("a", "urn:other");
        second.add_prefix("b", "urn:b");
        first.merge(&second);
        assert_eq!(first.get_namespace("a"), Some("urn:a"));
        assert_eq!(first.get_namespace("b"), Some("urn:b"));
    }
}

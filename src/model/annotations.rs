//! Annotations and opaque passthrough nodes

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// `xs:annotation` with its documentation and appinfo text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Annotation {
    /// `id` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Text of each `xs:documentation` child
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub documentation: Vec<String>,
    /// Text of each `xs:appinfo` child
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub appinfo: Vec<String>,
}

/// A construct the parser does not model, kept verbatim
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OpaqueNode {
    /// Namespace URI of the node
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Local name of the node
    pub name: String,
    /// Attributes as written (prefixed names kept)
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,
    /// Text content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Child nodes
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OpaqueNode>,
}

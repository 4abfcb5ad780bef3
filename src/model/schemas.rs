//! The schema document and its composition directives
//!
//! A [`Schema`] mirrors one `xs:schema` document. Composition directives
//! (`xs:include`, `xs:import`, `xs:redefine`, `xs:override`) carry a
//! `linked` slot that the linker fills with the target schema.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::annotations::{Annotation, OpaqueNode};
use super::attributes::{Attribute, AttributeGroup};
use super::complex_types::ComplexType;
use super::elements::Element;
use super::groups::Group;
use super::simple_types::SimpleType;
use crate::namespaces::{NamespaceContext, QName};
use crate::names::split_qname;

/// Check an XSD boolean attribute (`true` or `1`)
pub(crate) fn is_true(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("true") | Some("1"))
}

/// Qualification of local declarations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Form {
    /// Local names carry the target namespace
    Qualified,
    /// Local names are in no namespace (default)
    #[default]
    Unqualified,
}

impl Form {
    /// Parse from attribute value
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "qualified" => Some(Self::Qualified),
            "unqualified" => Some(Self::Unqualified),
            _ => None,
        }
    }

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Qualified => "qualified",
            Self::Unqualified => "unqualified",
        }
    }

    /// Check for qualified form
    pub fn is_qualified(&self) -> bool {
        *self == Self::Qualified
    }
}

/// Top-level components of a schema (or of a redefine/override block)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Components {
    /// Global element declarations
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<Element>,
    /// Global attribute declarations
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    /// Named complex types
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub complex_types: Vec<ComplexType>,
    /// Named simple types
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub simple_types: Vec<SimpleType>,
    /// Named model groups
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Group>,
    /// Named attribute groups
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attribute_groups: Vec<AttributeGroup>,
}

impl Components {
    /// Check if no component is declared
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
            && self.attributes.is_empty()
            && self.complex_types.is_empty()
            && self.simple_types.is_empty()
            && self.groups.is_empty()
            && self.attribute_groups.is_empty()
    }

    /// Global element by local name
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.name.as_deref() == Some(name))
    }

    /// Named complex type by local name
    pub fn complex_type(&self, name: &str) -> Option<&ComplexType> {
        self.complex_types.iter().find(|t| t.name.as_deref() == Some(name))
    }

    /// Named simple type by local name
    pub fn simple_type(&self, name: &str) -> Option<&SimpleType> {
        self.simple_types.iter().find(|t| t.name.as_deref() == Some(name))
    }

    /// Named group by local name
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name.as_deref() == Some(name))
    }

    /// Named attribute group by local name
    pub fn attribute_group(&self, name: &str) -> Option<&AttributeGroup> {
        self.attribute_groups.iter().find(|g| g.name.as_deref() == Some(name))
    }

    /// Global attribute by local name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name.as_deref() == Some(name))
    }
}

/// `xs:include`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Include {
    /// `id` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// `schemaLocation`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_location: Option<String>,
    /// Annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
    /// Included schema, once linked
    #[serde(skip)]
    pub linked: Option<Arc<Schema>>,
}

/// `xs:import`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Import {
    /// `id` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Imported namespace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// `schemaLocation` (a hint, may be absent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_location: Option<String>,
    /// Annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
    /// Imported schema, once linked
    #[serde(skip)]
    pub linked: Option<Arc<Schema>>,
}

/// `xs:redefine` or `xs:override`
///
/// The block's components replace same-named components of the linked
/// schema. In a redefine, a type may derive from (and a group may
/// reference) its own name to mean the original definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Redefinition {
    /// `id` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// `schemaLocation`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_location: Option<String>,
    /// Annotations inside the block
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    /// Replacement components
    #[serde(flatten)]
    pub components: Components,
    /// Redefined schema, once linked
    #[serde(skip)]
    pub linked: Option<Arc<Schema>>,
}

/// `xs:notation`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Notation {
    /// `id` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Notation name
    pub name: String,
    /// `public` identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<String>,
    /// `system` identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
}

/// An `xs:schema` document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Schema {
    /// Identifier the schema is known by in a pool (file name or URL)
    #[serde(rename = "$filename", skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// `id` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// `version` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// `targetNamespace`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_namespace: Option<String>,
    /// Raw `elementFormDefault`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_form_default: Option<String>,
    /// Raw `attributeFormDefault`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_form_default: Option<String>,
    /// `blockDefault`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_default: Option<String>,
    /// `finalDefault`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_default: Option<String>,
    /// XSD 1.1 `defaultAttributes`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_attributes: Option<String>,
    /// `xml:lang`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Namespace declarations on the root element
    #[serde(skip_serializing_if = "NamespaceContext::is_empty")]
    pub namespaces: NamespaceContext,
    /// Top-level annotations
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    /// `xs:include` directives
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<Include>,
    /// `xs:import` directives
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<Import>,
    /// `xs:redefine` blocks
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub redefines: Vec<Redefinition>,
    /// `xs:override` blocks (XSD 1.1)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<Redefinition>,
    /// Top-level components
    #[serde(flatten)]
    pub components: Components,
    /// `xs:notation` declarations
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notations: Vec<Notation>,
    /// Unmodelled top-level children
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown: Vec<OpaqueNode>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the identifier used to match composition directives
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Interpreted `elementFormDefault`
    pub fn element_form(&self) -> Form {
        self.element_form_default
            .as_deref()
            .and_then(Form::parse)
            .unwrap_or_default()
    }

    /// Interpreted `attributeFormDefault`
    pub fn attribute_form(&self) -> Form {
        self.attribute_form_default
            .as_deref()
            .and_then(Form::parse)
            .unwrap_or_default()
    }

    /// Resolve a QName-valued attribute against this schema's declarations.
    ///
    /// Unlike [`NamespaceContext::resolve`] this never fails: an unknown
    /// prefix yields a name without namespace, which lookups then match by
    /// local name only.
    pub fn resolve_qname(&self, value: &str) -> QName {
        let value = value.trim();
        match split_qname(value) {
            (Some(prefix), local) => {
                QName::new(self.namespaces.get_namespace(prefix), local)
            }
            (None, local) => QName::new(self.namespaces.get_default_namespace(), local),
        }
    }

    /// Prefix this schema uses for a namespace, if any
    pub fn prefix_for(&self, namespace: &str) -> Option<&str> {
        self.namespaces.prefix_for(namespace)
    }

    /// Schemas pulled in by include, redefine and override (same namespace)
    pub fn included(&self) -> impl Iterator<Item = &Arc<Schema>> {
        self.includes
            .iter()
            .filter_map(|i| i.linked.as_ref())
            .chain(self.redefines.iter().filter_map(|r| r.linked.as_ref()))
            .chain(self.overrides.iter().filter_map(|r| r.linked.as_ref()))
    }

    /// Schemas pulled in by import (foreign namespaces)
    pub fn imported(&self) -> impl Iterator<Item = &Arc<Schema>> {
        self.imports.iter().filter_map(|i| i.linked.as_ref())
    }

    /// All directly linked schemas, included ones first
    pub fn linked_schemas(&self) -> impl Iterator<Item = &Arc<Schema>> {
        self.included().chain(self.imported())
    }

    /// Check whether the schema has composition directives
    pub fn has_directives(&self) -> bool {
        !(self.includes.is_empty()
            && self.imports.is_empty()
            && self.redefines.is_empty()
            && self.overrides.is_empty())
    }

    /// Copy of this schema adopted into another namespace (chameleon include)
    pub fn adopted(&self, namespace: &str) -> Schema {
        let mut schema = self.clone();
        schema.target_namespace = Some(namespace.to_string());
        if schema.namespaces.get_default_namespace().is_none() {
            schema.namespaces.set_default_namespace(namespace);
        }
        schema
    }

    /// Dump the schema data model as JSON
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a schema data model from a JSON dump (links are not restored)
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

//! Attribute declarations and attribute groups

use serde::{Deserialize, Serialize};

use super::annotations::Annotation;
use super::groups::Wildcard;
use super::schemas::Form;
use super::simple_types::SimpleType;

/// Interpreted `use` of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeUse {
    /// May be absent (default)
    #[default]
    Optional,
    /// Must be present
    Required,
    /// Must not be present
    Prohibited,
}

impl AttributeUse {
    /// Parse from attribute value
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "optional" => Some(Self::Optional),
            "required" => Some(Self::Required),
            "prohibited" => Some(Self::Prohibited),
            _ => None,
        }
    }

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Optional => "optional",
            Self::Required => "required",
            Self::Prohibited => "prohibited",
        }
    }
}

/// `xs:attribute`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Attribute {
    /// `id` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Declared name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Reference to a global attribute (`ref`)
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Named simple type (`type`)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Raw `use`
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,
    /// `default` value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// `fixed` value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed: Option<String>,
    /// `form` override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
    /// XSD 1.1 `targetNamespace` on local declarations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_namespace: Option<String>,
    /// XSD 1.1 `inheritable`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inheritable: Option<String>,
    /// Annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
    /// Inline simple type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simple_type: Option<Box<SimpleType>>,
}

impl Attribute {
    /// Create a named attribute
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Interpreted `use` (unknown values count as optional)
    pub fn use_mode(&self) -> AttributeUse {
        self.use_
            .as_deref()
            .and_then(AttributeUse::parse)
            .unwrap_or_default()
    }

    /// Check `use="required"`
    pub fn is_required(&self) -> bool {
        self.use_mode() == AttributeUse::Required
    }

    /// Check `use="prohibited"`
    pub fn is_prohibited(&self) -> bool {
        self.use_mode() == AttributeUse::Prohibited
    }

    /// Interpreted `form` override
    pub fn form(&self) -> Option<Form> {
        self.form.as_deref().and_then(Form::parse)
    }

    /// Name for data keys: the declared name, or the local part of the ref
    pub fn local_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.reference.as_deref().map(crate::names::local_name))
    }
}

/// Attribute uses of a complex type, derivation or attribute group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AttributeList {
    /// Attributes and attribute group references in source order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<AttributeItem>,
    /// `xs:anyAttribute`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_attribute: Option<Wildcard>,
}

impl AttributeList {
    /// Check if the list declares nothing
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.any_attribute.is_none()
    }

    /// Append an attribute
    pub fn push(&mut self, attribute: Attribute) {
        self.items.push(AttributeItem::Attribute(attribute));
    }
}

/// Entry of an [`AttributeList`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeItem {
    /// Local attribute or attribute reference
    Attribute(Attribute),
    /// `xs:attributeGroup ref="..."`
    AttributeGroup(AttributeGroup),
}

/// `xs:attributeGroup`, either a named definition or a reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AttributeGroup {
    /// `id` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Name of a definition
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Referenced group
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
    /// Attributes of a definition
    #[serde(skip_serializing_if = "AttributeList::is_empty")]
    pub attributes: AttributeList,
}

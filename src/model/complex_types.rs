//! Complex type definitions
//!
//! Content is one of: nothing, a model group, a group reference, or a
//! `simpleContent`/`complexContent` derivation from a base type.
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#Complex_Type_Definitions

use serde::{Deserialize, Serialize};

use super::annotations::{Annotation, OpaqueNode};
use super::attributes::AttributeList;
use super::groups::{GroupRef, ModelGroup, Particle};
use super::schemas::is_true;
use super::simple_types::{Facet, SimpleType};

/// `xs:complexType`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComplexType {
    /// `id` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Type name (absent for anonymous types)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `mixed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mixed: Option<String>,
    /// `abstract`
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_: Option<String>,
    /// `block`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
    /// `final`
    #[serde(rename = "final", skip_serializing_if = "Option::is_none")]
    pub final_: Option<String>,
    /// XSD 1.1 `defaultAttributesApply`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_attributes_apply: Option<String>,
    /// Annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
    /// Content model
    #[serde(skip_serializing_if = "Content::is_empty")]
    pub content: Content,
    /// Attributes declared directly on the type
    #[serde(skip_serializing_if = "AttributeList::is_empty")]
    pub attributes: AttributeList,
    /// Unmodelled children (e.g. XSD 1.1 `xs:assert`)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown: Vec<OpaqueNode>,
}

impl ComplexType {
    /// Create a type with a model group as content
    pub fn with_model(model: ModelGroup) -> Self {
        Self {
            content: Content::Model(model),
            ..Self::default()
        }
    }

    /// Check `mixed="true"` on the type or its `complexContent`
    pub fn is_mixed(&self) -> bool {
        if is_true(self.mixed.as_deref()) {
            return true;
        }
        match &self.content {
            Content::ComplexContent(derived) => is_true(derived.mixed.as_deref()),
            _ => false,
        }
    }

    /// Check `abstract="true"`
    pub fn is_abstract(&self) -> bool {
        is_true(self.abstract_.as_deref())
    }

    /// The derivation, if content is derived from a base type
    pub fn derivation(&self) -> Option<&Derivation> {
        match &self.content {
            Content::SimpleContent(derived) | Content::ComplexContent(derived) => {
                Some(&derived.derivation)
            }
            _ => None,
        }
    }

    /// Check for simple content
    pub fn has_simple_content(&self) -> bool {
        matches!(self.content, Content::SimpleContent(_))
    }
}

/// Content of a complex type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Content {
    /// No element content
    #[default]
    Empty,
    /// `xs:sequence`, `xs:choice` or `xs:all`
    Model(ModelGroup),
    /// `xs:group ref="..."`
    Group(GroupRef),
    /// `xs:simpleContent`
    SimpleContent(DerivedContent),
    /// `xs:complexContent`
    ComplexContent(DerivedContent),
}

impl Content {
    /// Check for empty content
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// `xs:simpleContent` or `xs:complexContent` wrapper
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DerivedContent {
    /// `id` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// `mixed` (complexContent only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mixed: Option<String>,
    /// Annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
    /// The extension or restriction
    pub derivation: Derivation,
}

/// Derivation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DerivationKind {
    /// `xs:extension`
    #[default]
    Extension,
    /// `xs:restriction`
    Restriction,
}

impl DerivationKind {
    /// Parse from element tag name
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "extension" => Some(Self::Extension),
            "restriction" => Some(Self::Restriction),
            _ => None,
        }
    }

    /// XSD tag name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extension => "extension",
            Self::Restriction => "restriction",
        }
    }
}

/// `xs:extension` or `xs:restriction` of a complex type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Derivation {
    /// Extension or restriction
    pub kind: DerivationKind,
    /// `id` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Base type QName
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
    /// Content particle (model group or group reference)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub particle: Option<Particle>,
    /// Attributes added or restricted
    #[serde(skip_serializing_if = "AttributeList::is_empty")]
    pub attributes: AttributeList,
    /// Inline simple type (simpleContent restriction)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simple_type: Option<Box<SimpleType>>,
    /// Facets (simpleContent restriction)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<Facet>,
}

impl Derivation {
    /// Create an extension of `base`
    pub fn extension(base: impl Into<String>) -> Self {
        Self {
            kind: DerivationKind::Extension,
            base: Some(base.into()),
            ..Self::default()
        }
    }

    /// Create a restriction of `base`
    pub fn restriction(base: impl Into<String>) -> Self {
        Self {
            kind: DerivationKind::Restriction,
            base: Some(base.into()),
            ..Self::default()
        }
    }

    /// Check for extension
    pub fn is_extension(&self) -> bool {
        self.kind == DerivationKind::Extension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Compositor;

    #[test]
    fn test_mixed_on_complex_content() {
        let mut ct = ComplexType::default();
        assert!(!ct.is_mixed());
        ct.content = Content::ComplexContent(DerivedContent {
            mixed: Some("true".to_string()),
            derivation: Derivation::extension("tns:Base"),
            ..DerivedContent::default()
        });
        assert!(ct.is_mixed());
        assert!(ct.derivation().is_some_and(Derivation::is_extension));
    }

    #[test]
    fn test_model_content() {
        let ct = ComplexType::with_model(ModelGroup::new(Compositor::Choice));
        assert!(ct.derivation().is_none());
        assert!(!ct.has_simple_content());
        assert!(!ct.content.is_empty());
    }
}

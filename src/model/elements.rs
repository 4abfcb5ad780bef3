//! Element declarations
//!
//! The same struct describes top-level declarations (`name`, maybe
//! `abstract`/`substitutionGroup`) and local particles (`name` XOR `ref`,
//! plus occurrence bounds).

use serde::{Deserialize, Serialize};

use super::annotations::{Annotation, OpaqueNode};
use super::complex_types::ComplexType;
use super::particles::Occurs;
use super::schemas::{is_true, Form};
use super::simple_types::SimpleType;
use crate::error::Result;
use crate::names::local_name;

/// `xs:element`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Element {
    /// `id` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Declared name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Reference to a top-level element (`ref`)
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Named type (`type`)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Raw `minOccurs`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_occurs: Option<String>,
    /// Raw `maxOccurs`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_occurs: Option<String>,
    /// `default` value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// `fixed` value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed: Option<String>,
    /// `nillable`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nillable: Option<String>,
    /// `abstract`
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_: Option<String>,
    /// `substitutionGroup` (a list of QNames in XSD 1.1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitution_group: Option<String>,
    /// `form` override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
    /// `block`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<String>,
    /// `final`
    #[serde(rename = "final", skip_serializing_if = "Option::is_none")]
    pub final_: Option<String>,
    /// XSD 1.1 `targetNamespace` on local declarations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_namespace: Option<String>,
    /// Annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
    /// Inline complex type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complex_type: Option<Box<ComplexType>>,
    /// Inline simple type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simple_type: Option<Box<SimpleType>>,
    /// `xs:key`, `xs:keyref` and `xs:unique` children
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub identity_constraints: Vec<IdentityConstraint>,
    /// Unmodelled children (e.g. XSD 1.1 `xs:alternative`)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown: Vec<OpaqueNode>,
}

impl Element {
    /// Create a named element declaration
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Create an element reference
    pub fn reference(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            ..Self::default()
        }
    }

    /// Set the named type
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Set raw occurrence bounds
    pub fn with_occurs(mut self, min: Option<&str>, max: Option<&str>) -> Self {
        self.min_occurs = min.map(str::to_string);
        self.max_occurs = max.map(str::to_string);
        self
    }

    /// Interpreted occurrence bounds
    pub fn occurs(&self) -> Result<Occurs> {
        Occurs::parse(self.min_occurs.as_deref(), self.max_occurs.as_deref())
    }

    /// Name for data keys: the declared name, or the local part of the ref
    pub fn local_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.reference.as_deref().map(local_name))
    }

    /// Check `abstract="true"`
    pub fn is_abstract(&self) -> bool {
        is_true(self.abstract_.as_deref())
    }

    /// Check `nillable="true"`
    pub fn is_nillable(&self) -> bool {
        is_true(self.nillable.as_deref())
    }

    /// Interpreted `form` override
    pub fn form(&self) -> Option<Form> {
        self.form.as_deref().and_then(Form::parse)
    }

    /// Heads named in `substitutionGroup`
    pub fn substitution_heads(&self) -> impl Iterator<Item = &str> {
        self.substitution_group
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
    }
}

/// `xs:key`, `xs:keyref` or `xs:unique`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IdentityConstraint {
    /// Constraint kind (`key`, `keyref` or `unique`)
    pub kind: String,
    /// `id` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Constraint name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Constraint reference (XSD 1.1 `ref`)
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Referenced key for `keyref`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refer: Option<String>,
    /// Selector XPath
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    /// Field XPaths
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    /// Annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Occurs;

    #[test]
    fn test_local_name_prefers_name_then_ref() {
        assert_eq!(Element::named("entry").local_name(), Some("entry"));
        assert_eq!(Element::reference("atom:link").local_name(), Some("link"));
        assert_eq!(Element::default().local_name(), None);
    }

    #[test]
    fn test_flags_and_occurs() {
        let mut element = Element::named("link").with_occurs(Some("0"), Some("5"));
        element.abstract_ = Some("true".to_string());
        element.form = Some("unqualified".to_string());
        assert!(element.is_abstract());
        assert!(!element.is_nillable());
        assert_eq!(element.form(), Some(Form::Unqualified));
        assert_eq!(element.occurs().unwrap(), Occurs::new(0, Some(5)));
    }

    #[test]
    fn test_substitution_heads() {
        let mut element = Element::named("a");
        element.substitution_group = Some("tns:head other:head".to_string());
        assert_eq!(
            element.substitution_heads().collect::<Vec<_>>(),
            vec!["tns:head", "other:head"]
        );
        assert_eq!(Element::named("b").substitution_heads().count(), 0);
    }
}

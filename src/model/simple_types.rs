//! Simple type definitions
//!
//! Reference: https://www.w3.org/TR/xmlschema11-2/#Simple_Type_Definitions

use serde::{Deserialize, Serialize};

use super::annotations::Annotation;

/// `xs:simpleType`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimpleType {
    /// `id` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Type name (absent for anonymous types)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `final`
    #[serde(rename = "final", skip_serializing_if = "Option::is_none")]
    pub final_: Option<String>,
    /// Annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
    /// How the type is derived
    #[serde(skip_serializing_if = "SimpleDerivation::is_none")]
    pub derivation: SimpleDerivation,
}

impl SimpleType {
    /// Create an anonymous restriction of a base type
    pub fn restriction(base: impl Into<String>) -> Self {
        Self {
            derivation: SimpleDerivation::Restriction(SimpleRestriction {
                base: Some(base.into()),
                ..SimpleRestriction::default()
            }),
            ..Self::default()
        }
    }

    /// Create an anonymous list of an item type
    pub fn list(item_type: impl Into<String>) -> Self {
        Self {
            derivation: SimpleDerivation::List(ListType {
                item_type: Some(item_type.into()),
                ..ListType::default()
            }),
            ..Self::default()
        }
    }

    /// Enumeration values declared by a restriction
    pub fn enumeration(&self) -> Vec<&str> {
        match &self.derivation {
            SimpleDerivation::Restriction(restriction) => restriction
                .facets
                .iter()
                .filter(|facet| facet.kind == "enumeration")
                .map(|facet| facet.value.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Derivation of a simple type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SimpleDerivation {
    /// `xs:restriction`
    Restriction(SimpleRestriction),
    /// `xs:list`
    List(ListType),
    /// `xs:union`
    Union(UnionType),
    /// No derivation child (malformed, kept lenient)
    #[default]
    None,
}

impl SimpleDerivation {
    /// Check for a missing derivation
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// `xs:restriction` inside a simple type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimpleRestriction {
    /// `id` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Named base type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
    /// Inline base type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simple_type: Option<Box<SimpleType>>,
    /// Constraining facets in source order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<Facet>,
}

/// `xs:list`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListType {
    /// `id` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Named item type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    /// Annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
    /// Inline item type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simple_type: Option<Box<SimpleType>>,
}

/// `xs:union`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UnionType {
    /// `id` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Raw `memberTypes` (whitespace separated QNames)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_types: Option<String>,
    /// Annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
    /// Inline member types
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub simple_types: Vec<SimpleType>,
}

impl UnionType {
    /// Named member types
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.member_types
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
    }
}

/// A constraining facet (`xs:enumeration`, `xs:pattern`, `xs:maxLength`, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Facet {
    /// Facet tag name
    pub kind: String,
    /// `value` attribute
    pub value: String,
    /// `fixed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed: Option<String>,
    /// `id` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
}

impl Facet {
    /// Create a facet
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
            ..Self::default()
        }
    }
}

/// Tag names accepted as facets
pub const FACET_TAGS: &[&str] = &[
    "enumeration",
    "pattern",
    "length",
    "minLength",
    "maxLength",
    "minInclusive",
    "maxInclusive",
    "minExclusive",
    "maxExclusive",
    "totalDigits",
    "fractionDigits",
    "whiteSpace",
    "assertion",
    "explicitTimezone",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration() {
        let mut simple = SimpleType::restriction("xs:string");
        if let SimpleDerivation::Restriction(restriction) = &mut simple.derivation {
            restriction.facets.push(Facet::new("enumeration", "red"));
            restriction.facets.push(Facet::new("maxLength", "5"));
            restriction.facets.push(Facet::new("enumeration", "blue"));
        }
        assert_eq!(simple.enumeration(), vec!["red", "blue"]);
        assert!(SimpleType::list("xs:int").enumeration().is_empty());
    }

    #[test]
    fn test_union_members() {
        let union = UnionType {
            member_types: Some(" xs:int  xs:boolean ".to_string()),
            ..UnionType::default()
        };
        assert_eq!(union.members().collect::<Vec<_>>(), vec!["xs:int", "xs:boolean"]);
    }
}

//! Model groups and particles
//!
//! This module models XSD content models:
//! - xs:sequence - ordered content
//! - xs:choice - alternative content
//! - xs:all - unordered content
//!
//! plus named groups (`xs:group name=...`), group references and wildcards.
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#Model_Groups

use serde::{Deserialize, Serialize};

use super::annotations::Annotation;
use super::elements::Element;
use super::particles::Occurs;
use crate::error::Result;

/// Model group compositor type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Compositor {
    /// Ordered sequence of particles
    #[default]
    Sequence,
    /// One of multiple alternatives
    Choice,
    /// Unordered set of particles
    All,
}

impl Compositor {
    /// Parse from element tag name
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "sequence" => Some(Self::Sequence),
            "choice" => Some(Self::Choice),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    /// XSD tag name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sequence => "sequence",
            Self::Choice => "choice",
            Self::All => "all",
        }
    }
}

impl std::fmt::Display for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `xs:sequence`, `xs:choice` or `xs:all`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelGroup {
    /// Compositor
    pub compositor: Compositor,
    /// `id` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Raw `minOccurs`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_occurs: Option<String>,
    /// Raw `maxOccurs`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_occurs: Option<String>,
    /// Annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
    /// Particles in source order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub particles: Vec<Particle>,
}

impl ModelGroup {
    /// Create an empty group
    pub fn new(compositor: Compositor) -> Self {
        Self {
            compositor,
            ..Self::default()
        }
    }

    /// Create a group holding the given particles
    pub fn with_particles(compositor: Compositor, particles: Vec<Particle>) -> Self {
        Self {
            compositor,
            particles,
            ..Self::default()
        }
    }

    /// Interpreted occurrence bounds
    pub fn occurs(&self) -> Result<Occurs> {
        Occurs::parse(self.min_occurs.as_deref(), self.max_occurs.as_deref())
    }
}

/// A particle in a model group (element, group reference, nested group or wildcard)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Particle {
    /// Local element or element reference
    Element(Element),
    /// `xs:group ref="..."`
    Group(GroupRef),
    /// Nested model group
    Model(ModelGroup),
    /// `xs:any`
    Any(Wildcard),
}

/// `xs:group ref="..."`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroupRef {
    /// `id` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Referenced group
    #[serde(rename = "ref")]
    pub reference: String,
    /// Raw `minOccurs`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_occurs: Option<String>,
    /// Raw `maxOccurs`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_occurs: Option<String>,
    /// Annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
}

impl GroupRef {
    /// Reference a named group
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            ..Self::default()
        }
    }

    /// Interpreted occurrence bounds
    pub fn occurs(&self) -> Result<Occurs> {
        Occurs::parse(self.min_occurs.as_deref(), self.max_occurs.as_deref())
    }
}

/// Named model group definition (`xs:group name="..."`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Group {
    /// `id` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Group name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
    /// The group's model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelGroup>,
}

/// `xs:any` or `xs:anyAttribute`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Wildcard {
    /// `id` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// `namespace` constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// XSD 1.1 `notNamespace`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_namespace: Option<String>,
    /// `processContents`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_contents: Option<String>,
    /// Raw `minOccurs`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_occurs: Option<String>,
    /// Raw `maxOccurs`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_occurs: Option<String>,
    /// Annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
}

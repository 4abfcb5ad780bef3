//! Schema data model
//!
//! Plain data structures mirroring the XSD component vocabulary. Attribute
//! values are kept as written (`minOccurs="unbounded"` stays a string) and
//! interpreted through accessor methods, so a schema read from text can be
//! written back without loss.

pub mod annotations;
pub mod attributes;
pub mod builtins;
pub mod complex_types;
pub mod elements;
pub mod groups;
pub mod parsing;
pub mod particles;
pub mod schemas;
pub mod simple_types;
pub mod writer;

pub use annotations::{Annotation, OpaqueNode};
pub use attributes::{Attribute, AttributeGroup, AttributeItem, AttributeList, AttributeUse};
pub use builtins::{builtin_kind, is_xsd_namespace, ValueKind, ANY_TYPE};
pub use complex_types::{ComplexType, Content, Derivation, DerivationKind, DerivedContent};
pub use elements::{Element, IdentityConstraint};
pub use groups::{Compositor, Group, GroupRef, ModelGroup, Particle, Wildcard};
pub use parsing::parse_xsd;
pub use particles::Occurs;
pub use schemas::{Components, Form, Import, Include, Notation, Redefinition, Schema};
pub use simple_types::{Facet, ListType, SimpleDerivation, SimpleRestriction, SimpleType, UnionType};
pub use writer::write_xsd;

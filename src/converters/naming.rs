//! Wire names of fields
//!
//! Data keys are always local names; the name on the wire depends on where
//! and how the field is declared:
//!
//! - a reference takes the namespace of the referenced declaration and the
//!   prefix written in the reference;
//! - a local declaration is namespace qualified when its `form` (or the
//!   defining schema's form default) says so;
//! - a top-level declaration is always qualified.
//!
//! Build and parse both go through these functions, so a tag written by
//! one is found by the other.

use crate::model::{Element, Form, Schema};
use crate::names::split_qname;
use crate::namespaces::{NamespaceContext, QName};
use crate::walker::{AttributeField, ElementField};

/// Expanded name of a field plus the prefix to prefer when writing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireName {
    /// Expanded name
    pub qname: QName,
    /// Prefix preferred for the namespace (from the reference or schema)
    pub prefix: Option<String>,
}

impl WireName {
    fn new(namespace: Option<&str>, local_name: &str, prefix: Option<&str>) -> Self {
        Self {
            qname: QName::new(namespace, local_name),
            prefix: namespace.and(prefix).map(str::to_string),
        }
    }

    /// Prefix to write, declaring the namespace in `namespaces` when needed
    pub fn declare(&self, namespaces: &mut NamespaceContext) -> Option<String> {
        self.qname
            .namespace()
            .map(|ns| namespaces.declare(ns, self.prefix.as_deref()))
    }
}

/// Wire name of a top-level element declared in `schema`
pub fn global_element_name(element: &Element, schema: &Schema) -> WireName {
    let namespace = schema.target_namespace.as_deref();
    let local = element.name.as_deref().unwrap_or_default();
    WireName::new(namespace, local, namespace.and_then(|ns| schema.prefix_for(ns)))
}

/// Wire name of an element field
pub fn element_name(field: &ElementField<'_>) -> WireName {
    let local = field.name();
    if let Some(reference) = &field.element.reference {
        let namespace = field.declaration_schema.target_namespace.as_deref();
        let prefix = split_qname(reference)
            .0
            .or_else(|| namespace.and_then(|ns| field.declaration_schema.prefix_for(ns)));
        return WireName::new(namespace, local, prefix);
    }
    let schema = field.schema;
    let form = field.element.form().unwrap_or_else(|| schema.element_form());
    local_name(field.element.target_namespace.as_deref(), form, local, schema)
}

/// Wire name of an attribute field
pub fn attribute_name(field: &AttributeField<'_>) -> WireName {
    let local = field.name();
    if let Some(reference) = &field.attribute.reference {
        let namespace = if std::ptr::eq(field.declaration, field.attribute) {
            // Undeclared reference such as `xml:lang`
            field.schema.resolve_qname(reference).namespace
        } else {
            field.declaration_schema.target_namespace.clone()
        };
        let prefix = split_qname(reference).0;
        return WireName::new(namespace.as_deref(), local, prefix);
    }
    let schema = field.schema;
    let form = field.attribute.form().unwrap_or_else(|| schema.attribute_form());
    local_name(field.attribute.target_namespace.as_deref(), form, local, schema)
}

fn local_name(explicit: Option<&str>, form: Form, local: &str, schema: &Schema) -> WireName {
    let namespace = match (explicit, form) {
        (Some(ns), _) => Some(ns),
        (None, Form::Qualified) => schema.target_namespace.as_deref(),
        (None, Form::Unqualified) => None,
    }
    .filter(|ns| !ns.is_empty());
    WireName::new(namespace, local, namespace.and_then(|ns| schema.prefix_for(ns)))
}

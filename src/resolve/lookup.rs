//! Named component lookup across a linked schema graph
//!
//! A name is searched depth first from a scope schema through everything it
//! links. The first pass requires the component's schema namespace to match
//! the name's namespace; a second pass matches on local name alone, which
//! keeps lookups working for schemas with sloppy or missing prefix bindings.

use std::collections::HashSet;

use crate::error::ComponentKind;
use crate::model::{
    Attribute, AttributeGroup, ComplexType, Components, Element, Group, Schema, SimpleType,
};
use crate::namespaces::QName;

/// A top-level component kind that can be looked up by name
pub trait Component: Sized {
    /// Kind reported in reference errors
    const KIND: ComponentKind;

    /// Declared name
    fn component_name(&self) -> Option<&str>;

    /// Components of this kind in a component set
    fn pick(components: &Components) -> &[Self];
}

impl Component for Element {
    const KIND: ComponentKind = ComponentKind::Element;

    fn component_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn pick(components: &Components) -> &[Self] {
        &components.elements
    }
}

impl Component for Attribute {
    const KIND: ComponentKind = ComponentKind::Attribute;

    fn component_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn pick(components: &Components) -> &[Self] {
        &components.attributes
    }
}

impl Component for ComplexType {
    const KIND: ComponentKind = ComponentKind::ComplexType;

    fn component_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn pick(components: &Components) -> &[Self] {
        &components.complex_types
    }
}

impl Component for SimpleType {
    const KIND: ComponentKind = ComponentKind::SimpleType;

    fn component_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn pick(components: &Components) -> &[Self] {
        &components.simple_types
    }
}

impl Component for Group {
    const KIND: ComponentKind = ComponentKind::Group;

    fn component_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn pick(components: &Components) -> &[Self] {
        &components.groups
    }
}

impl Component for AttributeGroup {
    const KIND: ComponentKind = ComponentKind::AttributeGroup;

    fn component_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn pick(components: &Components) -> &[Self] {
        &components.attribute_groups
    }
}

/// A component together with the schema that defines it
#[derive(Debug)]
pub struct Found<'a, T> {
    /// The component
    pub item: &'a T,
    /// Its defining schema (namespace and prefix context)
    pub schema: &'a Schema,
}

impl<T> Clone for Found<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Found<'_, T> {}

impl<T> PartialEq for Found<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.item, other.item) && std::ptr::eq(self.schema, other.schema)
    }
}

impl<'a, T> Found<'a, T> {
    /// Pair a component with its schema
    pub fn new(item: &'a T, schema: &'a Schema) -> Self {
        Self { item, schema }
    }

    /// Identity of the component (for visiting sets)
    pub fn id(&self) -> *const T {
        self.item as *const T
    }
}

impl<'a, T: Component> Found<'a, T> {
    /// Expanded name of the component
    pub fn qname(&self) -> QName {
        QName::new(
            self.schema.target_namespace.as_deref(),
            self.item.component_name().unwrap_or_default(),
        )
    }
}

/// Find a named component from `scope`
pub fn find<'a, T: Component>(scope: &'a Schema, name: &QName) -> Option<Found<'a, T>> {
    find_in(scope, name, true, &mut HashSet::new())
        .or_else(|| find_in(scope, name, false, &mut HashSet::new()))
}

/// Find a component by a QName-valued attribute written in `scope`
pub fn find_ref<'a, T: Component>(scope: &'a Schema, reference: &str) -> Option<Found<'a, T>> {
    find(scope, &scope.resolve_qname(reference))
}

fn find_in<'a, T: Component>(
    schema: &'a Schema,
    name: &QName,
    strict: bool,
    visited: &mut HashSet<*const Schema>,
) -> Option<Found<'a, T>> {
    if !visited.insert(schema as *const Schema) {
        return None;
    }
    if !strict || schema.target_namespace.as_deref() == name.namespace() {
        let blocks = schema
            .overrides
            .iter()
            .chain(&schema.redefines)
            .map(|r| &r.components);
        for components in blocks.chain(std::iter::once(&schema.components)) {
            if let Some(item) = T::pick(components)
                .iter()
                .find(|c| c.component_name() == Some(name.local_name.as_str()))
            {
                return Some(Found::new(item, schema));
            }
        }
    }
    schema
        .linked_schemas()
        .find_map(|linked| find_in(linked, name, strict, visited))
}

/// Find the definition a redefine/override block in `schema` replaced.
///
/// Inside `xs:redefine`, a type extending its own name (or a group
/// referencing its own name) means the original definition.
pub fn find_original<'a, T: Component>(schema: &'a Schema, name: &QName) -> Option<Found<'a, T>> {
    schema
        .redefines
        .iter()
        .chain(&schema.overrides)
        .filter(|r| {
            T::pick(&r.components)
                .iter()
                .any(|c| c.component_name() == Some(name.local_name.as_str()))
        })
        .filter_map(|r| r.linked.as_deref())
        .find_map(|linked| find(linked, name))
}

/// Check whether `item` is one of the replacement components of `schema`
pub fn is_redefinition<T: Component>(schema: &Schema, item: &T) -> bool {
    schema
        .redefines
        .iter()
        .chain(&schema.overrides)
        .any(|r| T::pick(&r.components).iter().any(|c| std::ptr::eq(c, item)))
}

/// Every top-level element reachable from `scope`, first declaration per name
pub fn all_elements(scope: &Schema) -> Vec<Found<'_, Element>> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    collect_elements(scope, &mut HashSet::new(), &mut seen, &mut out);
    out
}

fn collect_elements<'a>(
    schema: &'a Schema,
    visited: &mut HashSet<*const Schema>,
    seen: &mut HashSet<QName>,
    out: &mut Vec<Found<'a, Element>>,
) {
    if !visited.insert(schema as *const Schema) {
        return;
    }
    let blocks = schema
        .overrides
        .iter()
        .chain(&schema.redefines)
        .map(|r| &r.components);
    for components in blocks.chain(std::iter::once(&schema.components)) {
        for element in &components.elements {
            let found = Found::new(element, schema);
            if seen.insert(found.qname()) {
                out.push(found);
            }
        }
    }
    for linked in schema.linked_schemas() {
        collect_elements(linked, visited, seen, out);
    }
}

/// Concrete members of the substitution group headed by `head`.
///
/// Membership is transitive; abstract members are traversed but not
/// returned. Heads are compared by expanded name, or by local name when
/// the member's reference has no resolvable namespace.
pub fn substitutes<'a>(scope: &'a Schema, head: Found<'a, Element>) -> Vec<Found<'a, Element>> {
    let elements = all_elements(scope);
    let mut members = Vec::new();
    let mut heads = vec![head.qname()];
    let mut done: HashSet<QName> = heads.iter().cloned().collect();

    while let Some(current) = heads.pop() {
        for candidate in &elements {
            let joins = candidate.item.substitution_heads().any(|h| {
                let h = candidate.schema.resolve_qname(h);
                h.local_name == current.local_name
                    && (h.namespace.is_none() || h.namespace == current.namespace)
            });
            if !joins {
                continue;
            }
            let qname = candidate.qname();
            if !done.insert(qname.clone()) {
                continue;
            }
            if !candidate.item.is_abstract() {
                members.push(*candidate);
            }
            heads.push(qname);
        }
    }
    // Declaration order, independent of traversal order
    members.sort_by_key(|m| elements.iter().position(|e| std::ptr::eq(e.item, m.item)));
    members
}

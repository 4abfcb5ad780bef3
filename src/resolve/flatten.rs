//! Schema flattening (`resolveAll`)
//!
//! Collapses a linked schema graph into one self-contained schema:
//!
//! - components are merged depth first from the entry schema, the first
//!   definition of a local name winning;
//! - redefinitions that extend or reference their own name are merged with
//!   the original definition they replace;
//! - element references are inlined as local declarations, and references
//!   to abstract heads become a choice of the concrete substitutes;
//! - QName references are re-prefixed against the merged namespace table;
//! - composition directives are dropped.
//!
//! Only the entry schema's document root elements stay at the top level.
//! Components from foreign namespaces keep their names but live in the
//! entry schema's target namespace afterwards.

use std::collections::HashSet;

use crate::model::{
    AttributeGroup, AttributeItem, AttributeList, ComplexType, Components, Compositor, Content,
    DerivationKind, Element, Form, Group, ModelGroup, Particle, Schema, SimpleDerivation,
    SimpleType,
};
use crate::names::split_qname;
use crate::namespaces::QName;
use crate::resolve::lookup::{find_original, substitutes, Component, Found};
use crate::walker::Walker;

/// Flatten `schema` and everything it links into one schema without
/// composition directives.
pub fn resolve_all_schema(schema: &Schema) -> Schema {
    let mut flattener = Flattener::new(schema);
    flattener.collect(schema, &mut HashSet::new());
    flattener.finish()
}

struct Flattener<'a> {
    root: &'a Schema,
    out: Schema,
    /// Top-level elements in merge order, flagged when declared by the entry schema
    elements: Vec<(Element, bool)>,
    /// Declarations currently being inlined (recursion guard)
    inlining: Vec<*const Element>,
    /// Top-level elements that were inlined somewhere
    inlined: HashSet<String>,
    /// Top-level elements still referenced by name after flattening
    kept_refs: HashSet<String>,
}

impl<'a> Flattener<'a> {
    fn new(root: &'a Schema) -> Self {
        let mut out = root.clone();
        out.includes.clear();
        out.imports.clear();
        out.redefines.clear();
        out.overrides.clear();
        out.components = Components::default();
        out.notations.clear();
        Self {
            root,
            out,
            elements: Vec::new(),
            inlining: Vec::new(),
            inlined: HashSet::new(),
            kept_refs: HashSet::new(),
        }
    }

    fn collect(&mut self, schema: &'a Schema, visited: &mut HashSet<*const Schema>) {
        if !visited.insert(schema as *const Schema) {
            return;
        }
        for block in &schema.overrides {
            self.merge(&block.components, schema, false);
        }
        for block in &schema.redefines {
            self.merge(&block.components, schema, true);
        }
        self.merge(&schema.components, schema, false);
        for notation in &schema.notations {
            if !self.out.notations.iter().any(|n| n.name == notation.name) {
                self.out.notations.push(notation.clone());
            }
        }
        for linked in schema.linked_schemas() {
            self.collect(linked, visited);
        }
    }

    fn merge(&mut self, components: &'a Components, schema: &'a Schema, redefining: bool) {
        for ct in &components.complex_types {
            if self.is_taken::<ComplexType>(ct) {
                continue;
            }
            let merged = if redefining {
                self.redefined_complex_type(ct, schema)
            } else {
                let mut ct = ct.clone();
                self.complex_type(&mut ct, schema);
                ct
            };
            self.out.components.complex_types.push(merged);
        }
        for simple in &components.simple_types {
            if self.is_taken::<SimpleType>(simple) {
                continue;
            }
            let merged = if redefining {
                self.redefined_simple_type(simple, schema)
            } else {
                let mut simple = simple.clone();
                self.simple_type(&mut simple, schema);
                simple
            };
            self.out.components.simple_types.push(merged);
        }
        for group in &components.groups {
            if self.is_taken::<Group>(group) {
                continue;
            }
            let mut merged = group.clone();
            if let Some(model) = &mut merged.model {
                self.model(model, schema);
            }
            if redefining {
                self.splice_original_group(&mut merged, schema);
            }
            self.out.components.groups.push(merged);
        }
        for group in &components.attribute_groups {
            if self.is_taken::<AttributeGroup>(group) {
                continue;
            }
            let mut merged = group.clone();
            self.attribute_list(&mut merged.attributes, schema, false);
            if redefining {
                self.splice_original_attribute_group(&mut merged, schema);
            }
            self.out.components.attribute_groups.push(merged);
        }
        for attribute in &components.attributes {
            if self.is_taken(attribute) {
                continue;
            }
            let mut attribute = attribute.clone();
            if let Some(type_name) = &attribute.type_name {
                attribute.type_name = Some(self.requalify(type_name, schema));
            }
            if let Some(simple) = &mut attribute.simple_type {
                self.simple_type(simple, schema);
            }
            self.out.components.attributes.push(attribute);
        }
        let from_entry = std::ptr::eq(schema, self.root);
        for element in &components.elements {
            let name = element.name.as_deref();
            if self.elements.iter().any(|(e, _)| e.name.as_deref() == name) {
                continue;
            }
            let mut merged = element.clone();
            self.inlining.push(element as *const Element);
            self.element(&mut merged, schema);
            self.inlining.pop();
            self.elements.push((merged, from_entry));
        }
    }

    fn is_taken<T: Component>(&self, item: &T) -> bool {
        let Some(name) = item.component_name() else {
            return true;
        };
        let taken = T::pick(&self.out.components)
            .iter()
            .any(|c| c.component_name() == Some(name));
        if taken {
            tracing::trace!(kind = %T::KIND, name, "shadowed by an earlier definition");
        }
        taken
    }

    fn finish(mut self) -> Schema {
        let inlined = &self.inlined;
        let is_root = |(element, from_entry): &(Element, bool)| {
            *from_entry
                && !element.is_abstract()
                && !element.name.as_ref().is_some_and(|n| inlined.contains(n))
        };
        let mut roots: Vec<usize> = (0..self.elements.len())
            .filter(|&i| is_root(&self.elements[i]))
            .collect();
        if roots.is_empty() {
            let fallback = self
                .elements
                .iter()
                .position(|(e, from_entry)| *from_entry && !e.is_abstract())
                .or_else(|| self.elements.iter().position(|(e, _)| !e.is_abstract()));
            roots.extend(fallback);
        }
        for (index, (element, _)) in self.elements.into_iter().enumerate() {
            let kept = element
                .name
                .as_ref()
                .is_some_and(|n| self.kept_refs.contains(n));
            if roots.contains(&index) || kept {
                self.out.components.elements.push(element);
            }
        }
        tracing::debug!(
            roots = self.out.components.elements.len(),
            complex_types = self.out.components.complex_types.len(),
            "flattened schema"
        );
        self.out
    }

    /// Rewrite a QName written in `schema` against the merged namespace table
    fn requalify(&mut self, reference: &str, schema: &Schema) -> String {
        let name = schema.resolve_qname(reference);
        let (prefix, local) = split_qname(reference.trim());
        match name.namespace() {
            None => local.to_string(),
            Some(ns)
                if prefix.is_none() && self.out.namespaces.get_default_namespace() == Some(ns) =>
            {
                local.to_string()
            }
            Some(ns) => {
                let prefix = self.out.namespaces.declare(ns, prefix);
                format!("{}:{}", prefix, local)
            }
        }
    }

    fn complex_type(&mut self, ct: &mut ComplexType, schema: &'a Schema) {
        match &mut ct.content {
            Content::Empty => {}
            Content::Model(model) => self.model(model, schema),
            Content::Group(group) => group.reference = self.requalify(&group.reference, schema),
            Content::SimpleContent(derived) | Content::ComplexContent(derived) => {
                let derivation = &mut derived.derivation;
                if let Some(base) = &derivation.base {
                    derivation.base = Some(self.requalify(base, schema));
                }
                if let Some(particle) = derivation.particle.take() {
                    derivation.particle = self.particle(particle, schema);
                }
                self.attribute_list(&mut derivation.attributes, schema, true);
                if let Some(simple) = &mut derivation.simple_type {
                    self.simple_type(simple, schema);
                }
            }
        }
        self.attribute_list(&mut ct.attributes, schema, true);
    }

    fn model(&mut self, model: &mut ModelGroup, schema: &'a Schema) {
        model.particles = std::mem::take(&mut model.particles)
            .into_iter()
            .filter_map(|particle| self.particle(particle, schema))
            .collect();
    }

    fn particle(&mut self, particle: Particle, schema: &'a Schema) -> Option<Particle> {
        match particle {
            Particle::Element(element) if element.reference.is_some() => {
                self.element_ref(element, schema)
            }
            Particle::Element(mut element) => {
                if element.form.is_none() && schema.element_form() != self.root.element_form() {
                    element.form = Some(schema.element_form().as_str().to_string());
                }
                let form = element.form().unwrap_or_else(|| schema.element_form());
                if form == Form::Qualified {
                    self.keep_namespace(&mut element, schema);
                }
                self.element(&mut element, schema);
                Some(Particle::Element(element))
            }
            Particle::Group(mut group) => {
                group.reference = self.requalify(&group.reference, schema);
                Some(Particle::Group(group))
            }
            Particle::Model(mut model) => {
                self.model(&mut model, schema);
                Some(Particle::Model(model))
            }
            Particle::Any(wildcard) => Some(Particle::Any(wildcard)),
        }
    }

    fn element_ref(&mut self, mut element: Element, schema: &'a Schema) -> Option<Particle> {
        let reference = element.reference.clone().unwrap_or_default();
        let walker = Walker::new(self.root);
        let Some(found) = walker.lookup::<Element>(schema, &reference) else {
            tracing::warn!(reference = %reference, "could not inline element reference");
            element.reference = Some(self.requalify(&reference, schema));
            return Some(Particle::Element(element));
        };
        if self.inlining.contains(&found.id()) {
            tracing::warn!(reference = %reference, "recursive element reference kept by name");
            element.reference = Some(self.requalify(&reference, schema));
            self.kept_refs
                .insert(found.item.name.clone().unwrap_or_default());
            return Some(Particle::Element(element));
        }
        if !found.item.is_abstract() {
            return Some(Particle::Element(self.inlined(found, &element)));
        }

        let members = substitutes(self.root, found);
        if members.is_empty() {
            tracing::warn!(reference = %reference, "abstract element has no substitutes");
            return None;
        }
        if let Some(name) = &found.item.name {
            self.inlined.insert(name.clone());
        }
        let particles = members
            .into_iter()
            .map(|member| Particle::Element(self.inlined(member, &element)))
            .collect();
        let mut choice = ModelGroup::with_particles(Compositor::Choice, particles);
        choice.annotation = element.annotation.take();
        Some(Particle::Model(choice))
    }

    /// Local copy of a top-level declaration, taking occurrence from the reference
    fn inlined(&mut self, found: Found<'a, Element>, reference: &Element) -> Element {
        let mut element = found.item.clone();
        self.inlining.push(found.id());
        self.element(&mut element, found.schema);
        self.inlining.pop();

        if let Some(name) = &element.name {
            self.inlined.insert(name.clone());
        }
        element.reference = None;
        element.abstract_ = None;
        element.substitution_group = None;
        element.final_ = None;
        element.id = reference.id.clone();
        element.min_occurs = reference.min_occurs.clone();
        element.max_occurs = reference.max_occurs.clone();
        if reference.annotation.is_some() {
            element.annotation = reference.annotation.clone();
        }
        // Global declarations are namespace qualified wherever they appear
        if found.schema.target_namespace.is_some() {
            element.form = Some(Form::Qualified.as_str().to_string());
            self.keep_namespace(&mut element, found.schema);
        }
        element
    }

    /// Pin a qualified local element from another namespace to that namespace
    fn keep_namespace(&self, element: &mut Element, schema: &Schema) {
        if element.target_namespace.is_none() && schema.target_namespace != self.root.target_namespace {
            element.target_namespace = schema.target_namespace.clone();
        }
    }

    fn element(&mut self, element: &mut Element, schema: &'a Schema) {
        if let Some(type_name) = &element.type_name {
            element.type_name = Some(self.requalify(type_name, schema));
        }
        if let Some(group) = &element.substitution_group {
            let heads: Vec<String> = group
                .split_whitespace()
                .map(|head| self.requalify(head, schema))
                .collect();
            element.substitution_group = Some(heads.join(" "));
        }
        if let Some(ct) = &mut element.complex_type {
            self.complex_type(ct, schema);
        }
        if let Some(simple) = &mut element.simple_type {
            self.simple_type(simple, schema);
        }
    }

    fn attribute_list(&mut self, list: &mut AttributeList, schema: &'a Schema, local: bool) {
        for item in &mut list.items {
            match item {
                AttributeItem::Attribute(attribute) => {
                    if let Some(reference) = &attribute.reference {
                        attribute.reference = Some(self.requalify(reference, schema));
                        continue;
                    }
                    if local
                        && attribute.form.is_none()
                        && schema.attribute_form() != self.root.attribute_form()
                    {
                        attribute.form = Some(schema.attribute_form().as_str().to_string());
                    }
                    if let Some(type_name) = &attribute.type_name {
                        attribute.type_name = Some(self.requalify(type_name, schema));
                    }
                    if let Some(simple) = &mut attribute.simple_type {
                        self.simple_type(simple, schema);
                    }
                }
                AttributeItem::AttributeGroup(group) => {
                    if let Some(reference) = &group.reference {
                        group.reference = Some(self.requalify(reference, schema));
                    }
                }
            }
        }
    }

    fn simple_type(&mut self, simple: &mut SimpleType, schema: &'a Schema) {
        match &mut simple.derivation {
            SimpleDerivation::Restriction(restriction) => {
                if let Some(base) = &restriction.base {
                    restriction.base = Some(self.requalify(base, schema));
                }
                if let Some(inner) = &mut restriction.simple_type {
                    self.simple_type(inner, schema);
                }
            }
            SimpleDerivation::List(list) => {
                if let Some(item) = &list.item_type {
                    list.item_type = Some(self.requalify(item, schema));
                }
                if let Some(inner) = &mut list.simple_type {
                    self.simple_type(inner, schema);
                }
            }
            SimpleDerivation::Union(union) => {
                if let Some(members) = &union.member_types {
                    let members: Vec<String> = members
                        .split_whitespace()
                        .map(|m| self.requalify(m, schema))
                        .collect();
                    union.member_types = Some(members.join(" "));
                }
                for inner in &mut union.simple_types {
                    self.simple_type(inner, schema);
                }
            }
            SimpleDerivation::None => {}
        }
    }

    /// Original definition replaced by a redefinition in `schema`
    fn original<T: Component>(&self, name: &str, schema: &'a Schema) -> Option<Found<'a, T>> {
        find_original(schema, &QName::new(schema.target_namespace.as_deref(), name))
    }

    fn redefined_complex_type(&mut self, ct: &ComplexType, schema: &'a Schema) -> ComplexType {
        let mut redefined = ct.clone();
        self.complex_type(&mut redefined, schema);
        let self_derived = ct.derivation().and_then(|d| d.base.as_deref()).is_some_and(|base| {
            split_qname(base).1 == ct.name.as_deref().unwrap_or_default()
        });
        if !self_derived {
            return redefined;
        }
        let name = ct.name.as_deref().unwrap_or_default();
        let Some(found) = self.original::<ComplexType>(name, schema) else {
            tracing::warn!(name = ?ct.name, "redefined type has no original");
            return redefined;
        };
        let mut original = found.item.clone();
        self.complex_type(&mut original, found.schema);
        tracing::debug!(name = ?ct.name, "merged redefined complex type");
        merge_complex_types(original, redefined)
    }

    fn redefined_simple_type(&mut self, simple: &SimpleType, schema: &'a Schema) -> SimpleType {
        let mut redefined = simple.clone();
        self.simple_type(&mut redefined, schema);
        let SimpleDerivation::Restriction(restriction) = &redefined.derivation else {
            return redefined;
        };
        let own_name = simple.name.as_deref().unwrap_or_default();
        if !restriction.base.as_deref().is_some_and(|b| split_qname(b).1 == own_name) {
            return redefined;
        }
        let Some(found) = self.original::<SimpleType>(own_name, schema) else {
            return redefined;
        };
        let mut original = found.item.clone();
        self.simple_type(&mut original, found.schema);
        if let SimpleDerivation::Restriction(base) = &mut original.derivation {
            base.facets.extend(restriction.facets.iter().cloned());
        }
        original.annotation = redefined.annotation.or(original.annotation);
        tracing::debug!(name = own_name, "merged redefined simple type");
        original
    }

    fn splice_original_group(&mut self, group: &mut Group, schema: &'a Schema) {
        let name = group.name.clone().unwrap_or_default();
        let Some(model) = &mut group.model else {
            return;
        };
        if !references_group(model, &name) {
            return;
        }
        let Some(found) = self.original::<Group>(&name, schema) else {
            return;
        };
        let mut original = found.item.model.clone().unwrap_or_default();
        self.model(&mut original, found.schema);
        splice_group(model, &name, &original);
        tracing::debug!(name = %name, "merged redefined group");
    }

    fn splice_original_attribute_group(&mut self, group: &mut AttributeGroup, schema: &'a Schema) {
        let name = group.name.clone().unwrap_or_default();
        let is_self = |item: &AttributeItem| {
            matches!(item, AttributeItem::AttributeGroup(g)
                if g.reference.as_deref().is_some_and(|r| split_qname(r).1 == name))
        };
        if !group.attributes.items.iter().any(is_self) {
            return;
        }
        let Some(found) = self.original::<AttributeGroup>(&name, schema) else {
            return;
        };
        let mut original = found.item.attributes.clone();
        self.attribute_list(&mut original, found.schema, false);
        let mut items = Vec::new();
        for item in std::mem::take(&mut group.attributes.items) {
            if is_self(&item) {
                items.extend(original.items.iter().cloned());
            } else {
                items.push(item);
            }
        }
        group.attributes.items = items;
        if group.attributes.any_attribute.is_none() {
            group.attributes.any_attribute = original.any_attribute;
        }
        tracing::debug!(name = %name, "merged redefined attribute group");
    }
}

fn references_group(model: &ModelGroup, name: &str) -> bool {
    model.particles.iter().any(|particle| match particle {
        Particle::Group(group) => split_qname(&group.reference).1 == name,
        Particle::Model(inner) => references_group(inner, name),
        _ => false,
    })
}

/// Replace references to `name` with the original group's model
fn splice_group(model: &mut ModelGroup, name: &str, original: &ModelGroup) {
    for particle in &mut model.particles {
        match particle {
            Particle::Group(group) if split_qname(&group.reference).1 == name => {
                let mut inlined = original.clone();
                inlined.min_occurs = group.min_occurs.clone();
                inlined.max_occurs = group.max_occurs.clone();
                *particle = Particle::Model(inlined);
            }
            Particle::Model(inner) => splice_group(inner, name, original),
            _ => {}
        }
    }
}

fn sequence_of(first: Option<Particle>, second: Option<Particle>) -> Option<Particle> {
    match (first, second) {
        (None, second) => second,
        (first, None) => first,
        (Some(first), Some(second)) => Some(Particle::Model(ModelGroup::with_particles(
            Compositor::Sequence,
            vec![first, second],
        ))),
    }
}

/// Merge a redefinition deriving from its own name into the original type
fn merge_complex_types(mut original: ComplexType, redefined: ComplexType) -> ComplexType {
    let Some(derivation) = redefined.derivation().cloned() else {
        return redefined;
    };
    original.annotation = redefined.annotation.or(original.annotation);
    if redefined.mixed.is_some() {
        original.mixed = redefined.mixed;
    }
    let restriction = derivation.kind == DerivationKind::Restriction;

    match &mut original.content {
        Content::ComplexContent(derived) => {
            let target = &mut derived.derivation;
            target.particle = if restriction {
                derivation.particle
            } else {
                sequence_of(target.particle.take(), derivation.particle)
            };
            merge_attributes(&mut target.attributes, derivation.attributes, restriction);
        }
        Content::SimpleContent(derived) => {
            merge_attributes(
                &mut derived.derivation.attributes,
                derivation.attributes,
                restriction,
            );
        }
        content => {
            let current = match std::mem::take(content) {
                Content::Model(model) => Some(Particle::Model(model)),
                Content::Group(group) => Some(Particle::Group(group)),
                _ => None,
            };
            let particle = if restriction {
                derivation.particle
            } else {
                sequence_of(current, derivation.particle)
            };
            *content = match particle {
                Some(Particle::Model(model)) => Content::Model(model),
                Some(Particle::Group(group)) => Content::Group(group),
                Some(other) => Content::Model(ModelGroup::with_particles(
                    Compositor::Sequence,
                    vec![other],
                )),
                None => Content::Empty,
            };
            merge_attributes(&mut original.attributes, derivation.attributes, restriction);
        }
    }
    original
}

/// Append (extension) or override by name (restriction) attribute uses
fn merge_attributes(target: &mut AttributeList, added: AttributeList, restriction: bool) {
    for item in added.items {
        let AttributeItem::Attribute(attribute) = &item else {
            target.items.push(item);
            continue;
        };
        let name = attribute.local_name().map(str::to_string);
        let existing = target.items.iter().position(|i| {
            matches!(i, AttributeItem::Attribute(a) if a.local_name().map(str::to_string) == name)
        });
        match existing {
            Some(index) if restriction && attribute.is_prohibited() => {
                target.items.remove(index);
            }
            Some(index) => target.items[index] = item,
            None if attribute.is_prohibited() => {}
            None => target.items.push(item),
        }
    }
    if added.any_attribute.is_some() {
        target.any_attribute = added.any_attribute;
    }
}

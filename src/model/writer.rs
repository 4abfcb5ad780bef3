//! Schema data model back to XSD text
//!
//! Components are written in a fixed order (directives, then elements,
//! attributes, types, groups), so the output is canonical rather than a copy
//! of the source layout. Parsing the output yields an equal model.

use super::annotations::{Annotation, OpaqueNode};
use super::attributes::{Attribute, AttributeGroup, AttributeItem, AttributeList};
use super::complex_types::{ComplexType, Content, Derivation, DerivedContent};
use super::elements::{Element, IdentityConstraint};
use super::groups::{Group, GroupRef, ModelGroup, Particle, Wildcard};
use super::schemas::{Components, Redefinition, Schema};
use super::simple_types::{Facet, SimpleDerivation, SimpleType};
use crate::documents::{Document, Element as Node, WriteOptions};
use crate::error::Result;
use crate::namespaces::{NamespaceContext, QName};
use crate::{XML_NAMESPACE, XSD_NAMESPACE};

/// Serialize a schema as indented XSD text
pub fn write_xsd(schema: &Schema) -> Result<String> {
    let mut writer = XsdWriter::new(schema);
    let root = writer.schema(schema);
    let options = WriteOptions {
        indent: Some(2),
        ..WriteOptions::default()
    };
    Document::new(root).to_xml(&options)
}

struct XsdWriter {
    prefix: String,
    namespaces: NamespaceContext,
}

impl XsdWriter {
    fn new(schema: &Schema) -> Self {
        let mut namespaces = schema.namespaces.clone();
        let prefix = namespaces.declare(XSD_NAMESPACE, Some("xs"));
        Self { prefix, namespaces }
    }

    fn node(&self, tag: &str) -> Node {
        Node::prefixed(
            QName::namespaced(XSD_NAMESPACE, tag),
            Some(self.prefix.clone()),
        )
    }

    fn schema(&mut self, schema: &Schema) -> Node {
        let mut root = self.node("schema");
        put(&mut root, "id", &schema.id);
        put(&mut root, "version", &schema.version);
        put(&mut root, "targetNamespace", &schema.target_namespace);
        put(&mut root, "elementFormDefault", &schema.element_form_default);
        put(&mut root, "attributeFormDefault", &schema.attribute_form_default);
        put(&mut root, "blockDefault", &schema.block_default);
        put(&mut root, "finalDefault", &schema.final_default);
        put(&mut root, "defaultAttributes", &schema.default_attributes);
        if let Some(lang) = &schema.lang {
            root.set_attribute(
                QName::namespaced(XML_NAMESPACE, "lang"),
                Some("xml".to_string()),
                lang,
            );
        }

        for annotation in &schema.annotations {
            root.add_child(self.annotation(annotation));
        }
        for include in &schema.includes {
            let mut node = self.node("include");
            put(&mut node, "id", &include.id);
            put(&mut node, "schemaLocation", &include.schema_location);
            self.annotate(&mut node, &include.annotation);
            root.add_child(node);
        }
        for import in &schema.imports {
            let mut node = self.node("import");
            put(&mut node, "id", &import.id);
            put(&mut node, "namespace", &import.namespace);
            put(&mut node, "schemaLocation", &import.schema_location);
            self.annotate(&mut node, &import.annotation);
            root.add_child(node);
        }
        for redefine in &schema.redefines {
            root.add_child(self.redefinition("redefine", redefine));
        }
        for override_ in &schema.overrides {
            root.add_child(self.redefinition("override", override_));
        }
        self.components(&mut root, &schema.components);
        for notation in &schema.notations {
            let mut node = self.node("notation");
            put(&mut node, "id", &notation.id);
            node.set_attribute(QName::local("name"), None, notation.name.as_str());
            put(&mut node, "public", &notation.public);
            put(&mut node, "system", &notation.system);
            self.annotate(&mut node, &notation.annotation);
            root.add_child(node);
        }
        for unknown in &schema.unknown {
            root.add_child(self.opaque(unknown));
        }

        root.namespaces = self.namespaces.clone();
        root
    }

    fn redefinition(&mut self, tag: &str, redefinition: &Redefinition) -> Node {
        let mut node = self.node(tag);
        put(&mut node, "id", &redefinition.id);
        put(&mut node, "schemaLocation", &redefinition.schema_location);
        for annotation in &redefinition.annotations {
            node.add_child(self.annotation(annotation));
        }
        self.components(&mut node, &redefinition.components);
        node
    }

    fn components(&mut self, parent: &mut Node, components: &Components) {
        for element in &components.elements {
            parent.add_child(self.element(element));
        }
        for attribute in &components.attributes {
            parent.add_child(self.attribute(attribute));
        }
        for ct in &components.complex_types {
            parent.add_child(self.complex_type(ct));
        }
        for simple in &components.simple_types {
            parent.add_child(self.simple_type(simple));
        }
        for group in &components.groups {
            parent.add_child(self.group(group));
        }
        for group in &components.attribute_groups {
            parent.add_child(self.attribute_group(group));
        }
    }

    fn element(&mut self, element: &Element) -> Node {
        let mut node = self.node("element");
        put(&mut node, "id", &element.id);
        put(&mut node, "name", &element.name);
        put(&mut node, "ref", &element.reference);
        put(&mut node, "type", &element.type_name);
        put(&mut node, "minOccurs", &element.min_occurs);
        put(&mut node, "maxOccurs", &element.max_occurs);
        put(&mut node, "default", &element.default);
        put(&mut node, "fixed", &element.fixed);
        put(&mut node, "nillable", &element.nillable);
        put(&mut node, "abstract", &element.abstract_);
        put(&mut node, "substitutionGroup", &element.substitution_group);
        put(&mut node, "form", &element.form);
        put(&mut node, "block", &element.block);
        put(&mut node, "final", &element.final_);
        put(&mut node, "targetNamespace", &element.target_namespace);
        self.annotate(&mut node, &element.annotation);
        if let Some(simple) = &element.simple_type {
            node.add_child(self.simple_type(simple));
        }
        if let Some(ct) = &element.complex_type {
            node.add_child(self.complex_type(ct));
        }
        for unknown in &element.unknown {
            node.add_child(self.opaque(unknown));
        }
        for constraint in &element.identity_constraints {
            node.add_child(self.identity_constraint(constraint));
        }
        node
    }

    fn identity_constraint(&mut self, constraint: &IdentityConstraint) -> Node {
        let mut node = self.node(&constraint.kind);
        put(&mut node, "id", &constraint.id);
        put(&mut node, "name", &constraint.name);
        put(&mut node, "ref", &constraint.reference);
        put(&mut node, "refer", &constraint.refer);
        self.annotate(&mut node, &constraint.annotation);
        if let Some(selector) = &constraint.selector {
            let mut child = self.node("selector");
            child.set_attribute(QName::local("xpath"), None, selector.as_str());
            node.add_child(child);
        }
        for field in &constraint.fields {
            let mut child = self.node("field");
            child.set_attribute(QName::local("xpath"), None, field.as_str());
            node.add_child(child);
        }
        node
    }

    fn attribute(&mut self, attribute: &Attribute) -> Node {
        let mut node = self.node("attribute");
        put(&mut node, "id", &attribute.id);
        put(&mut node, "name", &attribute.name);
        put(&mut node, "ref", &attribute.reference);
        put(&mut node, "type", &attribute.type_name);
        put(&mut node, "use", &attribute.use_);
        put(&mut node, "default", &attribute.default);
        put(&mut node, "fixed", &attribute.fixed);
        put(&mut node, "form", &attribute.form);
        put(&mut node, "targetNamespace", &attribute.target_namespace);
        put(&mut node, "inheritable", &attribute.inheritable);
        self.annotate(&mut node, &attribute.annotation);
        if let Some(simple) = &attribute.simple_type {
            node.add_child(self.simple_type(simple));
        }
        node
    }

    fn attribute_group(&mut self, group: &AttributeGroup) -> Node {
        let mut node = self.node("attributeGroup");
        put(&mut node, "id", &group.id);
        put(&mut node, "name", &group.name);
        put(&mut node, "ref", &group.reference);
        self.annotate(&mut node, &group.annotation);
        self.attribute_list(&mut node, &group.attributes);
        node
    }

    fn attribute_list(&mut self, parent: &mut Node, list: &AttributeList) {
        for item in &list.items {
            match item {
                AttributeItem::Attribute(attribute) => parent.add_child(self.attribute(attribute)),
                AttributeItem::AttributeGroup(group) => {
                    parent.add_child(self.attribute_group(group))
                }
            }
        }
        if let Some(wildcard) = &list.any_attribute {
            parent.add_child(self.wildcard("anyAttribute", wildcard));
        }
    }

    fn complex_type(&mut self, ct: &ComplexType) -> Node {
        let mut node = self.node("complexType");
        put(&mut node, "id", &ct.id);
        put(&mut node, "name", &ct.name);
        put(&mut node, "mixed", &ct.mixed);
        put(&mut node, "abstract", &ct.abstract_);
        put(&mut node, "block", &ct.block);
        put(&mut node, "final", &ct.final_);
        put(&mut node, "defaultAttributesApply", &ct.default_attributes_apply);
        self.annotate(&mut node, &ct.annotation);
        match &ct.content {
            Content::Empty => {}
            Content::Model(model) => node.add_child(self.model_group(model)),
            Content::Group(group) => node.add_child(self.group_ref(group)),
            Content::SimpleContent(derived) => {
                node.add_child(self.derived_content("simpleContent", derived))
            }
            Content::ComplexContent(derived) => {
                node.add_child(self.derived_content("complexContent", derived))
            }
        }
        self.attribute_list(&mut node, &ct.attributes);
        for unknown in &ct.unknown {
            node.add_child(self.opaque(unknown));
        }
        node
    }

    fn derived_content(&mut self, tag: &str, derived: &DerivedContent) -> Node {
        let mut node = self.node(tag);
        put(&mut node, "id", &derived.id);
        put(&mut node, "mixed", &derived.mixed);
        self.annotate(&mut node, &derived.annotation);
        node.add_child(self.derivation(&derived.derivation));
        node
    }

    fn derivation(&mut self, derivation: &Derivation) -> Node {
        let mut node = self.node(derivation.kind.as_str());
        put(&mut node, "id", &derivation.id);
        put(&mut node, "base", &derivation.base);
        self.annotate(&mut node, &derivation.annotation);
        if let Some(simple) = &derivation.simple_type {
            node.add_child(self.simple_type(simple));
        }
        if let Some(particle) = &derivation.particle {
            node.add_child(self.particle(particle));
        }
        for facet in &derivation.facets {
            node.add_child(self.facet(facet));
        }
        self.attribute_list(&mut node, &derivation.attributes);
        node
    }

    fn simple_type(&mut self, simple: &SimpleType) -> Node {
        let mut node = self.node("simpleType");
        put(&mut node, "id", &simple.id);
        put(&mut node, "name", &simple.name);
        put(&mut node, "final", &simple.final_);
        self.annotate(&mut node, &simple.annotation);
        match &simple.derivation {
            SimpleDerivation::Restriction(restriction) => {
                let mut child = self.node("restriction");
                put(&mut child, "id", &restriction.id);
                put(&mut child, "base", &restriction.base);
                self.annotate(&mut child, &restriction.annotation);
                if let Some(inner) = &restriction.simple_type {
                    child.add_child(self.simple_type(inner));
                }
                for facet in &restriction.facets {
                    child.add_child(self.facet(facet));
                }
                node.add_child(child);
            }
            SimpleDerivation::List(list) => {
                let mut child = self.node("list");
                put(&mut child, "id", &list.id);
                put(&mut child, "itemType", &list.item_type);
                self.annotate(&mut child, &list.annotation);
                if let Some(inner) = &list.simple_type {
                    child.add_child(self.simple_type(inner));
                }
                node.add_child(child);
            }
            SimpleDerivation::Union(union) => {
                let mut child = self.node("union");
                put(&mut child, "id", &union.id);
                put(&mut child, "memberTypes", &union.member_types);
                self.annotate(&mut child, &union.annotation);
                for inner in &union.simple_types {
                    child.add_child(self.simple_type(inner));
                }
                node.add_child(child);
            }
            SimpleDerivation::None => {}
        }
        node
    }

    fn facet(&mut self, facet: &Facet) -> Node {
        let mut node = self.node(&facet.kind);
        put(&mut node, "id", &facet.id);
        let key = if facet.kind == "assertion" { "test" } else { "value" };
        node.set_attribute(QName::local(key), None, facet.value.as_str());
        put(&mut node, "fixed", &facet.fixed);
        self.annotate(&mut node, &facet.annotation);
        node
    }

    fn group(&mut self, group: &Group) -> Node {
        let mut node = self.node("group");
        put(&mut node, "id", &group.id);
        put(&mut node, "name", &group.name);
        self.annotate(&mut node, &group.annotation);
        if let Some(model) = &group.model {
            node.add_child(self.model_group(model));
        }
        node
    }

    fn group_ref(&mut self, group: &GroupRef) -> Node {
        let mut node = self.node("group");
        put(&mut node, "id", &group.id);
        node.set_attribute(QName::local("ref"), None, group.reference.as_str());
        put(&mut node, "minOccurs", &group.min_occurs);
        put(&mut node, "maxOccurs", &group.max_occurs);
        self.annotate(&mut node, &group.annotation);
        node
    }

    fn model_group(&mut self, model: &ModelGroup) -> Node {
        let mut node = self.node(model.compositor.as_str());
        put(&mut node, "id", &model.id);
        put(&mut node, "minOccurs", &model.min_occurs);
        put(&mut node, "maxOccurs", &model.max_occurs);
        self.annotate(&mut node, &model.annotation);
        for particle in &model.particles {
            node.add_child(self.particle(particle));
        }
        node
    }

    fn particle(&mut self, particle: &Particle) -> Node {
        match particle {
            Particle::Element(element) => self.element(element),
            Particle::Group(group) => self.group_ref(group),
            Particle::Model(model) => self.model_group(model),
            Particle::Any(wildcard) => self.wildcard("any", wildcard),
        }
    }

    fn wildcard(&mut self, tag: &str, wildcard: &Wildcard) -> Node {
        let mut node = self.node(tag);
        put(&mut node, "id", &wildcard.id);
        put(&mut node, "namespace", &wildcard.namespace);
        put(&mut node, "notNamespace", &wildcard.not_namespace);
        put(&mut node, "processContents", &wildcard.process_contents);
        put(&mut node, "minOccurs", &wildcard.min_occurs);
        put(&mut node, "maxOccurs", &wildcard.max_occurs);
        self.annotate(&mut node, &wildcard.annotation);
        node
    }

    fn annotate(&mut self, parent: &mut Node, annotation: &Option<Annotation>) {
        if let Some(annotation) = annotation {
            parent.add_child(self.annotation(annotation));
        }
    }

    fn annotation(&mut self, annotation: &Annotation) -> Node {
        let mut node = self.node("annotation");
        put(&mut node, "id", &annotation.id);
        for text in &annotation.appinfo {
            let mut child = self.node("appinfo");
            child.set_text(text.as_str());
            node.add_child(child);
        }
        for text in &annotation.documentation {
            let mut child = self.node("documentation");
            child.set_text(text.as_str());
            node.add_child(child);
        }
        node
    }

    fn opaque(&mut self, opaque: &OpaqueNode) -> Node {
        let prefix = opaque
            .namespace
            .as_deref()
            .map(|ns| self.namespaces.declare(ns, None));
        let mut node = Node::prefixed(
            QName::new(opaque.namespace.as_deref(), opaque.name.as_str()),
            prefix,
        );
        for (key, value) in &opaque.attributes {
            node.set_attribute(QName::local(key.as_str()), None, value.as_str());
        }
        if let Some(text) = &opaque.text {
            node.set_text(text.as_str());
        }
        for child in &opaque.children {
            let child = self.opaque(child);
            node.add_child(child);
        }
        node
    }
}

fn put(node: &mut Node, name: &str, value: &Option<String>) {
    if let Some(value) = value {
        node.set_attribute(QName::local(name), None, value.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_xsd;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns:tns="urn:shop" targetNamespace="urn:shop" elementFormDefault="qualified">
  <xs:annotation><xs:documentation>Shop &amp; stock</xs:documentation></xs:annotation>
  <xs:import namespace="urn:common" schemaLocation="common.xsd"/>
  <xs:element name="order" type="tns:Order"/>
  <xs:complexType name="Order">
    <xs:sequence>
      <xs:element name="item" maxOccurs="unbounded">
        <xs:complexType>
          <xs:simpleContent>
            <xs:extension base="xs:string">
              <xs:attribute name="sku" type="xs:token" use="required"/>
            </xs:extension>
          </xs:simpleContent>
        </xs:complexType>
      </xs:element>
      <xs:choice minOccurs="0">
        <xs:element name="note" type="xs:string"/>
        <xs:group ref="tns:extras"/>
      </xs:choice>
    </xs:sequence>
    <xs:attributeGroup ref="tns:audit"/>
  </xs:complexType>
  <xs:simpleType name="Size">
    <xs:restriction base="xs:string">
      <xs:enumeration value="S"/>
      <xs:enumeration value="L"/>
    </xs:restriction>
  </xs:simpleType>
  <xs:group name="extras"><xs:sequence><xs:any processContents="skip"/></xs:sequence></xs:group>
  <xs:attributeGroup name="audit"><xs:attribute name="by" type="xs:string"/></xs:attributeGroup>
</xs:schema>"#;

    #[test]
    fn test_write_then_parse_is_stable() {
        let schema = parse_xsd(SOURCE).unwrap();
        let text = write_xsd(&schema).unwrap();
        let reparsed = parse_xsd(&text).unwrap();
        assert_eq!(reparsed, schema);
    }

    #[test]
    fn test_output_uses_existing_prefix() {
        let schema = parse_xsd(SOURCE).unwrap();
        let text = write_xsd(&schema).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("<xs:schema"));
        assert!(text.contains("xmlns:tns=\"urn:shop\""));
        assert!(text.contains("Shop &amp; stock"));
    }

    #[test]
    fn test_declares_xs_prefix_for_default_namespace_schema() {
        let schema = parse_xsd(
            r#"<schema xmlns="http://www.w3.org/2001/XMLSchema"><element name="a" type="string"/></schema>"#,
        )
        .unwrap();
        let text = write_xsd(&schema).unwrap();
        assert!(text.contains("xmlns:xs=\"http://www.w3.org/2001/XMLSchema\""));
        let reparsed = parse_xsd(&text).unwrap();
        assert_eq!(reparsed.components, schema.components);
    }
}

//! XSD text to schema data model
//!
//! The document is read with roxmltree, which resolves namespace scopes for
//! us; each `xs:*` construct is then mapped onto the model one to one.
//! Attribute values are copied verbatim, children not in the XSD namespace
//! are kept as [`OpaqueNode`]s where the model has room for them.

use roxmltree::{Document, Node, ParsingOptions};

use super::annotations::{Annotation, OpaqueNode};
use super::attributes::{Attribute, AttributeGroup, AttributeItem, AttributeList};
use super::builtins::is_xsd_namespace;
use super::complex_types::{ComplexType, Content, Derivation, DerivationKind, DerivedContent};
use super::elements::{Element, IdentityConstraint};
use super::groups::{Compositor, Group, GroupRef, ModelGroup, Particle, Wildcard};
use super::schemas::{Import, Include, Notation, Redefinition, Schema};
use super::simple_types::{
    Facet, ListType, SimpleDerivation, SimpleRestriction, SimpleType, UnionType, FACET_TAGS,
};
use crate::error::{Error, Result};
use crate::names::{validate_ncname, validate_qname};
use crate::XML_NAMESPACE;

/// Parse an XSD document into a [`Schema`]
///
/// # Example
///
/// ```
/// use xsd_bind::parse_xsd;
///
/// let schema = parse_xsd(r#"
///     <xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
///         <xs:element name="note" type="xs:string"/>
///     </xs:schema>
/// "#).unwrap();
/// assert_eq!(schema.components.elements.len(), 1);
/// ```
pub fn parse_xsd(text: &str) -> Result<Schema> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(text, options)
        .map_err(|e| Error::MalformedDocument(e.to_string()))?;
    let root = doc.root_element();

    if root.tag_name().name() != "schema" || !is_xsd_namespace(root.tag_name().namespace()) {
        return Err(Error::MalformedDocument(format!(
            "root element must be xs:schema, found '{}'",
            root.tag_name().name()
        )));
    }

    let mut schema = Schema {
        id: attr(root, "id"),
        version: attr(root, "version"),
        target_namespace: attr(root, "targetNamespace"),
        element_form_default: attr(root, "elementFormDefault"),
        attribute_form_default: attr(root, "attributeFormDefault"),
        block_default: attr(root, "blockDefault"),
        final_default: attr(root, "finalDefault"),
        default_attributes: attr(root, "defaultAttributes"),
        lang: root.attribute((XML_NAMESPACE, "lang")).map(str::to_string),
        ..Schema::default()
    };

    for ns in root.namespaces() {
        match ns.name() {
            Some("xml") => {}
            Some(prefix) => schema.namespaces.add_prefix(prefix, ns.uri()),
            None => schema.namespaces.set_default_namespace(ns.uri()),
        }
    }

    for child in root.children().filter(Node::is_element) {
        if !is_xsd(child) {
            schema.unknown.push(opaque(child));
            continue;
        }
        match child.tag_name().name() {
            "annotation" => schema.annotations.push(parse_annotation(child)),
            "include" => schema.includes.push(Include {
                id: attr(child, "id"),
                schema_location: attr(child, "schemaLocation"),
                annotation: annotation_of(child),
                linked: None,
            }),
            "import" => schema.imports.push(Import {
                id: attr(child, "id"),
                namespace: attr(child, "namespace"),
                schema_location: attr(child, "schemaLocation"),
                annotation: annotation_of(child),
                linked: None,
            }),
            "redefine" => schema.redefines.push(parse_redefinition(child)?),
            "override" => schema.overrides.push(parse_redefinition(child)?),
            "notation" => schema.notations.push(Notation {
                id: attr(child, "id"),
                name: required_name(child)?,
                public: attr(child, "public"),
                system: attr(child, "system"),
                annotation: annotation_of(child),
            }),
            _ => {
                if !parse_component(child, &mut schema.components)? {
                    schema.unknown.push(opaque(child));
                }
            }
        }
    }

    Ok(schema)
}

/// Parse a top-level component into `components`; false if the tag is not one
fn parse_component(node: Node, components: &mut super::schemas::Components) -> Result<bool> {
    match node.tag_name().name() {
        "element" => {
            required_name(node)?;
            components.elements.push(parse_element(node)?);
        }
        "attribute" => {
            required_name(node)?;
            components.attributes.push(parse_attribute(node));
        }
        "complexType" => {
            required_name(node)?;
            components.complex_types.push(parse_complex_type(node)?);
        }
        "simpleType" => {
            required_name(node)?;
            components.simple_types.push(parse_simple_type(node));
        }
        "group" => {
            required_name(node)?;
            components.groups.push(parse_group(node)?);
        }
        "attributeGroup" => {
            required_name(node)?;
            components.attribute_groups.push(parse_attribute_group(node));
        }
        _ => return Ok(false),
    }
    Ok(true)
}

fn parse_redefinition(node: Node) -> Result<Redefinition> {
    let mut redefinition = Redefinition {
        id: attr(node, "id"),
        schema_location: attr(node, "schemaLocation"),
        ..Redefinition::default()
    };
    for child in xs_children(node) {
        if child.tag_name().name() == "annotation" {
            redefinition.annotations.push(parse_annotation(child));
        } else if !parse_component(child, &mut redefinition.components)? {
            tracing::trace!(tag = child.tag_name().name(), "ignoring child of redefinition");
        }
    }
    Ok(redefinition)
}

fn parse_element(node: Node) -> Result<Element> {
    let mut element = Element {
        id: attr(node, "id"),
        name: name_attr(node),
        reference: qname_attr(node, "ref")?,
        type_name: qname_attr(node, "type")?,
        min_occurs: attr(node, "minOccurs"),
        max_occurs: attr(node, "maxOccurs"),
        default: attr(node, "default"),
        fixed: attr(node, "fixed"),
        nillable: attr(node, "nillable"),
        abstract_: attr(node, "abstract"),
        substitution_group: attr(node, "substitutionGroup"),
        form: attr(node, "form"),
        block: attr(node, "block"),
        final_: attr(node, "final"),
        target_namespace: attr(node, "targetNamespace"),
        ..Element::default()
    };
    if element.name.is_none() && element.reference.is_none() {
        return Err(Error::MalformedDocument(
            "xs:element needs a name or a ref".to_string(),
        ));
    }

    for child in node.children().filter(Node::is_element) {
        if !is_xsd(child) {
            element.unknown.push(opaque(child));
            continue;
        }
        match child.tag_name().name() {
            "annotation" => element.annotation = Some(parse_annotation(child)),
            "complexType" => element.complex_type = Some(Box::new(parse_complex_type(child)?)),
            "simpleType" => element.simple_type = Some(Box::new(parse_simple_type(child))),
            kind @ ("key" | "keyref" | "unique") => {
                element.identity_constraints.push(parse_identity_constraint(child, kind))
            }
            _ => element.unknown.push(opaque(child)),
        }
    }
    Ok(element)
}

fn parse_identity_constraint(node: Node, kind: &str) -> IdentityConstraint {
    let mut constraint = IdentityConstraint {
        kind: kind.to_string(),
        id: attr(node, "id"),
        name: name_attr(node),
        reference: attr(node, "ref"),
        refer: attr(node, "refer"),
        ..IdentityConstraint::default()
    };
    for child in xs_children(node) {
        match child.tag_name().name() {
            "annotation" => constraint.annotation = Some(parse_annotation(child)),
            "selector" => constraint.selector = attr(child, "xpath"),
            "field" => constraint.fields.extend(attr(child, "xpath")),
            _ => {}
        }
    }
    constraint
}

fn parse_attribute(node: Node) -> Attribute {
    let mut attribute = Attribute {
        id: attr(node, "id"),
        name: name_attr(node),
        reference: attr(node, "ref"),
        type_name: attr(node, "type"),
        use_: attr(node, "use"),
        default: attr(node, "default"),
        fixed: attr(node, "fixed"),
        form: attr(node, "form"),
        target_namespace: attr(node, "targetNamespace"),
        inheritable: attr(node, "inheritable"),
        ..Attribute::default()
    };
    for child in xs_children(node) {
        match child.tag_name().name() {
            "annotation" => attribute.annotation = Some(parse_annotation(child)),
            "simpleType" => attribute.simple_type = Some(Box::new(parse_simple_type(child))),
            _ => {}
        }
    }
    attribute
}

fn parse_attribute_group(node: Node) -> AttributeGroup {
    let mut group = AttributeGroup {
        id: attr(node, "id"),
        name: name_attr(node),
        reference: attr(node, "ref"),
        ..AttributeGroup::default()
    };
    for child in xs_children(node) {
        if child.tag_name().name() == "annotation" {
            group.annotation = Some(parse_annotation(child));
        } else {
            push_attribute_use(child, &mut group.attributes);
        }
    }
    group
}

/// Add an attribute-ish child to a list; false if the child is something else
fn push_attribute_use(node: Node, list: &mut AttributeList) -> bool {
    match node.tag_name().name() {
        "attribute" => list.items.push(AttributeItem::Attribute(parse_attribute(node))),
        "attributeGroup" => list
            .items
            .push(AttributeItem::AttributeGroup(parse_attribute_group(node))),
        "anyAttribute" => list.any_attribute = Some(parse_wildcard(node)),
        _ => return false,
    }
    true
}

fn parse_complex_type(node: Node) -> Result<ComplexType> {
    let mut ct = ComplexType {
        id: attr(node, "id"),
        name: name_attr(node),
        mixed: attr(node, "mixed"),
        abstract_: attr(node, "abstract"),
        block: attr(node, "block"),
        final_: attr(node, "final"),
        default_attributes_apply: attr(node, "defaultAttributesApply"),
        ..ComplexType::default()
    };

    for child in node.children().filter(Node::is_element) {
        if !is_xsd(child) {
            ct.unknown.push(opaque(child));
            continue;
        }
        let tag = child.tag_name().name();
        if let Some(compositor) = Compositor::from_tag(tag) {
            ct.content = Content::Model(parse_model_group(child, compositor)?);
            continue;
        }
        match tag {
            "annotation" => ct.annotation = Some(parse_annotation(child)),
            "group" => ct.content = Content::Group(parse_group_ref(child)?),
            "simpleContent" => ct.content = Content::SimpleContent(parse_derived_content(child)?),
            "complexContent" => {
                ct.content = Content::ComplexContent(parse_derived_content(child)?)
            }
            _ => {
                if !push_attribute_use(child, &mut ct.attributes) {
                    ct.unknown.push(opaque(child));
                }
            }
        }
    }
    Ok(ct)
}

fn parse_derived_content(node: Node) -> Result<DerivedContent> {
    let mut content = DerivedContent {
        id: attr(node, "id"),
        mixed: attr(node, "mixed"),
        ..DerivedContent::default()
    };
    let mut derivation = None;
    for child in xs_children(node) {
        let tag = child.tag_name().name();
        if tag == "annotation" {
            content.annotation = Some(parse_annotation(child));
        } else if let Some(kind) = DerivationKind::from_tag(tag) {
            derivation = Some(parse_derivation(child, kind)?);
        }
    }
    content.derivation = derivation.ok_or_else(|| {
        Error::MalformedDocument(format!(
            "xs:{} needs an extension or restriction",
            node.tag_name().name()
        ))
    })?;
    Ok(content)
}

fn parse_derivation(node: Node, kind: DerivationKind) -> Result<Derivation> {
    let mut derivation = Derivation {
        kind,
        id: attr(node, "id"),
        base: attr(node, "base"),
        ..Derivation::default()
    };
    for child in xs_children(node) {
        let tag = child.tag_name().name();
        if let Some(compositor) = Compositor::from_tag(tag) {
            derivation.particle = Some(Particle::Model(parse_model_group(child, compositor)?));
            continue;
        }
        if FACET_TAGS.contains(&tag) {
            derivation.facets.push(parse_facet(child));
            continue;
        }
        match tag {
            "annotation" => derivation.annotation = Some(parse_annotation(child)),
            "group" => derivation.particle = Some(Particle::Group(parse_group_ref(child)?)),
            "simpleType" => derivation.simple_type = Some(Box::new(parse_simple_type(child))),
            _ => {
                if !push_attribute_use(child, &mut derivation.attributes) {
                    tracing::trace!(tag, "ignoring child of derivation");
                }
            }
        }
    }
    Ok(derivation)
}

fn parse_simple_type(node: Node) -> SimpleType {
    let mut simple = SimpleType {
        id: attr(node, "id"),
        name: name_attr(node),
        final_: attr(node, "final"),
        ..SimpleType::default()
    };
    for child in xs_children(node) {
        match child.tag_name().name() {
            "annotation" => simple.annotation = Some(parse_annotation(child)),
            "restriction" => {
                let mut restriction = SimpleRestriction {
                    id: attr(child, "id"),
                    base: attr(child, "base"),
                    ..SimpleRestriction::default()
                };
                for item in xs_children(child) {
                    let tag = item.tag_name().name();
                    match tag {
                        "annotation" => restriction.annotation = Some(parse_annotation(item)),
                        "simpleType" => {
                            restriction.simple_type = Some(Box::new(parse_simple_type(item)))
                        }
                        _ if FACET_TAGS.contains(&tag) => restriction.facets.push(parse_facet(item)),
                        _ => {}
                    }
                }
                simple.derivation = SimpleDerivation::Restriction(restriction);
            }
            "list" => {
                let mut list = ListType {
                    id: attr(child, "id"),
                    item_type: attr(child, "itemType"),
                    ..ListType::default()
                };
                for item in xs_children(child) {
                    match item.tag_name().name() {
                        "annotation" => list.annotation = Some(parse_annotation(item)),
                        "simpleType" => list.simple_type = Some(Box::new(parse_simple_type(item))),
                        _ => {}
                    }
                }
                simple.derivation = SimpleDerivation::List(list);
            }
            "union" => {
                let mut union = UnionType {
                    id: attr(child, "id"),
                    member_types: attr(child, "memberTypes"),
                    ..UnionType::default()
                };
                for item in xs_children(child) {
                    match item.tag_name().name() {
                        "annotation" => union.annotation = Some(parse_annotation(item)),
                        "simpleType" => union.simple_types.push(parse_simple_type(item)),
                        _ => {}
                    }
                }
                simple.derivation = SimpleDerivation::Union(union);
            }
            _ => {}
        }
    }
    simple
}

fn parse_facet(node: Node) -> Facet {
    let mut facet = Facet::new(
        node.tag_name().name(),
        // xs:assertion carries `test` instead of `value`
        node.attribute("value")
            .or_else(|| node.attribute("test"))
            .unwrap_or_default(),
    );
    facet.fixed = attr(node, "fixed");
    facet.id = attr(node, "id");
    facet.annotation = annotation_of(node);
    facet
}

fn parse_model_group(node: Node, compositor: Compositor) -> Result<ModelGroup> {
    let mut group = ModelGroup {
        compositor,
        id: attr(node, "id"),
        min_occurs: attr(node, "minOccurs"),
        max_occurs: attr(node, "maxOccurs"),
        ..ModelGroup::default()
    };
    for child in xs_children(node) {
        let tag = child.tag_name().name();
        if tag == "annotation" {
            group.annotation = Some(parse_annotation(child));
            continue;
        }
        let particle = match tag {
            "element" => Particle::Element(parse_element(child)?),
            "group" => Particle::Group(parse_group_ref(child)?),
            "any" => Particle::Any(parse_wildcard(child)),
            _ => match Compositor::from_tag(tag) {
                Some(nested) => Particle::Model(parse_model_group(child, nested)?),
                None => {
                    tracing::trace!(tag, "ignoring child of model group");
                    continue;
                }
            },
        };
        group.particles.push(particle);
    }
    Ok(group)
}

fn parse_group(node: Node) -> Result<Group> {
    let mut group = Group {
        id: attr(node, "id"),
        name: name_attr(node),
        ..Group::default()
    };
    for child in xs_children(node) {
        let tag = child.tag_name().name();
        if tag == "annotation" {
            group.annotation = Some(parse_annotation(child));
        } else if let Some(compositor) = Compositor::from_tag(tag) {
            group.model = Some(parse_model_group(child, compositor)?);
        }
    }
    Ok(group)
}

fn parse_group_ref(node: Node) -> Result<GroupRef> {
    let reference = qname_attr(node, "ref")?.ok_or_else(|| {
        Error::MalformedDocument("local xs:group needs a ref".to_string())
    })?;
    Ok(GroupRef {
        id: attr(node, "id"),
        reference,
        min_occurs: attr(node, "minOccurs"),
        max_occurs: attr(node, "maxOccurs"),
        annotation: annotation_of(node),
    })
}

fn parse_wildcard(node: Node) -> Wildcard {
    Wildcard {
        id: attr(node, "id"),
        namespace: attr(node, "namespace"),
        not_namespace: attr(node, "notNamespace"),
        process_contents: attr(node, "processContents"),
        min_occurs: attr(node, "minOccurs"),
        max_occurs: attr(node, "maxOccurs"),
        annotation: annotation_of(node),
    }
}

fn parse_annotation(node: Node) -> Annotation {
    let mut annotation = Annotation {
        id: attr(node, "id"),
        ..Annotation::default()
    };
    for child in xs_children(node) {
        match child.tag_name().name() {
            "documentation" => annotation.documentation.push(text_content(child)),
            "appinfo" => annotation.appinfo.push(text_content(child)),
            _ => {}
        }
    }
    annotation
}

fn annotation_of(node: Node) -> Option<Annotation> {
    xs_children(node)
        .find(|c| c.tag_name().name() == "annotation")
        .map(parse_annotation)
}

fn opaque(node: Node) -> OpaqueNode {
    let attributes = node
        .attributes()
        .map(|a| {
            let key = match a.namespace().and_then(|ns| node.lookup_prefix(ns)) {
                Some(prefix) => format!("{}:{}", prefix, a.name()),
                None => a.name().to_string(),
            };
            (key, a.value().to_string())
        })
        .collect();
    let text = node
        .children()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    OpaqueNode {
        namespace: node.tag_name().namespace().map(str::to_string),
        name: node.tag_name().name().to_string(),
        attributes,
        text: (!text.is_empty()).then_some(text),
        children: node.children().filter(Node::is_element).map(opaque).collect(),
    }
}

fn required_name(node: Node) -> Result<String> {
    let name = node.attribute("name").ok_or_else(|| {
        Error::MalformedDocument(format!(
            "top-level xs:{} needs a name",
            node.tag_name().name()
        ))
    })?;
    let name = name.trim();
    validate_ncname(name)?;
    Ok(name.to_string())
}

fn text_content(node: Node) -> String {
    node.descendants()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}

fn attr(node: Node, name: &str) -> Option<String> {
    node.attribute(name).map(str::to_string)
}

/// `name` attribute with XSD whitespace collapsed
fn name_attr(node: Node) -> Option<String> {
    node.attribute("name").map(|v| v.trim().to_string())
}

/// QName-valued attribute, checked lexically
fn qname_attr(node: Node, name: &str) -> Result<Option<String>> {
    let value = node.attribute(name).map(|v| v.trim().to_string());
    if let Some(value) = &value {
        validate_qname(value)?;
    }
    Ok(value)
}

fn is_xsd(node: Node) -> bool {
    is_xsd_namespace(node.tag_name().namespace())
}

fn xs_children<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.is_element() && is_xsd(*n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Form;

    const PERSON: &str = r###"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
           xmlns:tns="urn:people" targetNamespace="urn:people"
           elementFormDefault="qualified">
  <xs:annotation><xs:documentation> People </xs:documentation></xs:annotation>
  <xs:include schemaLocation="common.xsd"/>
  <xs:import namespace="urn:other"/>
  <xs:element name="person" type="tns:Person"/>
  <xs:complexType name="Person">
    <xs:sequence>
      <xs:element name="name" type="xs:string"/>
      <xs:element name="nick" type="xs:string" minOccurs="0" maxOccurs="unbounded"/>
      <xs:choice>
        <xs:element ref="tns:phone"/>
        <xs:group ref="tns:contact"/>
      </xs:choice>
      <xs:any namespace="##other" processContents="lax"/>
    </xs:sequence>
    <xs:attribute name="id" type="xs:ID" use="required"/>
    <xs:attributeGroup ref="tns:common"/>
    <xs:anyAttribute/>
  </xs:complexType>
  <xs:simpleType name="Color">
    <xs:restriction base="xs:string">
      <xs:enumeration value="red"/>
      <xs:enumeration value="blue"/>
    </xs:restriction>
  </xs:simpleType>
</xs:schema>"###;

    #[test]
    fn test_parse_schema_attributes() {
        let schema = parse_xsd(PERSON).unwrap();
        assert_eq!(schema.target_namespace.as_deref(), Some("urn:people"));
        assert_eq!(schema.element_form(), Form::Qualified);
        assert_eq!(schema.namespaces.get_namespace("tns"), Some("urn:people"));
        assert_eq!(schema.annotations[0].documentation, vec!["People".to_string()]);
        assert_eq!(schema.includes[0].schema_location.as_deref(), Some("common.xsd"));
        assert_eq!(schema.imports[0].namespace.as_deref(), Some("urn:other"));
        assert!(schema.imports[0].schema_location.is_none());
    }

    #[test]
    fn test_parse_complex_type() {
        let schema = parse_xsd(PERSON).unwrap();
        let person = schema.components.complex_type("Person").unwrap();
        let Content::Model(sequence) = &person.content else {
            panic!("expected model content");
        };
        assert_eq!(sequence.compositor, Compositor::Sequence);
        assert_eq!(sequence.particles.len(), 4);
        let Particle::Element(nick) = &sequence.particles[1] else {
            panic!("expected element");
        };
        assert_eq!(nick.max_occurs.as_deref(), Some("unbounded"));
        let Particle::Model(choice) = &sequence.particles[2] else {
            panic!("expected choice");
        };
        assert_eq!(choice.compositor, Compositor::Choice);
        assert!(matches!(&choice.particles[1], Particle::Group(g) if g.reference == "tns:contact"));
        assert!(matches!(&sequence.particles[3], Particle::Any(_)));
        assert_eq!(person.attributes.items.len(), 2);
        assert!(person.attributes.any_attribute.is_some());
    }

    #[test]
    fn test_parse_simple_type_facets() {
        let schema = parse_xsd(PERSON).unwrap();
        let color = schema.components.simple_type("Color").unwrap();
        assert_eq!(color.enumeration(), vec!["red", "blue"]);
    }

    #[test]
    fn test_parse_derivations() {
        let schema = parse_xsd(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType name="Price">
    <xs:simpleContent>
      <xs:extension base="xs:decimal">
        <xs:attribute name="currency" type="xs:string"/>
      </xs:extension>
    </xs:simpleContent>
  </xs:complexType>
  <xs:complexType name="Child">
    <xs:complexContent mixed="true">
      <xs:restriction base="Parent">
        <xs:sequence><xs:element name="a" type="xs:int"/></xs:sequence>
        <xs:attribute name="b" use="prohibited"/>
      </xs:restriction>
    </xs:complexContent>
  </xs:complexType>
  <xs:simpleType name="Ints"><xs:list itemType="xs:int"/></xs:simpleType>
  <xs:simpleType name="U"><xs:union memberTypes="xs:int xs:string"/></xs:simpleType>
</xs:schema>"#,
        )
        .unwrap();
        let price = schema.components.complex_type("Price").unwrap();
        assert!(price.has_simple_content());
        let derivation = price.derivation().unwrap();
        assert!(derivation.is_extension());
        assert_eq!(derivation.base.as_deref(), Some("xs:decimal"));
        assert_eq!(derivation.attributes.items.len(), 1);

        let child = schema.components.complex_type("Child").unwrap();
        assert!(child.is_mixed());
        let derivation = child.derivation().unwrap();
        assert_eq!(derivation.kind, DerivationKind::Restriction);
        assert!(matches!(derivation.particle, Some(Particle::Model(_))));

        let ints = schema.components.simple_type("Ints").unwrap();
        assert!(matches!(&ints.derivation, SimpleDerivation::List(l) if l.item_type.as_deref() == Some("xs:int")));
        let union = schema.components.simple_type("U").unwrap();
        let SimpleDerivation::Union(u) = &union.derivation else {
            panic!("expected union");
        };
        assert_eq!(u.members().count(), 2);
    }

    #[test]
    fn test_redefine_and_override_blocks() {
        let schema = parse_xsd(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:redefine schemaLocation="base.xsd">
    <xs:complexType name="T">
      <xs:complexContent><xs:extension base="T"/></xs:complexContent>
    </xs:complexType>
  </xs:redefine>
  <xs:override schemaLocation="other.xsd">
    <xs:element name="e" type="xs:string"/>
  </xs:override>
</xs:schema>"#,
        )
        .unwrap();
        assert_eq!(schema.redefines[0].components.complex_types.len(), 1);
        assert_eq!(schema.overrides[0].components.elements.len(), 1);
        assert!(schema.components.is_empty());
    }

    #[test]
    fn test_identity_constraints_and_unknown() {
        let schema = parse_xsd(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:x="urn:x">
  <xs:element name="list">
    <xs:complexType><xs:sequence><xs:element name="item" maxOccurs="unbounded"/></xs:sequence></xs:complexType>
    <xs:key name="itemKey"><xs:selector xpath="item"/><xs:field xpath="@id"/></xs:key>
  </xs:element>
  <x:extra flag="1">note</x:extra>
</xs:schema>"#,
        )
        .unwrap();
        let list = schema.components.element("list").unwrap();
        assert_eq!(list.identity_constraints[0].kind, "key");
        assert_eq!(list.identity_constraints[0].selector.as_deref(), Some("item"));
        assert_eq!(list.identity_constraints[0].fields, vec!["@id".to_string()]);
        assert_eq!(schema.unknown[0].name, "extra");
        assert_eq!(schema.unknown[0].text.as_deref(), Some("note"));
    }

    #[test]
    fn test_rejects_non_schema_root() {
        assert!(matches!(
            parse_xsd("<schema/>"),
            Err(Error::MalformedDocument(_))
        ));
        assert!(matches!(
            parse_xsd("<xs:schema xmlns:xs=\"http://www.w3.org/2001/XMLSchema\">"),
            Err(Error::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_rejects_unnamed_components() {
        let result = parse_xsd(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:complexType><xs:sequence/></xs:complexType>
</xs:schema>"#,
        );
        assert!(matches!(result, Err(Error::MalformedDocument(_))));
        let result = parse_xsd(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="1bad"/>
</xs:schema>"#,
        );
        assert!(matches!(result, Err(Error::Name(_))));
    }

    #[test]
    fn test_rejects_malformed_references() {
        let result = parse_xsd(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="a" type="xs:string:x"/>
</xs:schema>"#,
        );
        assert!(matches!(result, Err(Error::Name(_))));
    }

    #[test]
    fn test_non_latin_and_padded_names() {
        let schema = parse_xsd(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="名前" type="xs:string"/>
  <xs:element name=" padded " type=" xs:string "/>
</xs:schema>"#,
        )
        .unwrap();
        let element = schema.components.element("名前").unwrap();
        assert_eq!(element.type_name.as_deref(), Some("xs:string"));
        let padded = schema.components.element("padded").unwrap();
        assert_eq!(padded.type_name.as_deref(), Some("xs:string"));
    }
}

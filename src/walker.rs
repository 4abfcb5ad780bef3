//! Effective fields of complex types
//!
//! The walker answers "which elements and attributes does this type have",
//! resolving base types, group references and attribute groups across the
//! linked schema graph. Builder, parser and type inference all go through
//! it, so they agree on field order, cardinality and defining schema.
//!
//! Each field remembers two schemas: the one the particle is written in
//! (which decides prefixes for references) and the one defining the
//! declaration (which decides its type and namespace).

use crate::error::{ComponentKind, Error, Result};
use crate::model::{
    builtin_kind, is_xsd_namespace, Attribute, AttributeGroup, AttributeItem, AttributeList,
    ComplexType, Compositor, Content, Derivation, Element, Group, GroupRef, ModelGroup, Occurs,
    Particle, Schema, SimpleDerivation, SimpleType, ValueKind, ANY_TYPE,
};
use crate::resolve::lookup::{self, find, find_original, is_redefinition, Component, Found};
use crate::XML_NAMESPACE;

/// An element field of a complex type
#[derive(Debug, Clone, Copy)]
pub struct ElementField<'a> {
    /// The particle as written (local declaration or reference)
    pub element: &'a Element,
    /// The effective declaration (the referenced global element for refs)
    pub declaration: &'a Element,
    /// Schema the particle is written in
    pub schema: &'a Schema,
    /// Schema defining the declaration
    pub declaration_schema: &'a Schema,
    /// Occurrence bounds of the particle
    pub occurs: Occurs,
    /// Field may be absent (minOccurs 0, inside a choice or an optional group)
    pub optional: bool,
}

impl<'a> ElementField<'a> {
    /// Data key of the field (local name of the declaration)
    pub fn name(&self) -> &'a str {
        self.declaration
            .name
            .as_deref()
            .or_else(|| self.element.local_name())
            .unwrap_or_default()
    }

    /// Check whether the particle is a reference to a global element
    pub fn is_ref(&self) -> bool {
        self.element.reference.is_some()
    }

    /// Values of this field are arrays
    pub fn is_repeated(&self) -> bool {
        self.occurs.is_repeated()
    }

    /// Check whether the declaration is an abstract substitution head
    pub fn is_abstract(&self) -> bool {
        self.declaration.is_abstract()
    }
}

/// An attribute field of a complex type
#[derive(Debug, Clone, Copy)]
pub struct AttributeField<'a> {
    /// The attribute use as written
    pub attribute: &'a Attribute,
    /// The effective declaration (the referenced global attribute for refs)
    pub declaration: &'a Attribute,
    /// Schema the attribute use is written in
    pub schema: &'a Schema,
    /// Schema defining the declaration
    pub declaration_schema: &'a Schema,
}

impl<'a> AttributeField<'a> {
    /// Data key of the field
    pub fn name(&self) -> &'a str {
        self.declaration
            .name
            .as_deref()
            .or_else(|| self.attribute.local_name())
            .unwrap_or_default()
    }

    /// Check `use="required"` on the attribute use
    pub fn is_required(&self) -> bool {
        self.attribute.is_required()
    }
}

#[derive(Default)]
struct Visiting {
    types: Vec<*const ComplexType>,
    groups: Vec<*const Group>,
    attribute_groups: Vec<*const AttributeGroup>,
}

/// Walks complex types within a root schema's linked graph
#[derive(Debug, Clone, Copy)]
pub struct Walker<'a> {
    root: &'a Schema,
}

impl<'a> Walker<'a> {
    /// Walk within `root` and everything it links
    pub fn new(root: &'a Schema) -> Self {
        Self { root }
    }

    /// The root schema
    pub fn root(&self) -> &'a Schema {
        self.root
    }

    /// Look a reference written in `schema` up, falling back to the root graph
    pub fn lookup<T: Component>(&self, schema: &'a Schema, reference: &str) -> Option<Found<'a, T>> {
        let name = schema.resolve_qname(reference);
        find(schema, &name).or_else(|| find(self.root, &name))
    }

    fn require<T: Component>(&self, schema: &'a Schema, reference: &str) -> Result<Found<'a, T>> {
        self.lookup(schema, reference)
            .ok_or_else(|| Error::reference(T::KIND, reference))
    }

    /// Element fields of `ct` (defined in `schema`), inherited fields first
    pub fn elements(&self, ct: &'a ComplexType, schema: &'a Schema) -> Result<Vec<ElementField<'a>>> {
        let mut out = Vec::new();
        self.collect_elements(ct, schema, &mut out, &mut Visiting::default())?;
        Ok(out)
    }

    /// Attribute fields of `ct` (defined in `schema`), inherited fields first
    pub fn attributes(
        &self,
        ct: &'a ComplexType,
        schema: &'a Schema,
    ) -> Result<Vec<AttributeField<'a>>> {
        let mut out = Vec::new();
        self.collect_attributes(ct, schema, &mut out, &mut Visiting::default())?;
        Ok(out)
    }

    fn collect_elements(
        &self,
        ct: &'a ComplexType,
        schema: &'a Schema,
        out: &mut Vec<ElementField<'a>>,
        visiting: &mut Visiting,
    ) -> Result<()> {
        let id = ct as *const ComplexType;
        if visiting.types.contains(&id) {
            return Err(Error::circular(
                ComponentKind::ComplexType,
                ct.name.as_deref().unwrap_or("(anonymous)"),
            ));
        }
        visiting.types.push(id);
        match &ct.content {
            Content::Empty | Content::SimpleContent(_) => {}
            Content::Model(model) => self.model(model, schema, false, out, visiting)?,
            Content::Group(group) => self.group(group, schema, false, out, visiting)?,
            Content::ComplexContent(derived) => {
                let derivation = &derived.derivation;
                if derivation.is_extension() {
                    if let Some(base) = self.base_type(ct, derivation, schema)? {
                        self.collect_elements(base.item, base.schema, out, visiting)?;
                    }
                }
                if let Some(particle) = &derivation.particle {
                    self.particle(particle, schema, false, out, visiting)?;
                }
            }
        }
        visiting.types.pop();
        Ok(())
    }

    /// Complex base type of a derivation, `None` for built-in and simple bases
    pub fn base_type(
        &self,
        ct: &'a ComplexType,
        derivation: &'a Derivation,
        schema: &'a Schema,
    ) -> Result<Option<Found<'a, ComplexType>>> {
        let Some(base) = derivation.base.as_deref() else {
            return Ok(None);
        };
        let name = schema.resolve_qname(base);
        if is_xsd_namespace(name.namespace()) {
            return Ok(None);
        }
        if ct.name.as_deref() == Some(name.local_name.as_str()) && is_redefinition(schema, ct) {
            return find_original(schema, &name)
                .map(Some)
                .ok_or_else(|| Error::reference(ComponentKind::ComplexType, base));
        }
        if let Some(found) = self.lookup::<ComplexType>(schema, base) {
            return Ok(Some(found));
        }
        if self.lookup::<SimpleType>(schema, base).is_some() {
            return Ok(None);
        }
        Err(Error::reference(ComponentKind::Type, base))
    }

    fn model(
        &self,
        model: &'a ModelGroup,
        schema: &'a Schema,
        optional: bool,
        out: &mut Vec<ElementField<'a>>,
        visiting: &mut Visiting,
    ) -> Result<()> {
        let occurs = model.occurs()?;
        let choice = model.compositor == Compositor::Choice && model.particles.len() > 1;
        let optional = optional || occurs.is_emptiable() || choice;
        for particle in &model.particles {
            self.particle(particle, schema, optional, out, visiting)?;
        }
        Ok(())
    }

    fn particle(
        &self,
        particle: &'a Particle,
        schema: &'a Schema,
        optional: bool,
        out: &mut Vec<ElementField<'a>>,
        visiting: &mut Visiting,
    ) -> Result<()> {
        match particle {
            Particle::Element(element) => out.push(self.element_field(element, schema, optional)?),
            Particle::Group(group) => self.group(group, schema, optional, out, visiting)?,
            Particle::Model(model) => self.model(model, schema, optional, out, visiting)?,
            Particle::Any(_) => tracing::trace!("skipping wildcard particle"),
        }
        Ok(())
    }

    fn group(
        &self,
        group: &'a GroupRef,
        schema: &'a Schema,
        optional: bool,
        out: &mut Vec<ElementField<'a>>,
        visiting: &mut Visiting,
    ) -> Result<()> {
        let mut found: Found<'a, Group> = self.require(schema, &group.reference)?;
        if visiting.groups.contains(&found.id()) && is_redefinition(found.schema, found.item) {
            // A redefined group referencing its own name means the original
            found = find_original(found.schema, &found.qname())
                .ok_or_else(|| Error::reference(ComponentKind::Group, &group.reference))?;
        }
        if visiting.groups.contains(&found.id()) {
            return Err(Error::circular(ComponentKind::Group, &group.reference));
        }
        tracing::trace!(group = %group.reference, "expanding group");
        let optional = optional || group.occurs()?.is_emptiable();
        visiting.groups.push(found.id());
        if let Some(model) = &found.item.model {
            self.model(model, found.schema, optional, out, visiting)?;
        }
        visiting.groups.pop();
        Ok(())
    }

    fn element_field(
        &self,
        element: &'a Element,
        schema: &'a Schema,
        optional: bool,
    ) -> Result<ElementField<'a>> {
        let occurs = element.occurs()?;
        let (declaration, declaration_schema) = match &element.reference {
            Some(reference) => {
                let found: Found<'a, Element> = self.require(schema, reference)?;
                (found.item, found.schema)
            }
            None => (element, schema),
        };
        Ok(ElementField {
            element,
            declaration,
            schema,
            declaration_schema,
            occurs,
            optional: optional || occurs.is_emptiable(),
        })
    }

    fn collect_attributes(
        &self,
        ct: &'a ComplexType,
        schema: &'a Schema,
        out: &mut Vec<AttributeField<'a>>,
        visiting: &mut Visiting,
    ) -> Result<()> {
        let id = ct as *const ComplexType;
        if visiting.types.contains(&id) {
            return Err(Error::circular(
                ComponentKind::ComplexType,
                ct.name.as_deref().unwrap_or("(anonymous)"),
            ));
        }
        visiting.types.push(id);
        if let Some(derivation) = ct.derivation() {
            if let Some(base) = self.base_type(ct, derivation, schema)? {
                self.collect_attributes(base.item, base.schema, out, visiting)?;
            }
            self.attribute_list(&derivation.attributes, schema, out, visiting)?;
        }
        self.attribute_list(&ct.attributes, schema, out, visiting)?;
        visiting.types.pop();
        Ok(())
    }

    fn attribute_list(
        &self,
        list: &'a AttributeList,
        schema: &'a Schema,
        out: &mut Vec<AttributeField<'a>>,
        visiting: &mut Visiting,
    ) -> Result<()> {
        for item in &list.items {
            match item {
                AttributeItem::Attribute(attribute) => {
                    self.merge_attribute(attribute, schema, out)?
                }
                AttributeItem::AttributeGroup(group) => {
                    let reference = group.reference.as_deref().unwrap_or_default();
                    let mut found: Found<'a, AttributeGroup> = self.require(schema, reference)?;
                    if visiting.attribute_groups.contains(&found.id())
                        && is_redefinition(found.schema, found.item)
                    {
                        found = find_original(found.schema, &found.qname()).ok_or_else(|| {
                            Error::reference(ComponentKind::AttributeGroup, reference)
                        })?;
                    }
                    if visiting.attribute_groups.contains(&found.id()) {
                        return Err(Error::circular(ComponentKind::AttributeGroup, reference));
                    }
                    visiting.attribute_groups.push(found.id());
                    self.attribute_list(&found.item.attributes, found.schema, out, visiting)?;
                    visiting.attribute_groups.pop();
                }
            }
        }
        Ok(())
    }

    fn merge_attribute(
        &self,
        attribute: &'a Attribute,
        schema: &'a Schema,
        out: &mut Vec<AttributeField<'a>>,
    ) -> Result<()> {
        let (declaration, declaration_schema) = match &attribute.reference {
            Some(reference) => match self.lookup::<Attribute>(schema, reference) {
                Some(found) => (found.item, found.schema),
                // xml:lang and friends have no schema in the pool
                None if schema.resolve_qname(reference).namespace() == Some(XML_NAMESPACE) => {
                    (attribute, schema)
                }
                None => return Err(Error::reference(ComponentKind::Attribute, reference)),
            },
            None => (attribute, schema),
        };
        let field = AttributeField {
            attribute,
            declaration,
            schema,
            declaration_schema,
        };
        let existing = out.iter().position(|f| f.name() == field.name());
        match (existing, attribute.is_prohibited()) {
            (Some(index), true) => {
                out.remove(index);
            }
            (Some(index), false) => out[index] = field,
            (None, true) => {}
            (None, false) => out.push(field),
        }
        Ok(())
    }

    /// Type of an element field
    pub fn element_type(&self, field: &ElementField<'a>) -> Result<Resolved<'a>> {
        self.declared_type(field.declaration, field.declaration_schema)
    }

    /// Type of an element declaration defined in `schema`
    pub fn declared_type(&self, element: &'a Element, schema: &'a Schema) -> Result<Resolved<'a>> {
        let mut heads = Vec::new();
        self.declared_type_guarded(element, schema, &mut heads)
    }

    fn declared_type_guarded(
        &self,
        element: &'a Element,
        schema: &'a Schema,
        heads: &mut Vec<*const Element>,
    ) -> Result<Resolved<'a>> {
        if let Some(ct) = &element.complex_type {
            return Ok(Resolved::Complex(Found::new(ct, schema)));
        }
        if let Some(simple) = &element.simple_type {
            return Ok(Resolved::Simple(self.simple_kind(simple, schema, &mut Vec::new())?));
        }
        if let Some(type_name) = &element.type_name {
            return self.named_type(type_name, schema);
        }
        // A substitution member without a type takes its head's type
        heads.push(element as *const Element);
        for head in element.substitution_heads() {
            if let Some(found) = self.lookup::<Element>(schema, head) {
                if !heads.contains(&(found.item as *const Element)) {
                    return self.declared_type_guarded(found.item, found.schema, heads);
                }
            }
        }
        Ok(Resolved::Any)
    }

    /// Value kind of an attribute field (attributes always have simple types)
    pub fn attribute_kind(&self, field: &AttributeField<'a>) -> Result<ValueKind> {
        let declaration = field.declaration;
        let schema = field.declaration_schema;
        if let Some(simple) = &declaration.simple_type {
            return self.simple_kind(simple, schema, &mut Vec::new());
        }
        match &declaration.type_name {
            Some(type_name) => match self.named_type(type_name, schema)? {
                Resolved::Simple(kind) => Ok(kind),
                _ => Ok(ValueKind::String),
            },
            None => Ok(ValueKind::String),
        }
    }

    /// Resolve a named type written in `schema`
    pub fn named_type(&self, reference: &str, schema: &'a Schema) -> Result<Resolved<'a>> {
        let name = schema.resolve_qname(reference);
        if is_xsd_namespace(name.namespace()) {
            if name.local_name == ANY_TYPE {
                return Ok(Resolved::Any);
            }
            return Ok(Resolved::Simple(
                builtin_kind(&name.local_name).unwrap_or(ValueKind::String),
            ));
        }
        if let Some(found) = self.lookup::<ComplexType>(schema, reference) {
            return Ok(Resolved::Complex(found));
        }
        if let Some(found) = self.lookup::<SimpleType>(schema, reference) {
            return Ok(Resolved::Simple(self.simple_kind(
                found.item,
                found.schema,
                &mut Vec::new(),
            )?));
        }
        Err(Error::reference(ComponentKind::Type, reference))
    }

    fn simple_kind(
        &self,
        simple: &'a SimpleType,
        schema: &'a Schema,
        visiting: &mut Vec<*const SimpleType>,
    ) -> Result<ValueKind> {
        let id = simple as *const SimpleType;
        if visiting.contains(&id) {
            return Err(Error::circular(
                ComponentKind::SimpleType,
                simple.name.as_deref().unwrap_or("(anonymous)"),
            ));
        }
        visiting.push(id);
        let kind = match &simple.derivation {
            SimpleDerivation::Restriction(restriction) => match (&restriction.simple_type, &restriction.base) {
                (Some(inner), _) => self.simple_kind(inner, schema, visiting)?,
                (None, Some(base)) => self.simple_named(base, schema, visiting)?,
                (None, None) => ValueKind::String,
            },
            SimpleDerivation::List(list) => {
                let item = match (&list.simple_type, &list.item_type) {
                    (Some(inner), _) => self.simple_kind(inner, schema, visiting)?,
                    (None, Some(item)) => self.simple_named(item, schema, visiting)?,
                    (None, None) => ValueKind::String,
                };
                match item {
                    ValueKind::List(_) => item,
                    item => ValueKind::List(Box::new(item)),
                }
            }
            SimpleDerivation::Union(_) | SimpleDerivation::None => ValueKind::String,
        };
        visiting.pop();
        Ok(kind)
    }

    fn simple_named(
        &self,
        reference: &str,
        schema: &'a Schema,
        visiting: &mut Vec<*const SimpleType>,
    ) -> Result<ValueKind> {
        let name = schema.resolve_qname(reference);
        if is_xsd_namespace(name.namespace()) {
            return Ok(builtin_kind(&name.local_name).unwrap_or(ValueKind::String));
        }
        match self.lookup::<SimpleType>(schema, reference) {
            Some(found) => self.simple_kind(found.item, found.schema, visiting),
            None => Err(Error::reference(ComponentKind::SimpleType, reference)),
        }
    }

    /// Kind of the text content (`$value`) of a complex type, if it has any
    pub fn text_kind(&self, ct: Found<'a, ComplexType>) -> Result<Option<ValueKind>> {
        let mut visiting = Vec::new();
        self.text_kind_guarded(ct, &mut visiting)
    }

    fn text_kind_guarded(
        &self,
        ct: Found<'a, ComplexType>,
        visiting: &mut Vec<*const ComplexType>,
    ) -> Result<Option<ValueKind>> {
        if visiting.contains(&ct.id()) {
            return Err(Error::circular(
                ComponentKind::ComplexType,
                ct.item.name.as_deref().unwrap_or("(anonymous)"),
            ));
        }
        visiting.push(ct.id());
        let kind = match &ct.item.content {
            Content::SimpleContent(derived) => {
                let derivation = &derived.derivation;
                if let Some(simple) = &derivation.simple_type {
                    Some(self.simple_kind(simple, ct.schema, &mut Vec::new())?)
                } else if let Some(base) = self.base_type(ct.item, derivation, ct.schema)? {
                    self.text_kind_guarded(base, visiting)?
                        .or(Some(ValueKind::String))
                } else if let Some(base) = &derivation.base {
                    Some(self.simple_named(base, ct.schema, &mut Vec::new())?)
                } else {
                    Some(ValueKind::String)
                }
            }
            _ if ct.item.is_mixed() => Some(ValueKind::String),
            Content::ComplexContent(derived) => {
                // Mixed content is inherited along extensions
                match self.base_type(ct.item, &derived.derivation, ct.schema)? {
                    Some(base) if derived.derivation.is_extension() => self
                        .text_kind_guarded(base, visiting)?
                        .filter(|_| base.item.is_mixed()),
                    _ => None,
                }
            }
            _ => None,
        };
        visiting.pop();
        Ok(kind)
    }

    /// Concrete substitutes of an abstract field, searched in the whole graph
    pub fn substitutes(&self, field: &ElementField<'a>) -> Vec<Found<'a, Element>> {
        lookup::substitutes(
            self.root,
            Found::new(field.declaration, field.declaration_schema),
        )
    }
}

/// Resolved type of an element declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<'a> {
    /// Complex type with its defining schema
    Complex(Found<'a, ComplexType>),
    /// Simple value of the given kind
    Simple(ValueKind),
    /// `xs:anyType` or untyped: converted generically
    Any,
}

/// Element fields of a complex type defined in `schema`
pub fn walk_elements<'a>(ct: &'a ComplexType, schema: &'a Schema) -> Result<Vec<ElementField<'a>>> {
    Walker::new(schema).elements(ct, schema)
}

/// Attribute fields of a complex type defined in `schema`
pub fn walk_attributes<'a>(
    ct: &'a ComplexType,
    schema: &'a Schema,
) -> Result<Vec<AttributeField<'a>>> {
    Walker::new(schema).attributes(ct, schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_xsd;
    use crate::resolve::link_schema;
    use std::sync::Arc;

    fn names<'a>(fields: &[ElementField<'a>]) -> Vec<&'a str> {
        fields.iter().map(ElementField::name).collect()
    }

    const CHAIN: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
        xmlns:t="urn:t" targetNamespace="urn:t">
      <xs:complexType name="Base">
        <xs:sequence><xs:element name="id" type="xs:int"/></xs:sequence>
        <xs:attribute name="version" type="xs:string"/>
      </xs:complexType>
      <xs:complexType name="Child">
        <xs:complexContent><xs:extension base="t:Base">
          <xs:sequence><xs:element name="name" type="xs:string"/></xs:sequence>
          <xs:attribute name="lang" type="xs:language"/>
        </xs:extension></xs:complexContent>
      </xs:complexType>
      <xs:complexType name="GrandChild">
        <xs:complexContent><xs:extension base="t:Child">
          <xs:sequence>
            <xs:element name="tags" type="xs:string" maxOccurs="unbounded"/>
            <xs:group ref="t:extra"/>
          </xs:sequence>
          <xs:attributeGroup ref="t:audit"/>
        </xs:extension></xs:complexContent>
      </xs:complexType>
      <xs:group name="extra">
        <xs:choice>
          <xs:element name="a" type="xs:string"/>
          <xs:element name="b" type="xs:string"/>
        </xs:choice>
      </xs:group>
      <xs:attributeGroup name="audit">
        <xs:attribute name="by" type="xs:string" use="required"/>
      </xs:attributeGroup>
    </xs:schema>"#;

    #[test]
    fn test_three_level_inheritance() {
        let schema = parse_xsd(CHAIN).unwrap();
        let ct = schema.components.complex_type("GrandChild").unwrap();
        let fields = walk_elements(ct, &schema).unwrap();
        assert_eq!(names(&fields), vec!["id", "name", "tags", "a", "b"]);
        assert!(fields[2].is_repeated());
        assert!(!fields[0].optional);
        assert!(fields[3].optional && fields[4].optional);

        let attributes = walk_attributes(ct, &schema).unwrap();
        let names: Vec<_> = attributes.iter().map(AttributeField::name).collect();
        assert_eq!(names, vec!["version", "lang", "by"]);
        assert!(attributes[2].is_required());
    }

    #[test]
    fn test_restriction_replaces_content_and_prohibits() {
        let schema = parse_xsd(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
              <xs:complexType name="Base">
                <xs:sequence>
                  <xs:element name="a" type="xs:string"/>
                  <xs:element name="b" type="xs:string" minOccurs="0"/>
                </xs:sequence>
                <xs:attribute name="x" type="xs:string"/>
                <xs:attribute name="y" type="xs:string"/>
              </xs:complexType>
              <xs:complexType name="Narrow">
                <xs:complexContent><xs:restriction base="Base">
                  <xs:sequence><xs:element name="a" type="xs:string"/></xs:sequence>
                  <xs:attribute name="x" type="xs:string" use="required"/>
                  <xs:attribute name="y" use="prohibited"/>
                </xs:restriction></xs:complexContent>
              </xs:complexType>
            </xs:schema>"#,
        )
        .unwrap();
        let ct = schema.components.complex_type("Narrow").unwrap();
        assert_eq!(names(&walk_elements(ct, &schema).unwrap()), vec!["a"]);
        let attributes = walk_attributes(ct, &schema).unwrap();
        assert_eq!(attributes.len(), 1);
        assert!(attributes[0].is_required());
    }

    #[test]
    fn test_circular_group_is_an_error() {
        let schema = parse_xsd(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
              <xs:group name="g1"><xs:sequence><xs:group ref="g2"/></xs:sequence></xs:group>
              <xs:group name="g2"><xs:sequence><xs:group ref="g1"/></xs:sequence></xs:group>
              <xs:complexType name="T"><xs:group ref="g1"/></xs:complexType>
            </xs:schema>"#,
        )
        .unwrap();
        let ct = schema.components.complex_type("T").unwrap();
        assert!(matches!(
            walk_elements(ct, &schema),
            Err(Error::CircularReference { kind: ComponentKind::Group, .. })
        ));
    }

    #[test]
    fn test_same_group_twice_is_not_circular() {
        let schema = parse_xsd(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
              <xs:group name="g"><xs:sequence><xs:element name="v" type="xs:string"/></xs:sequence></xs:group>
              <xs:complexType name="T"><xs:sequence>
                <xs:group ref="g"/><xs:element name="w" type="xs:string"/><xs:group ref="g"/>
              </xs:sequence></xs:complexType>
            </xs:schema>"#,
        )
        .unwrap();
        let ct = schema.components.complex_type("T").unwrap();
        assert_eq!(names(&walk_elements(ct, &schema).unwrap()), vec!["v", "w", "v"]);
    }

    #[test]
    fn test_unresolved_reference() {
        let schema = parse_xsd(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
              <xs:complexType name="T"><xs:sequence><xs:element ref="missing"/></xs:sequence></xs:complexType>
            </xs:schema>"#,
        )
        .unwrap();
        let ct = schema.components.complex_type("T").unwrap();
        assert!(matches!(
            walk_elements(ct, &schema),
            Err(Error::SchemaReference { kind: ComponentKind::Element, .. })
        ));
    }

    #[test]
    fn test_inherited_field_keeps_defining_schema() {
        let base = Arc::new(
            parse_xsd(
                r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:base"
                    elementFormDefault="qualified">
                  <xs:complexType name="Base"><xs:sequence><xs:element name="id" type="xs:int"/></xs:sequence></xs:complexType>
                </xs:schema>"#,
            )
            .unwrap()
            .with_filename("base.xsd"),
        );
        let main = parse_xsd(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:b="urn:base"
                targetNamespace="urn:main">
              <xs:import namespace="urn:base" schemaLocation="base.xsd"/>
              <xs:complexType name="Derived">
                <xs:complexContent><xs:extension base="b:Base">
                  <xs:sequence><xs:element name="extra" type="xs:string"/></xs:sequence>
                </xs:extension></xs:complexContent>
              </xs:complexType>
            </xs:schema>"#,
        )
        .unwrap();
        let linked = link_schema(&main, &[base]);
        let ct = linked.components.complex_type("Derived").unwrap();
        let fields = walk_elements(ct, &linked).unwrap();
        assert_eq!(fields[0].schema.target_namespace.as_deref(), Some("urn:base"));
        assert_eq!(fields[1].schema.target_namespace.as_deref(), Some("urn:main"));
    }

    #[test]
    fn test_element_types() {
        let schema = parse_xsd(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
              <xs:simpleType name="Ints"><xs:list itemType="xs:int"/></xs:simpleType>
              <xs:simpleType name="Small"><xs:restriction base="xs:short"/></xs:simpleType>
              <xs:complexType name="Price">
                <xs:simpleContent><xs:extension base="xs:decimal">
                  <xs:attribute name="currency" type="xs:string"/>
                </xs:extension></xs:simpleContent>
              </xs:complexType>
              <xs:element name="ints" type="Ints"/>
              <xs:element name="small" type="Small"/>
              <xs:element name="price" type="Price"/>
              <xs:element name="anything"/>
              <xs:element name="head" abstract="true" type="Small"/>
              <xs:element name="member" substitutionGroup="head"/>
            </xs:schema>"#,
        )
        .unwrap();
        let walker = Walker::new(&schema);
        let resolve = |name: &str| {
            walker
                .declared_type(schema.components.element(name).unwrap(), &schema)
                .unwrap()
        };
        assert_eq!(
            resolve("ints"),
            Resolved::Simple(ValueKind::List(Box::new(ValueKind::Integer)))
        );
        assert_eq!(resolve("small"), Resolved::Simple(ValueKind::Integer));
        assert_eq!(resolve("anything"), Resolved::Any);
        assert_eq!(resolve("member"), Resolved::Simple(ValueKind::Integer));
        let Resolved::Complex(price) = resolve("price") else {
            panic!("expected complex type");
        };
        assert_eq!(walker.text_kind(price).unwrap(), Some(ValueKind::Decimal));
    }
}

//! XML document handling
//!
//! A small DOM used on both sides of the schema-driven engine: instance
//! documents are read into it with namespace resolution, and the builder
//! produces it before serializing to text.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::namespaces::{NamespaceContext, QName};
use crate::{XML_NAMESPACE, XSI_NAMESPACE};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use quick_xml::Writer;

/// Attribute of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Resolved attribute name
    pub qname: QName,
    /// Prefix as written
    pub prefix: Option<String>,
    /// Attribute value (unescaped)
    pub value: String,
}

impl Attribute {
    /// Name as written on the wire
    pub fn tag_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.qname.local_name),
            None => self.qname.local_name.clone(),
        }
    }
}

/// XML Element in the document tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Resolved element name
    pub qname: QName,
    /// Prefix as written
    pub prefix: Option<String>,
    /// Attributes in document order
    pub attributes: Vec<Attribute>,
    /// Namespace declarations made on this element
    pub namespaces: NamespaceContext,
    /// Text content (if any)
    pub text: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
}

impl Element {
    /// Create a new element
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            prefix: None,
            attributes: Vec::new(),
            namespaces: NamespaceContext::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Create an element with a wire prefix
    pub fn prefixed(qname: QName, prefix: Option<String>) -> Self {
        Self {
            prefix,
            ..Self::new(qname)
        }
    }

    /// Name as written on the wire
    pub fn tag_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.qname.local_name),
            None => self.qname.local_name.clone(),
        }
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.qname.local_name
    }

    /// Get the namespace of the element
    pub fn namespace(&self) -> Option<&str> {
        self.qname.namespace.as_deref()
    }

    /// Get an unqualified attribute value by local name
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attribute(&QName::local(name))
    }

    /// Get an attribute value by resolved name
    pub fn attribute(&self, qname: &QName) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| &a.qname == qname)
            .map(|a| a.value.as_str())
    }

    /// Append an attribute
    pub fn set_attribute(&mut self, qname: QName, prefix: Option<String>, value: impl Into<String>) {
        self.attributes.push(Attribute {
            qname,
            prefix,
            value: value.into(),
        });
    }

    /// Add a child element
    pub fn add_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Set text content
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Child elements with the given resolved name
    pub fn children_named<'a>(&'a self, qname: &'a QName) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| &c.qname == qname)
    }

    /// Find child elements by local name
    pub fn find_children(&self, local_name: &str) -> Vec<&Element> {
        self.children
            .iter()
            .filter(|e| e.local_name() == local_name)
            .collect()
    }

    /// Check for `xsi:nil="true"`
    pub fn is_nil(&self) -> bool {
        matches!(
            self.attribute(&QName::namespaced(XSI_NAMESPACE, "nil")),
            Some("true") | Some("1")
        )
    }

    fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let name = self.tag_name();
        let mut start = BytesStart::new(name.clone());
        if let Some(default) = self.namespaces.get_default_namespace() {
            start.push_attribute(("xmlns", default));
        }
        for (prefix, uri) in self.namespaces.iter() {
            let key = format!("xmlns:{}", prefix);
            start.push_attribute((key.as_str(), uri));
        }
        for attr in &self.attributes {
            let key = attr.tag_name();
            start.push_attribute((key.as_str(), attr.value.as_str()));
        }

        // An empty text node keeps the explicit close tag.
        if self.children.is_empty() && self.text.is_none() {
            return write_event(writer, Event::Empty(start));
        }
        write_event(writer, Event::Start(start))?;
        if let Some(text) = &self.text {
            write_event(writer, Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write_to(writer)?;
        }
        write_event(writer, Event::End(BytesEnd::new(name)))
    }
}

fn write_event<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Xml(e.to_string()))
}

/// Options for writing a document as text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Emit an XML declaration
    pub xml_decl: bool,
    /// Encoding named in the declaration
    pub encoding: String,
    /// Indentation width (None for compact output)
    pub indent: Option<usize>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            xml_decl: true,
            encoding: "UTF-8".to_string(),
            indent: None,
        }
    }
}

/// XML Document representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Root element of the document
    pub root: Element,
}

impl Document {
    /// Create a document around a root element
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Parse an XML document from a string
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse_with_limits(xml, &Limits::default())
    }

    /// Parse an XML document, enforcing resource limits
    pub fn parse_with_limits(xml: &str, limits: &Limits) -> Result<Self> {
        limits.check_xml_size(xml.len())?;

        // Leaf text is kept exactly; whitespace between child elements is
        // dropped when the element closes
        let mut reader = NsReader::from_str(xml);
        reader.trim_text(false);

        let mut root: Option<Element> = None;
        let mut element_stack: Vec<Element> = Vec::new();

        loop {
            let position = reader.buffer_position();
            let (resolved, event) = reader.read_resolved_event().map_err(|e| {
                Error::MalformedDocument(format!("at position {}: {}", position, e))
            })?;
            let namespace = owned_namespace(resolved)?;

            match event {
                Event::Start(e) => {
                    if root.is_some() && element_stack.is_empty() {
                        return Err(multiple_roots(position));
                    }
                    let element = Self::parse_element(&reader, &e, namespace, limits)?;
                    element_stack.push(element);
                    limits.check_xml_depth(element_stack.len())?;
                }
                Event::Empty(e) => {
                    let element = Self::parse_element(&reader, &e, namespace, limits)?;
                    match element_stack.last_mut() {
                        Some(parent) => parent.add_child(element),
                        None if root.is_none() => root = Some(element),
                        None => return Err(multiple_roots(position)),
                    }
                }
                Event::End(_) => {
                    if let Some(mut current) = element_stack.pop() {
                        current.settle_text();
                        match element_stack.last_mut() {
                            Some(parent) => parent.add_child(current),
                            None => root = Some(current),
                        }
                    }
                }
                Event::Text(e) => {
                    let text = e.unescape().map_err(|e| {
                        Error::MalformedDocument(format!("failed to unescape text: {}", e))
                    })?;
                    append_text(&mut element_stack, &text, position)?;
                }
                Event::CData(e) => {
                    let raw = e.into_inner();
                    let text = String::from_utf8_lossy(&raw);
                    append_text(&mut element_stack, &text, position)?;
                }
                Event::Eof => break,
                _ => {} // Declarations, comments, processing instructions
            }
        }

        if !element_stack.is_empty() {
            return Err(Error::MalformedDocument(format!(
                "unexpected end of document inside <{}>",
                element_stack[element_stack.len() - 1].tag_name()
            )));
        }

        root.map(Document::new)
            .ok_or_else(|| Error::MalformedDocument("document has no root element".to_string()))
    }

    /// Parse element from BytesStart event
    fn parse_element(
        reader: &NsReader<&[u8]>,
        start: &BytesStart,
        namespace: Option<String>,
        limits: &Limits,
    ) -> Result<Element> {
        let name = start.name();
        let local = utf8(start.local_name().as_ref())?;
        let prefix = name.prefix().map(|p| utf8(p.as_ref())).transpose()?;

        let mut element = Element::prefixed(QName::new(namespace, local), prefix);

        for attr_result in start.attributes() {
            let attr = attr_result
                .map_err(|e| Error::MalformedDocument(format!("failed to parse attribute: {}", e)))?;
            let key = utf8(attr.key.as_ref())?;
            let value = attr
                .unescape_value()
                .map_err(|e| {
                    Error::MalformedDocument(format!("failed to unescape attribute value: {}", e))
                })?
                .into_owned();

            if key == "xmlns" {
                element.namespaces.set_default_namespace(value);
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                element.namespaces.add_prefix(prefix, value);
            } else {
                let (resolved, local) = reader.resolve_attribute(attr.key);
                let attr_prefix = attr.key.prefix().map(|p| utf8(p.as_ref())).transpose()?;
                let attr_namespace = match resolved {
                    ResolveResult::Unknown(p) if p.as_slice() == b"xml" => Some(XML_NAMESPACE.to_string()),
                    other => owned_namespace(other)?,
                };
                let qname = QName::new(attr_namespace, utf8(local.as_ref())?);
                element.set_attribute(qname, attr_prefix, value);
            }
        }
        limits.check_attributes(element.attributes.len())?;

        Ok(element)
    }

    /// Serialize the document as text
    pub fn to_xml(&self, options: &WriteOptions) -> Result<String> {
        let mut writer = match options.indent {
            Some(indent) => Writer::new_with_indent(Vec::new(), b' ', indent),
            None => Writer::new(Vec::new()),
        };
        if options.xml_decl {
            write_event(
                &mut writer,
                Event::Decl(BytesDecl::new("1.0", Some(options.encoding.as_str()), None)),
            )?;
        }
        self.root.write_to(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(|e| Error::Xml(e.to_string()))
    }
}

fn owned_namespace(resolved: ResolveResult) -> Result<Option<String>> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.as_ref()).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(Error::MalformedDocument(format!(
            "unbound namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

fn append_text(stack: &mut [Element], text: &str, position: usize) -> Result<()> {
    match stack.last_mut() {
        Some(current) => {
            match &mut current.text {
                Some(existing) => existing.push_str(text),
                None => current.text = Some(text.to_string()),
            }
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(Error::MalformedDocument(format!(
            "text outside of the root element at position {}",
            position
        ))),
    }
}

impl Element {
    fn settle_text(&mut self) {
        if self.children.is_empty() {
            return;
        }
        self.text = match self.text.take() {
            Some(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            _ => None,
        };
    }
}

fn multiple_roots(position: usize) -> Error {
    Error::MalformedDocument(format!("second root element at position {}", position))
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| Error::MalformedDocument(format!("invalid UTF-8 in name: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_xml() {
        let xml = r#"<root><child>text</child></root>"#;
        let doc = Document::from_string(xml).unwrap();

        assert_eq!(doc.root.local_name(), "root");
        assert_eq!(doc.root.children.len(), 1);
        assert_eq!(doc.root.children[0].local_name(), "child");
        assert_eq!(doc.root.children[0].text.as_deref(), Some("text"));
    }

    #[test]
    fn test_leaf_text_keeps_whitespace() {
        let xml = "<root>\n  <name> John </name>\n  <blank>  </blank>\n</root>\n";
        let doc = Document::from_string(xml).unwrap();

        assert_eq!(doc.root.text, None);
        assert_eq!(doc.root.children.len(), 2);
        assert_eq!(doc.root.children[0].text.as_deref(), Some(" John "));
        assert_eq!(doc.root.children[1].text.as_deref(), Some("  "));
    }

    #[test]
    fn test_mixed_text_is_trimmed() {
        let xml = "<p>\n  Hello <b>x</b>\n</p>";
        let doc = Document::from_string(xml).unwrap();
        assert_eq!(doc.root.text.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_parse_with_attributes() {
        let xml = r#"<root attr1="value1" attr2="a &amp; b"><child/></root>"#;
        let doc = Document::from_string(xml).unwrap();

        assert_eq!(doc.root.get_attribute("attr1"), Some("value1"));
        assert_eq!(doc.root.get_attribute("attr2"), Some("a & b"));
    }

    #[test]
    fn test_parse_resolves_namespaces() {
        let xml = r#"<p:root xmlns:p="urn:p" xmlns="urn:d" p:id="1"><child/><p:other/></p:root>"#;
        let doc = Document::from_string(xml).unwrap();

        assert!(doc.root.qname.matches(Some("urn:p"), "root"));
        assert_eq!(doc.root.prefix.as_deref(), Some("p"));
        assert!(doc.root.children[0].qname.matches(Some("urn:d"), "child"));
        assert!(doc.root.children[1].qname.matches(Some("urn:p"), "other"));
        assert_eq!(doc.root.attribute(&QName::namespaced("urn:p", "id")), Some("1"));
        assert_eq!(doc.root.get_attribute("id"), None);
        assert_eq!(doc.root.namespaces.get_namespace("p"), Some("urn:p"));
    }

    #[test]
    fn test_malformed_documents() {
        for xml in [
            "<root><child></root>",
            "<root>",
            "",
            "<a/><b/>",
            "<x:root/>",
        ] {
            let result = Document::from_string(xml);
            assert!(
                matches!(result, Err(Error::MalformedDocument(_))),
                "expected malformed error for {:?}",
                xml
            );
        }
    }

    #[test]
    fn test_depth_limit() {
        let xml = "<a><a><a><a/></a></a></a>";
        let limits = Limits::default().with_max_depth(2);
        assert!(matches!(
            Document::parse_with_limits(xml, &limits),
            Err(Error::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_write_document() {
        let mut root = Element::prefixed(QName::namespaced("urn:p", "root"), Some("p".to_string()));
        root.namespaces.add_prefix("p", "urn:p");
        root.set_attribute(QName::local("id"), None, "a<b");
        let mut child = Element::new(QName::local("name"));
        child.set_text("x & y");
        root.add_child(child);
        root.add_child(Element::new(QName::local("empty")));

        let xml = Document::new(root)
            .to_xml(&WriteOptions {
                xml_decl: false,
                ..WriteOptions::default()
            })
            .unwrap();
        assert_eq!(
            xml,
            r#"<p:root xmlns:p="urn:p" id="a&lt;b"><name>x &amp; y</name><empty/></p:root>"#
        );
    }

    #[test]
    fn test_empty_text_keeps_close_tag() {
        let mut root = Element::new(QName::local("root"));
        root.set_text("");
        let xml = Document::new(root).to_xml(&WriteOptions::default()).unwrap();
        assert_eq!(xml, r#"<?xml version="1.0" encoding="UTF-8"?><root></root>"#);
    }

    #[test]
    fn test_nil_detection() {
        let xml = r#"<root xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:nil="true"/>"#;
        let doc = Document::from_string(xml).unwrap();
        assert!(doc.root.is_nil());
    }
}

//! Minimal navigable element tree built from quick-xml events.
//!
//! The extractors need `textContent`-style access and descendant lookups,
//! which a flat event state machine makes awkward for nested full-text
//! documents, so documents are materialised into a small tree first.

use std::borrow::Cow;

use ciliai_common::{CiliaiError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    /// Local name (namespace prefix stripped).
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), attrs: Vec::new(), children: Vec::new() }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// Direct children named `name`.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.child_elements().filter(move |e| e.name == name)
    }

    /// Every descendant named `name`, in document order. Nested matches are included.
    pub fn descendants_named(&self, name: &str) -> Vec<&XmlElement> {
        let mut out = Vec::new();
        collect_named(self, name, &mut out);
        out
    }

    /// First descendant named `name` in document order.
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        for child in self.child_elements() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text(&self) -> String {
        let mut out = String::new();
        push_text(self, &mut out);
        out
    }

    /// `text()` with runs of whitespace collapsed and ends trimmed.
    pub fn normalized_text(&self) -> String {
        collapse_whitespace(&self.text())
    }
}

fn collect_named<'a>(el: &'a XmlElement, name: &str, out: &mut Vec<&'a XmlElement>) {
    for child in el.child_elements() {
        if child.name == name {
            out.push(child);
        }
        collect_named(child, name, out);
    }
}

fn push_text(el: &XmlElement, out: &mut String) {
    for child in &el.children {
        match child {
            XmlNode::Text(t) => out.push_str(t),
            XmlNode::Element(e) => push_text(e, out),
        }
    }
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn element_from(start: &BytesStart<'_>) -> Result<XmlElement> {
    let mut el = XmlElement::new(lossy(start.local_name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(|e| CiliaiError::Xml(format!("bad attribute on <{}>: {e}", el.name)))?;
        let key = lossy(attr.key.local_name().as_ref());
        let value = attr
            .unescape_value()
            .map(Cow::into_owned)
            .unwrap_or_else(|_| lossy(&attr.value));
        el.attrs.push((key, value));
    }
    Ok(el)
}

/// Parse a document into a synthetic `#document` root element.
///
/// Syntax errors (mismatched or unclosed tags, malformed markup) are
/// returned as `CiliaiError::Xml`. Unknown entities degrade to raw text.
pub fn parse_document(xml: &str) -> Result<XmlElement> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlElement> = vec![XmlElement::new("#document")];

    loop {
        let event = reader.read_event().map_err(|e| {
            CiliaiError::Xml(format!("at byte {}: {e}", reader.buffer_position()))
        })?;

        match event {
            Event::Start(ref e) => stack.push(element_from(e)?),
            Event::Empty(ref e) => {
                let el = element_from(e)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlNode::Element(el));
                }
            }
            Event::End(_) => {
                if stack.len() < 2 {
                    return Err(CiliaiError::Xml("unmatched closing tag".into()));
                }
                if let (Some(el), Some(parent)) = (stack.pop(), stack.last_mut()) {
                    parent.children.push(XmlNode::Element(el));
                }
            }
            Event::Text(ref t) => {
                let text = t
                    .unescape()
                    .map(Cow::into_owned)
                    .unwrap_or_else(|_| lossy(t));
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlNode::Text(text));
                }
            }
            Event::CData(c) => {
                let text = lossy(&c.into_inner());
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(XmlNode::Text(text));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if stack.len() != 1 {
        let open = stack.last().map(|e| e.name.clone()).unwrap_or_default();
        return Err(CiliaiError::Xml(format!("unexpected end of document inside <{open}>")));
    }
    stack.pop().ok_or_else(|| CiliaiError::Xml("empty document stack".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_content_spans_inline_markup() {
        let doc = parse_document("<p>Loss of <italic>IFT88</italic>   gave\n shorter cilia.</p>").unwrap();
        let p = doc.find("p").unwrap();
        assert_eq!(p.normalized_text(), "Loss of IFT88 gave shorter cilia.");
    }

    #[test]
    fn test_descendants_in_document_order() {
        let doc = parse_document(
            "<body><sec><p>a</p><sec><p>b</p></sec></sec><p>c</p><x:p xmlns:x=\"urn:x\">d</x:p></body>",
        )
        .unwrap();
        let texts: Vec<String> = doc.descendants_named("p").iter().map(|p| p.text()).collect();
        assert_eq!(texts, vec!["a", "b", "c", "d"]);
        let body = doc.find("body").unwrap();
        assert_eq!(body.children_named("sec").count(), 1);
    }

    #[test]
    fn test_attributes_and_entities() {
        let doc = parse_document(r#"<article-id pub-id-type="pmc">PMC1 &amp; more</article-id>"#).unwrap();
        let id = doc.find("article-id").unwrap();
        assert_eq!(id.attr("pub-id-type"), Some("pmc"));
        assert_eq!(id.text(), "PMC1 & more");
        assert_eq!(id.attr("missing"), None);
    }

    #[test]
    fn test_cdata_is_text() {
        let doc = parse_document("<t><![CDATA[a < b]]></t>").unwrap();
        assert_eq!(doc.find("t").unwrap().text(), "a < b");
    }

    #[test]
    fn test_mismatched_tags_are_errors() {
        assert!(matches!(parse_document("<a><b></a>"), Err(CiliaiError::Xml(_))));
    }

    #[test]
    fn test_unclosed_document_is_error() {
        assert!(matches!(parse_document("<a><b>text</b>"), Err(CiliaiError::Xml(_))));
    }
}

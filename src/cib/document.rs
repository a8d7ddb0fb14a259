//! Generic XML element tree the decoder walks.
//!
//! Only elements and their attributes are kept. Text, comments, processing
//! instructions and the XML declaration are dropped while parsing.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// All descendants (not `self`) tagged `name`, in document order.
    pub fn descendants_named<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut out = Vec::new();
        // Reverse push keeps the pre-order walk in document order.
        let mut stack: Vec<&Element> = self.children.iter().rev().collect();
        while let Some(el) = stack.pop() {
            if el.name == name {
                out.push(el);
            }
            stack.extend(el.children.iter().rev());
        }
        out
    }
}

/// A parsed CIB snapshot with exactly one root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

/// Why a byte stream did not become a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    /// Not well-formed XML.
    Malformed(String),
    /// Well-formed but without any element.
    Empty,
}

impl Document {
    /// Every element tagged `name`, the root included, in document order.
    pub fn elements_named<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut out = Vec::new();
        if self.root.name == name {
            out.push(&self.root);
        }
        out.extend(self.root.descendants_named(name));
        out
    }

    pub fn parse(text: &str) -> Result<Document, ParseFailure> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = match reader.read_event() {
                Ok(ev) => ev,
                Err(e) => {
                    return Err(ParseFailure::Malformed(format!(
                        "at byte {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
            };

            match event {
                Event::Start(start) => {
                    if root.is_some() && stack.is_empty() {
                        return Err(ParseFailure::Malformed(
                            "more than one root element".to_string(),
                        ));
                    }
                    stack.push(element_from(&start)?);
                }
                Event::Empty(start) => {
                    let el = element_from(&start)?;
                    attach(el, &mut stack, &mut root)?;
                }
                Event::End(_) => {
                    let el = stack.pop().ok_or_else(|| {
                        ParseFailure::Malformed("closing tag without opening tag".to_string())
                    })?;
                    attach(el, &mut stack, &mut root)?;
                }
                Event::Eof => break,
                // Text, CDATA, comments, declarations and doctype carry nothing we use.
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(ParseFailure::Malformed(format!(
                "unclosed element <{}>",
                open.name
            )));
        }

        root.map(|root| Document { root }).ok_or(ParseFailure::Empty)
    }
}

fn element_from(start: &BytesStart) -> Result<Element, ParseFailure> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();

    let mut attributes = BTreeMap::new();
    for attr in start.attributes() {
        let attr = attr
            .map_err(|e| ParseFailure::Malformed(format!("bad attribute on <{}>: {}", name, e)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| ParseFailure::Malformed(format!("bad value for {}: {}", key, e)))?
            .into_owned();
        attributes.insert(key, value);
    }

    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

/// Hang a finished element under its parent, or make it the root.
fn attach(
    el: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
) -> Result<(), ParseFailure> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(el),
        None if root.is_none() => *root = Some(el),
        None => {
            return Err(ParseFailure::Malformed(
                "more than one root element".to_string(),
            ));
        }
    }
    Ok(())
}

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;
use thiserror::Error;

use crate::tree::{Element, Fragment};

/// Errors that can occur while decoding XML into [`Element`] trees.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Input XML could not be tokenized.
    #[error("failed to parse XML: {0}")]
    Xml(#[from] quick_xml::Error),
    /// Input bytes were not valid UTF-8 for tag/attribute/text extraction.
    #[error("invalid UTF-8 while parsing XML: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// Failed to decode an escaped entity.
    #[error("failed to decode XML text: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),
    /// Structural issue in the document.
    #[error("malformed XML: {0}")]
    Malformed(String),
}

/// Parse a document with exactly one root element.
pub fn parse(xml: &[u8]) -> Result<Element, ParseError> {
    let mut roots = read_elements(xml)?;
    match roots.len() {
        0 => Err(ParseError::Malformed("no root element found".to_string())),
        1 => Ok(roots.remove(0)),
        _ => Err(ParseError::Malformed(
            "multiple top-level elements found".to_string(),
        )),
    }
}

/// Parse a sequence of sibling elements, such as a `set` payload.
///
/// An empty or whitespace-only input yields an empty [`Fragment`].
pub fn parse_forest(xml: &[u8]) -> Result<Fragment, ParseError> {
    read_elements(xml).map(Fragment::from)
}

fn read_elements(xml: &[u8]) -> Result<Vec<Element>, ParseError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut roots: Vec<Element> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                stack.push(open_element(&e, &reader)?);
            }
            Event::Empty(e) => {
                let element = open_element(&e, &reader)?;
                attach(&mut stack, &mut roots, element);
            }
            Event::Text(e) => {
                let text = e.unescape()?.into_owned();
                append_text(&mut stack, text)?;
            }
            Event::CData(e) => {
                let text = std::str::from_utf8(e.as_ref())?.to_string();
                append_text(&mut stack, text)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or_else(|| {
                    ParseError::Malformed("encountered closing tag without open tag".to_string())
                })?;
                attach(&mut stack, &mut roots, element);
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) | Event::Comment(_) => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(ParseError::Malformed(
            "unclosed element(s) at end of document".to_string(),
        ));
    }

    Ok(roots)
}

fn attach(stack: &mut [Element], roots: &mut Vec<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => roots.push(element),
    }
}

// Whitespace-only runs are layout, not content.
fn append_text(stack: &mut [Element], text: String) -> Result<(), ParseError> {
    if text.trim().is_empty() {
        return Ok(());
    }
    let Some(current) = stack.last_mut() else {
        return Err(ParseError::Malformed(format!(
            "text outside of any element: {}",
            text.trim()
        )));
    };
    match &mut current.text {
        Some(existing) => existing.push_str(&text),
        None => current.text = Some(text),
    }
    Ok(())
}

fn open_element(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<Element, ParseError> {
    let mut element = Element::new(qname_to_string(e.name())?);

    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = qname_to_string(attr.key)?;
        let value = attr
            .decode_and_unescape_value(reader.decoder())?
            .into_owned();
        element.attributes.insert(key, value);
    }

    Ok(element)
}

fn qname_to_string(name: QName<'_>) -> Result<String, ParseError> {
    Ok(std::str::from_utf8(name.as_ref())?.to_string())
}

#[cfg(test)]
mod tests {
    use super::{parse, parse_forest, ParseError};

    #[test]
    fn parses_attributes_and_nested_entries() {
        let root = parse(
            br#"<response status="success"><result><entry name="web1"><ip-netmask>10.1.1.1/32</ip-netmask></entry></result></response>"#,
        )
        .expect("parse");

        assert_eq!(root.attribute("status"), Some("success"));
        let entry = root
            .get_child("result")
            .and_then(|r| r.get_child("entry"))
            .expect("entry");
        assert_eq!(entry.attribute("name"), Some("web1"));
        assert_eq!(entry.get_text(&["ip-netmask"]), Some("10.1.1.1/32"));
    }

    #[test]
    fn cdata_is_kept_as_text() {
        let root = parse(b"<msg><line><![CDATA[commit failed]]></line></msg>").expect("parse");
        assert_eq!(root.get_text(&["line"]), Some("commit failed"));
    }

    #[test]
    fn forest_keeps_sibling_order() {
        let fragment = parse_forest(b"<b>2</b><a>1</a><c/>").expect("parse forest");
        let names: Vec<&str> = fragment.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn forest_accepts_empty_input() {
        assert!(parse_forest(b"  ").expect("parse forest").is_empty());
    }

    #[test]
    fn single_root_rejects_siblings() {
        let err = parse(b"<a/><b/>").expect_err("should reject");
        assert!(matches!(err, ParseError::Malformed(_)));
    }

    #[test]
    fn rejects_unclosed_elements() {
        assert!(parse(b"<a><b></b>").is_err());
    }

    #[test]
    fn rejects_stray_top_level_text() {
        let err = parse_forest(b"oops<a/>").expect_err("should reject");
        assert!(matches!(err, ParseError::Malformed(_)));
    }
}

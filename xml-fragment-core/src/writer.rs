use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

use crate::tree::{Element, Fragment};

/// Errors that can occur while encoding [`Element`] trees.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to serialize XML events.
    #[error("failed to write XML: {0}")]
    Xml(#[from] quick_xml::Error),
    /// Underlying buffer rejected a write.
    #[error("failed to write XML: {0}")]
    Io(#[from] std::io::Error),
    /// Produced bytes were not UTF-8.
    #[error("encoded XML is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serialize one element compactly, without indentation.
pub fn write(element: &Element) -> Result<Vec<u8>, WriteError> {
    let mut writer = Writer::new(Vec::new());
    write_element(&mut writer, element)?;
    Ok(writer.into_inner())
}

/// Serialize one element with two-space indentation for display.
pub fn write_pretty(element: &Element) -> Result<Vec<u8>, WriteError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_element(&mut writer, element)?;
    Ok(writer.into_inner())
}

/// Serialize sibling elements back to back.
pub fn write_forest(fragment: &Fragment) -> Result<Vec<u8>, WriteError> {
    let mut writer = Writer::new(Vec::new());
    for element in fragment {
        write_element(&mut writer, element)?;
    }
    Ok(writer.into_inner())
}

/// Serialize a fragment into a `String`, the form carried in query parameters.
pub fn to_xml_string(fragment: &Fragment) -> Result<String, WriteError> {
    Ok(String::from_utf8(write_forest(fragment)?)?)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), WriteError> {
    let mut start = BytesStart::new(element.name.as_str());

    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() && element.text.is_none() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;

    if let Some(text) = &element.text {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }

    for child in &element.children {
        write_element(writer, child)?;
    }

    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

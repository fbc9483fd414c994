//! Typed views of configuration entries returned by `get`/`show`.

use serde::Serialize;
use xml_fragment_core::Element;

use crate::kind::ObjectKind;
use crate::payload::{AddressType, TagColor};
use crate::response::{ApiResponse, ProtocolError};

/// Decoding of one `<entry name="...">` of a known kind.
pub trait FromEntry: Sized {
    const KIND: ObjectKind;
    /// Element wrapping the entries in a collection `get`.
    const CONTAINER: &'static str;

    fn from_entry(entry: &Element) -> Result<Self, ProtocolError>;

    /// Decode every entry in a response.
    fn from_response(response: &ApiResponse) -> Result<Vec<Self>, ProtocolError> {
        response
            .entries_for(Self::CONTAINER)
            .into_iter()
            .map(Self::from_entry)
            .collect()
    }
}

fn entry_name(entry: &Element) -> Result<String, ProtocolError> {
    entry
        .attribute("name")
        .map(str::to_string)
        .ok_or_else(|| ProtocolError::MissingElement("entry/@name".to_string()))
}

fn text(entry: &Element, name: &str) -> Option<String> {
    entry.get_text(&[name]).map(str::to_string)
}

fn members_of(entry: &Element, name: &str) -> Vec<String> {
    entry.get_child(name).map(Element::members).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressRecord {
    pub name: String,
    pub address_type: AddressType,
    pub value: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

impl FromEntry for AddressRecord {
    const KIND: ObjectKind = ObjectKind::Address;
    const CONTAINER: &'static str = "address";

    fn from_entry(entry: &Element) -> Result<Self, ProtocolError> {
        let name = entry_name(entry)?;
        let (address_type, value) = entry
            .children
            .iter()
            .find_map(|child| {
                AddressType::from_element_name(&child.name)
                    .map(|t| (t, child.text.clone().unwrap_or_default()))
            })
            .ok_or_else(|| ProtocolError::MissingElement(format!("address '{name}' value")))?;
        Ok(Self {
            name,
            address_type,
            value,
            description: text(entry, "description"),
            tags: members_of(entry, "tag"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupMembers {
    Static(Vec<String>),
    Dynamic(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressGroupRecord {
    pub name: String,
    pub members: GroupMembers,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

impl FromEntry for AddressGroupRecord {
    const KIND: ObjectKind = ObjectKind::AddressGroup;
    const CONTAINER: &'static str = "address-group";

    fn from_entry(entry: &Element) -> Result<Self, ProtocolError> {
        let name = entry_name(entry)?;
        let members = if let Some(list) = entry.get_child("static") {
            GroupMembers::Static(list.members())
        } else if let Some(filter) = entry.get_text(&["dynamic", "filter"]) {
            GroupMembers::Dynamic(filter.to_string())
        } else {
            return Err(ProtocolError::MissingElement(format!(
                "address-group '{name}' static or dynamic"
            )));
        };
        Ok(Self {
            name,
            members,
            description: text(entry, "description"),
            tags: members_of(entry, "tag"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceRecord {
    pub name: String,
    pub protocol: String,
    pub port: String,
    pub source_port: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

impl FromEntry for ServiceRecord {
    const KIND: ObjectKind = ObjectKind::Service;
    const CONTAINER: &'static str = "service";

    fn from_entry(entry: &Element) -> Result<Self, ProtocolError> {
        let name = entry_name(entry)?;
        let protocol = entry
            .get_child("protocol")
            .and_then(|p| p.children.first())
            .ok_or_else(|| ProtocolError::MissingElement(format!("service '{name}' protocol")))?;
        Ok(Self {
            protocol: protocol.name.clone(),
            port: protocol.get_text(&["port"]).unwrap_or_default().to_string(),
            source_port: text(protocol, "source-port"),
            description: text(entry, "description"),
            tags: members_of(entry, "tag"),
            name,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceGroupRecord {
    pub name: String,
    pub members: Vec<String>,
    pub tags: Vec<String>,
}

impl FromEntry for ServiceGroupRecord {
    const KIND: ObjectKind = ObjectKind::ServiceGroup;
    const CONTAINER: &'static str = "service-group";

    fn from_entry(entry: &Element) -> Result<Self, ProtocolError> {
        Ok(Self {
            name: entry_name(entry)?,
            members: members_of(entry, "members"),
            tags: members_of(entry, "tag"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRecord {
    pub name: String,
    pub color: Option<TagColor>,
    pub comments: Option<String>,
}

impl FromEntry for TagRecord {
    const KIND: ObjectKind = ObjectKind::Tag;
    const CONTAINER: &'static str = "tag";

    fn from_entry(entry: &Element) -> Result<Self, ProtocolError> {
        Ok(Self {
            name: entry_name(entry)?,
            color: entry.get_text(&["color"]).and_then(TagColor::from_code),
            comments: text(entry, "comments"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceGroupRecord {
    pub name: String,
    pub description: Option<String>,
    pub devices: Vec<String>,
}

impl FromEntry for DeviceGroupRecord {
    const KIND: ObjectKind = ObjectKind::DeviceGroup;
    const CONTAINER: &'static str = "device-group";

    fn from_entry(entry: &Element) -> Result<Self, ProtocolError> {
        let devices = entry
            .get_child("devices")
            .map(|d| {
                d.get_children("entry")
                    .into_iter()
                    .filter_map(|e| e.attribute("name").map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self {
            name: entry_name(entry)?,
            description: text(entry, "description"),
            devices,
        })
    }
}

/// `show system info` summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SystemInfo {
    pub hostname: Option<String>,
    pub model: String,
    pub serial: Option<String>,
    pub sw_version: Option<String>,
    pub multi_vsys: bool,
}

impl SystemInfo {
    pub fn from_response(response: &ApiResponse) -> Result<Self, ProtocolError> {
        let system = response
            .result()
            .and_then(|r| r.get_child("system"))
            .ok_or_else(|| ProtocolError::MissingElement("result/system".to_string()))?;
        Ok(Self {
            hostname: text(system, "hostname"),
            model: system.get_text(&["model"]).unwrap_or_default().to_string(),
            serial: text(system, "serial"),
            sw_version: text(system, "sw-version"),
            multi_vsys: system.get_text(&["multi-vsys"]) == Some("on"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(xml: &str) -> ApiResponse {
        ApiResponse::decode(xml.as_bytes()).expect("decode")
    }

    #[test]
    fn single_entry_get() {
        let response = decode(
            r#"<response status="success" code="19"><result total-count="1" count="1">
                <entry name="lab"><color>color5</color></entry></result></response>"#,
        );
        let tags = TagRecord::from_response(&response).expect("tags");
        assert_eq!(
            tags,
            vec![TagRecord {
                name: "lab".to_string(),
                color: Some(TagColor::Copper),
                comments: None,
            }]
        );
    }

    #[test]
    fn address_without_value_is_a_protocol_error() {
        let response = decode(
            r#"<response status="success"><result><address><entry name="x"><description>d</description></entry></address></result></response>"#,
        );
        assert!(matches!(
            AddressRecord::from_response(&response),
            Err(ProtocolError::MissingElement(_))
        ));
    }

    #[test]
    fn empty_result_is_empty_list() {
        let response = decode(r#"<response status="success" code="7"/>"#);
        assert!(ServiceRecord::from_response(&response)
            .expect("records")
            .is_empty());
    }
}

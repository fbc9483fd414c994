use xml_fragment_core::Element;

use super::{push_optional_text, Payload, PayloadError};
use crate::kind::ObjectKind;
use crate::name::{validate_object_name, validate_serial};
use crate::session::DEFAULT_VSYS;
use crate::ConfigFragment;

/// A device group and the firewalls (by serial) assigned to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceGroup {
    pub description: Option<String>,
    pub devices: Vec<String>,
}

impl Payload for DeviceGroup {
    fn kind(&self) -> ObjectKind {
        ObjectKind::DeviceGroup
    }

    fn build(&self) -> Result<ConfigFragment, PayloadError> {
        let mut fragment = ConfigFragment::new();
        push_optional_text(&mut fragment, "description", self.description.as_deref());
        if !self.devices.is_empty() {
            let mut devices = Element::new("devices");
            for serial in &self.devices {
                validate_serial(serial)?;
                devices
                    .children
                    .push(Element::new("entry").with_attribute("name", serial.as_str()));
            }
            fragment.push(devices);
        }
        Ok(fragment)
    }
}

/// A template with an empty device configuration skeleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub description: Option<String>,
    pub default_vsys: String,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            description: None,
            default_vsys: DEFAULT_VSYS.to_string(),
        }
    }
}

impl Payload for Template {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Template
    }

    fn build(&self) -> Result<ConfigFragment, PayloadError> {
        validate_object_name("vsys", &self.default_vsys)?;
        let mut fragment = ConfigFragment::new();
        push_optional_text(&mut fragment, "description", self.description.as_deref());
        fragment.push(
            Element::new("settings")
                .with_child(Element::text_node("default-vsys", self.default_vsys.as_str())),
        );
        let vsys = Element::new("vsys")
            .with_child(Element::new("entry").with_attribute("name", self.default_vsys.as_str()));
        let device = Element::new("entry")
            .with_attribute("name", "localhost.localdomain")
            .with_child(vsys);
        fragment.push(
            Element::new("config")
                .with_child(Element::new("devices").with_child(device)),
        );
        Ok(fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_group_lists_serials() {
        let group = DeviceGroup {
            description: Some("branch offices".to_string()),
            devices: vec!["013201001234".to_string(), "013201005678".to_string()],
        };
        assert_eq!(
            group.build().expect("build").to_string(),
            "<description>branch offices</description><devices><entry name=\"013201001234\"/><entry name=\"013201005678\"/></devices>"
        );
    }

    #[test]
    fn empty_device_group_has_no_body() {
        assert!(DeviceGroup::default().build().expect("build").is_empty());
    }

    #[test]
    fn device_group_rejects_bad_serial() {
        let group = DeviceGroup {
            description: None,
            devices: vec!["0132-0100".to_string()],
        };
        assert!(matches!(group.build(), Err(PayloadError::Name(_))));
    }

    #[test]
    fn template_skeleton() {
        let xml = Template::default().build().expect("build").to_string();
        assert_eq!(
            xml,
            "<settings><default-vsys>vsys1</default-vsys></settings><config><devices><entry name=\"localhost.localdomain\"><vsys><entry name=\"vsys1\"/></vsys></entry></devices></config>"
        );
    }
}

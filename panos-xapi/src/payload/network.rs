use std::net::IpAddr;
use std::str::FromStr;

use serde::Serialize;
use xml_fragment_core::Element;

use super::objects::is_ip_netmask;
use super::{invalid, member_list, parse_discriminator, push_optional_text, Payload, PayloadError};
use crate::kind::{InterfaceType, ObjectKind};
use crate::name::{validate_interface_name, validate_object_name};
use crate::ConfigFragment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZoneMode {
    Layer3,
    Layer2,
    VirtualWire,
    Tap,
    Tunnel,
}

impl ZoneMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ZoneMode::Layer3 => "layer3",
            ZoneMode::Layer2 => "layer2",
            ZoneMode::VirtualWire => "virtual-wire",
            ZoneMode::Tap => "tap",
            ZoneMode::Tunnel => "tunnel",
        }
    }
}

impl FromStr for ZoneMode {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_discriminator(
            "zone mode",
            s,
            &[
                ("layer3", ZoneMode::Layer3),
                ("layer2", ZoneMode::Layer2),
                ("virtual-wire", ZoneMode::VirtualWire),
                ("tap", ZoneMode::Tap),
                ("tunnel", ZoneMode::Tunnel),
            ],
            &["layer3", "layer2", "virtual-wire", "tap", "tunnel"],
        )
    }
}

/// A security zone and the interfaces bound to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub mode: ZoneMode,
    pub interfaces: Vec<String>,
    pub enable_user_identification: bool,
}

impl Zone {
    pub fn new(mode: ZoneMode, interfaces: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            mode,
            interfaces: interfaces.into_iter().map(Into::into).collect(),
            enable_user_identification: false,
        }
    }
}

impl Payload for Zone {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Zone
    }

    fn build(&self) -> Result<ConfigFragment, PayloadError> {
        // tunnel zones take no interface list
        let body = match self.mode {
            ZoneMode::Tunnel if !self.interfaces.is_empty() => {
                return Err(invalid(
                    "zone",
                    "interface",
                    &self.interfaces.join(","),
                    "tunnel zones cannot bind interfaces",
                ))
            }
            ZoneMode::Tunnel => Element::new("tunnel"),
            mode => member_list(mode.as_str(), &self.interfaces)?,
        };
        let mut fragment = ConfigFragment::from(Element::new("network").with_child(body));
        if self.enable_user_identification {
            fragment.push(Element::text_node("enable-user-identification", "yes"));
        }
        Ok(fragment)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EthernetMode {
    Layer3,
    Layer2,
    VirtualWire,
    Tap,
    Ha,
    AggregateGroup,
}

impl EthernetMode {
    pub fn as_str(self) -> &'static str {
        match self {
            EthernetMode::Layer3 => "layer3",
            EthernetMode::Layer2 => "layer2",
            EthernetMode::VirtualWire => "virtual-wire",
            EthernetMode::Tap => "tap",
            EthernetMode::Ha => "ha",
            EthernetMode::AggregateGroup => "aggregate-group",
        }
    }
}

impl FromStr for EthernetMode {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_discriminator(
            "interface mode",
            s,
            &[
                ("layer3", EthernetMode::Layer3),
                ("layer2", EthernetMode::Layer2),
                ("virtual-wire", EthernetMode::VirtualWire),
                ("tap", EthernetMode::Tap),
                ("ha", EthernetMode::Ha),
                ("aggregate-group", EthernetMode::AggregateGroup),
            ],
            &["layer3", "layer2", "virtual-wire", "tap", "ha", "aggregate-group"],
        )
    }
}

/// Interface settings. `mode` applies to ethernet and aggregate interfaces;
/// logical units (`tunnel.N`, `loopback.N`, `vlan.N`) carry addresses directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub interface_type: InterfaceType,
    pub mode: EthernetMode,
    /// CIDR addresses, only meaningful for layer3 and logical units.
    pub addresses: Vec<String>,
    /// Parent aggregate for `EthernetMode::AggregateGroup`.
    pub aggregate_group: Option<String>,
    pub comment: Option<String>,
}

impl Interface {
    pub fn layer3(interface_type: InterfaceType, addresses: Vec<String>) -> Self {
        Self {
            interface_type,
            mode: EthernetMode::Layer3,
            addresses,
            aggregate_group: None,
            comment: None,
        }
    }

    fn ip_list(&self) -> Result<Option<Element>, PayloadError> {
        if self.addresses.is_empty() {
            return Ok(None);
        }
        let mut ip = Element::new("ip");
        for address in &self.addresses {
            if !is_ip_netmask(address) {
                return Err(invalid("interface", "ip", address, "expected an address in CIDR form"));
            }
            ip.children
                .push(Element::new("entry").with_attribute("name", address.as_str()));
        }
        Ok(Some(ip))
    }
}

impl Payload for Interface {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Interface(self.interface_type)
    }

    fn build(&self) -> Result<ConfigFragment, PayloadError> {
        let mut fragment = ConfigFragment::new();
        if self.interface_type.has_units() {
            if self.mode != EthernetMode::Layer3 {
                return Err(invalid(
                    "interface",
                    "mode",
                    self.mode.as_str(),
                    format!("{} interfaces are always layer3", self.interface_type),
                ));
            }
            fragment.elements.extend(self.ip_list()?);
        } else {
            match self.mode {
                EthernetMode::Layer3 => {
                    let mut layer3 = Element::new("layer3");
                    layer3.children.extend(self.ip_list()?);
                    fragment.push(layer3);
                }
                EthernetMode::AggregateGroup => {
                    if self.interface_type != InterfaceType::Ethernet {
                        return Err(invalid(
                            "interface",
                            "mode",
                            "aggregate-group",
                            "only ethernet ports join an aggregate",
                        ));
                    }
                    let group = self.aggregate_group.as_deref().unwrap_or_default();
                    validate_interface_name(InterfaceType::AggregateEthernet, group)?;
                    fragment.push(Element::text_node("aggregate-group", group));
                }
                mode if !self.addresses.is_empty() => {
                    return Err(invalid(
                        "interface",
                        "ip",
                        &self.addresses.join(","),
                        format!("{} interfaces carry no addresses", mode.as_str()),
                    ))
                }
                mode => fragment.push(Element::new(mode.as_str())),
            }
        }
        push_optional_text(&mut fragment, "comment", self.comment.as_deref());
        Ok(fragment)
    }
}

/// Interfaces bound to a virtual router.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualRouter {
    pub interfaces: Vec<String>,
}

impl Payload for VirtualRouter {
    fn kind(&self) -> ObjectKind {
        ObjectKind::VirtualRouter
    }

    fn build(&self) -> Result<ConfigFragment, PayloadError> {
        Ok(ConfigFragment::from(member_list("interface", &self.interfaces)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextHop {
    IpAddress(IpAddr),
    NextVr(String),
    Discard,
}

/// Static route inside a virtual router. Addressed through
/// [`crate::xpath::static_route_path`] rather than an [`ObjectKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticRoute {
    pub destination: String,
    pub interface: Option<String>,
    pub nexthop: Option<NextHop>,
    pub metric: u16,
}

impl StaticRoute {
    pub const DEFAULT_METRIC: u16 = 10;

    pub fn new(destination: impl Into<String>, nexthop: Option<NextHop>) -> Self {
        Self {
            destination: destination.into(),
            interface: None,
            nexthop,
            metric: Self::DEFAULT_METRIC,
        }
    }

    pub fn build(&self) -> Result<ConfigFragment, PayloadError> {
        let destination = self.destination.trim();
        if !(destination.contains('/') && is_ip_netmask(destination)) {
            return Err(invalid(
                "static route",
                "destination",
                destination,
                "expected a prefix such as 0.0.0.0/0",
            ));
        }

        let mut fragment = ConfigFragment::from(Element::text_node("destination", destination));
        if let Some(interface) = self.interface.as_deref() {
            let interface_type = interface_type_of(interface).ok_or_else(|| {
                invalid("static route", "interface", interface, "unrecognized interface")
            })?;
            validate_interface_name(interface_type, interface)?;
            fragment.push(Element::text_node("interface", interface));
        }
        match &self.nexthop {
            Some(NextHop::IpAddress(ip)) => fragment.push(
                Element::new("nexthop").with_child(Element::text_node("ip-address", ip.to_string())),
            ),
            Some(NextHop::NextVr(router)) => {
                validate_object_name("virtual router", router)?;
                fragment.push(
                    Element::new("nexthop").with_child(Element::text_node("next-vr", router.as_str())),
                );
            }
            Some(NextHop::Discard) => {
                fragment.push(Element::new("nexthop").with_child(Element::new("discard")))
            }
            None => {}
        }
        fragment.push(Element::text_node("metric", self.metric.to_string()));
        Ok(fragment)
    }
}

fn interface_type_of(name: &str) -> Option<InterfaceType> {
    [
        ("ethernet", InterfaceType::Ethernet),
        ("ae", InterfaceType::AggregateEthernet),
        ("loopback", InterfaceType::Loopback),
        ("tunnel", InterfaceType::Tunnel),
        ("vlan", InterfaceType::Vlan),
    ]
    .into_iter()
    .find(|(prefix, _)| name.starts_with(prefix))
    .map(|(_, interface_type)| interface_type)
}

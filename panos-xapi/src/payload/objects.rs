use std::net::IpAddr;
use std::str::FromStr;

use serde::Serialize;
use xml_fragment_core::Element;

use super::{
    invalid, member_list, parse_discriminator, push_annotations, push_optional_text, Payload,
    PayloadError,
};
use crate::kind::ObjectKind;
use crate::ConfigFragment;

/// Value encoding of an address object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddressType {
    /// `10.1.1.0/24`, `10.1.1.1`, `2001:db8::/32`
    IpNetmask,
    /// `10.1.1.10-10.1.1.20`
    IpRange,
    /// `updates.example.com`
    Fqdn,
}

const ADDRESS_TYPES: &[&str] = &["ip-netmask", "ip-range", "fqdn"];

impl AddressType {
    pub const ALL: [AddressType; 3] = [AddressType::IpNetmask, AddressType::IpRange, AddressType::Fqdn];

    /// Element carrying the value.
    pub fn element_name(self) -> &'static str {
        match self {
            AddressType::IpNetmask => "ip-netmask",
            AddressType::IpRange => "ip-range",
            AddressType::Fqdn => "fqdn",
        }
    }

    pub fn from_element_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.element_name() == name)
    }

    fn validate(self, value: &str) -> Result<(), PayloadError> {
        let value = value.trim();
        let ok = match self {
            AddressType::IpNetmask => is_ip_netmask(value),
            AddressType::IpRange => value
                .split_once('-')
                .is_some_and(|(start, end)| is_ip(start) && is_ip(end)),
            AddressType::Fqdn => {
                !value.is_empty()
                    && value.len() <= 255
                    && value
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '*'))
            }
        };
        if ok {
            Ok(())
        } else {
            Err(invalid(
                "address",
                self.element_name(),
                value,
                "value does not match the address type",
            ))
        }
    }
}

impl FromStr for AddressType {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_discriminator(
            "address type",
            s,
            &[
                ("ip-netmask", AddressType::IpNetmask),
                ("ip", AddressType::IpNetmask),
                ("ip-range", AddressType::IpRange),
                ("range", AddressType::IpRange),
                ("fqdn", AddressType::Fqdn),
            ],
            ADDRESS_TYPES,
        )
    }
}

fn is_ip(value: &str) -> bool {
    value.trim().parse::<IpAddr>().is_ok()
}

/// An address with an optional prefix length within its family's width.
pub(crate) fn is_ip_netmask(value: &str) -> bool {
    match value.split_once('/') {
        None => is_ip(value),
        Some((ip, prefix)) => match (ip.parse::<IpAddr>(), prefix.parse::<u8>()) {
            (Ok(IpAddr::V4(_)), Ok(bits)) => bits <= 32,
            (Ok(IpAddr::V6(_)), Ok(bits)) => bits <= 128,
            _ => false,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub address_type: AddressType,
    pub value: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

impl Address {
    pub fn new(address_type: AddressType, value: impl Into<String>) -> Self {
        Self {
            address_type,
            value: value.into(),
            description: None,
            tags: Vec::new(),
        }
    }

    /// Build from a textual type discriminator such as `"ip-netmask"`.
    pub fn from_parts(address_type: &str, value: impl Into<String>) -> Result<Self, PayloadError> {
        Ok(Self::new(address_type.parse()?, value))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

impl Payload for Address {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Address
    }

    fn build(&self) -> Result<ConfigFragment, PayloadError> {
        self.address_type.validate(&self.value)?;
        let mut fragment = ConfigFragment::from(Element::text_node(
            self.address_type.element_name(),
            self.value.trim(),
        ));
        push_annotations(&mut fragment, self.description.as_deref(), &self.tags)?;
        Ok(fragment)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupType {
    Static,
    Dynamic,
}

impl FromStr for GroupType {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_discriminator(
            "group type",
            s,
            &[("static", GroupType::Static), ("dynamic", GroupType::Dynamic)],
            &["static", "dynamic"],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupMembership {
    /// Explicit member objects.
    Static(Vec<String>),
    /// Tag-match filter, e.g. `'web' and 'prod'`.
    Dynamic(String),
}

impl GroupMembership {
    /// Build from a discriminator: static groups take every value as a
    /// member, dynamic groups take a single filter expression.
    pub fn from_parts(group_type: &str, values: Vec<String>) -> Result<Self, PayloadError> {
        match group_type.parse()? {
            GroupType::Static => Ok(GroupMembership::Static(values)),
            GroupType::Dynamic => match <[String; 1]>::try_from(values) {
                Ok([filter]) => Ok(GroupMembership::Dynamic(filter)),
                Err(values) => Err(invalid(
                    "address-group",
                    "filter",
                    &values.join(" "),
                    "dynamic groups take exactly one filter expression",
                )),
            },
        }
    }

    pub fn group_type(&self) -> GroupType {
        match self {
            GroupMembership::Static(_) => GroupType::Static,
            GroupMembership::Dynamic(_) => GroupType::Dynamic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressGroup {
    pub membership: GroupMembership,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

impl AddressGroup {
    pub fn new(membership: GroupMembership) -> Self {
        Self {
            membership,
            description: None,
            tags: Vec::new(),
        }
    }
}

impl Payload for AddressGroup {
    fn kind(&self) -> ObjectKind {
        ObjectKind::AddressGroup
    }

    fn build(&self) -> Result<ConfigFragment, PayloadError> {
        let body = match &self.membership {
            GroupMembership::Static(members) => {
                if members.is_empty() {
                    return Err(PayloadError::EmptyMembers {
                        kind: "address-group",
                        field: "member",
                    });
                }
                member_list("static", members)?
            }
            GroupMembership::Dynamic(filter) => {
                let filter = filter.trim();
                if filter.is_empty() {
                    return Err(invalid("address-group", "filter", filter, "empty filter"));
                }
                Element::new("dynamic").with_child(Element::text_node("filter", filter))
            }
        };
        let mut fragment = ConfigFragment::from(body);
        push_annotations(&mut fragment, self.description.as_deref(), &self.tags)?;
        Ok(fragment)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceProtocol {
    Tcp,
    Udp,
}

impl ServiceProtocol {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceProtocol::Tcp => "tcp",
            ServiceProtocol::Udp => "udp",
        }
    }
}

impl FromStr for ServiceProtocol {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_discriminator(
            "service protocol",
            s,
            &[("tcp", ServiceProtocol::Tcp), ("udp", ServiceProtocol::Udp)],
            &["tcp", "udp"],
        )
    }
}

/// Validate `80`, `8080-8090`, `80,443,8000-8100`.
fn validate_port_spec(field: &'static str, spec: &str) -> Result<(), PayloadError> {
    let port = |p: &str| p.trim().parse::<u16>().ok().filter(|n| *n > 0);
    let ok = !spec.trim().is_empty()
        && spec.split(',').all(|item| match item.split_once('-') {
            Some((lo, hi)) => matches!((port(lo), port(hi)), (Some(lo), Some(hi)) if lo <= hi),
            None => port(item).is_some(),
        });
    if ok {
        Ok(())
    } else {
        Err(invalid(
            "service",
            field,
            spec,
            "expected ports 1-65535, ranges or a comma-separated list",
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub protocol: ServiceProtocol,
    pub destination_port: String,
    pub source_port: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

impl Service {
    pub fn new(protocol: ServiceProtocol, destination_port: impl Into<String>) -> Self {
        Self {
            protocol,
            destination_port: destination_port.into(),
            source_port: None,
            description: None,
            tags: Vec::new(),
        }
    }
}

impl Payload for Service {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Service
    }

    fn build(&self) -> Result<ConfigFragment, PayloadError> {
        validate_port_spec("port", &self.destination_port)?;
        let mut proto = Element::new(self.protocol.as_str())
            .with_child(Element::text_node("port", self.destination_port.trim()));
        if let Some(source) = self.source_port.as_deref() {
            validate_port_spec("source-port", source)?;
            proto.children.push(Element::text_node("source-port", source.trim()));
        }

        let mut fragment = ConfigFragment::from(Element::new("protocol").with_child(proto));
        push_annotations(&mut fragment, self.description.as_deref(), &self.tags)?;
        Ok(fragment)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceGroup {
    pub members: Vec<String>,
    pub tags: Vec<String>,
}

impl Payload for ServiceGroup {
    fn kind(&self) -> ObjectKind {
        ObjectKind::ServiceGroup
    }

    fn build(&self) -> Result<ConfigFragment, PayloadError> {
        if self.members.is_empty() {
            return Err(PayloadError::EmptyMembers {
                kind: "service-group",
                field: "member",
            });
        }
        let mut fragment = ConfigFragment::from(member_list("members", &self.members)?);
        push_annotations(&mut fragment, None, &self.tags)?;
        Ok(fragment)
    }
}

/// Tag colors as named in the management UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagColor {
    Red,
    Green,
    Blue,
    Yellow,
    Copper,
    Orange,
    Purple,
    Gray,
    LightGreen,
    Cyan,
    LightGray,
    BlueGray,
    Lime,
    Black,
    Gold,
    Brown,
}

const TAG_COLORS: [(&str, TagColor); 16] = [
    ("red", TagColor::Red),
    ("green", TagColor::Green),
    ("blue", TagColor::Blue),
    ("yellow", TagColor::Yellow),
    ("copper", TagColor::Copper),
    ("orange", TagColor::Orange),
    ("purple", TagColor::Purple),
    ("gray", TagColor::Gray),
    ("light-green", TagColor::LightGreen),
    ("cyan", TagColor::Cyan),
    ("light-gray", TagColor::LightGray),
    ("blue-gray", TagColor::BlueGray),
    ("lime", TagColor::Lime),
    ("black", TagColor::Black),
    ("gold", TagColor::Gold),
    ("brown", TagColor::Brown),
];

const TAG_COLOR_NAMES: &[&str] = &[
    "red", "green", "blue", "yellow", "copper", "orange", "purple", "gray", "light-green", "cyan",
    "light-gray", "blue-gray", "lime", "black", "gold", "brown",
];

impl TagColor {
    /// Device encoding: `color1` through `color16`.
    pub fn code(self) -> String {
        let index = TAG_COLORS
            .iter()
            .position(|(_, color)| *color == self)
            .unwrap_or(0);
        format!("color{}", index + 1)
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let index: usize = code.trim().strip_prefix("color")?.parse().ok()?;
        TAG_COLORS.get(index.checked_sub(1)?).map(|(_, color)| *color)
    }
}

impl FromStr for TagColor {
    type Err = PayloadError;

    /// Accepts UI names (`Light Green`, `light-green`) or device codes (`color9`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(color) = TagColor::from_code(s) {
            return Ok(color);
        }
        let normalized = s.trim().replace([' ', '_'], "-");
        parse_discriminator("tag color", &normalized, &TAG_COLORS, TAG_COLOR_NAMES).map_err(
            |_| PayloadError::InvalidTypeDiscriminator {
                field: "tag color",
                value: s.to_string(),
                expected: TAG_COLOR_NAMES,
            },
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    pub color: Option<TagColor>,
    pub comments: Option<String>,
}

impl Payload for Tag {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Tag
    }

    fn build(&self) -> Result<ConfigFragment, PayloadError> {
        let mut fragment = ConfigFragment::new();
        if let Some(color) = self.color {
            fragment.push(Element::text_node("color", color.code()));
        }
        push_optional_text(&mut fragment, "comments", self.comments.as_deref());
        Ok(fragment)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UrlCategoryType {
    UrlList,
    CategoryMatch,
}

impl UrlCategoryType {
    pub fn as_str(self) -> &'static str {
        match self {
            UrlCategoryType::UrlList => "URL List",
            UrlCategoryType::CategoryMatch => "Category Match",
        }
    }
}

impl FromStr for UrlCategoryType {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_discriminator(
            "url category type",
            &s.trim().replace(' ', "-"),
            &[
                ("url-list", UrlCategoryType::UrlList),
                ("category-match", UrlCategoryType::CategoryMatch),
            ],
            &["url-list", "category-match"],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlCategory {
    pub category_type: UrlCategoryType,
    /// URL patterns, or predefined category names for `CategoryMatch`.
    pub entries: Vec<String>,
    pub description: Option<String>,
}

impl Payload for UrlCategory {
    fn kind(&self) -> ObjectKind {
        ObjectKind::CustomUrlCategory
    }

    fn build(&self) -> Result<ConfigFragment, PayloadError> {
        if self.entries.is_empty() {
            return Err(PayloadError::EmptyMembers {
                kind: "custom-url-category",
                field: "list entry",
            });
        }
        let mut fragment = ConfigFragment::from(member_list("list", &self.entries)?);
        push_optional_text(&mut fragment, "description", self.description.as_deref());
        fragment.push(Element::text_node("type", self.category_type.as_str()));
        Ok(fragment)
    }
}

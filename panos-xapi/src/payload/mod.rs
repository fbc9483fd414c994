//! Element bodies for `set` and `edit` requests.
//!
//! Each builder turns a typed description of one object into the ordered
//! sibling elements the device expects under the object's `entry`. Builders
//! are pure: the same input always yields the same [`ConfigFragment`].
//! Discriminators ("ip-netmask", "static", "tcp", ...) parse through
//! [`std::str::FromStr`] and unknown values fail with
//! [`PayloadError::InvalidTypeDiscriminator`] instead of producing an empty
//! body.

pub mod network;
pub mod objects;
pub mod panorama;
pub mod policy;

use thiserror::Error;
use xml_fragment_core::Element;

use crate::kind::ObjectKind;
use crate::name::{validate_member_text, NameError};
use crate::ConfigFragment;

pub use network::{
    EthernetMode, Interface, NextHop, StaticRoute, VirtualRouter, Zone, ZoneMode,
};
pub use objects::{
    Address, AddressGroup, AddressType, GroupMembership, GroupType, Service, ServiceGroup,
    ServiceProtocol, Tag, TagColor, UrlCategory, UrlCategoryType,
};
pub use panorama::{DeviceGroup, Template};
pub use policy::{ProfileSetting, RuleAction, SecurityProfiles, SecurityRule};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("unrecognized {field} '{value}' (expected one of: {})", .expected.join(", "))]
    InvalidTypeDiscriminator {
        field: &'static str,
        value: String,
        expected: &'static [&'static str],
    },
    #[error("{kind} needs at least one {field}")]
    EmptyMembers {
        kind: &'static str,
        field: &'static str,
    },
    #[error("invalid {field} '{value}' for {kind}: {reason}")]
    InvalidValue {
        kind: &'static str,
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error(transparent)]
    Name(#[from] NameError),
}

/// A typed object body that knows which kind it belongs to.
pub trait Payload {
    fn kind(&self) -> ObjectKind;

    fn build(&self) -> Result<ConfigFragment, PayloadError>;
}

pub(crate) fn invalid(
    kind: &'static str,
    field: &'static str,
    value: &str,
    reason: impl Into<String>,
) -> PayloadError {
    PayloadError::InvalidValue {
        kind,
        field,
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// `<name><member>a</member>...</name>`.
pub(crate) fn member_list(name: &str, members: &[String]) -> Result<Element, PayloadError> {
    let mut list = Element::new(name);
    for member in members {
        validate_member_text(member)?;
        list.children.push(Element::text_node("member", member.as_str()));
    }
    Ok(list)
}

/// Like [`member_list`], with `any` standing in for an empty list.
pub(crate) fn member_list_or_any(name: &str, members: &[String]) -> Result<Element, PayloadError> {
    if members.is_empty() {
        return Ok(Element::new(name).with_child(Element::text_node("member", "any")));
    }
    member_list(name, members)
}

/// Append `description` and `tag` when present, in that order.
pub(crate) fn push_annotations(
    fragment: &mut ConfigFragment,
    description: Option<&str>,
    tags: &[String],
) -> Result<(), PayloadError> {
    push_optional_text(fragment, "description", description);
    if !tags.is_empty() {
        fragment.push(member_list("tag", tags)?);
    }
    Ok(())
}

pub(crate) fn push_optional_text(fragment: &mut ConfigFragment, name: &str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        fragment.push(Element::text_node(name, value));
    }
}

pub(crate) fn parse_discriminator<T: Copy>(
    field: &'static str,
    value: &str,
    table: &[(&str, T)],
    expected: &'static [&'static str],
) -> Result<T, PayloadError> {
    let needle = value.trim().to_ascii_lowercase();
    table
        .iter()
        .find(|(literal, _)| *literal == needle)
        .map(|(_, parsed)| *parsed)
        .ok_or_else(|| PayloadError::InvalidTypeDiscriminator {
            field,
            value: value.to_string(),
            expected,
        })
}

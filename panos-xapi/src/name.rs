//! Naming rules for configuration objects.
//!
//! Every name that ends up inside an XPath predicate passes through one of
//! these checks first, so a resolved path can never contain a stray quote or
//! path separator.

use thiserror::Error;

use crate::kind::InterfaceType;

/// Longest object name the device accepts.
pub const MAX_NAME_LEN: usize = 63;

/// Longest value accepted inside a `member[text()='...']` selector.
pub const MAX_MEMBER_LEN: usize = 255;

/// Rejections raised before any request is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("{what} name must not be empty")]
    Empty { what: &'static str },
    #[error("{what} name '{name}' is {len} characters long; the limit is 63")]
    TooLong {
        what: &'static str,
        name: String,
        len: usize,
    },
    #[error("{what} name '{name}' contains unsupported character {ch:?}")]
    InvalidCharacter {
        what: &'static str,
        name: String,
        ch: char,
    },
    #[error("'{name}' is not a valid {interface} interface name")]
    InvalidInterface {
        interface: InterfaceType,
        name: String,
    },
    #[error("'{0}' is not a valid device serial number")]
    InvalidSerial(String),
    #[error("'{0}' is not a valid element path")]
    InvalidElementPath(String),
    #[error("member value '{0}' cannot be addressed")]
    InvalidMember(String),
    #[error("member value {0:?} is empty or contains control characters")]
    InvalidMemberText(String),
}

/// Which grammar a name is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameRule {
    /// Letters, digits, space, hyphen, underscore; 1..=63 characters.
    Object,
    /// Interface naming for the given interface family.
    Interface(InterfaceType),
    /// Alphanumeric device serial number.
    Serial,
}

impl NameRule {
    pub fn validate(self, what: &'static str, name: &str) -> Result<(), NameError> {
        match self {
            NameRule::Object => validate_object_name(what, name),
            NameRule::Interface(interface) => validate_interface_name(interface, name),
            NameRule::Serial => validate_serial(name),
        }
    }
}

/// Validate a user-defined object name.
pub fn validate_object_name(what: &'static str, name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty { what });
    }
    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(NameError::TooLong {
            what,
            name: name.to_string(),
            len,
        });
    }
    if let Some(ch) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_')))
    {
        return Err(NameError::InvalidCharacter {
            what,
            name: name.to_string(),
            ch,
        });
    }
    Ok(())
}

/// Validate an interface name such as `ethernet1/3`, `ae2` or `tunnel.10`.
pub fn validate_interface_name(interface: InterfaceType, name: &str) -> Result<(), NameError> {
    let valid = match interface {
        InterfaceType::Ethernet => name
            .strip_prefix("ethernet")
            .and_then(|rest| rest.split_once('/'))
            .is_some_and(|(slot, port)| is_number(slot) && is_number(port)),
        InterfaceType::AggregateEthernet => name.strip_prefix("ae").is_some_and(is_number),
        InterfaceType::Loopback => is_unit_name(name, "loopback"),
        InterfaceType::Tunnel => is_unit_name(name, "tunnel"),
        InterfaceType::Vlan => is_unit_name(name, "vlan"),
    };
    if valid {
        Ok(())
    } else {
        Err(NameError::InvalidInterface {
            interface,
            name: name.to_string(),
        })
    }
}

/// Validate a device serial number.
pub fn validate_serial(serial: &str) -> Result<(), NameError> {
    if serial.is_empty()
        || serial.len() > MAX_NAME_LEN
        || !serial.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(NameError::InvalidSerial(serial.to_string()));
    }
    Ok(())
}

/// Validate a relative element path such as `static` or `routing-table/ip/static-route`.
pub fn validate_element_path(path: &str) -> Result<(), NameError> {
    let valid = !path.is_empty()
        && path.split('/').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        });
    if valid {
        Ok(())
    } else {
        Err(NameError::InvalidElementPath(path.to_string()))
    }
}

/// Validate a list member value (object name, URL pattern, zone, ...).
///
/// Member values are looser than object names but may not break out of the
/// single-quoted XPath literal they are placed in.
pub fn validate_member(value: &str) -> Result<(), NameError> {
    if value.trim().is_empty()
        || value.len() > MAX_MEMBER_LEN
        || value.chars().any(|c| c == '\'' || c.is_control())
    {
        return Err(NameError::InvalidMember(value.to_string()));
    }
    Ok(())
}

/// Validate a member value carried in an element body.
///
/// Element text is escaped on the way out, so only blank values, control
/// characters and overlong values are refused.
pub fn validate_member_text(value: &str) -> Result<(), NameError> {
    if value.trim().is_empty() || value.len() > MAX_MEMBER_LEN || value.chars().any(char::is_control) {
        return Err(NameError::InvalidMemberText(value.to_string()));
    }
    Ok(())
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.len() <= 5 && s.chars().all(|c| c.is_ascii_digit())
}

// `loopback`, `loopback.4`
fn is_unit_name(name: &str, family: &str) -> bool {
    match name.strip_prefix(family) {
        Some("") => true,
        Some(rest) => rest.strip_prefix('.').is_some_and(is_number),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_name_at_length_limit() {
        let name = "a".repeat(MAX_NAME_LEN);
        assert!(validate_object_name("address", &name).is_ok());
    }

    #[test]
    fn rejects_name_past_length_limit() {
        let name = "a".repeat(MAX_NAME_LEN + 1);
        let err = validate_object_name("address", &name).expect_err("too long");
        assert!(matches!(err, NameError::TooLong { len: 64, .. }));
    }

    #[test]
    fn rejects_slash_and_quote() {
        for bad in ["web/1", "web'1", "web.1"] {
            let err = validate_object_name("address", bad).expect_err("invalid");
            assert!(matches!(err, NameError::InvalidCharacter { .. }), "{bad}");
        }
    }

    #[test]
    fn accepts_space_hyphen_underscore() {
        assert!(validate_object_name("address", "web server_01-a").is_ok());
    }

    #[test]
    fn rejects_empty_name() {
        assert_eq!(
            validate_object_name("tag", ""),
            Err(NameError::Empty { what: "tag" })
        );
    }

    #[test]
    fn interface_grammar_per_family() {
        assert!(validate_interface_name(InterfaceType::Ethernet, "ethernet1/12").is_ok());
        assert!(validate_interface_name(InterfaceType::Ethernet, "ethernet1").is_err());
        assert!(validate_interface_name(InterfaceType::Ethernet, "ethernet1/1.5").is_err());
        assert!(validate_interface_name(InterfaceType::AggregateEthernet, "ae2").is_ok());
        assert!(validate_interface_name(InterfaceType::Tunnel, "tunnel").is_ok());
        assert!(validate_interface_name(InterfaceType::Tunnel, "tunnel.12").is_ok());
        assert!(validate_interface_name(InterfaceType::Tunnel, "tunnel.").is_err());
        assert!(validate_interface_name(InterfaceType::Vlan, "loopback.1").is_err());
    }

    #[test]
    fn serial_must_be_alphanumeric() {
        assert!(validate_serial("013201001234").is_ok());
        assert!(validate_serial("0132-0100").is_err());
    }

    #[test]
    fn element_paths_are_lowercase_segments() {
        assert!(validate_element_path("routing-table/ip/static-route").is_ok());
        assert!(validate_element_path("static").is_ok());
        assert!(validate_element_path("entry[@name='x']").is_err());
        assert!(validate_element_path("a//b").is_err());
    }

    #[test]
    fn member_values_cannot_contain_quotes() {
        assert!(validate_member("*.example.com/login").is_ok());
        assert!(validate_member("bad'value").is_err());
        assert!(validate_member("  ").is_err());
    }

    #[test]
    fn member_text_allows_quotes() {
        assert!(validate_member_text("O'Brien lab").is_ok());
        assert!(validate_member_text("a < b & c").is_ok());
        assert!(validate_member_text("").is_err());
        assert!(validate_member_text("tab\there").is_err());
        assert!(validate_member_text(&"m".repeat(MAX_MEMBER_LEN + 1)).is_err());
    }
}

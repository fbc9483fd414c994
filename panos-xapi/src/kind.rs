use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::Serialize;

use crate::name::NameRule;

/// Interface families with distinct locations in the network subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterfaceType {
    Ethernet,
    AggregateEthernet,
    Loopback,
    Tunnel,
    Vlan,
}

impl InterfaceType {
    pub fn as_str(self) -> &'static str {
        match self {
            InterfaceType::Ethernet => "ethernet",
            InterfaceType::AggregateEthernet => "aggregate-ethernet",
            InterfaceType::Loopback => "loopback",
            InterfaceType::Tunnel => "tunnel",
            InterfaceType::Vlan => "vlan",
        }
    }

    /// Logical interfaces (`tunnel.N`, `loopback.N`, `vlan.N`) live under `units`.
    pub fn has_units(self) -> bool {
        matches!(
            self,
            InterfaceType::Loopback | InterfaceType::Tunnel | InterfaceType::Vlan
        )
    }
}

impl Display for InterfaceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy rulebases that share the pre/post/local placement rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleType {
    Security,
    Nat,
}

impl RuleType {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleType::Security => "security",
            RuleType::Nat => "nat",
        }
    }
}

/// Every configuration object the resolver can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectKind {
    Address,
    AddressGroup,
    Service,
    ServiceGroup,
    CustomUrlCategory,
    Tag,
    Rule(RuleType),
    Interface(InterfaceType),
    Zone,
    VirtualRouter,
    Vlan,
    VirtualWire,
    IkeGateway,
    IpsecTunnel,
    IkeCryptoProfile,
    IpsecCryptoProfile,
    Template,
    Device,
    DeviceGroup,
}

/// Where a kind of object may live, per management mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// vsys on a firewall; shared or device-group on a manager.
    Shareable,
    /// vsys rulebase on a firewall; pre/post rulebases on a manager.
    Rule,
    /// Firewall network configuration. Undefined on a manager.
    LocalNetwork,
    /// Manager-only configuration. Undefined on a firewall.
    ManagerGlobal,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 24] = [
        ObjectKind::Address,
        ObjectKind::AddressGroup,
        ObjectKind::Service,
        ObjectKind::ServiceGroup,
        ObjectKind::CustomUrlCategory,
        ObjectKind::Tag,
        ObjectKind::Rule(RuleType::Security),
        ObjectKind::Rule(RuleType::Nat),
        ObjectKind::Interface(InterfaceType::Ethernet),
        ObjectKind::Interface(InterfaceType::AggregateEthernet),
        ObjectKind::Interface(InterfaceType::Loopback),
        ObjectKind::Interface(InterfaceType::Tunnel),
        ObjectKind::Interface(InterfaceType::Vlan),
        ObjectKind::Zone,
        ObjectKind::VirtualRouter,
        ObjectKind::Vlan,
        ObjectKind::VirtualWire,
        ObjectKind::IkeGateway,
        ObjectKind::IpsecTunnel,
        ObjectKind::IkeCryptoProfile,
        ObjectKind::IpsecCryptoProfile,
        ObjectKind::Template,
        ObjectKind::Device,
        ObjectKind::DeviceGroup,
    ];

    pub fn placement(self) -> Placement {
        match self {
            ObjectKind::Address
            | ObjectKind::AddressGroup
            | ObjectKind::Service
            | ObjectKind::ServiceGroup
            | ObjectKind::CustomUrlCategory
            | ObjectKind::Tag => Placement::Shareable,
            ObjectKind::Rule(_) => Placement::Rule,
            ObjectKind::Interface(_)
            | ObjectKind::Zone
            | ObjectKind::VirtualRouter
            | ObjectKind::Vlan
            | ObjectKind::VirtualWire
            | ObjectKind::IkeGateway
            | ObjectKind::IpsecTunnel
            | ObjectKind::IkeCryptoProfile
            | ObjectKind::IpsecCryptoProfile => Placement::LocalNetwork,
            ObjectKind::Template | ObjectKind::Device | ObjectKind::DeviceGroup => {
                Placement::ManagerGlobal
            }
        }
    }

    pub fn is_local_only(self) -> bool {
        self.placement() == Placement::LocalNetwork
    }

    pub fn name_rule(self) -> NameRule {
        match self {
            ObjectKind::Interface(interface) => NameRule::Interface(interface),
            ObjectKind::Device => NameRule::Serial,
            _ => NameRule::Object,
        }
    }

    /// Stable kebab-case label, also accepted by [`FromStr`].
    pub fn label(self) -> &'static str {
        match self {
            ObjectKind::Address => "address",
            ObjectKind::AddressGroup => "address-group",
            ObjectKind::Service => "service",
            ObjectKind::ServiceGroup => "service-group",
            ObjectKind::CustomUrlCategory => "custom-url-category",
            ObjectKind::Tag => "tag",
            ObjectKind::Rule(RuleType::Security) => "security-rule",
            ObjectKind::Rule(RuleType::Nat) => "nat-rule",
            ObjectKind::Interface(InterfaceType::Ethernet) => "ethernet-interface",
            ObjectKind::Interface(InterfaceType::AggregateEthernet) => "aggregate-interface",
            ObjectKind::Interface(InterfaceType::Loopback) => "loopback-interface",
            ObjectKind::Interface(InterfaceType::Tunnel) => "tunnel-interface",
            ObjectKind::Interface(InterfaceType::Vlan) => "vlan-interface",
            ObjectKind::Zone => "zone",
            ObjectKind::VirtualRouter => "virtual-router",
            ObjectKind::Vlan => "vlan",
            ObjectKind::VirtualWire => "virtual-wire",
            ObjectKind::IkeGateway => "ike-gateway",
            ObjectKind::IpsecTunnel => "ipsec-tunnel",
            ObjectKind::IkeCryptoProfile => "ike-crypto-profile",
            ObjectKind::IpsecCryptoProfile => "ipsec-crypto-profile",
            ObjectKind::Template => "template",
            ObjectKind::Device => "device",
            ObjectKind::DeviceGroup => "device-group",
        }
    }

    /// Container element(s) below the vsys, shared or device-group root.
    pub(crate) fn object_segment(self) -> Option<&'static str> {
        match self {
            ObjectKind::Address => Some("address"),
            ObjectKind::AddressGroup => Some("address-group"),
            ObjectKind::Service => Some("service"),
            ObjectKind::ServiceGroup => Some("service-group"),
            ObjectKind::CustomUrlCategory => Some("profiles/custom-url-category"),
            ObjectKind::Tag => Some("tag"),
            _ => None,
        }
    }

    /// Container element(s) below the device root for firewall network config.
    pub(crate) fn network_segment(self) -> Option<&'static str> {
        match self {
            ObjectKind::Interface(InterfaceType::Ethernet) => Some("network/interface/ethernet"),
            ObjectKind::Interface(InterfaceType::AggregateEthernet) => {
                Some("network/interface/aggregate-ethernet")
            }
            ObjectKind::Interface(InterfaceType::Loopback) => {
                Some("network/interface/loopback/units")
            }
            ObjectKind::Interface(InterfaceType::Tunnel) => Some("network/interface/tunnel/units"),
            ObjectKind::Interface(InterfaceType::Vlan) => Some("network/interface/vlan/units"),
            ObjectKind::VirtualRouter => Some("network/virtual-router"),
            ObjectKind::Vlan => Some("network/vlan"),
            ObjectKind::VirtualWire => Some("network/virtual-wire"),
            ObjectKind::IkeGateway => Some("network/ike/gateway"),
            ObjectKind::IpsecTunnel => Some("network/tunnel/ipsec"),
            ObjectKind::IkeCryptoProfile => Some("network/ike/crypto-profiles/ike-crypto-profiles"),
            ObjectKind::IpsecCryptoProfile => {
                Some("network/ike/crypto-profiles/ipsec-crypto-profiles")
            }
            _ => None,
        }
    }
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ObjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        ObjectKind::ALL
            .into_iter()
            .find(|kind| kind.label() == needle)
            .ok_or_else(|| {
                let known: Vec<&str> = ObjectKind::ALL.iter().map(|k| k.label()).collect();
                format!("unknown object kind '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{ObjectKind, Placement};

    #[test]
    fn labels_parse_back_to_kinds() {
        for kind in ObjectKind::ALL {
            assert_eq!(kind.label().parse::<ObjectKind>(), Ok(kind));
        }
    }

    #[test]
    fn every_kind_has_a_container_source() {
        for kind in ObjectKind::ALL {
            let has_segment = match kind.placement() {
                Placement::Shareable => kind.object_segment().is_some(),
                Placement::LocalNetwork => {
                    kind.network_segment().is_some() || kind == ObjectKind::Zone
                }
                Placement::Rule | Placement::ManagerGlobal => true,
            };
            assert!(has_segment, "{kind} has no container");
        }
    }

    #[test]
    fn unknown_label_lists_choices() {
        let err = "firewall".parse::<ObjectKind>().expect_err("unknown");
        assert!(err.contains("security-rule"));
    }
}

use std::net::{IpAddr, Ipv6Addr};

use panos_xapi::kind::InterfaceType;
use panos_xapi::payload::{
    Address, AddressGroup, AddressType, DeviceGroup, EthernetMode, GroupMembership, Interface,
    NextHop, Payload, PayloadError, ProfileSetting, RuleAction, SecurityRule, Service,
    ServiceGroup, ServiceProtocol, StaticRoute, Tag, TagColor, Template, UrlCategory,
    UrlCategoryType, VirtualRouter, Zone, ZoneMode,
};
use panos_xapi::ConfigFragment;
use proptest::prelude::*;
use xml_fragment_core::parse_forest;

/// Build twice, compare, then send the body through the parser.
fn stable_on_the_wire(
    build: impl Fn() -> Result<ConfigFragment, PayloadError>,
) -> Result<ConfigFragment, TestCaseError> {
    let first = build().map_err(|e| TestCaseError::fail(e.to_string()))?;
    let second = build().map_err(|e| TestCaseError::fail(e.to_string()))?;
    prop_assert_eq!(&first, &second);
    let parsed = parse_forest(first.to_string().as_bytes())
        .map_err(|e| TestCaseError::fail(e.to_string()))?;
    prop_assert_eq!(&parsed, &first);
    Ok(first)
}

fn ipv4_prefix() -> impl Strategy<Value = String> {
    (any::<[u8; 4]>(), 0u8..=32)
        .prop_map(|(o, bits)| format!("{}.{}.{}.{}/{bits}", o[0], o[1], o[2], o[3]))
}

fn names() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-z][a-z0-9-]{0,10}", 0..4)
}

fn member_names() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-z][a-z0-9-]{0,10}", 1..4)
}

fn description() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[A-Za-z0-9<>&'\" ]{0,40}")
}

fn ipv6_prefix() -> impl Strategy<Value = String> {
    (any::<[u16; 8]>(), 0u8..=128).prop_map(|(s, bits)| {
        let ip = Ipv6Addr::new(s[0], s[1], s[2], s[3], s[4], s[5], s[6], s[7]);
        format!("{ip}/{bits}")
    })
}

fn any_prefix() -> impl Strategy<Value = String> {
    prop_oneof![ipv4_prefix(), ipv6_prefix()]
}

fn ethernet_ports() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec((1u8..=8, 1u8..=48), 0..4).prop_map(|ports| {
        ports
            .into_iter()
            .map(|(slot, port)| format!("ethernet{slot}/{port}"))
            .collect()
    })
}

fn tag_color() -> impl Strategy<Value = Option<TagColor>> {
    proptest::option::of((1u8..=16).prop_filter_map("color code", |n| {
        TagColor::from_code(&format!("color{n}"))
    }))
}

fn nexthop() -> impl Strategy<Value = Option<NextHop>> {
    proptest::option::of(prop_oneof![
        any::<IpAddr>().prop_map(NextHop::IpAddress),
        "vr-[a-z0-9]{1,6}".prop_map(NextHop::NextVr),
        Just(NextHop::Discard),
    ])
}

proptest! {
    #[test]
    fn address_build_is_pure(
        value in ipv4_prefix(),
        description in description(),
        tags in names(),
    ) {
        let mut address = Address::new(AddressType::IpNetmask, value).with_tags(tags);
        if let Some(description) = description {
            address = address.with_description(description);
        }
        let first = address.build().map_err(|e| TestCaseError::fail(e.to_string()))?;
        let second = address.build().map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(first, second);
    }

    #[test]
    fn address_fragment_survives_the_wire(
        value in ipv4_prefix(),
        description in description(),
        tags in names(),
    ) {
        let mut address = Address::new(AddressType::IpNetmask, value).with_tags(tags);
        if let Some(description) = description {
            address = address.with_description(description);
        }
        let fragment = address.build().map_err(|e| TestCaseError::fail(e.to_string()))?;
        let parsed = parse_forest(fragment.to_string().as_bytes())
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(parsed, fragment);
    }

    #[test]
    fn service_ports_in_range_build(port in 1u32..=65535, upper in 0u32..1000) {
        let spec = match port.checked_add(upper) {
            Some(end) if upper > 0 && end <= 65535 => format!("{port}-{end}"),
            _ => port.to_string(),
        };
        let fragment = Service::new(ServiceProtocol::Tcp, spec.clone())
            .build()
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let proto = &fragment.elements[0];
        prop_assert_eq!(proto.get_text(&["tcp", "port"]), Some(spec.as_str()));
    }

    #[test]
    fn service_port_zero_is_rejected(
        protocol in prop_oneof![Just(ServiceProtocol::Tcp), Just(ServiceProtocol::Udp)],
    ) {
        prop_assert!(Service::new(protocol, "0").build().is_err());
    }

    #[test]
    fn rule_lists_always_render(
        from in names(),
        to in names(),
        sources in names(),
    ) {
        let mut rule = SecurityRule::new(RuleAction::Allow).zones(from.clone(), to);
        rule.sources = sources.clone();
        let fragment = rule.build().map_err(|e| TestCaseError::fail(e.to_string()))?;

        let names: Vec<&str> = fragment.iter().map(|e| e.name.as_str()).collect();
        prop_assert_eq!(&names[..9], &[
            "from", "to", "source", "destination", "source-user",
            "category", "application", "service", "action",
        ]);

        let expected_from = if from.is_empty() { vec!["any".to_string()] } else { from };
        prop_assert_eq!(fragment.elements[0].members(), expected_from);
        let expected_sources = if sources.is_empty() { vec!["any".to_string()] } else { sources };
        prop_assert_eq!(fragment.elements[2].members(), expected_sources);
    }

    #[test]
    fn static_group_is_stable(members in member_names(), description in description(), tags in names()) {
        let mut group = AddressGroup::new(GroupMembership::Static(members.clone()));
        group.description = description;
        group.tags = tags;
        let fragment = stable_on_the_wire(|| group.build())?;
        prop_assert_eq!(fragment.elements[0].members(), members);
    }

    #[test]
    fn dynamic_group_keeps_its_filter(
        filter in "'[a-z]{1,8}'( (and|or) '[a-z]{1,8}'){0,2}",
        tags in names(),
    ) {
        let mut group = AddressGroup::new(GroupMembership::Dynamic(filter.clone()));
        group.tags = tags;
        let fragment = stable_on_the_wire(|| group.build())?;
        prop_assert_eq!(fragment.elements[0].get_text(&["filter"]), Some(filter.as_str()));
    }

    #[test]
    fn service_with_source_port_is_stable(
        protocol in prop_oneof![Just(ServiceProtocol::Tcp), Just(ServiceProtocol::Udp)],
        port in 1u16..=65535,
        source in proptest::option::of(1u16..=65535),
        description in description(),
        tags in names(),
    ) {
        let mut service = Service::new(protocol, port.to_string());
        service.source_port = source.map(|p| p.to_string());
        service.description = description;
        service.tags = tags;
        let fragment = stable_on_the_wire(|| service.build())?;
        let proto = &fragment.elements[0].children[0];
        prop_assert_eq!(proto.name.as_str(), protocol.as_str());
        prop_assert_eq!(proto.children.len(), 1 + usize::from(source.is_some()));
    }

    #[test]
    fn service_group_is_stable(members in member_names(), tags in names()) {
        let group = ServiceGroup { members: members.clone(), tags };
        let fragment = stable_on_the_wire(|| group.build())?;
        prop_assert_eq!(fragment.elements[0].members(), members);
    }

    #[test]
    fn tag_is_stable(color in tag_color(), comments in description()) {
        let tag = Tag { color, comments };
        let fragment = stable_on_the_wire(|| tag.build())?;
        let code = fragment.elements.first().and_then(|e| e.text.as_deref());
        if let Some(color) = color {
            prop_assert_eq!(code.and_then(TagColor::from_code), Some(color));
        }
    }

    #[test]
    fn url_category_ends_with_type(
        entries in proptest::collection::vec("(\\*\\.)?[a-z]{1,10}\\.example\\.com(/[a-z]{1,6})?", 1..5),
        category_type in prop_oneof![
            Just(UrlCategoryType::UrlList),
            Just(UrlCategoryType::CategoryMatch),
        ],
        description in description(),
    ) {
        let category = UrlCategory { category_type, entries: entries.clone(), description };
        let fragment = stable_on_the_wire(|| category.build())?;
        prop_assert_eq!(fragment.elements[0].members(), entries);
        let last = fragment.elements.last().map(|e| (e.name.as_str(), e.text.as_deref()));
        prop_assert_eq!(last, Some(("type", Some(category_type.as_str()))));
    }

    #[test]
    fn full_rule_is_stable(
        from in names(),
        to in names(),
        applications in names(),
        action in prop_oneof![
            Just(RuleAction::Allow),
            Just(RuleAction::Deny),
            Just(RuleAction::Drop),
            Just(RuleAction::ResetBoth),
        ],
        group in proptest::option::of("[a-z][a-z0-9-]{0,10}"),
        tags in names(),
        description in description(),
        disabled in any::<bool>(),
    ) {
        let mut rule = SecurityRule::new(action).zones(from, to);
        rule.applications = applications;
        rule.profile_setting = group.map(ProfileSetting::Group);
        rule.tags = tags;
        rule.description = description;
        rule.disabled = disabled;
        let fragment = stable_on_the_wire(|| rule.build())?;
        prop_assert_eq!(fragment.elements[8].text.as_deref(), Some(action.as_str()));
        prop_assert_eq!(
            fragment.elements.last().map(|e| e.name == "disabled"),
            Some(disabled)
        );
    }

    #[test]
    fn zone_is_stable(
        mode in prop_oneof![
            Just(ZoneMode::Layer3),
            Just(ZoneMode::Layer2),
            Just(ZoneMode::VirtualWire),
            Just(ZoneMode::Tap),
            Just(ZoneMode::Tunnel),
        ],
        interfaces in ethernet_ports(),
        user_id in any::<bool>(),
    ) {
        let interfaces = if mode == ZoneMode::Tunnel { Vec::new() } else { interfaces };
        let mut zone = Zone::new(mode, interfaces.clone());
        zone.enable_user_identification = user_id;
        let fragment = stable_on_the_wire(|| zone.build())?;
        let body = &fragment.elements[0].children[0];
        prop_assert_eq!(body.name.as_str(), mode.as_str());
        prop_assert_eq!(body.members(), interfaces);
    }

    #[test]
    fn layer3_interface_is_stable(
        interface_type in prop_oneof![
            Just(InterfaceType::Ethernet),
            Just(InterfaceType::AggregateEthernet),
            Just(InterfaceType::Loopback),
            Just(InterfaceType::Tunnel),
            Just(InterfaceType::Vlan),
        ],
        addresses in proptest::collection::vec(any_prefix(), 0..3),
        comment in description(),
    ) {
        let mut interface = Interface::layer3(interface_type, addresses);
        interface.comment = comment;
        stable_on_the_wire(|| interface.build())?;
    }

    #[test]
    fn non_layer3_ports_are_stable(
        mode in prop_oneof![
            Just(EthernetMode::Layer2),
            Just(EthernetMode::VirtualWire),
            Just(EthernetMode::Tap),
            Just(EthernetMode::Ha),
        ],
    ) {
        let mut interface = Interface::layer3(InterfaceType::Ethernet, Vec::new());
        interface.mode = mode;
        let fragment = stable_on_the_wire(|| interface.build())?;
        prop_assert_eq!(fragment.elements[0].name.as_str(), mode.as_str());
    }

    #[test]
    fn aggregate_member_is_stable(group in 1u8..=16) {
        let mut interface = Interface::layer3(InterfaceType::Ethernet, Vec::new());
        interface.mode = EthernetMode::AggregateGroup;
        interface.aggregate_group = Some(format!("ae{group}"));
        let fragment = stable_on_the_wire(|| interface.build())?;
        let expected = format!("ae{group}");
        prop_assert_eq!(fragment.elements[0].text.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn virtual_router_is_stable(interfaces in ethernet_ports()) {
        let router = VirtualRouter { interfaces: interfaces.clone() };
        let fragment = stable_on_the_wire(|| router.build())?;
        prop_assert_eq!(fragment.elements[0].members(), interfaces);
    }

    #[test]
    fn static_route_is_stable(
        destination in any_prefix(),
        nexthop in nexthop(),
        interface in proptest::option::of((1u8..=8, 1u8..=48)),
        metric in any::<u16>(),
    ) {
        let mut route = StaticRoute::new(destination.clone(), nexthop);
        route.interface = interface.map(|(slot, port)| format!("ethernet{slot}/{port}"));
        route.metric = metric;
        let fragment = stable_on_the_wire(|| route.build())?;
        prop_assert_eq!(fragment.elements[0].text.as_deref(), Some(destination.as_str()));
        let metric = metric.to_string();
        prop_assert_eq!(
            fragment.elements.last().and_then(|e| e.text.as_deref()),
            Some(metric.as_str())
        );
    }

    #[test]
    fn device_group_is_stable(
        devices in proptest::collection::vec("[0-9]{12}", 0..4),
        description in description(),
    ) {
        let group = DeviceGroup { description, devices };
        stable_on_the_wire(|| group.build())?;
    }

    #[test]
    fn template_is_stable(vsys in 1u8..=9, description in description()) {
        let template = Template { description, default_vsys: format!("vsys{vsys}") };
        let fragment = stable_on_the_wire(|| template.build())?;
        let expected = format!("vsys{vsys}");
        prop_assert_eq!(
            fragment
                .iter()
                .find(|e| e.name == "settings")
                .and_then(|e| e.get_text(&["default-vsys"])),
            Some(expected.as_str())
        );
    }
}

use panos_xapi::kind::{ObjectKind, Placement};
use panos_xapi::name::NameError;
use panos_xapi::outcome::{classify, Category, Outcome};
use panos_xapi::payload::{Address, Payload};
use panos_xapi::scope::{ObjectScope, RoutingError, RulebasePhase, ScopeOptions};
use panos_xapi::session::{ManagementMode, Secret, SessionContext, SessionSnapshot};
use panos_xapi::xpath::{locate, resolve, scope_for};
use panos_xapi::Error;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const DEVICE: &str = "/config/devices/entry[@name='localhost.localdomain']";

#[test]
fn scenario_standalone_address() {
    let snapshot = SessionSnapshot::standalone();
    let path = locate(
        &snapshot,
        ObjectKind::Address,
        &ScopeOptions::default(),
        "web1",
    )
    .expect("resolve");
    assert_eq!(
        path.as_str(),
        format!("{DEVICE}/vsys/entry[@name='vsys1']/address/entry[@name='web1']")
    );

    let fragment = Address::from_parts("ip-netmask", "10.1.1.1/32")
        .and_then(|a| a.build())
        .expect("build");
    assert_eq!(fragment.to_string(), "<ip-netmask>10.1.1.1/32</ip-netmask>");
}

#[test]
fn scenario_manager_device_group() {
    let path = locate(
        &SessionSnapshot::manager(false),
        ObjectKind::Address,
        &ScopeOptions::device_group("DG1"),
        "web1",
    )
    .expect("resolve");
    assert_eq!(
        path.as_str(),
        format!("{DEVICE}/device-group/entry[@name='DG1']/address/entry[@name='web1']")
    );
}

#[test]
fn scenario_manager_shared() {
    let path = locate(
        &SessionSnapshot::manager(true),
        ObjectKind::Address,
        &ScopeOptions::default(),
        "web1",
    )
    .expect("resolve");
    assert_eq!(path.as_str(), "/config/shared/address/entry[@name='web1']");
}

#[test]
fn scenario_interface_on_manager() {
    for options in [
        ScopeOptions::default(),
        ScopeOptions::shared(),
        ScopeOptions::device_group("DG1"),
    ] {
        let err = locate(
            &SessionSnapshot::manager(false),
            ObjectKind::Interface(panos_xapi::kind::InterfaceType::Ethernet),
            &options,
            "ethernet1/1",
        )
        .expect_err("interfaces are firewall-local");
        assert!(
            matches!(
                err,
                Error::Routing(RoutingError::UnsupportedScopeForMode {
                    mode: ManagementMode::CentralizedManager,
                    ..
                })
            ),
            "{err:?}"
        );
    }
}

#[test]
fn scenario_object_not_present() {
    match classify("7", "") {
        Outcome::Recoverable { category, message } => {
            assert_eq!(category, Category::NotFound);
            assert!(message.starts_with("Object not present"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn missing_device_group_on_manager() {
    let err = locate(
        &SessionSnapshot::manager(false),
        ObjectKind::Service,
        &ScopeOptions::default(),
        "tcp-8443",
    )
    .expect_err("no placement");
    assert!(matches!(
        err,
        Error::Routing(RoutingError::MissingDeviceGroup {
            kind: ObjectKind::Service
        })
    ));
}

#[test]
fn name_length_boundary() {
    let snapshot = SessionSnapshot::standalone();
    let ok = "a".repeat(63);
    assert!(locate(&snapshot, ObjectKind::Tag, &ScopeOptions::default(), &ok).is_ok());

    let long = "a".repeat(64);
    let err = locate(&snapshot, ObjectKind::Tag, &ScopeOptions::default(), &long)
        .expect_err("too long");
    assert!(matches!(
        err,
        Error::Validation(NameError::TooLong { len: 64, .. })
    ));

    let err = locate(&snapshot, ObjectKind::Tag, &ScopeOptions::default(), "a/b")
        .expect_err("slash");
    assert!(matches!(
        err,
        Error::Validation(NameError::InvalidCharacter { ch: '/', .. })
    ));
}

#[test]
fn routing_errors_take_precedence_over_name_errors() {
    let err = locate(
        &SessionSnapshot::manager(false),
        ObjectKind::Zone,
        &ScopeOptions::default(),
        "bad'name",
    )
    .expect_err("zone on manager");
    assert!(matches!(err, Error::Routing(_)));
}

#[test]
fn snapshot_isolates_in_flight_operations() {
    let mut session = SessionContext::new(ManagementMode::CentralizedManager, Secret::new("k"));
    let before = session.snapshot();
    session.set_prefer_shared(true).expect("manager");

    let options = ScopeOptions::device_group("DG1");
    let old = locate(&before, ObjectKind::Address, &options, "web1").expect("resolve");
    let new = locate(&session.snapshot(), ObjectKind::Address, &options, "web1").expect("resolve");
    assert!(old.as_str().contains("device-group"));
    assert_eq!(new.as_str(), "/config/shared/address/entry[@name='web1']");
}

#[test]
fn vsys_selection_changes_root() {
    let session = SessionContext::new(ManagementMode::Standalone, Secret::default())
        .with_vsys("vsys3")
        .expect("vsys");
    let path = locate(
        &session.snapshot(),
        ObjectKind::Address,
        &ScopeOptions::default(),
        "web1",
    )
    .expect("resolve");
    assert!(path.as_str().contains("/vsys/entry[@name='vsys3']/address/"));
}

#[test]
fn explicit_scope_resolution() {
    let snapshot = SessionSnapshot::manager(false);
    let path = resolve(
        &snapshot,
        ObjectKind::Rule(panos_xapi::kind::RuleType::Security),
        &ObjectScope::Rulebase {
            device_group: None,
            phase: RulebasePhase::Post,
        },
        "deny-all",
    )
    .expect("resolve");
    assert_eq!(
        path.as_str(),
        "/config/shared/post-rulebase/security/rules/entry[@name='deny-all']"
    );
}

fn snapshots() -> impl Strategy<Value = SessionSnapshot> {
    prop_oneof![
        Just(SessionSnapshot::standalone()),
        any::<bool>().prop_map(SessionSnapshot::manager),
    ]
}

fn kinds() -> impl Strategy<Value = ObjectKind> {
    proptest::sample::select(ObjectKind::ALL.to_vec())
}

fn kinds_placed(placements: &'static [Placement]) -> impl Strategy<Value = ObjectKind> {
    let kinds: Vec<ObjectKind> = ObjectKind::ALL
        .into_iter()
        .filter(|kind| placements.contains(&kind.placement()))
        .collect();
    proptest::sample::select(kinds)
}

fn options() -> impl Strategy<Value = ScopeOptions> {
    (
        proptest::option::of("[A-Z][A-Za-z0-9]{0,8}"),
        any::<bool>(),
        proptest::option::of(prop_oneof![
            Just(RulebasePhase::Pre),
            Just(RulebasePhase::Post),
            Just(RulebasePhase::Local),
        ]),
    )
        .prop_map(|(device_group, shared, phase)| ScopeOptions {
            device_group,
            shared,
            phase,
        })
}

proptest! {
    #[test]
    fn resolution_is_deterministic(
        snapshot in snapshots(),
        kind in kinds(),
        options in options(),
        name in "[a-z][a-z0-9-]{0,20}",
    ) {
        let first = locate(&snapshot, kind, &options, &name).map_err(|e| e.to_string());
        let second = locate(&snapshot, kind, &options, &name).map_err(|e| e.to_string());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn local_only_kinds_never_resolve_on_a_manager(
        prefer_shared in any::<bool>(),
        kind in kinds_placed(&[Placement::LocalNetwork]),
        options in options(),
    ) {
        let snapshot = SessionSnapshot::manager(prefer_shared);
        let is_unsupported = matches!(
            scope_for(&snapshot, kind, &options),
            Err(RoutingError::UnsupportedScopeForMode { .. })
        );
        prop_assert!(is_unsupported);
    }

    #[test]
    fn manager_without_group_or_shared_is_missing_group(
        kind in kinds_placed(&[Placement::Shareable, Placement::Rule]),
        phase in proptest::option::of(Just(RulebasePhase::Pre)),
    ) {
        let options = ScopeOptions { device_group: None, shared: false, phase };
        let is_missing = matches!(
            scope_for(&SessionSnapshot::manager(false), kind, &options),
            Err(RoutingError::MissingDeviceGroup { .. })
        );
        prop_assert!(is_missing);
    }

    #[test]
    fn shared_placement_never_mentions_a_device_group(
        kind in kinds_placed(&[Placement::Shareable]),
        group in "[A-Z][a-z0-9]{0,8}",
        name in "[a-z][a-z0-9]{0,12}",
    ) {
        let path = locate(
            &SessionSnapshot::manager(true),
            kind,
            &ScopeOptions::device_group(group),
            &name,
        );
        let path = path.map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(path.as_str().starts_with("/config/shared/"));
        prop_assert!(!path.as_str().contains("device-group"));
    }

    #[test]
    fn explicit_scopes_obey_the_shared_preference(
        kind in kinds_placed(&[Placement::Shareable]),
        group in "[A-Z][a-z0-9]{0,8}",
        name in "[a-z][a-z0-9]{0,12}",
    ) {
        let snapshot = SessionSnapshot::manager(true);
        let via_options = locate(&snapshot, kind, &ScopeOptions::device_group(group.clone()), &name)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let via_scope = resolve(&snapshot, kind, &ObjectScope::DeviceGroup(group), &name)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(via_scope, via_options);
    }
}

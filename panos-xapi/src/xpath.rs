//! Configuration address resolution.
//!
//! Maps (object kind, placement, session snapshot, name) to the XPath of the
//! object in the device configuration tree. Everything here is pure: no I/O
//! and no session mutation.
//!
//! Decision order:
//!
//! 1. Firewall-local network kinds are rejected on a manager.
//! 2. On a firewall, objects live under the vsys (or the device network
//!    subtree); asking for a device group or shared placement is rejected.
//! 3. On a manager, shared placement (per call or session preference) wins
//!    over any device group argument.
//! 4. Otherwise the device group is used.
//! 5. No device group and not shared is [`RoutingError::MissingDeviceGroup`].
//! 6. Rules always need an explicit rulebase phase.

use std::fmt::{self, Display, Formatter};

use serde::Serialize;
use tracing::debug;

use crate::kind::{ObjectKind, Placement};
use crate::name::{validate_element_path, validate_member, validate_object_name, NameError};
use crate::scope::{ObjectScope, RoutingError, RulebasePhase, ScopeOptions};
use crate::session::{ManagementMode, SessionSnapshot};
use crate::Result;

const DEVICE_ROOT: &str = "/config/devices/entry[@name='localhost.localdomain']";
const SHARED_ROOT: &str = "/config/shared";
const MANAGED_DEVICES: &str = "/config/mgt-config/devices";

/// An XPath into the configuration tree. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AddressPath(String);

impl AddressPath {
    fn from_root(root: impl Into<String>) -> Self {
        Self(root.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append element segment(s), e.g. `static` or `routing-table/ip/static-route`.
    pub fn child(&self, elements: &str) -> Result<AddressPath, NameError> {
        validate_element_path(elements)?;
        Ok(self.join(elements))
    }

    /// Select `entry[@name='...']` below this path.
    ///
    /// The name is only checked against the member grammar here; kind-specific
    /// naming rules are applied by the resolver.
    pub fn entry(&self, name: &str) -> Result<AddressPath, NameError> {
        validate_member(name)?;
        Ok(self.join(&format!("entry[@name='{name}']")))
    }

    /// Select one `member` of a list, for incremental removal.
    pub fn member(&self, value: &str) -> Result<AddressPath, NameError> {
        validate_member(value)?;
        Ok(self.join(&format!("member[text()='{value}']")))
    }

    /// The enclosing container, or `None` at the document root.
    ///
    /// Separators inside quoted predicates (`ethernet1/1`) are not split on.
    pub fn parent(&self) -> Option<AddressPath> {
        let mut in_quote = false;
        let mut last_separator = None;
        for (idx, ch) in self.0.char_indices() {
            match ch {
                '\'' => in_quote = !in_quote,
                '/' if !in_quote => last_separator = Some(idx),
                _ => {}
            }
        }
        match last_separator {
            Some(idx) if idx > 0 => Some(Self(self.0[..idx].to_string())),
            _ => None,
        }
    }

    fn join(&self, segment: &str) -> AddressPath {
        Self(format!("{}/{}", self.0, segment))
    }
}

impl Display for AddressPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AddressPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Compute the placement of `kind` from session state and caller options.
pub fn scope_for(
    snapshot: &SessionSnapshot,
    kind: ObjectKind,
    options: &ScopeOptions,
) -> Result<ObjectScope, RoutingError> {
    let mode = snapshot.mode();
    match (kind.placement(), mode) {
        (Placement::LocalNetwork, ManagementMode::CentralizedManager) => {
            Err(RoutingError::unsupported(kind, "any scope", mode))
        }
        (Placement::ManagerGlobal, ManagementMode::Standalone) => {
            Err(RoutingError::unsupported(kind, "any scope", mode))
        }
        (_, ManagementMode::Standalone) => standalone_scope(kind, options),
        (Placement::ManagerGlobal, ManagementMode::CentralizedManager) => {
            manager_global_scope(kind, options)
        }
        (_, ManagementMode::CentralizedManager) => manager_scope(snapshot, kind, options),
    }
}

fn standalone_scope(kind: ObjectKind, options: &ScopeOptions) -> Result<ObjectScope, RoutingError> {
    let mode = ManagementMode::Standalone;
    if let Some(group) = &options.device_group {
        return Err(RoutingError::unsupported(
            kind,
            ObjectScope::DeviceGroup(group.clone()),
            mode,
        ));
    }
    if options.shared {
        return Err(RoutingError::unsupported(kind, ObjectScope::Shared, mode));
    }
    match (kind.placement(), options.phase) {
        (Placement::Rule, Some(RulebasePhase::Local)) => Ok(ObjectScope::Rulebase {
            device_group: None,
            phase: RulebasePhase::Local,
        }),
        (Placement::Rule, Some(phase)) => Err(RoutingError::unsupported(
            kind,
            format!("{phase} rulebase"),
            mode,
        )),
        (Placement::Rule, None) => Err(RoutingError::MissingRulebasePhase { kind }),
        (_, Some(phase)) => Err(RoutingError::unsupported(
            kind,
            format!("{phase} rulebase"),
            mode,
        )),
        (_, None) => Ok(ObjectScope::Local),
    }
}

fn manager_scope(
    snapshot: &SessionSnapshot,
    kind: ObjectKind,
    options: &ScopeOptions,
) -> Result<ObjectScope, RoutingError> {
    let mode = ManagementMode::CentralizedManager;
    let device_group = if options.shared || snapshot.prefer_shared() {
        None
    } else {
        match &options.device_group {
            Some(group) => Some(group.clone()),
            None => return Err(RoutingError::MissingDeviceGroup { kind }),
        }
    };

    match (kind.placement(), options.phase) {
        (Placement::Rule, None) => Err(RoutingError::MissingRulebasePhase { kind }),
        (Placement::Rule, Some(RulebasePhase::Local)) => {
            Err(RoutingError::unsupported(kind, "local rulebase", mode))
        }
        (Placement::Rule, Some(phase)) => Ok(ObjectScope::Rulebase {
            device_group,
            phase,
        }),
        (_, Some(phase)) => Err(RoutingError::unsupported(
            kind,
            format!("{phase} rulebase"),
            mode,
        )),
        (_, None) => Ok(match device_group {
            Some(group) => ObjectScope::DeviceGroup(group),
            None => ObjectScope::Shared,
        }),
    }
}

// Templates, device groups and managed devices ignore the shared preference:
// they have exactly one home on the manager.
fn manager_global_scope(
    kind: ObjectKind,
    options: &ScopeOptions,
) -> Result<ObjectScope, RoutingError> {
    let mode = ManagementMode::CentralizedManager;
    if options.shared {
        return Err(RoutingError::unsupported(kind, ObjectScope::Shared, mode));
    }
    if let Some(phase) = options.phase {
        return Err(RoutingError::unsupported(
            kind,
            format!("{phase} rulebase"),
            mode,
        ));
    }
    match (&options.device_group, kind) {
        (Some(group), ObjectKind::Device) => Ok(ObjectScope::DeviceGroup(group.clone())),
        (Some(group), _) => Err(RoutingError::unsupported(
            kind,
            ObjectScope::DeviceGroup(group.clone()),
            mode,
        )),
        (None, _) => Ok(ObjectScope::Local),
    }
}

/// Path of the container holding every `kind` object in `scope`.
///
/// On a manager the session's shared preference wins over a device group
/// given in `scope`, as it does in [`scope_for`].
pub fn resolve_container(
    snapshot: &SessionSnapshot,
    kind: ObjectKind,
    scope: &ObjectScope,
) -> Result<AddressPath> {
    let mode = snapshot.mode();
    let scope = manager_placement(snapshot, kind, scope)?;
    let scope = &scope;
    let unsupported = || RoutingError::unsupported(kind, scope, mode);

    let path = match (kind.placement(), mode, scope) {
        (Placement::LocalNetwork, ManagementMode::CentralizedManager, _)
        | (Placement::ManagerGlobal, ManagementMode::Standalone, _) => {
            return Err(unsupported().into())
        }
        (Placement::LocalNetwork, ManagementMode::Standalone, ObjectScope::Local) => {
            match kind.network_segment() {
                Some(segment) => AddressPath::from_root(DEVICE_ROOT).child(segment)?,
                None => vsys_root(snapshot)?.child("zone")?,
            }
        }
        (Placement::Shareable, ManagementMode::Standalone, ObjectScope::Local) => {
            vsys_root(snapshot)?.child(object_segment(kind)?)?
        }
        (Placement::Shareable, ManagementMode::CentralizedManager, ObjectScope::Shared) => {
            AddressPath::from_root(SHARED_ROOT).child(object_segment(kind)?)?
        }
        (
            Placement::Shareable,
            ManagementMode::CentralizedManager,
            ObjectScope::DeviceGroup(group),
        ) => device_group_root(group)?.child(object_segment(kind)?)?,
        (
            Placement::Rule,
            ManagementMode::Standalone,
            ObjectScope::Rulebase {
                device_group: None,
                phase: RulebasePhase::Local,
            },
        ) => vsys_root(snapshot)?.child(&format!("rulebase/{}/rules", rule_type(kind)))?,
        (
            Placement::Rule,
            ManagementMode::CentralizedManager,
            ObjectScope::Rulebase { device_group, phase },
        ) if *phase != RulebasePhase::Local => {
            let root = match device_group {
                Some(group) => device_group_root(group)?,
                None => AddressPath::from_root(SHARED_ROOT),
            };
            root.child(&format!("{phase}-rulebase/{}/rules", rule_type(kind)))?
        }
        (Placement::Rule, _, ObjectScope::Rulebase { .. }) => return Err(unsupported().into()),
        (Placement::Rule, _, _) => return Err(RoutingError::MissingRulebasePhase { kind }.into()),
        (Placement::ManagerGlobal, ManagementMode::CentralizedManager, ObjectScope::Local) => {
            match kind {
                ObjectKind::Template => AddressPath::from_root(DEVICE_ROOT).child("template")?,
                ObjectKind::DeviceGroup => {
                    AddressPath::from_root(DEVICE_ROOT).child("device-group")?
                }
                _ => AddressPath::from_root(MANAGED_DEVICES),
            }
        }
        (
            Placement::ManagerGlobal,
            ManagementMode::CentralizedManager,
            ObjectScope::DeviceGroup(group),
        ) if kind == ObjectKind::Device => device_group_root(group)?.child("devices")?,
        _ => return Err(unsupported().into()),
    };
    Ok(path)
}

// An explicit scope on a manager still obeys the session: a shared preference
// replaces any device group, and a shareable object with no placement needs one.
fn manager_placement(
    snapshot: &SessionSnapshot,
    kind: ObjectKind,
    scope: &ObjectScope,
) -> Result<ObjectScope, RoutingError> {
    if snapshot.mode() != ManagementMode::CentralizedManager {
        return Ok(scope.clone());
    }
    let prefer_shared = snapshot.prefer_shared();
    match (kind.placement(), scope) {
        (Placement::Shareable, ObjectScope::Local | ObjectScope::DeviceGroup(_)) if prefer_shared => {
            Ok(ObjectScope::Shared)
        }
        (Placement::Shareable, ObjectScope::Local) => Err(RoutingError::MissingDeviceGroup { kind }),
        (
            Placement::Rule,
            ObjectScope::Rulebase {
                device_group: Some(_),
                phase,
            },
        ) if prefer_shared => Ok(ObjectScope::Rulebase {
            device_group: None,
            phase: *phase,
        }),
        _ => Ok(scope.clone()),
    }
}

/// Path of the object `name` of `kind` in `scope`.
pub fn resolve(
    snapshot: &SessionSnapshot,
    kind: ObjectKind,
    scope: &ObjectScope,
    name: &str,
) -> Result<AddressPath> {
    let container = resolve_container(snapshot, kind, scope)?;
    kind.name_rule().validate(kind.label(), name)?;
    let path = container.entry(name)?;
    debug!(%kind, %scope, xpath = %path, "resolved configuration address");
    Ok(path)
}

/// [`scope_for`] followed by [`resolve`].
pub fn locate(
    snapshot: &SessionSnapshot,
    kind: ObjectKind,
    options: &ScopeOptions,
    name: &str,
) -> Result<AddressPath> {
    let scope = scope_for(snapshot, kind, options)?;
    resolve(snapshot, kind, &scope, name)
}

/// [`scope_for`] followed by [`resolve_container`].
pub fn locate_container(
    snapshot: &SessionSnapshot,
    kind: ObjectKind,
    options: &ScopeOptions,
) -> Result<AddressPath> {
    let scope = scope_for(snapshot, kind, options)?;
    resolve_container(snapshot, kind, &scope)
}

/// Path of a static route inside a virtual router.
pub fn static_route_path(
    snapshot: &SessionSnapshot,
    virtual_router: &str,
    route: &str,
) -> Result<AddressPath> {
    let router = locate(
        snapshot,
        ObjectKind::VirtualRouter,
        &ScopeOptions::default(),
        virtual_router,
    )?;
    validate_object_name("static route", route)?;
    Ok(router.child("routing-table/ip/static-route")?.entry(route)?)
}

fn vsys_root(snapshot: &SessionSnapshot) -> Result<AddressPath, NameError> {
    validate_object_name("vsys", snapshot.vsys())?;
    AddressPath::from_root(DEVICE_ROOT)
        .child("vsys")?
        .entry(snapshot.vsys())
}

fn device_group_root(group: &str) -> Result<AddressPath, NameError> {
    validate_object_name("device group", group)?;
    AddressPath::from_root(DEVICE_ROOT)
        .child("device-group")?
        .entry(group)
}

fn object_segment(kind: ObjectKind) -> Result<&'static str, RoutingError> {
    kind.object_segment().ok_or(RoutingError::UnsupportedScopeForMode {
        kind,
        scope: "object scope".to_string(),
        mode: ManagementMode::Standalone,
    })
}

fn rule_type(kind: ObjectKind) -> &'static str {
    match kind {
        ObjectKind::Rule(rule) => rule.as_str(),
        _ => "security",
    }
}

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::kind::ObjectKind;
use crate::session::ManagementMode;

/// Which rulebase of a scope a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RulebasePhase {
    /// Evaluated before device-local rules (manager only).
    Pre,
    /// Evaluated after device-local rules (manager only).
    Post,
    /// The firewall's own rulebase.
    Local,
}

impl RulebasePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            RulebasePhase::Pre => "pre",
            RulebasePhase::Post => "post",
            RulebasePhase::Local => "local",
        }
    }
}

impl Display for RulebasePhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RulebasePhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pre" | "pre-rulebase" => Ok(RulebasePhase::Pre),
            "post" | "post-rulebase" => Ok(RulebasePhase::Post),
            "local" | "rulebase" => Ok(RulebasePhase::Local),
            other => Err(format!("unknown rulebase phase '{other}' (expected pre, post or local)")),
        }
    }
}

/// A resolved placement, computed fresh for every call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectScope {
    /// The device's own configuration: a firewall vsys, or a manager's own objects.
    Local,
    /// Manager-wide shared configuration.
    Shared,
    DeviceGroup(String),
    /// A rulebase; `device_group: None` is the shared rulebase on a manager
    /// or the vsys rulebase on a firewall.
    Rulebase {
        device_group: Option<String>,
        phase: RulebasePhase,
    },
}

impl Display for ObjectScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ObjectScope::Local => f.write_str("local"),
            ObjectScope::Shared => f.write_str("shared"),
            ObjectScope::DeviceGroup(name) => write!(f, "device-group '{name}'"),
            ObjectScope::Rulebase {
                device_group: Some(name),
                phase,
            } => write!(f, "{phase} rulebase of device-group '{name}'"),
            ObjectScope::Rulebase {
                device_group: None,
                phase,
            } => write!(f, "{phase} rulebase"),
        }
    }
}

/// Caller-supplied placement hints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeOptions {
    pub device_group: Option<String>,
    /// Request shared placement for this call only.
    pub shared: bool,
    pub phase: Option<RulebasePhase>,
}

impl ScopeOptions {
    pub fn device_group(name: impl Into<String>) -> Self {
        Self {
            device_group: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn shared() -> Self {
        Self {
            shared: true,
            ..Self::default()
        }
    }

    pub fn with_phase(mut self, phase: RulebasePhase) -> Self {
        self.phase = Some(phase);
        self
    }
}

/// Placement failures detected before any request is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("{kind} objects cannot be placed in {scope} on a {mode} device")]
    UnsupportedScopeForMode {
        kind: ObjectKind,
        scope: String,
        mode: ManagementMode,
    },
    #[error("{kind} objects on a panorama device need a device group or shared placement")]
    MissingDeviceGroup { kind: ObjectKind },
    #[error("{kind} placement needs an explicit rulebase phase (pre, post or local)")]
    MissingRulebasePhase { kind: ObjectKind },
}

impl RoutingError {
    pub(crate) fn unsupported(
        kind: ObjectKind,
        scope: impl Display,
        mode: ManagementMode,
    ) -> Self {
        RoutingError::UnsupportedScopeForMode {
            kind,
            scope: scope.to_string(),
            mode,
        }
    }
}

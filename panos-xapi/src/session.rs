//! Per-connection session state.
//!
//! [`SessionContext`] is the only mutable state in the crate. Routing never
//! reads it directly: each operation takes a [`SessionSnapshot`] up front, so a
//! shared-mode toggle cannot change where an operation already underway is
//! sent. The context itself is not synchronized; callers that share one
//! connection across threads serialize access or hand out snapshots.

use std::fmt::{self, Debug, Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::name::{validate_object_name, NameError};

/// Default virtual system on a single-vsys firewall.
pub const DEFAULT_VSYS: &str = "vsys1";

/// How the connected device is managed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManagementMode {
    /// A firewall configured directly.
    Standalone,
    /// A Panorama manager holding shared and device-group configuration.
    #[serde(alias = "panorama")]
    CentralizedManager,
}

impl Display for ManagementMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ManagementMode::Standalone => f.write_str("standalone"),
            ManagementMode::CentralizedManager => f.write_str("panorama"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("shared placement is only available on a centralized manager (session is {0})")]
    SharedRequiresManager(ManagementMode),
    #[error("invalid vsys: {0}")]
    Vsys(#[from] NameError),
}

/// A credential that never appears in `Debug` output or logs.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Debug for Secret {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone)]
pub struct SessionContext {
    mode: ManagementMode,
    centralized_peer_detected: bool,
    prefer_shared: bool,
    credential_key: Secret,
    vsys: String,
}

impl SessionContext {
    pub fn new(mode: ManagementMode, credential_key: Secret) -> Self {
        Self {
            mode,
            centralized_peer_detected: false,
            prefer_shared: false,
            credential_key,
            vsys: DEFAULT_VSYS.to_string(),
        }
    }

    /// Target a different virtual system on a multi-vsys firewall.
    pub fn with_vsys(mut self, vsys: impl Into<String>) -> Result<Self, SessionError> {
        let vsys = vsys.into();
        validate_object_name("vsys", &vsys)?;
        self.vsys = vsys;
        Ok(self)
    }

    pub fn mode(&self) -> ManagementMode {
        self.mode
    }

    /// Whether a firewall reported an active connection to a manager.
    pub fn is_centralized_peer_detected(&self) -> bool {
        self.centralized_peer_detected
    }

    pub fn prefer_shared(&self) -> bool {
        self.prefer_shared
    }

    pub fn credential_key(&self) -> &Secret {
        &self.credential_key
    }

    pub fn vsys(&self) -> &str {
        &self.vsys
    }

    /// Toggle shared placement for subsequent operations.
    ///
    /// Operations already holding a snapshot are unaffected.
    pub fn set_prefer_shared(&mut self, prefer_shared: bool) -> Result<(), SessionError> {
        if prefer_shared && self.mode != ManagementMode::CentralizedManager {
            return Err(SessionError::SharedRequiresManager(self.mode));
        }
        self.prefer_shared = prefer_shared;
        Ok(())
    }

    /// Reclassify the session after probing the device.
    ///
    /// Dropping to standalone clears any shared preference, keeping the
    /// `prefer_shared => CentralizedManager` invariant.
    pub(crate) fn set_mode(&mut self, mode: ManagementMode) {
        self.mode = mode;
        if mode == ManagementMode::Standalone {
            self.prefer_shared = false;
        }
    }

    pub(crate) fn set_centralized_peer_detected(&mut self, detected: bool) {
        self.centralized_peer_detected = detected;
    }

    pub(crate) fn set_credential_key(&mut self, key: Secret) {
        self.credential_key = key;
    }

    /// Immutable copy of everything routing depends on.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            mode: self.mode,
            prefer_shared: self.prefer_shared,
            vsys: self.vsys.clone(),
        }
    }
}

/// Routing view of a session at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    mode: ManagementMode,
    prefer_shared: bool,
    vsys: String,
}

impl SessionSnapshot {
    pub fn standalone() -> Self {
        Self {
            mode: ManagementMode::Standalone,
            prefer_shared: false,
            vsys: DEFAULT_VSYS.to_string(),
        }
    }

    pub fn manager(prefer_shared: bool) -> Self {
        Self {
            mode: ManagementMode::CentralizedManager,
            prefer_shared,
            vsys: DEFAULT_VSYS.to_string(),
        }
    }

    pub fn mode(&self) -> ManagementMode {
        self.mode
    }

    pub fn prefer_shared(&self) -> bool {
        self.prefer_shared
    }

    pub fn vsys(&self) -> &str {
        &self.vsys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_toggle_requires_manager() {
        let mut session = SessionContext::new(ManagementMode::Standalone, Secret::new("k"));
        assert_eq!(
            session.set_prefer_shared(true),
            Err(SessionError::SharedRequiresManager(ManagementMode::Standalone))
        );
        assert!(session.set_prefer_shared(false).is_ok());
        assert!(!session.prefer_shared());
    }

    #[test]
    fn snapshot_is_not_affected_by_later_toggle() {
        let mut session =
            SessionContext::new(ManagementMode::CentralizedManager, Secret::new("k"));
        let before = session.snapshot();
        session.set_prefer_shared(true).expect("manager allows shared");

        assert!(!before.prefer_shared());
        assert!(session.snapshot().prefer_shared());
    }

    #[test]
    fn downgrade_to_standalone_clears_shared() {
        let mut session =
            SessionContext::new(ManagementMode::CentralizedManager, Secret::new("k"));
        session.set_prefer_shared(true).expect("manager allows shared");
        session.set_mode(ManagementMode::Standalone);
        assert!(!session.prefer_shared());
    }

    #[test]
    fn debug_output_redacts_key() {
        let session = SessionContext::new(ManagementMode::Standalone, Secret::new("LUFRPT1"));
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("LUFRPT1"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn vsys_name_is_validated() {
        let session = SessionContext::new(ManagementMode::Standalone, Secret::default());
        assert!(session.clone().with_vsys("vsys2").is_ok());
        assert!(matches!(
            session.with_vsys("vsys/2"),
            Err(SessionError::Vsys(_))
        ));
    }
}

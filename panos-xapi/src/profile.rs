//! Connection profiles.
//!
//! ```toml
//! host = "fw01.example.net"
//! username = "admin"          # password from PANOS_PASSWORD when omitted
//! # api_key = "LUFRPT..."
//! mode = "panorama"           # skip detection
//! device_group = "branch"
//! shared = false
//! vsys = "vsys2"
//! verify_tls = true
//! timeout_secs = 30
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::client::Client;
use crate::scope::ScopeOptions;
use crate::session::{ManagementMode, Secret, SessionContext};
use crate::transport::{api_endpoint, HttpOptions, HttpTransport};
use crate::Result;

/// Environment variable consulted when a profile names a user but no password.
pub const PASSWORD_ENV: &str = "PANOS_PASSWORD";

#[derive(Debug, Error)]
pub enum ProfileLoadError {
    #[error("failed to read profile {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse profile {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("profile {path} has no api_key, and no password for user '{user}' (set PANOS_PASSWORD)")]
    MissingCredentials { path: String, user: String },
    #[error("profile {path} needs either api_key or username")]
    NoIdentity { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionProfile {
    pub host: String,
    #[serde(default)]
    pub api_key: Option<Secret>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<Secret>,
    #[serde(default)]
    pub mode: Option<ManagementMode>,
    #[serde(default)]
    pub device_group: Option<String>,
    #[serde(default)]
    pub shared: bool,
    #[serde(default)]
    pub vsys: Option<String>,
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(skip)]
    source: String,
}

fn default_verify_tls() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

/// How the profile authenticates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    ApiKey(Secret),
    Password { user: String, password: Secret },
}

pub fn load_profile(path: &Path) -> Result<ConnectionProfile, ProfileLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| ProfileLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_profile(&raw, path.display().to_string())
}

pub fn parse_profile(raw: &str, path: String) -> Result<ConnectionProfile, ProfileLoadError> {
    let mut profile: ConnectionProfile =
        toml::from_str(raw).map_err(|source| ProfileLoadError::Parse {
            path: path.clone(),
            source,
        })?;
    profile.source = path;
    Ok(profile)
}

impl ConnectionProfile {
    /// Credentials, taking the password from [`PASSWORD_ENV`] when the
    /// profile has none.
    pub fn credentials(&self) -> Result<Credentials, ProfileLoadError> {
        self.credentials_with(|name| std::env::var(name).ok())
    }

    pub fn credentials_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Credentials, ProfileLoadError> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Ok(Credentials::ApiKey(key.clone()));
        }
        let Some(user) = self.username.clone() else {
            return Err(ProfileLoadError::NoIdentity {
                path: self.source.clone(),
            });
        };
        let password = self
            .password
            .clone()
            .filter(|p| !p.is_empty())
            .or_else(|| env(PASSWORD_ENV).filter(|p| !p.is_empty()).map(Secret::new));
        match password {
            Some(password) => Ok(Credentials::Password { user, password }),
            None => Err(ProfileLoadError::MissingCredentials {
                path: self.source.clone(),
                user,
            }),
        }
    }

    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            verify_tls: self.verify_tls,
        }
    }

    /// Placement defaults for operations run with this profile.
    pub fn scope_options(&self) -> ScopeOptions {
        ScopeOptions {
            device_group: self.device_group.clone(),
            shared: self.shared,
            phase: None,
        }
    }
}

/// Open an HTTPS session as described by `profile`.
///
/// The mode is detected from the device unless the profile pins it.
pub fn connect(profile: &ConnectionProfile) -> Result<Client<HttpTransport>> {
    let endpoint = api_endpoint(&profile.host)?;
    let transport = HttpTransport::new(profile.http_options())?;
    let credentials = profile.credentials()?;

    let mode = profile.mode.unwrap_or(ManagementMode::Standalone);
    let key = match &credentials {
        Credentials::ApiKey(key) => key.clone(),
        Credentials::Password { .. } => Secret::default(),
    };
    let mut client = Client::new(transport, endpoint, SessionContext::new(mode, key));
    if let Credentials::Password { user, password } = credentials {
        client.authenticate(&user, password)?;
    }
    if profile.mode.is_none() {
        client.detect_mode()?;
    }
    if let Some(vsys) = profile.vsys.as_deref() {
        client.select_vsys(vsys)?;
    }
    Ok(client)
}

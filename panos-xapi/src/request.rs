//! Typed XML API requests.
//!
//! A request is a list of key/value query parameters. Nothing here is
//! string-concatenated into a URL: [`ApiRequest::url`] hands the pairs to
//! [`url::Url`] which does the encoding.

use std::fmt::{self, Display, Formatter};

use serde::Serialize;
use url::Url;
use xml_fragment_core::Element;

use crate::name::{validate_member, NameError};
use crate::session::Secret;
use crate::xpath::AddressPath;
use crate::ConfigFragment;

const REDACTED: &str = "***";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestType {
    Config,
    Op,
    Commit,
    Keygen,
}

impl RequestType {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestType::Config => "config",
            RequestType::Op => "op",
            RequestType::Commit => "commit",
            RequestType::Keygen => "keygen",
        }
    }
}

/// Configuration actions (`type=config&action=...`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Candidate configuration.
    Get,
    /// Running configuration.
    Show,
    /// Merge an element into the addressed node.
    Set,
    /// Replace the addressed node.
    Edit,
    Delete,
    Rename,
    Move,
    Clone,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Get => "get",
            Action::Show => "show",
            Action::Set => "set",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Rename => "rename",
            Action::Move => "move",
            Action::Clone => "clone",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target position for a `move`, mostly used to reorder rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovePosition {
    Top,
    Bottom,
    Before(String),
    After(String),
}

impl MovePosition {
    fn params(&self) -> Result<Vec<(&'static str, String)>, NameError> {
        Ok(match self {
            MovePosition::Top => vec![("where", "top".to_string())],
            MovePosition::Bottom => vec![("where", "bottom".to_string())],
            MovePosition::Before(other) => {
                validate_member(other)?;
                vec![("where", "before".to_string()), ("dst", other.clone())]
            }
            MovePosition::After(other) => {
                validate_member(other)?;
                vec![("where", "after".to_string()), ("dst", other.clone())]
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    request_type: RequestType,
    action: Option<Action>,
    params: Vec<(&'static str, String)>,
    element: Option<String>,
    password: Option<Secret>,
}

impl ApiRequest {
    fn new(request_type: RequestType, action: Option<Action>) -> Self {
        Self {
            request_type,
            action,
            params: Vec::new(),
            element: None,
            password: None,
        }
    }

    /// A configuration action at `xpath`.
    pub fn config(action: Action, xpath: &AddressPath) -> Self {
        Self::new(RequestType::Config, Some(action)).with_param("xpath", xpath.as_str())
    }

    pub fn rename(xpath: &AddressPath, new_name: &str) -> Self {
        Self::config(Action::Rename, xpath).with_param("newname", new_name)
    }

    pub fn move_to(xpath: &AddressPath, position: &MovePosition) -> Result<Self, NameError> {
        let mut request = Self::config(Action::Move, xpath);
        request.params.extend(position.params()?);
        Ok(request)
    }

    /// Copy `source` to a sibling named `new_name`.
    pub fn clone_of(container: &AddressPath, source: &AddressPath, new_name: &str) -> Self {
        Self::config(Action::Clone, container)
            .with_param("from", source.as_str())
            .with_param("newname", new_name)
    }

    /// An operational command, e.g. `<show><system><info/></system></show>`.
    pub fn op(command: &Element) -> Self {
        Self::new(RequestType::Op, None).with_param("cmd", command.to_string())
    }

    pub fn commit(command: &Element) -> Self {
        Self::new(RequestType::Commit, None).with_param("cmd", command.to_string())
    }

    /// Panorama `commit-all`, pushing to managed devices.
    pub fn commit_all(command: &Element) -> Self {
        Self::commit(command).with_param("action", "all")
    }

    pub fn keygen(user: &str, password: Secret) -> Self {
        let mut request = Self::new(RequestType::Keygen, None).with_param("user", user);
        request.password = Some(password);
        request
    }

    pub fn with_param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.push((key, value.into()));
        self
    }

    pub fn with_element(mut self, element: &ConfigFragment) -> Self {
        self.element = Some(element.to_string());
        self
    }

    pub fn request_type(&self) -> RequestType {
        self.request_type
    }

    pub fn action(&self) -> Option<Action> {
        self.action
    }

    pub fn element(&self) -> Option<&str> {
        self.element.as_deref()
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Element bodies and credentials never travel in a query string.
    pub fn method(&self) -> Method {
        if self.element.is_some() || self.password.is_some() {
            Method::Post
        } else {
            Method::Get
        }
    }

    /// Every parameter in send order, including the API key.
    pub fn query_pairs(&self, key: &Secret) -> Vec<(String, String)> {
        self.pairs(Some(key.expose()), false)
    }

    pub fn url(&self, endpoint: &Url, key: &Secret) -> Url {
        with_pairs(endpoint, self.query_pairs(key))
    }

    /// The request URL with the key and password masked, for logs and output.
    pub fn redacted_url(&self, endpoint: &Url) -> Url {
        with_pairs(endpoint, self.pairs(Some(REDACTED), true))
    }

    fn pairs(&self, key: Option<&str>, redact: bool) -> Vec<(String, String)> {
        let mut pairs = vec![("type".to_string(), self.request_type.as_str().to_string())];
        if let Some(action) = self.action {
            pairs.push(("action".to_string(), action.as_str().to_string()));
        }
        pairs.extend(
            self.params
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone())),
        );
        if let Some(element) = &self.element {
            pairs.push(("element".to_string(), element.clone()));
        }
        match (&self.password, key) {
            (Some(password), _) => {
                let password = if redact { REDACTED } else { password.expose() };
                pairs.push(("password".to_string(), password.to_string()));
            }
            (None, Some(key)) if !key.is_empty() => {
                pairs.push(("key".to_string(), key.to_string()));
            }
            (None, _) => {}
        }
        pairs
    }
}

fn with_pairs(endpoint: &Url, pairs: Vec<(String, String)>) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut().clear().extend_pairs(pairs);
    url
}

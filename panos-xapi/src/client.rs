//! Blocking API client.
//!
//! Every operation takes a [`SessionSnapshot`](crate::session::SessionSnapshot)
//! before resolving its address, so toggling shared placement only affects
//! operations started afterwards.

use tracing::{debug, warn};
use url::Url;
use xml_fragment_core::Element;

use crate::detect::{
    detect_mode, panorama_status_command, peer_connected, system_info_command, ModeDetection,
};
use crate::kind::ObjectKind;
use crate::name::{validate_member_text, validate_object_name};
use crate::outcome::Category;
use crate::payload::{Payload, StaticRoute};
use crate::records::{FromEntry, SystemInfo};
use crate::request::{Action, ApiRequest, MovePosition};
use crate::response::ApiResponse;
use crate::scope::{RoutingError, ScopeOptions};
use crate::session::{ManagementMode, Secret, SessionContext};
use crate::transport::Transport;
use crate::xpath::{locate, locate_container, static_route_path, AddressPath};
use crate::{ConfigFragment, Error, Result};

/// Options for [`Client::commit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitOptions {
    pub description: Option<String>,
    /// On a manager, push the committed configuration to this device group.
    pub push_device_group: Option<String>,
}

#[derive(Debug)]
pub struct Client<T> {
    transport: T,
    endpoint: Url,
    session: SessionContext,
}

impl<T: Transport> Client<T> {
    /// Wrap an existing session, e.g. one built from a stored API key and a
    /// known mode.
    pub fn new(transport: T, endpoint: Url, session: SessionContext) -> Self {
        Self {
            transport,
            endpoint,
            session,
        }
    }

    /// Generate an API key for `user`, then probe the device to set the mode.
    pub fn login(transport: T, endpoint: Url, user: &str, password: Secret) -> Result<Self> {
        let session = SessionContext::new(ManagementMode::Standalone, Secret::default());
        let mut client = Self::new(transport, endpoint, session);
        client.authenticate(user, password)?;
        client.detect_mode()?;
        Ok(client)
    }

    /// Exchange a username and password for an API key and keep it in the
    /// session.
    pub fn authenticate(&mut self, user: &str, password: Secret) -> Result<()> {
        let response = self.execute(&ApiRequest::keygen(user, password))?;
        let key = response.require_text(&["key"])?.to_string();
        self.session.set_credential_key(Secret::new(key));
        debug!(user, "generated API key");
        Ok(())
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn set_prefer_shared(&mut self, prefer_shared: bool) -> Result<()> {
        Ok(self.session.set_prefer_shared(prefer_shared)?)
    }

    pub fn select_vsys(&mut self, vsys: &str) -> Result<()> {
        self.session = self.session.clone().with_vsys(vsys)?;
        Ok(())
    }

    /// Query system info and reclassify the session.
    ///
    /// On a firewall the manager connection status is also probed; a failure
    /// there is logged and treated as "not connected".
    pub fn detect_mode(&mut self) -> Result<ModeDetection> {
        let response = self.op(&system_info_command())?;
        let info = SystemInfo::from_response(&response)?;
        let detection = detect_mode(&info);
        self.session.set_mode(detection.mode);

        let peer = match detection.mode {
            ManagementMode::CentralizedManager => false,
            ManagementMode::Standalone => match self.op(&panorama_status_command()) {
                Ok(status) => status.result_text().is_some_and(peer_connected),
                Err(err) => {
                    warn!(error = %err, "could not read manager connection status");
                    false
                }
            },
        };
        self.session.set_centralized_peer_detected(peer);
        debug!(mode = %detection.mode, model = %info.model, peer, "detected management mode");
        Ok(detection)
    }

    /// Send a request and classify the response.
    pub fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        debug!(
            method = %request.method(),
            url = %request.redacted_url(&self.endpoint),
            "api request"
        );
        let query = request.query_pairs(self.session.credential_key());
        let body = self
            .transport
            .send(request.method(), &self.endpoint, &query)?;
        ApiResponse::decode(&body)?.into_result()
    }

    /// Candidate configuration of one object.
    pub fn get(&self, kind: ObjectKind, options: &ScopeOptions, name: &str) -> Result<ApiResponse> {
        let snapshot = self.session.snapshot();
        let path = locate(&snapshot, kind, options, name)?;
        self.execute(&ApiRequest::config(Action::Get, &path))
    }

    /// Running configuration of one object.
    pub fn show(&self, kind: ObjectKind, options: &ScopeOptions, name: &str) -> Result<ApiResponse> {
        let snapshot = self.session.snapshot();
        let path = locate(&snapshot, kind, options, name)?;
        self.execute(&ApiRequest::config(Action::Show, &path))
    }

    /// Every object of `R`'s kind in the resolved container. An absent
    /// container is an empty list.
    pub fn list<R: FromEntry>(&self, options: &ScopeOptions) -> Result<Vec<R>> {
        let snapshot = self.session.snapshot();
        let path = locate_container(&snapshot, R::KIND, options)?;
        match self.execute(&ApiRequest::config(Action::Get, &path)) {
            Ok(response) => Ok(R::from_response(&response)?),
            Err(err) if err.category() == Some(Category::NotFound) => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    /// One typed object.
    pub fn fetch<R: FromEntry>(&self, options: &ScopeOptions, name: &str) -> Result<R> {
        let response = self.get(R::KIND, options, name)?;
        R::from_response(&response)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Semantic {
                category: Category::NotFound,
                code: response.code().map(str::to_string),
                description: format!("{} '{name}' is not present", R::KIND),
                detail: String::new(),
            })
    }

    /// `set` the payload under the object's entry, creating or merging.
    pub fn create<P: Payload>(
        &self,
        payload: &P,
        options: &ScopeOptions,
        name: &str,
    ) -> Result<AddressPath> {
        let snapshot = self.session.snapshot();
        let path = locate(&snapshot, payload.kind(), options, name)?;
        let fragment = payload.build()?;
        self.execute(&ApiRequest::config(Action::Set, &path).with_element(&fragment))?;
        Ok(path)
    }

    /// `edit` the object, replacing it wholesale.
    pub fn replace<P: Payload>(
        &self,
        payload: &P,
        options: &ScopeOptions,
        name: &str,
    ) -> Result<AddressPath> {
        let snapshot = self.session.snapshot();
        let path = locate(&snapshot, payload.kind(), options, name)?;
        let entry = payload
            .build()?
            .wrap(Element::new("entry").with_attribute("name", name));
        let fragment = ConfigFragment::from(entry);
        self.execute(&ApiRequest::config(Action::Edit, &path).with_element(&fragment))?;
        Ok(path)
    }

    pub fn delete(&self, kind: ObjectKind, options: &ScopeOptions, name: &str) -> Result<()> {
        let snapshot = self.session.snapshot();
        let path = locate(&snapshot, kind, options, name)?;
        self.execute(&ApiRequest::config(Action::Delete, &path))?;
        Ok(())
    }

    pub fn rename(
        &self,
        kind: ObjectKind,
        options: &ScopeOptions,
        name: &str,
        new_name: &str,
    ) -> Result<AddressPath> {
        let snapshot = self.session.snapshot();
        let path = locate(&snapshot, kind, options, name)?;
        let renamed = locate(&snapshot, kind, options, new_name)?;
        self.execute(&ApiRequest::rename(&path, new_name))?;
        Ok(renamed)
    }

    /// Reorder an object, usually a rule, within its container.
    pub fn move_object(
        &self,
        kind: ObjectKind,
        options: &ScopeOptions,
        name: &str,
        position: &MovePosition,
    ) -> Result<()> {
        let snapshot = self.session.snapshot();
        let path = locate(&snapshot, kind, options, name)?;
        self.execute(&ApiRequest::move_to(&path, position)?)?;
        Ok(())
    }

    pub fn clone_object(
        &self,
        kind: ObjectKind,
        options: &ScopeOptions,
        name: &str,
        new_name: &str,
    ) -> Result<AddressPath> {
        let snapshot = self.session.snapshot();
        let source = locate(&snapshot, kind, options, name)?;
        let copy = locate(&snapshot, kind, options, new_name)?;
        let container = locate_container(&snapshot, kind, options)?;
        self.execute(&ApiRequest::clone_of(&container, &source, new_name))?;
        Ok(copy)
    }

    /// Append `member` to a list such as `static` or `tag`, leaving other
    /// members in place.
    pub fn add_member(
        &self,
        kind: ObjectKind,
        options: &ScopeOptions,
        name: &str,
        list: &str,
        member: &str,
    ) -> Result<()> {
        validate_member_text(member)?;
        let snapshot = self.session.snapshot();
        let path = locate(&snapshot, kind, options, name)?.child(list)?;
        let fragment = ConfigFragment::from(Element::text_node("member", member));
        self.execute(&ApiRequest::config(Action::Set, &path).with_element(&fragment))?;
        Ok(())
    }

    pub fn remove_member(
        &self,
        kind: ObjectKind,
        options: &ScopeOptions,
        name: &str,
        list: &str,
        member: &str,
    ) -> Result<()> {
        let snapshot = self.session.snapshot();
        let path = locate(&snapshot, kind, options, name)?
            .child(list)?
            .member(member)?;
        self.execute(&ApiRequest::config(Action::Delete, &path))?;
        Ok(())
    }

    pub fn create_static_route(
        &self,
        virtual_router: &str,
        name: &str,
        route: &StaticRoute,
    ) -> Result<AddressPath> {
        let snapshot = self.session.snapshot();
        let path = static_route_path(&snapshot, virtual_router, name)?;
        let fragment = route.build()?;
        self.execute(&ApiRequest::config(Action::Set, &path).with_element(&fragment))?;
        Ok(path)
    }

    /// Run an operational command.
    pub fn op(&self, command: &Element) -> Result<ApiResponse> {
        self.execute(&ApiRequest::op(command))
    }

    /// Commit the candidate configuration. Returns the job id, or `None` when
    /// there was nothing to commit.
    pub fn commit(&self, options: &CommitOptions) -> Result<Option<u64>> {
        let snapshot = self.session.snapshot();
        let request = match &options.push_device_group {
            None => {
                let mut cmd = Element::new("commit");
                if let Some(description) = options.description.as_deref() {
                    cmd.children.push(Element::text_node("description", description));
                }
                ApiRequest::commit(&cmd)
            }
            Some(group) => {
                if snapshot.mode() != ManagementMode::CentralizedManager {
                    return Err(RoutingError::UnsupportedScopeForMode {
                        kind: ObjectKind::DeviceGroup,
                        scope: format!("commit-all to device group '{group}'"),
                        mode: snapshot.mode(),
                    }
                    .into());
                }
                validate_object_name("device group", group)?;
                let mut shared_policy = Element::new("shared-policy");
                if let Some(description) = options.description.as_deref() {
                    shared_policy
                        .children
                        .push(Element::text_node("description", description));
                }
                shared_policy.children.push(
                    Element::new("device-group")
                        .with_child(Element::new("entry").with_attribute("name", group.as_str())),
                );
                let cmd = Element::new("commit-all").with_child(shared_policy);
                ApiRequest::commit_all(&cmd)
            }
        };

        let response = self.execute(&request)?;
        let job = response
            .result()
            .and_then(|r| r.get_text(&["job"]))
            .and_then(|job| job.trim().parse().ok());
        if job.is_none() {
            debug!(message = response.message(), "commit returned no job");
        }
        Ok(job)
    }
}

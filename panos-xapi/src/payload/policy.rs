use std::str::FromStr;

use serde::Serialize;
use xml_fragment_core::Element;

use super::{
    member_list, member_list_or_any, parse_discriminator, push_optional_text, Payload,
    PayloadError,
};
use crate::kind::{ObjectKind, RuleType};
use crate::name::validate_object_name;
use crate::ConfigFragment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleAction {
    Allow,
    Deny,
    Drop,
    ResetClient,
    ResetServer,
    ResetBoth,
}

const RULE_ACTIONS: &[&str] = &[
    "allow",
    "deny",
    "drop",
    "reset-client",
    "reset-server",
    "reset-both",
];

impl RuleAction {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleAction::Allow => "allow",
            RuleAction::Deny => "deny",
            RuleAction::Drop => "drop",
            RuleAction::ResetClient => "reset-client",
            RuleAction::ResetServer => "reset-server",
            RuleAction::ResetBoth => "reset-both",
        }
    }
}

impl FromStr for RuleAction {
    type Err = PayloadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_discriminator(
            "rule action",
            s,
            &[
                ("allow", RuleAction::Allow),
                ("deny", RuleAction::Deny),
                ("drop", RuleAction::Drop),
                ("reset-client", RuleAction::ResetClient),
                ("reset-server", RuleAction::ResetServer),
                ("reset-both", RuleAction::ResetBoth),
            ],
            RULE_ACTIONS,
        )
    }
}

/// Individual security profiles attached to a rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityProfiles {
    pub virus: Option<String>,
    pub spyware: Option<String>,
    pub vulnerability: Option<String>,
    pub url_filtering: Option<String>,
    pub file_blocking: Option<String>,
    pub wildfire_analysis: Option<String>,
}

impl SecurityProfiles {
    fn entries(&self) -> [(&'static str, Option<&str>); 6] {
        [
            ("virus", self.virus.as_deref()),
            ("spyware", self.spyware.as_deref()),
            ("vulnerability", self.vulnerability.as_deref()),
            ("url-filtering", self.url_filtering.as_deref()),
            ("file-blocking", self.file_blocking.as_deref()),
            ("wildfire-analysis", self.wildfire_analysis.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSetting {
    /// A named security profile group.
    Group(String),
    Profiles(SecurityProfiles),
}

impl ProfileSetting {
    /// `None` when no profile is actually selected.
    fn element(&self) -> Result<Option<Element>, PayloadError> {
        let body = match self {
            ProfileSetting::Group(group) => {
                validate_object_name("profile group", group)?;
                member_list("group", std::slice::from_ref(group))?
            }
            ProfileSetting::Profiles(profiles) => {
                let mut body = Element::new("profiles");
                for (name, profile) in profiles.entries() {
                    if let Some(profile) = profile {
                        validate_object_name(name, profile)?;
                        body.children
                            .push(member_list(name, &[profile.to_string()])?);
                    }
                }
                if body.children.is_empty() {
                    return Ok(None);
                }
                body
            }
        };
        Ok(Some(Element::new("profile-setting").with_child(body)))
    }
}

/// A security policy rule. Empty address, user, category, application and
/// service lists default to `any`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityRule {
    pub from_zones: Vec<String>,
    pub to_zones: Vec<String>,
    pub sources: Vec<String>,
    pub destinations: Vec<String>,
    pub source_users: Vec<String>,
    pub categories: Vec<String>,
    pub applications: Vec<String>,
    pub services: Vec<String>,
    pub action: RuleAction,
    pub log_setting: Option<String>,
    pub profile_setting: Option<ProfileSetting>,
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub disabled: bool,
}

impl SecurityRule {
    pub fn new(action: RuleAction) -> Self {
        Self {
            from_zones: Vec::new(),
            to_zones: Vec::new(),
            sources: Vec::new(),
            destinations: Vec::new(),
            source_users: Vec::new(),
            categories: Vec::new(),
            applications: Vec::new(),
            services: vec!["application-default".to_string()],
            action,
            log_setting: None,
            profile_setting: None,
            tags: Vec::new(),
            description: None,
            disabled: false,
        }
    }

    pub fn zones(
        mut self,
        from: impl IntoIterator<Item = impl Into<String>>,
        to: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.from_zones = from.into_iter().map(Into::into).collect();
        self.to_zones = to.into_iter().map(Into::into).collect();
        self
    }
}

impl Payload for SecurityRule {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Rule(RuleType::Security)
    }

    fn build(&self) -> Result<ConfigFragment, PayloadError> {
        let mut fragment = ConfigFragment::new();
        fragment.push(member_list_or_any("from", &self.from_zones)?);
        fragment.push(member_list_or_any("to", &self.to_zones)?);
        fragment.push(member_list_or_any("source", &self.sources)?);
        fragment.push(member_list_or_any("destination", &self.destinations)?);
        fragment.push(member_list_or_any("source-user", &self.source_users)?);
        fragment.push(member_list_or_any("category", &self.categories)?);
        fragment.push(member_list_or_any("application", &self.applications)?);
        fragment.push(member_list_or_any("service", &self.services)?);
        fragment.push(Element::text_node("action", self.action.as_str()));

        if let Some(log_setting) = self.log_setting.as_deref() {
            validate_object_name("log setting", log_setting)?;
        }
        push_optional_text(&mut fragment, "log-setting", self.log_setting.as_deref());
        if let Some(element) = self
            .profile_setting
            .as_ref()
            .map(ProfileSetting::element)
            .transpose()?
            .flatten()
        {
            fragment.push(element);
        }
        if !self.tags.is_empty() {
            fragment.push(member_list("tag", &self.tags)?);
        }
        push_optional_text(&mut fragment, "description", self.description.as_deref());
        if self.disabled {
            fragment.push(Element::text_node("disabled", "yes"));
        }
        Ok(fragment)
    }
}

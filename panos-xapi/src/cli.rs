use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};
use panos_xapi::kind::ObjectKind;
use panos_xapi::scope::{RulebasePhase, ScopeOptions};
use panos_xapi::session::ManagementMode;

#[derive(Parser, Debug)]
#[command(name = "panos-xapi")]
#[command(about = "Resolve configuration addresses and talk to the PAN-OS XML API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Resolve the configuration XPath of an object without contacting a device.
    Xpath(XpathArgs),
    /// Build an address object body; send it with --profile.
    Address(AddressArgs),
    /// Classify an API status code.
    Classify(ClassifyArgs),
    /// Fetch an object or a whole collection from a device.
    Get(GetArgs),
    /// Commit the candidate configuration.
    Commit(CommitArgs),
    /// Print the encoded request URL for a configuration action (key redacted).
    Url(UrlArgs),
}

/// Where an object lives.
#[derive(Args, Debug, Clone, Default)]
pub struct PlacementArgs {
    #[arg(long)]
    pub device_group: Option<String>,
    /// Shared placement for this call.
    #[arg(long)]
    pub shared: bool,
    /// Rulebase phase for rules: pre, post or local.
    #[arg(long, value_parser = parse_phase)]
    pub phase: Option<RulebasePhase>,
}

impl PlacementArgs {
    pub fn scope_options(&self) -> ScopeOptions {
        ScopeOptions {
            device_group: self.device_group.clone(),
            shared: self.shared,
            phase: self.phase,
        }
    }

    /// Overlay these arguments on profile defaults.
    pub fn over(&self, defaults: ScopeOptions) -> ScopeOptions {
        ScopeOptions {
            device_group: self.device_group.clone().or(defaults.device_group),
            shared: self.shared || defaults.shared,
            phase: self.phase.or(defaults.phase),
        }
    }
}

/// Session state for offline resolution.
#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
    #[arg(long, value_enum, default_value_t = ModeArg::Standalone)]
    pub mode: ModeArg,
    /// Session-wide shared preference (panorama only).
    #[arg(long)]
    pub prefer_shared: bool,
    #[arg(long)]
    pub vsys: Option<String>,
}

#[derive(Parser, Debug)]
pub struct XpathArgs {
    #[arg(long, value_parser = parse_kind)]
    pub kind: ObjectKind,
    /// Object name; omit with --container.
    #[arg(long, required_unless_present = "container")]
    pub name: Option<String>,
    /// Print the container path instead of an entry.
    #[arg(long)]
    pub container: bool,
    #[command(flatten)]
    pub placement: PlacementArgs,
    #[command(flatten)]
    pub session: SessionArgs,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct AddressArgs {
    #[arg(long)]
    pub name: String,
    /// ip-netmask, ip-range or fqdn.
    #[arg(long = "type", default_value = "ip-netmask")]
    pub address_type: String,
    #[arg(long)]
    pub value: String,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    #[command(flatten)]
    pub placement: PlacementArgs,
    #[command(flatten)]
    pub session: SessionArgs,
    /// Connection profile; when given the object is created on the device.
    #[arg(long)]
    pub profile: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct ClassifyArgs {
    /// Status code from a response envelope.
    #[arg(required_unless_present = "table")]
    pub code: Option<String>,
    /// Device message to carry for unknown codes.
    #[arg(long, default_value = "")]
    pub message: String,
    /// Print the whole code table.
    #[arg(long)]
    pub table: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct GetArgs {
    #[arg(long)]
    pub profile: PathBuf,
    #[arg(long, value_parser = parse_kind)]
    pub kind: ObjectKind,
    /// Single object; omit to list the collection.
    #[arg(long)]
    pub name: Option<String>,
    #[command(flatten)]
    pub placement: PlacementArgs,
    /// Read the running configuration instead of the candidate.
    #[arg(long)]
    pub running: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct CommitArgs {
    #[arg(long)]
    pub profile: PathBuf,
    #[arg(long)]
    pub description: Option<String>,
    /// Panorama: push to this device group after committing.
    #[arg(long)]
    pub push_device_group: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct UrlArgs {
    #[arg(long)]
    pub host: String,
    #[arg(long, value_enum, default_value_t = ActionArg::Get)]
    pub action: ActionArg,
    #[arg(long, value_parser = parse_kind)]
    pub kind: ObjectKind,
    #[arg(long)]
    pub name: String,
    #[command(flatten)]
    pub placement: PlacementArgs,
    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    Standalone,
    Panorama,
}

impl From<ModeArg> for ManagementMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Standalone => ManagementMode::Standalone,
            ModeArg::Panorama => ManagementMode::CentralizedManager,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionArg {
    Get,
    Show,
    Delete,
}

fn parse_kind(value: &str) -> Result<ObjectKind, String> {
    value.parse()
}

fn parse_phase(value: &str) -> Result<RulebasePhase, String> {
    value.parse()
}

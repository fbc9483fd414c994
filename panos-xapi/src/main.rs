use anyhow::{Context, Result};
use clap::Parser;
use panos_xapi::outcome::{classify, code_table};
use panos_xapi::report::{render_code_table, render_outcome};
use panos_xapi::request::{Action, ApiRequest};
use panos_xapi::session::{Secret, SessionContext, SessionSnapshot};
use panos_xapi::transport::api_endpoint;
use panos_xapi::xpath::{locate, locate_container};
use tracing_subscriber::EnvFilter;

mod address_cmd;
mod cli;
mod device_cmd;

use cli::{ActionArg, ClassifyArgs, Cli, Command, OutputFormat, SessionArgs, UrlArgs, XpathArgs};

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Xpath(args) => run_xpath(args),
        Command::Address(args) => address_cmd::run_address(args),
        Command::Classify(args) => run_classify(args),
        Command::Get(args) => device_cmd::run_get(args),
        Command::Commit(args) => device_cmd::run_commit(args),
        Command::Url(args) => run_url(args),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Snapshot for offline commands, built through a session so the same
/// invariants apply as for a live connection.
pub(crate) fn offline_snapshot(args: &SessionArgs) -> Result<SessionSnapshot> {
    let mut session = SessionContext::new(args.mode.into(), Secret::default());
    if let Some(vsys) = &args.vsys {
        session = session
            .with_vsys(vsys)
            .with_context(|| format!("invalid --vsys '{vsys}'"))?;
    }
    session
        .set_prefer_shared(args.prefer_shared)
        .context("--prefer-shared requires --mode panorama")?;
    Ok(session.snapshot())
}

fn run_xpath(args: XpathArgs) -> Result<()> {
    let snapshot = offline_snapshot(&args.session)?;
    let options = args.placement.scope_options();
    let path = match (&args.name, args.container) {
        (Some(name), false) => locate(&snapshot, args.kind, &options, name),
        _ => locate_container(&snapshot, args.kind, &options),
    }
    .with_context(|| format!("cannot resolve {} address", args.kind))?;

    match args.format {
        OutputFormat::Text => println!("{path}"),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "kind": args.kind,
                "mode": snapshot.mode(),
                "xpath": path,
            }))?
        ),
    }
    Ok(())
}

fn run_classify(args: ClassifyArgs) -> Result<()> {
    if args.table {
        match args.format {
            OutputFormat::Text => println!("{}", render_code_table()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(code_table())?),
        }
        return Ok(());
    }

    let code = args.code.unwrap_or_default();
    let outcome = classify(&code, &args.message);
    match args.format {
        OutputFormat::Text => println!("{}", render_outcome(&code, &outcome)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
    }
    Ok(())
}

fn run_url(args: UrlArgs) -> Result<()> {
    let snapshot = offline_snapshot(&args.session)?;
    let path = locate(
        &snapshot,
        args.kind,
        &args.placement.scope_options(),
        &args.name,
    )
    .with_context(|| format!("cannot resolve {} address", args.kind))?;
    let endpoint = api_endpoint(&args.host)?;
    let action = match args.action {
        ActionArg::Get => Action::Get,
        ActionArg::Show => Action::Show,
        ActionArg::Delete => Action::Delete,
    };
    let request = ApiRequest::config(action, &path);
    println!("{} {}", request.method(), request.redacted_url(&endpoint));
    Ok(())
}

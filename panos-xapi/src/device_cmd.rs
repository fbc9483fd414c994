use anyhow::{bail, Context, Result};
use panos_xapi::client::{Client, CommitOptions};
use panos_xapi::kind::ObjectKind;
use panos_xapi::profile::{connect, load_profile};
use panos_xapi::records::{
    AddressGroupRecord, AddressRecord, DeviceGroupRecord, FromEntry, ServiceGroupRecord,
    ServiceRecord, TagRecord,
};
use panos_xapi::report::{
    render_address_groups, render_addresses, render_commit, render_device_groups,
    render_service_groups, render_services, render_tags,
};
use panos_xapi::scope::ScopeOptions;
use panos_xapi::transport::Transport;
use serde::Serialize;
use xml_fragment_core::write_pretty;

use crate::cli::{CommitArgs, GetArgs, OutputFormat};

pub fn run_get(args: GetArgs) -> Result<()> {
    let profile = load_profile(&args.profile)?;
    let client =
        connect(&profile).with_context(|| format!("failed to connect to {}", profile.host))?;
    let options = args.placement.over(profile.scope_options());

    if args.running {
        let Some(name) = &args.name else {
            bail!("--running needs --name");
        };
        let response = client.show(args.kind, &options, name)?;
        return print_raw(response.result(), args.format);
    }

    match args.kind {
        ObjectKind::Address => {
            print_records::<_, AddressRecord>(&client, &args, &options, render_addresses)
        }
        ObjectKind::AddressGroup => print_records::<_, AddressGroupRecord>(
            &client,
            &args,
            &options,
            render_address_groups,
        ),
        ObjectKind::Service => {
            print_records::<_, ServiceRecord>(&client, &args, &options, render_services)
        }
        ObjectKind::ServiceGroup => print_records::<_, ServiceGroupRecord>(
            &client,
            &args,
            &options,
            render_service_groups,
        ),
        ObjectKind::Tag => print_records::<_, TagRecord>(&client, &args, &options, render_tags),
        // device groups have one home regardless of the profile's placement
        ObjectKind::DeviceGroup => print_records::<_, DeviceGroupRecord>(
            &client,
            &args,
            &ScopeOptions::default(),
            render_device_groups,
        ),
        kind => {
            let Some(name) = &args.name else {
                bail!("listing {kind} objects is not supported; pass --name");
            };
            let response = client.get(kind, &options, name)?;
            print_raw(response.result(), args.format)
        }
    }
}

fn print_records<T, R>(
    client: &Client<T>,
    args: &GetArgs,
    options: &ScopeOptions,
    render: fn(&[R]) -> String,
) -> Result<()>
where
    T: Transport,
    R: FromEntry + Serialize,
{
    let records: Vec<R> = match &args.name {
        Some(name) => vec![client.fetch(options, name)?],
        None => client.list(options)?,
    };
    match args.format {
        OutputFormat::Text => println!("{}", render(&records)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
    }
    Ok(())
}

fn print_raw(result: Option<&xml_fragment_core::Element>, format: OutputFormat) -> Result<()> {
    let Some(result) = result else {
        bail!("response has no result");
    };
    let xml = String::from_utf8(write_pretty(result)?)?;
    match format {
        OutputFormat::Text => println!("{xml}"),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "result": xml }))?
        ),
    }
    Ok(())
}

pub fn run_commit(args: CommitArgs) -> Result<()> {
    let profile = load_profile(&args.profile)?;
    let client =
        connect(&profile).with_context(|| format!("failed to connect to {}", profile.host))?;
    let options = CommitOptions {
        description: args.description,
        push_device_group: args.push_device_group,
    };
    let job = client.commit(&options).context("commit failed")?;
    match args.format {
        OutputFormat::Text => println!("{}", render_commit(job)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "job": job }))?
        ),
    }
    Ok(())
}

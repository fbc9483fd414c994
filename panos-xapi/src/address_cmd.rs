use anyhow::{Context, Result};
use colored::Colorize;
use panos_xapi::kind::ObjectKind;
use panos_xapi::payload::{Address, Payload};
use panos_xapi::profile::{connect, load_profile};
use panos_xapi::xpath::locate;

use crate::cli::{AddressArgs, OutputFormat};
use crate::offline_snapshot;

pub fn run_address(args: AddressArgs) -> Result<()> {
    let mut address = Address::from_parts(&args.address_type, args.value.as_str())?
        .with_tags(args.tags.iter().cloned());
    if let Some(description) = &args.description {
        address = address.with_description(description.as_str());
    }
    let fragment = address.build().context("invalid address object")?;

    let (path, sent) = match &args.profile {
        None => {
            let snapshot = offline_snapshot(&args.session)?;
            let path = locate(
                &snapshot,
                ObjectKind::Address,
                &args.placement.scope_options(),
                &args.name,
            )?;
            (path, false)
        }
        Some(profile_path) => {
            let profile = load_profile(profile_path)?;
            let client = connect(&profile)
                .with_context(|| format!("failed to connect to {}", profile.host))?;
            let options = args.placement.over(profile.scope_options());
            let path = client
                .create(&address, &options, &args.name)
                .with_context(|| format!("failed to create address '{}'", args.name))?;
            (path, true)
        }
    };

    match args.format {
        OutputFormat::Text => {
            if sent {
                println!("{} {}", "CREATED".green(), path);
            } else {
                println!("{path}");
            }
            println!("{fragment}");
        }
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "xpath": path,
                "element": fragment.to_string(),
                "sent": sent,
            }))?
        ),
    }
    Ok(())
}

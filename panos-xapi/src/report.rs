use colored::Colorize;

use crate::outcome::{code_table, Outcome};
use crate::records::{
    AddressGroupRecord, AddressRecord, DeviceGroupRecord, GroupMembers, ServiceGroupRecord,
    ServiceRecord, TagRecord,
};

/// Render a classified status code for terminal output.
pub fn render_outcome(code: &str, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Success => format!("{} code={code}", "SUCCESS".green()),
        Outcome::Recoverable { category, message } => format!(
            "{} code={code} category={category} message={message}",
            "RECOVERABLE".yellow()
        ),
        Outcome::Fatal { category, message } => format!(
            "{} code={code} category={category} message={message}",
            "FATAL".red()
        ),
    }
}

/// Render the full status code table.
pub fn render_code_table() -> String {
    let mut out = Vec::new();
    for entry in code_table() {
        let recoverable = if entry.category.is_recoverable() {
            "recoverable"
        } else {
            "fatal"
        };
        out.push(format!(
            "{:>4} {:<24} {:<11} {}",
            entry.code,
            entry.category.as_str(),
            recoverable,
            entry.description
        ));
    }
    out.join("\n")
}

pub fn render_commit(job: Option<u64>) -> String {
    match job {
        Some(job) => format!("{} job={job}", "COMMIT".green()),
        None => format!("{} no changes to commit", "COMMIT".cyan()),
    }
}

pub fn render_addresses(records: &[AddressRecord]) -> String {
    let mut out = vec![format!("addresses count={}", records.len()).cyan().to_string()];
    for record in records {
        let mut line = format!(
            "- {} {}={}",
            record.name,
            record.address_type.element_name(),
            record.value
        );
        push_tags(&mut line, &record.tags);
        push_description(&mut line, record.description.as_deref());
        out.push(line);
    }
    out.join("\n")
}

pub fn render_address_groups(records: &[AddressGroupRecord]) -> String {
    let mut out = vec![format!("address-groups count={}", records.len())
        .cyan()
        .to_string()];
    for record in records {
        let mut line = match &record.members {
            GroupMembers::Static(members) => {
                format!("- {} static members={}", record.name, members.join(","))
            }
            GroupMembers::Dynamic(filter) => {
                format!("- {} dynamic filter={filter}", record.name)
            }
        };
        push_tags(&mut line, &record.tags);
        push_description(&mut line, record.description.as_deref());
        out.push(line);
    }
    out.join("\n")
}

pub fn render_services(records: &[ServiceRecord]) -> String {
    let mut out = vec![format!("services count={}", records.len()).cyan().to_string()];
    for record in records {
        let mut line = format!("- {} {}/{}", record.name, record.protocol, record.port);
        if let Some(source) = &record.source_port {
            line.push_str(&format!(" source-port={source}"));
        }
        push_tags(&mut line, &record.tags);
        push_description(&mut line, record.description.as_deref());
        out.push(line);
    }
    out.join("\n")
}

pub fn render_service_groups(records: &[ServiceGroupRecord]) -> String {
    let mut out = vec![format!("service-groups count={}", records.len())
        .cyan()
        .to_string()];
    for record in records {
        let mut line = format!("- {} members={}", record.name, record.members.join(","));
        push_tags(&mut line, &record.tags);
        out.push(line);
    }
    out.join("\n")
}

pub fn render_tags(records: &[TagRecord]) -> String {
    let mut out = vec![format!("tags count={}", records.len()).cyan().to_string()];
    for record in records {
        let mut line = format!("- {}", record.name);
        if let Some(color) = record.color {
            line.push_str(&format!(" color={}", color.code()));
        }
        if let Some(comments) = &record.comments {
            line.push_str(&format!(" comments={comments}"));
        }
        out.push(line);
    }
    out.join("\n")
}

pub fn render_device_groups(records: &[DeviceGroupRecord]) -> String {
    let mut out = vec![format!("device-groups count={}", records.len())
        .cyan()
        .to_string()];
    for record in records {
        let mut line = format!("- {} devices={}", record.name, record.devices.len());
        push_description(&mut line, record.description.as_deref());
        out.push(line);
        for serial in &record.devices {
            out.push(format!("  serial: {serial}"));
        }
    }
    out.join("\n")
}

fn push_tags(line: &mut String, tags: &[String]) {
    if !tags.is_empty() {
        line.push_str(&format!(" tags={}", tags.join(",")));
    }
}

fn push_description(line: &mut String, description: Option<&str>) {
    if let Some(description) = description {
        line.push_str(&format!(" description={description:?}"));
    }
}

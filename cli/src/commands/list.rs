//! List commands - show which processes own which ports.

use anyhow::Result;
use portsight_core::{PlatformCommandInterface, PortRecord};

use crate::port_spec;

/// `portsight list <SPEC>`
pub async fn run(
    interface: &PlatformCommandInterface,
    spec: &str,
    only_listening: bool,
    json: bool,
) -> Result<()> {
    let parsed = port_spec::parse(spec);
    for token in &parsed.rejected {
        eprintln!("Ignoring invalid port or range: {}", token);
    }
    if parsed.ports.is_empty() {
        anyhow::bail!("No valid ports in '{}'", spec);
    }

    let records = interface.list_ports(&parsed.ports, only_listening).await?;
    print_records(&records, json)
}

/// `portsight all`
pub async fn run_all(interface: &PlatformCommandInterface, json: bool) -> Result<()> {
    let records = interface.list_all_ports().await?;
    print_records(&records, json)
}

fn print_records(records: &[PortRecord], json: bool) -> Result<()> {
    if json {
        return super::print_json(&records);
    }

    if records.is_empty() {
        println!("No matching ports found.");
        return Ok(());
    }

    // Table header
    println!(
        "{:<6} {:<5} {:<8} {:<20} {:<12} {:<8} REMARKS",
        "PORT", "PROTO", "PID", "PROCESS", "USER", "SOURCE"
    );
    println!("{}", "-".repeat(90));

    for record in records {
        println!(
            "{:<6} {:<5} {:<8} {:<20} {:<12} {:<8} {}",
            record.port,
            record.protocol,
            record.pid,
            truncate(record.display_name(), 20),
            truncate(record.user.as_deref().unwrap_or("-"), 12),
            record.source,
            record.remarks
        );
    }

    println!("\nTotal: {} sockets", records.len());
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

//! Kill commands - terminate a process by PID or by port.

use anyhow::Result;
use portsight_core::{OutcomeCategory, PlatformCommandInterface, TerminationOutcome};

/// `portsight kill <PID>`. Returns whether the request succeeded.
pub async fn run(
    interface: &PlatformCommandInterface,
    pid: u32,
    force: bool,
    json: bool,
) -> Result<bool> {
    let outcome = interface.kill_process(pid, force).await;
    report(&outcome, json)
}

/// `portsight kill-port <PORT>`. Returns whether the request succeeded.
pub async fn run_port(
    interface: &PlatformCommandInterface,
    port: u16,
    force: bool,
    json: bool,
) -> Result<bool> {
    let outcome = interface.kill_by_port(port, force).await?;
    report(&outcome, json)
}

fn report(outcome: &TerminationOutcome, json: bool) -> Result<bool> {
    if json {
        super::print_json(outcome)?;
    } else if outcome.success {
        println!("{}", outcome.message);
    } else {
        eprintln!("{}", outcome.message);
        if outcome.category() == OutcomeCategory::PermissionDenied {
            eprintln!("{}", elevation_hint());
        }
    }

    Ok(outcome.success)
}

fn elevation_hint() -> &'static str {
    if cfg!(windows) {
        "Hint: run this command from an Administrator prompt."
    } else {
        "Hint: re-run this command with sudo."
    }
}

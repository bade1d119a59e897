//! Source command - classify a single process.

use anyhow::Result;
use portsight_core::{PlatformCommandInterface, Response};

/// `portsight source <PID>`
pub async fn run(interface: &PlatformCommandInterface, pid: u32, json: bool) -> Result<()> {
    let source = interface.detect_source(pid).await;

    if json {
        super::print_json(&Response::Source { source })
    } else {
        println!("{}", source);
        Ok(())
    }
}

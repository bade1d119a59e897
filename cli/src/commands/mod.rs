//! Subcommand implementations.

pub mod kill;
pub mod list;
pub mod serve;
pub mod source;

use anyhow::Result;
use serde::Serialize;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

//! Portsight CLI - Find and stop the processes behind network ports
//!
//! A command-line host for the portsight engine: lists port owners,
//! terminates processes, and serves the engine's request/response
//! interface to UI processes over stdio.

mod commands;
mod logging;
mod port_spec;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use portsight_core::{ConfigStore, EngineConfig, PlatformCommandInterface};

#[derive(Parser)]
#[command(name = "portsight")]
#[command(author, version, about = "Find and stop the processes behind network ports")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (implied when stdout is not a terminal)
    #[arg(long, global = true)]
    json: bool,

    /// Read configuration from this file instead of ~/.portsight/config.json
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log engine decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the processes bound to a set of ports, e.g. "3000,8000-8002"
    #[command(alias = "ls")]
    List {
        spec: String,

        /// Only include listening sockets
        #[arg(short, long)]
        listening: bool,
    },

    /// Show every bound TCP and UDP socket
    All,

    /// Terminate a process by PID
    Kill {
        pid: u32,

        /// Force kill (SIGKILL / TerminateProcess) without graceful shutdown
        #[arg(short, long)]
        force: bool,
    },

    /// Terminate the process listening on a port
    KillPort {
        port: u16,

        /// Force kill (SIGKILL / TerminateProcess) without graceful shutdown
        #[arg(short, long)]
        force: bool,
    },

    /// Show what most likely launched a process
    Source { pid: u32 },

    /// Answer JSON requests on stdin, one per line
    Serve,
}

async fn load_config(path: Option<PathBuf>) -> anyhow::Result<EngineConfig> {
    let store = match path {
        Some(path) => ConfigStore::with_path(path),
        None => ConfigStore::new()?,
    };

    store
        .load()
        .await
        .with_context(|| format!("Loading {}", store.path().display()))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let json = cli.json || !atty::is(atty::Stream::Stdout);
    let config = load_config(cli.config).await?;
    let interface = PlatformCommandInterface::platform(&config)?;

    let succeeded = match cli.command {
        Commands::List { spec, listening } => {
            commands::list::run(&interface, &spec, listening, json).await?;
            true
        }
        Commands::All => {
            commands::list::run_all(&interface, json).await?;
            true
        }
        Commands::Kill { pid, force } => commands::kill::run(&interface, pid, force, json).await?,
        Commands::KillPort { port, force } => {
            commands::kill::run_port(&interface, port, force, json).await?
        }
        Commands::Source { pid } => {
            commands::source::run(&interface, pid, json).await?;
            true
        }
        Commands::Serve => {
            commands::serve::run(&interface).await?;
            true
        }
    };

    if !succeeded {
        std::process::exit(1);
    }

    Ok(())
}

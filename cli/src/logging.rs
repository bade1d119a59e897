//! Diagnostic logging setup.
//!
//! Everything goes to stderr so stdout stays clean for tables and JSON.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` for our crates
/// with `--verbose`.
pub fn init(verbose: bool) {
    let default = if verbose {
        "warn,portsight=debug,portsight_core=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

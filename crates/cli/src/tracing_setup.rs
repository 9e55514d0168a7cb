//! Log setup for the `sluice` binary.
//!
//!   sluice --debug ...           # debug logs on stderr
//!   RUST_LOG=sluice_core=trace   # explicit filter, wins over --debug

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

pub(crate) fn init(debug: bool) -> Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|error| anyhow!(error))
}

use std::io;

use anyhow::{Result, anyhow};
use tracing::Level;
use tracing_subscriber::fmt;

/// Installs the stderr subscriber. Warnings (font fallback, empty clouds)
/// always show; `--verbose` adds the layout trace.
pub fn init(verbose: bool) -> Result<()> {
    fmt()
        .with_max_level(max_level(verbose))
        .with_target(verbose)
        .without_time()
        .with_writer(io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to install the log subscriber: {}", err))
}

fn max_level(verbose: bool) -> Level {
    if verbose { Level::DEBUG } else { Level::WARN }
}

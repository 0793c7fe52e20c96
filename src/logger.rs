use crate::error::{Result, ScsiTapeError};
use std::io;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// verbosity flag.
pub fn init(verbose: bool, json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    let registry = tracing_subscriber::registry().with(filter);

    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .try_init()
    } else {
        let fmt_layer = fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_writer(io::stderr);
        registry.with(fmt_layer).try_init()
    };

    result.map_err(|e| ScsiTapeError::system(format!("Logger initialization failed: {}", e)))
}

use std::io;

use tracing_subscriber::EnvFilter;

use crate::error::{AppError, AppResult};

const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber. `RUST_LOG` overrides the default
/// `info` level; everything goes to stderr so stdout stays free for the
/// file prompt.
pub fn init() -> AppResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|err| AppError::Logging(err.to_string()))
}

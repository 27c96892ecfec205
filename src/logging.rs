//! Diagnostic logging to standard error.

use log::{LevelFilter, SetLoggerError};

/// Initialises `env_logger`.
///
/// `RUST_LOG` is read first; `level` then overrides it for this crate and as
/// the global default. Certificate output never goes through the logger.
pub fn init_logger(level: LevelFilter) -> Result<(), SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    builder.filter_module("certpeek", level);
    builder.format_timestamp(None);
    builder.try_init()
}

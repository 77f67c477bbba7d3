//! Diagnostic logging.
//!
//! Installs a global tracing subscriber writing to stderr. The filter comes
//! from `RUST_LOG` and defaults to `warn`, so a normal launch prints nothing
//! but the accuracy line.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Subsequent calls are no-ops. Failures are returned so callers can carry on
/// without logs.
pub fn init() -> Result<(), LoggingError> {
    if INITIALIZED.get().is_some() {
        return Ok(());
    }

    let subscriber = tracing_subscriber::registry()
        .with(build_env_filter())
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr));
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = INITIALIZED.set(());
    Ok(())
}

fn build_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

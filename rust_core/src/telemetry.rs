//! Structured logging setup

use tracing_subscriber::EnvFilter;

/// Initialize logging with the given default level.
///
/// `RUST_LOG` takes precedence when set. Calling this twice returns an error
/// rather than replacing the installed subscriber.
pub fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))?;

    Ok(())
}

use crate::error::{KanbanError, Result};
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the configured filter
pub const LOG_ENV: &str = "KANBAN_LOG";

/// Builds the filter, preferring `KANBAN_LOG` over `default_filter`
pub fn env_filter(default_filter: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_filter).map_err(|error| {
            KanbanError::Config(format!("invalid log filter '{default_filter}': {error}"))
        }),
    }
}

/// Installs a fmt subscriber for the process.
///
/// Calling it again after a subscriber is installed is a no-op, so tests and
/// embedding applications can call it freely.
pub fn init(default_filter: &str) -> Result<()> {
    let filter = env_filter(default_filter)?;

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_err()
    {
        tracing::trace!("tracing subscriber already installed");
    }

    Ok(())
}

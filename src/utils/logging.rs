//! Logging setup on top of `tracing-subscriber`

use tracing_subscriber::EnvFilter;

use crate::domain::errors::*;

/// Build the filter: `RUST_LOG` when set, otherwise `level`
pub fn build_filter(level: &str) -> DomainResult<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| DomainError::Config(format!("Invalid log level '{}': {}", level, e))),
    }
}

/// Install the global subscriber, writing to stderr.
///
/// Returns `false` when a subscriber was already installed.
pub fn init_logging(level: &str, json: bool) -> DomainResult<bool> {
    let filter = build_filter(level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    Ok(installed.is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_malformed_level() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert!(build_filter("debug").is_ok());
        assert!(build_filter("trimkit=loud").is_err());
    }
}

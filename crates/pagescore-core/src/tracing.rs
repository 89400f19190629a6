//! Subscriber setup. `RUST_LOG` wins over the configured filter.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global `fmt` subscriber.
///
/// Returns `false` when a subscriber was already installed (tests, embedding hosts),
/// in which case the existing one is kept.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.effective_filter()));

    let installed = if config.effective_json() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    };
    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_keeps_existing_subscriber() {
        let config = LoggingConfig::default();
        let _ = init_tracing(&config);
        assert!(!init_tracing(&config));
    }
}

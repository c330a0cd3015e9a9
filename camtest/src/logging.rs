//! Logging initialization

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "camtest=debug,camtest_media=debug,camtest_upload=info";

/// Install the global `fmt` subscriber
///
/// `RUST_LOG` overrides [`DEFAULT_FILTER`]. Returns false when a subscriber
/// was already installed, which is not an error.
pub fn init() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        assert!(!init());
    }
}

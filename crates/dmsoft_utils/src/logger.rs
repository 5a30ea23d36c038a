//! Process-wide `tracing` setup for binaries. Libraries only emit events.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when `RUST_LOG` is unset or unparseable.
pub const DEFAULT_FILTER: &str = "dmsoft=info";

static INSTALLED: OnceLock<bool> = OnceLock::new();

/// Install the compact stderr subscriber, filtered by `RUST_LOG`.
pub fn init_logging() {
    init_logging_with(DEFAULT_FILTER);
}

/// Like [`init_logging`] with a different fallback filter. Only the first
/// call in a process has any effect; returns whether this crate's subscriber
/// is the one in place.
pub fn init_logging_with(fallback: &str) -> bool {
    *INSTALLED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .try_init()
            .is_ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_call_is_a_no_op() {
        let first = init_logging_with("dmsoft=debug");
        assert_eq!(init_logging_with("off"), first);
    }
}

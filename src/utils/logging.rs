//! Diagnostic logging setup.
//!
//! Logs go to stderr so replies on stdout stay clean for piping. `-v` turns
//! on `info`, `-vv` turns on `debug`; without either flag `RUST_LOG` is
//! honored and the default is `warn`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive for a `-v` count, or `None` to defer to `RUST_LOG`.
pub fn level_directive(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("info"),
        _ => Some("debug"),
    }
}

fn env_filter(verbosity: u8) -> EnvFilter {
    match level_directive(verbosity) {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    }
}

/// Installs the global subscriber. Safe to call more than once; later calls
/// leave the first subscriber in place.
pub fn init(verbosity: u8) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(verbosity))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_directive(0), None);
        assert_eq!(level_directive(1), Some("info"));
        assert_eq!(level_directive(2), Some("debug"));
        assert_eq!(level_directive(5), Some("debug"));
    }

    #[test]
    fn init_twice_does_not_panic() {
        init(2);
        init(0);
    }
}

//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Log levels:
//! - `error`/`warn`: failures and recoverable problems
//! - `info`: per-command progress
//! - `debug`: header and member parse milestones
//! - `trace`: row-level progress

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` overrides the level derived from verbosity flags when
/// the flags are absent.
///
/// # Panics
///
/// Panics if called more than once.
pub fn init_logging(level_filter: LevelFilter, verbosity_set: bool) {
    let filter = if verbosity_set {
        EnvFilter::new(level_filter.to_string().to_lowercase())
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level_filter.to_string().to_lowercase()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).without_time())
        .init();
}

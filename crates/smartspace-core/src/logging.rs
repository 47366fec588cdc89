#![forbid(unsafe_code)]

//! Structured logging helpers.
//!
//! With the `tracing` feature the usual macros are re-exported here so
//! downstream crates can log through `smartspace_core::logging`. With
//! `tracing-json`, [`init`] installs a JSON subscriber whose filter comes
//! from `RUST_LOG`, falling back to the given directive.

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, error, info, info_span, trace, warn};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,smartspace_runtime=debug";

/// Install a global JSON subscriber.
///
/// Fails if a global subscriber is already installed or the fallback
/// directive does not parse.
#[cfg(feature = "tracing-json")]
pub fn init(fallback: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    use tracing_subscriber::EnvFilter;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(fallback)?,
    };
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(false)
        .try_init()
}

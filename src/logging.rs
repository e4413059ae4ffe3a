//! Tracing subscriber setup.
//!
//! Native hosts log to stderr through the `fmt` subscriber, filtered by
//! `RUST_LOG` (default `info`). With the `web` feature the same fmt layer
//! writes to the browser console instead.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer};

/// Default filter when `RUST_LOG` is unset or unreadable.
pub const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber. Calling this more than once is harmless.
pub fn init() {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(DEFAULT_FILTER),
    };

    #[cfg(not(feature = "web"))]
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(filter);

    #[cfg(feature = "web")]
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(tracing_web::MakeWebConsoleWriter::new())
        .with_filter(filter);

    if let Err(e) = tracing_subscriber::registry().with(fmt_layer).try_init() {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }
}

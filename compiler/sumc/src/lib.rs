//! Driver library for the `sumc` binary.
//!
//! Reads union declarations from a small text format ([`parse`]), plans
//! their layouts, and runs one of the CLI commands over them
//! ([`commands`]). Flags are parsed by hand into [`DriverOptions`].

use std::sync::Once;

pub mod commands;
mod error;
pub mod options;
pub mod parse;

pub use error::DriverError;
pub use options::{parse_driver_options, DriverOptions};

static TRACING_INIT: Once = Once::new();

/// Install a stderr `tracing` subscriber filtered by `RUST_LOG`.
///
/// Without `RUST_LOG` nothing is installed. Repeated calls are no-ops.
/// `RUST_LOG=sum_layout=debug` shows planning decisions and
/// `RUST_LOG=sum_codegen=trace` every emitted request.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let Ok(filter) = EnvFilter::try_from_default_env() else {
            return;
        };
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .init();
    });
}

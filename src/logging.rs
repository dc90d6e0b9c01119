//! Diagnostics setup for binaries and tests embedding the puzzle.

use std::{io, sync::OnceLock};

use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt};

/// Filter applied when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "logic_gate_puzzle=info";

static INSTALLED: OnceLock<bool> = OnceLock::new();

/// Installs a compact stderr subscriber filtered by `RUST_LOG`, falling back
/// to [`DEFAULT_DIRECTIVE`].
///
/// Returns whether the subscriber became the global default. Only the first
/// call does any work; later calls repeat its answer.
pub fn init_tracing() -> bool {
    init_tracing_with(DEFAULT_DIRECTIVE)
}

/// Same as [`init_tracing`] with a caller-chosen fallback filter.
pub fn init_tracing_with(directive: &str) -> bool {
    *INSTALLED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
        let subscriber = tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .without_time()
                .compact(),
        );

        let installed = tracing::subscriber::set_global_default(subscriber).is_ok();
        if installed {
            // `log` records from dependencies go through the same filter
            let _ = LogTracer::init();
        }
        installed
    })
}

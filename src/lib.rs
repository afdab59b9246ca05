pub mod app;
pub mod config;
pub mod email_client;
mod error;
pub mod notifier;
pub mod rate_client;
pub mod store;
pub mod templ_manager;
pub mod web;

// re-export
pub use app::{serve, App, AppState};
pub use error::{Error, Result};

use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Human readable logs for local development, filtered with `RUST_LOG` (`info` when unset).
pub fn init_dbg_tracing() {
    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(env_filter())
        .compact()
        .init();
}

/// One JSON object per line.
pub fn init_production_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .json()
        .init();
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

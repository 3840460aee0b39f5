//! Structured logging configuration.
//!
//! The library logs through the `log` facade; the subscriber installed here
//! picks those records up along with native `tracing` events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "info";

/// Initialize logging, configurable via the RUST_LOG env var
///
/// Log lines go to stderr so they never mix with the table transcript on
/// stdout.
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::debug!("logging initialized");
}

/// Log a command a table turned down
pub fn log_rejected_command(table: &str, handle: &str, verb: &str, reason: &str) {
    tracing::debug!(table = table, handle = handle, verb = verb, "command rejected: {}", reason);
}

/// Log a force command, with who issued it
pub fn log_operator_action(table: &str, handle: &str, verb: &str, allowed: bool) {
    if allowed {
        tracing::info!(table = table, operator = handle, verb = verb, "operator command");
    } else {
        tracing::warn!(table = table, handle = handle, verb = verb, "force command from non-operator");
    }
}

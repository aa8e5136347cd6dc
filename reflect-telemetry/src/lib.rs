//! Tracing initialization and the structured fields every component in the
//! reflection runtime logs through.

#![warn(missing_docs, clippy::pedantic)]

use tracing_subscriber::EnvFilter;

/// Name of the field every reflection-cycle log line carries, identifying
/// which agent instance emitted it.
pub const FIELD_AGENT_NAME: &str = "agent_name";
/// Name of the field carrying the monotonically increasing cycle counter.
pub const FIELD_CYCLE_COUNT: &str = "cycle_count";
/// Name of the field carrying a situation identifier in policy log lines.
pub const FIELD_SITUATION_ID: &str = "situation_id";

/// Initializes the process-wide tracing subscriber.
///
/// Honors `RUST_LOG` via [`EnvFilter`], defaulting to `info` when unset, and
/// omits the module-path target from each line to match the rest of the
/// runtime's demo output.
///
/// Calling this more than once in a process is harmless: subsequent calls
/// are no-ops, since [`tracing::subscriber::set_global_default`] only
/// succeeds the first time.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_target(false).with_env_filter(filter).try_init();
}

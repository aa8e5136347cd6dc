//! Facade crate for the autonomous reflection agent runtime.
//!
//! Depend on this crate via `cargo add reflect-agent`. It bundles the
//! internal runtime crates behind feature flags so downstream users can
//! enable or disable components as needed for their own agent.

#![warn(missing_docs, clippy::pedantic)]

/// Shared identifiers, severity bands, and the core error taxonomy.
pub use reflect_core as core;

/// Thread-safe observer registry with concurrent fan-out (enabled by the
/// `registry` feature).
#[cfg(feature = "registry")]
pub use reflect_registry as registry;

/// Severity-banded decision policy with overrides and learning (enabled by
/// the `policy` feature).
#[cfg(feature = "policy")]
pub use reflect_policy as policy;

/// Just-in-time permission broker (enabled by the `broker` feature).
#[cfg(feature = "broker")]
pub use reflect_broker as broker;

/// Capability catalog and live load snapshot (enabled by the `selfmodel`
/// feature).
#[cfg(feature = "selfmodel")]
pub use reflect_selfmodel as selfmodel;

/// Volatile and journaled memory sinks (enabled by the `memory` feature).
#[cfg(feature = "memory")]
pub use reflect_memory as memory;

/// The oracle trait plus HTTP and static adapters (enabled by the `oracle`
/// feature).
#[cfg(feature = "oracle")]
pub use reflect_oracle as oracle;

/// Escalation, audit, and action-handler sink traits (enabled by the
/// `sinks` feature).
#[cfg(feature = "sinks")]
pub use reflect_sinks as sinks;

/// Tracing initialization shared by every binary (enabled by the
/// `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use reflect_telemetry as telemetry;

/// Environment-overridable configuration for every tunable (enabled by the
/// `config` feature).
#[cfg(feature = "config")]
pub use reflect_config as config;

/// The reflection loop orchestrator itself (enabled by the `loop` feature).
#[cfg(feature = "loop")]
pub use reflect_loop as reflection_loop;

//! Memory sinks consumed by the reflection loop: a bounded in-process ring
//! and an optional durable, newline-delimited JSON journal.

#![warn(missing_docs, clippy::pedantic)]

mod entry;
mod error;
mod journal;
mod sink;
mod volatile;

/// The memory entry type and its validated builder.
pub use entry::{MemoryEntry, MemoryEntryBuilder};
/// Error type and result alias shared across the memory subsystem.
pub use error::{MemoryError, MemoryResult};
/// Durable journal trait and the file-backed implementation.
pub use journal::{FileJournal, Journal};
/// The memory sink contract and its ring-only and ring+journal implementations.
pub use sink::{JournaledMemorySink, MemorySink, VolatileMemorySink};
/// The volatile ring buffer and its configuration/statistics types.
pub use volatile::{VolatileConfig, VolatileMemory, VolatileStats};

//! The live load snapshot used to form the reflection prompt and cap
//! concurrent work.

use chrono::{DateTime, Utc};
use sysinfo::{Pid, ProcessRefreshKind, RefreshKind, System};

/// A point-in-time read of how busy this process is.
#[derive(Debug, Clone, Copy)]
pub struct LoadSnapshot {
    /// Number of in-flight tasks the agent itself is tracking.
    pub active_tasks: u32,
    /// Number of tasks alive in the async runtime, as reported by its
    /// metrics. `None` when read outside a Tokio runtime context.
    pub live_task_count: Option<usize>,
    /// Resident memory of this process in bytes, as reported by the OS.
    /// `None` when the process table entry could not be read.
    pub allocated_bytes: Option<u64>,
    /// When this snapshot was taken.
    pub taken_at: DateTime<Utc>,
}

impl LoadSnapshot {
    /// Renders a one-line summary suitable for a reflection prompt.
    #[must_use]
    pub fn summary(&self) -> String {
        let runtime_tasks = self
            .live_task_count
            .map_or_else(|| "n/a".to_owned(), |count| count.to_string());
        let memory_mb = self
            .allocated_bytes
            .map_or_else(|| "n/a".to_owned(), |bytes| format!("{:.1}MB", bytes as f64 / 1_048_576.0));
        format!(
            "active_tasks={} runtime_tasks={} memory={}",
            self.active_tasks, runtime_tasks, memory_mb
        )
    }
}

/// Reads the current process's resident memory via the OS process table.
/// Returns `None` if the current process cannot be found, which can happen
/// in sandboxed or minimal containers without a full `/proc` view.
pub(crate) fn read_allocated_bytes() -> Option<u64> {
    let pid = Pid::from(std::process::id() as usize);
    let mut system = System::new_with_specifics(
        RefreshKind::new().with_processes(ProcessRefreshKind::everything()),
    );
    system.refresh_process(pid);
    system.process(pid).map(sysinfo::Process::memory)
}

/// Reads the number of tasks alive in the current Tokio runtime, if any.
pub(crate) fn read_live_task_count() -> Option<usize> {
    tokio::runtime::Handle::try_current()
        .ok()
        .map(|handle| handle.metrics().num_alive_tasks())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_handles_missing_runtime_metrics() {
        let snapshot = LoadSnapshot {
            active_tasks: 3,
            live_task_count: None,
            allocated_bytes: None,
            taken_at: Utc::now(),
        };
        assert_eq!(snapshot.summary(), "active_tasks=3 runtime_tasks=n/a memory=n/a");
    }

    #[test]
    fn summary_renders_memory_in_megabytes() {
        let snapshot = LoadSnapshot {
            active_tasks: 1,
            live_task_count: Some(4),
            allocated_bytes: Some(2 * 1024 * 1024),
            taken_at: Utc::now(),
        };
        assert_eq!(snapshot.summary(), "active_tasks=1 runtime_tasks=4 memory=2.0MB");
    }
}

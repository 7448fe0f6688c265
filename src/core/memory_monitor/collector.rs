use sysinfo::{MemoryRefreshKind, RefreshKind, System};

use crate::error::Result;
use crate::platform::{procfs, HeapProvider, HostProfile};

use super::snapshot::MemorySnapshot;

/// Collects process and system memory counters into snapshots.
pub struct MetricsCollector {
    system: System,
    heap: Box<dyn HeapProvider>,
    profile: HostProfile,
}

impl MetricsCollector {
    pub fn new(profile: HostProfile, heap: Box<dyn HeapProvider>) -> Self {
        let refresh_kind = RefreshKind::nothing().with_memory(MemoryRefreshKind::everything());

        Self {
            system: System::new_with_specifics(refresh_kind),
            heap,
            profile,
        }
    }

    /// Basic snapshot: host totals plus app heap counters.
    pub fn sample(&mut self) -> Result<MemorySnapshot> {
        self.system.refresh_memory();

        let total_mem = self.system.total_memory();
        let avail_mem = self.system.available_memory();
        let threshold = self.profile.low_memory_threshold(total_mem);

        let heap = self.heap.stats()?;

        Ok(MemorySnapshot {
            total_mem,
            avail_mem,
            threshold,
            low_memory: avail_mem <= threshold,
            app_max_memory: heap.max_bytes,
            app_total_memory: heap.committed_bytes,
            app_used_memory: heap.used_bytes(),
            app_free_memory: heap.free_bytes,
            ..Default::default()
        })
    }

    /// Snapshot with the best-effort extended tables filled in.
    ///
    /// Missing or partially malformed tables degrade to smaller (or empty)
    /// maps, never to an error.
    pub fn sample_detailed(&mut self) -> Result<MemorySnapshot> {
        let mut snapshot = self.sample()?;
        snapshot.process_usage = procfs::read_region_usage(&self.profile.smaps_path);
        snapshot.system_memory = procfs::read_memory_table(&self.profile.meminfo_path);
        Ok(snapshot)
    }
}

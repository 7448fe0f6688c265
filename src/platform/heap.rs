//! Application heap accounting sources.
//!
//! The monitor never reads heap counters directly; it goes through the
//! [`HeapProvider`] seam so hosts (and tests) can supply their own source.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

use crate::error::{MemwatchError, Result};

use super::profile::HostProfile;

/// One reading of the app heap: ceiling, committed bytes, and
/// allocator-retained free bytes. used = committed - free.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapStats {
    /// App memory ceiling; 0 when no limit could be resolved.
    pub max_bytes: u64,
    pub committed_bytes: u64,
    pub free_bytes: u64,
}

impl HeapStats {
    pub fn used_bytes(&self) -> u64 {
        self.committed_bytes.saturating_sub(self.free_bytes)
    }
}

/// Source of app heap readings, polled once per tick.
pub trait HeapProvider: Send {
    fn stats(&self) -> Result<HeapStats>;
}

/// Ceiling values at or above this mean "no limit configured".
const LIMIT_UNLIMITED: u64 = 1 << 60;

/// Resolve the effective process memory ceiling from the profile.
///
/// Probes the configured ceiling files in order; `max` and sentinel-sized
/// values count as unconstrained. Returns 0 when nothing resolves, which
/// classification treats as an unknown ceiling.
pub fn detect_heap_limit(profile: &HostProfile) -> u64 {
    if let Some(limit) = profile.heap_limit_override {
        return limit;
    }
    for path in &profile.cgroup_limit_paths {
        if let Some(limit) = read_limit_file(path) {
            return limit;
        }
    }
    0
}

fn read_limit_file(path: &Path) -> Option<u64> {
    let contents = fs::read_to_string(path).ok()?;
    let value = contents.trim();
    if value == "max" {
        return None;
    }
    let limit = value.parse::<u64>().ok()?;
    if limit == 0 || limit >= LIMIT_UNLIMITED {
        None
    } else {
        Some(limit)
    }
}

/// Heap readings for the current process from its procfs resident-set table.
pub struct ProcStatmHeap {
    statm_path: PathBuf,
    page_size: u64,
    limit: u64,
}

impl ProcStatmHeap {
    pub fn new(profile: &HostProfile) -> Self {
        Self {
            statm_path: profile.statm_path.clone(),
            page_size: profile.page_size,
            limit: detect_heap_limit(profile),
        }
    }
}

impl HeapProvider for ProcStatmHeap {
    fn stats(&self) -> Result<HeapStats> {
        let contents = fs::read_to_string(&self.statm_path).map_err(|e| {
            MemwatchError::memory(format!("read {}: {}", self.statm_path.display(), e))
        })?;

        // statm fields are page counts: size resident shared text lib data dt
        let resident_pages = contents
            .split_whitespace()
            .nth(1)
            .and_then(|field| field.parse::<u64>().ok())
            .ok_or_else(|| MemwatchError::memory("malformed resident-set table"))?;

        Ok(HeapStats {
            max_bytes: self.limit,
            committed_bytes: resident_pages * self.page_size,
            free_bytes: allocator_free_bytes(),
        })
    }
}

/// Bytes the allocator holds but has not handed out.
#[cfg(all(target_os = "linux", target_env = "gnu"))]
fn allocator_free_bytes() -> u64 {
    // SAFETY: mallinfo2 only reads allocator bookkeeping.
    let info = unsafe { libc::mallinfo2() };
    info.fordblks as u64
}

#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
fn allocator_free_bytes() -> u64 {
    0
}

/// Fallback provider for hosts without procfs: asks sysinfo for the current
/// process resident set.
pub struct SysinfoHeap {
    system: Mutex<System>,
    pid: sysinfo::Pid,
    limit: u64,
}

impl SysinfoHeap {
    pub fn new(profile: &HostProfile) -> Result<Self> {
        let pid = sysinfo::get_current_pid().map_err(MemwatchError::memory)?;
        Ok(Self {
            system: Mutex::new(System::new()),
            pid,
            limit: detect_heap_limit(profile),
        })
    }
}

impl HeapProvider for SysinfoHeap {
    fn stats(&self) -> Result<HeapStats> {
        let mut system = self.system.lock();
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        let process = system
            .process(self.pid)
            .ok_or_else(|| MemwatchError::memory("current process not visible to sysinfo"))?;

        Ok(HeapStats {
            max_bytes: self.limit,
            committed_bytes: process.memory(),
            free_bytes: 0,
        })
    }
}

/// Pick the cheapest working provider for this host.
pub fn detect_heap_provider(profile: &HostProfile) -> Result<Box<dyn HeapProvider>> {
    if profile.statm_path.exists() {
        Ok(Box::new(ProcStatmHeap::new(profile)))
    } else {
        Ok(Box::new(SysinfoHeap::new(profile)?))
    }
}

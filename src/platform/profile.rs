use std::path::PathBuf;

/// Capability descriptor for the host the monitor runs on.
///
/// Every platform fact the collector or heap providers consume is carried
/// here and injected at composition time; nothing queries ambient globals.
/// Tests point the paths at fixture files.
#[derive(Debug, Clone)]
pub struct HostProfile {
    /// Line-oriented system memory table (`key: value kB` pairs).
    pub meminfo_path: PathBuf,
    /// Per-region process memory map table.
    pub smaps_path: PathBuf,
    /// Resident-set source for the running process.
    pub statm_path: PathBuf,
    /// Candidate memory-ceiling files, probed in order.
    pub cgroup_limit_paths: Vec<PathBuf>,
    /// Fraction of total RAM under which the host counts as low on memory.
    pub low_memory_fraction: f64,
    /// Operator override for the app memory ceiling, in bytes.
    pub heap_limit_override: Option<u64>,
    /// Page size used to scale page-denominated sources.
    pub page_size: u64,
}

impl HostProfile {
    /// Profile for the running host.
    pub fn detect() -> Self {
        Self {
            meminfo_path: PathBuf::from("/proc/meminfo"),
            smaps_path: PathBuf::from("/proc/self/smaps"),
            statm_path: PathBuf::from("/proc/self/statm"),
            cgroup_limit_paths: vec![
                PathBuf::from("/sys/fs/cgroup/memory.max"),
                PathBuf::from("/sys/fs/cgroup/memory/memory.limit_in_bytes"),
            ],
            low_memory_fraction: 0.10,
            heap_limit_override: None,
            page_size: page_size(),
        }
    }

    /// System low-memory threshold for a host with `total_mem` bytes of RAM.
    pub fn low_memory_threshold(&self, total_mem: u64) -> u64 {
        (total_mem as f64 * self.low_memory_fraction) as u64
    }
}

impl Default for HostProfile {
    fn default() -> Self {
        Self::detect()
    }
}

#[cfg(unix)]
fn page_size() -> u64 {
    // SAFETY: sysconf with a valid name only reads system configuration.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as u64
    } else {
        4096
    }
}

#[cfg(not(unix))]
fn page_size() -> u64 {
    4096
}

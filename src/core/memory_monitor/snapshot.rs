use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::platform::RegionUsage;

/// One immutable reading of memory counters taken during a tick.
///
/// Field names follow the host wire contract; all quantities are bytes.
/// The extended maps are best-effort and omitted from the wire when empty.
/// Snapshots are created fresh per sample and never retained beyond the
/// tick that produced them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySnapshot {
    /// Total physical memory on the host.
    pub total_mem: u64,
    /// Memory the host considers available without swapping.
    pub avail_mem: u64,
    /// Low-memory threshold the host applies to `avail_mem`.
    pub threshold: u64,
    /// Whether the host is at or below its low-memory threshold.
    pub low_memory: bool,
    /// App memory ceiling; 0 when no limit could be resolved.
    pub app_max_memory: u64,
    pub app_total_memory: u64,
    pub app_used_memory: u64,
    pub app_free_memory: u64,
    /// Per-category process memory breakdown (detailed samples only).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub process_usage: BTreeMap<String, RegionUsage>,
    /// Canonical system memory counters (detailed samples only).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub system_memory: BTreeMap<String, u64>,
}

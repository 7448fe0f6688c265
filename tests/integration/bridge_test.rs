// Integration tests for the host bridge command surface.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

use memwatch::core::memory_monitor::{HostBridge, MethodCall, PressureThresholds};
use memwatch::platform::{HeapProvider, HeapStats, HostProfile};
use memwatch::MemwatchError;

fn test_profile(dir: &Path) -> HostProfile {
    HostProfile {
        meminfo_path: dir.join("meminfo"),
        smaps_path: dir.join("smaps"),
        statm_path: dir.join("statm"),
        cgroup_limit_paths: vec![],
        low_memory_fraction: 0.10,
        heap_limit_override: None,
        page_size: 4096,
    }
}

struct FixedHeap {
    max: u64,
    total: u64,
    free: u64,
}

impl HeapProvider for FixedHeap {
    fn stats(&self) -> memwatch::Result<HeapStats> {
        Ok(HeapStats {
            max_bytes: self.max,
            committed_bytes: self.total,
            free_bytes: self.free,
        })
    }
}

fn bridge_with_heap(dir: &Path, max: u64, total: u64, free: u64) -> HostBridge {
    let (bridge, _events) = HostBridge::with_parts(
        test_profile(dir),
        Box::new(FixedHeap { max, total, free }),
        PressureThresholds::default(),
        Duration::from_millis(5000),
    );
    bridge
}

fn call(method: &str) -> MethodCall {
    MethodCall::new(method)
}

#[tokio::test]
async fn test_get_memory_info_carries_the_wire_fields() {
    let dir = TempDir::new().unwrap();
    let bridge = bridge_with_heap(dir.path(), 100, 80, 30);

    let result = bridge.dispatch(&call("getMemoryInfo")).await.unwrap();

    for key in [
        "totalMem",
        "availMem",
        "threshold",
        "lowMemory",
        "appMaxMemory",
        "appTotalMemory",
        "appUsedMemory",
        "appFreeMemory",
    ] {
        assert!(result.get(key).is_some(), "missing wire field {key}");
    }
    assert_eq!(result["appMaxMemory"], 100);
    assert_eq!(result["appTotalMemory"], 80);
    assert_eq!(result["appUsedMemory"], 50);
    assert_eq!(result["appFreeMemory"], 30);
    // Basic snapshots never carry the extended tables.
    assert!(result.get("systemMemory").is_none());
    assert!(result.get("processUsage").is_none());
}

#[tokio::test]
async fn test_detailed_memory_info_parses_fixture_tables() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("meminfo"),
        "MemTotal:    16384000 kB\n\
         MemFree:      2048000 kB\n\
         broken line\n\
         SwapTotal: oops kB\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("smaps"),
        "55a000000000-55a000021000 rw-p 00000000 00:00 0    [heap]\n\
         Pss:      128 kB\n\
         Private_Dirty:   64 kB\n",
    )
    .unwrap();

    let bridge = bridge_with_heap(dir.path(), 100, 80, 30);
    let result = bridge
        .dispatch(&call("getDetailedMemoryInfo"))
        .await
        .unwrap();

    assert_eq!(
        result["systemMemory"]["systemTotalMemory"],
        16384000u64 * 1024
    );
    assert_eq!(
        result["systemMemory"]["systemFreeMemory"],
        2048000u64 * 1024
    );
    assert!(result["systemMemory"].get("systemSwapTotal").is_none());
    assert_eq!(result["processUsage"]["heap"]["pss"], 128 * 1024);
    assert_eq!(result["processUsage"]["heap"]["privateDirty"], 64 * 1024);
    assert_eq!(result["processUsage"]["total"]["pss"], 128 * 1024);
}

#[tokio::test]
async fn test_missing_tables_degrade_to_a_basic_snapshot() {
    let dir = TempDir::new().unwrap();
    let bridge = bridge_with_heap(dir.path(), 100, 80, 30);

    let result = bridge
        .dispatch(&call("getDetailedMemoryInfo"))
        .await
        .unwrap();

    assert!(result.get("systemMemory").is_none());
    assert!(result.get("processUsage").is_none());
    assert_eq!(result["appUsedMemory"], 50);
}

#[tokio::test]
async fn test_pressure_level_reports_the_ordinal() {
    let dir = TempDir::new().unwrap();

    let critical = bridge_with_heap(dir.path(), 100_000_000, 100_000_000, 3_000_000);
    let result = critical
        .dispatch(&call("getMemoryPressureLevel"))
        .await
        .unwrap();
    assert_eq!(result, json!(3));

    let unknown_ceiling = bridge_with_heap(dir.path(), 0, 80, 30);
    let result = unknown_ceiling
        .dispatch(&call("getMemoryPressureLevel"))
        .await
        .unwrap();
    assert_eq!(result, json!(1));
}

#[tokio::test]
async fn test_start_and_stop_acknowledge() {
    let dir = TempDir::new().unwrap();
    let bridge = bridge_with_heap(dir.path(), 100, 10, 0);

    let start = MethodCall {
        method: "startMemoryMonitoring".to_string(),
        args: json!({ "intervalMs": 60 }),
    };
    assert_eq!(bridge.dispatch(&start).await.unwrap(), json!(true));
    assert!(bridge.is_monitoring());

    assert_eq!(
        bridge.dispatch(&call("stopMemoryMonitoring")).await.unwrap(),
        json!(true)
    );
    assert!(!bridge.is_monitoring());
}

#[tokio::test]
async fn test_force_garbage_collection_acknowledges() {
    let dir = TempDir::new().unwrap();
    let bridge = bridge_with_heap(dir.path(), 100, 10, 0);

    let result = bridge
        .dispatch(&call("forceGarbageCollection"))
        .await
        .unwrap();
    assert_eq!(result, json!(true));
    assert_eq!(bridge.hints_issued(), 2);
}

#[tokio::test]
async fn test_unrecognized_method_is_not_implemented() {
    let dir = TempDir::new().unwrap();
    let bridge = bridge_with_heap(dir.path(), 100, 10, 0);

    let err = bridge.dispatch(&call("defragmentTheHeap")).await.unwrap_err();
    assert_eq!(err.code(), "NOT_IMPLEMENTED");
    assert!(err.to_string().contains("defragmentTheHeap"));
}

#[test]
fn test_error_kinds_map_to_wire_codes() {
    assert_eq!(MemwatchError::memory("x").code(), "MEMORY_ERROR");
    assert_eq!(MemwatchError::monitoring("x").code(), "MONITORING_ERROR");
    assert_eq!(MemwatchError::reclaim("x").code(), "GC_ERROR");
    assert_eq!(MemwatchError::pressure("x").code(), "PRESSURE_ERROR");
    assert_eq!(MemwatchError::not_implemented("x").code(), "NOT_IMPLEMENTED");
    assert_eq!(MemwatchError::config("x").code(), "MONITORING_ERROR");
}

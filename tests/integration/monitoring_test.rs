// Integration tests for the monitoring loop: session lifecycle, event
// ordering, fault degradation, and teardown silence.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tempfile::TempDir;
use tokio::time::timeout;

use memwatch::core::memory_monitor::{BridgeEvent, HostBridge, PressureThresholds};
use memwatch::platform::{HeapProvider, HeapStats, HostProfile};
use memwatch::MemwatchError;

/// Profile whose procfs paths point into an (empty) temp dir, so samples
/// never touch the real host tables.
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

/// Heap source with a fixed reading.
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

/// Heap source that fails every second reading.
struct FlakyHeap {
    calls: AtomicU64,
}

impl HeapProvider for FlakyHeap {
    fn stats(&self) -> memwatch::Result<HeapStats> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call % 2 == 1 {
            return Err(MemwatchError::memory("injected heap failure"));
        }
        Ok(HeapStats {
            max_bytes: 100,
            committed_bytes: 10,
            free_bytes: 0,
        })
    }
}

fn bridge_with_heap(
    dir: &Path,
    heap: Box<dyn HeapProvider>,
) -> (HostBridge, tokio::sync::mpsc::Receiver<BridgeEvent>) {
    HostBridge::with_parts(
        test_profile(dir),
        heap,
        PressureThresholds::default(),
        Duration::from_millis(5000),
    )
}

#[tokio::test]
async fn test_status_events_arrive_in_tick_order() {
    let dir = TempDir::new().unwrap();
    let heap = Box::new(FixedHeap {
        max: 100_000_000,
        total: 40_000_000,
        free: 10_000_000,
    });
    let (bridge, mut events) = bridge_with_heap(dir.path(), heap);

    bridge.start_monitoring(Some(40)).unwrap();

    let mut timestamps = Vec::new();
    for _ in 0..3 {
        let event = timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("event within two seconds")
            .expect("channel open");
        match event {
            BridgeEvent::MemoryStatusUpdate {
                memory_info,
                pressure_level,
                timestamp,
            } => {
                assert_eq!(pressure_level.as_u8(), 0);
                assert_eq!(memory_info.app_used_memory, 30_000_000);
                timestamps.push(timestamp);
            }
            BridgeEvent::MemoryMonitoringError { error, .. } => {
                panic!("unexpected error event: {error}");
            }
        }
    }

    assert!(timestamps.windows(2).all(|pair| pair[0] <= pair[1]));
    bridge.teardown();
}

#[tokio::test]
async fn test_critical_pressure_triggers_reclaim() {
    let dir = TempDir::new().unwrap();
    // used = 97M of a 100M ceiling: ratio 0.97, Critical
    let heap = Box::new(FixedHeap {
        max: 100_000_000,
        total: 100_000_000,
        free: 3_000_000,
    });
    let (bridge, mut events) = bridge_with_heap(dir.path(), heap);

    bridge.start_monitoring(Some(300)).unwrap();

    let event = timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("event within two seconds")
        .expect("channel open");
    match event {
        BridgeEvent::MemoryStatusUpdate { pressure_level, .. } => {
            assert_eq!(pressure_level.as_u8(), 3);
        }
        BridgeEvent::MemoryMonitoringError { error, .. } => {
            panic!("unexpected error event: {error}");
        }
    }

    // The reclaim runs inline after the status event; give its pause room.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(bridge.hints_issued() >= 2);

    bridge.teardown();
}

#[tokio::test]
async fn test_restart_leaves_a_single_tick_stream() {
    let dir = TempDir::new().unwrap();
    let heap = Box::new(FixedHeap {
        max: 100,
        total: 10,
        free: 0,
    });
    let (bridge, mut events) = bridge_with_heap(dir.path(), heap);

    bridge.start_monitoring(Some(50)).unwrap();
    bridge.start_monitoring(Some(50)).unwrap();
    assert!(bridge.is_monitoring());

    // One stream at 50ms produces roughly twelve events in 600ms; two
    // overlapping streams would produce roughly twice that.
    let window = Instant::now();
    let mut count = 0;
    while window.elapsed() < Duration::from_millis(600) {
        if let Ok(Some(_)) = timeout(Duration::from_millis(100), events.recv()).await {
            count += 1;
        }
    }

    assert!(count >= 5, "expected a live stream, got {count} events");
    assert!(count <= 16, "expected a single stream, got {count} events");

    bridge.teardown();
}

#[tokio::test]
async fn test_stop_while_idle_is_a_silent_noop() {
    let dir = TempDir::new().unwrap();
    let heap = Box::new(FixedHeap {
        max: 100,
        total: 10,
        free: 0,
    });
    let (bridge, mut events) = bridge_with_heap(dir.path(), heap);

    assert!(bridge.stop_monitoring().unwrap());
    assert!(!bridge.is_monitoring());

    let silent = timeout(Duration::from_millis(150), events.recv()).await;
    assert!(silent.is_err(), "no events expected while idle");
}

#[tokio::test]
async fn test_failing_tick_degrades_and_monitoring_continues() {
    let dir = TempDir::new().unwrap();
    let heap = Box::new(FlakyHeap {
        calls: AtomicU64::new(0),
    });
    let (bridge, mut events) = bridge_with_heap(dir.path(), heap);

    bridge.start_monitoring(Some(40)).unwrap();

    let mut kinds = Vec::new();
    for _ in 0..3 {
        let event = timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("event within two seconds")
            .expect("channel open");
        match event {
            BridgeEvent::MemoryStatusUpdate { .. } => kinds.push("status"),
            BridgeEvent::MemoryMonitoringError { error, .. } => {
                assert!(error.contains("injected heap failure"));
                kinds.push("error");
            }
        }
    }

    // Readings alternate ok/fail, so the loop survives the bad tick.
    assert_eq!(kinds, vec!["status", "error", "status"]);

    bridge.teardown();
}

#[tokio::test]
async fn test_teardown_silences_the_event_channel() {
    let dir = TempDir::new().unwrap();
    let heap = Box::new(FixedHeap {
        max: 100,
        total: 10,
        free: 0,
    });
    let (bridge, mut events) = bridge_with_heap(dir.path(), heap);

    bridge.start_monitoring(Some(30)).unwrap();
    timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("first event")
        .expect("channel open");

    bridge.teardown();
    assert!(!bridge.is_monitoring());

    // Drain anything emitted before the cancel landed.
    while timeout(Duration::from_millis(50), events.recv())
        .await
        .ok()
        .flatten()
        .is_some()
    {}

    // Longer than one interval: nothing further may arrive.
    let silent = timeout(Duration::from_millis(200), events.recv()).await;
    assert!(silent.is_err(), "no events expected after teardown");

    // Dropping the bridge closes the channel for good.
    drop(bridge);
    let closed = timeout(Duration::from_millis(200), events.recv())
        .await
        .expect("channel should close promptly");
    assert!(closed.is_none());
}

#[tokio::test]
async fn test_force_reclaim_is_a_double_hint_with_bounded_pause() {
    let dir = TempDir::new().unwrap();
    // Normal pressure: the forced reclaim must run regardless.
    let heap = Box::new(FixedHeap {
        max: 100_000_000,
        total: 10_000_000,
        free: 5_000_000,
    });
    let (bridge, _events) = bridge_with_heap(dir.path(), heap);

    let started = Instant::now();
    assert!(bridge.force_reclaim().await.unwrap());

    assert_eq!(bridge.hints_issued(), 2);
    assert!(started.elapsed() >= Duration::from_millis(90));
}

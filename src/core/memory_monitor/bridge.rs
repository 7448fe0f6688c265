//! The host boundary: commands in, status/error events out.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::{MemwatchError, Result};
use crate::platform::{detect_heap_provider, HeapProvider, HostProfile};

use super::collector::MetricsCollector;
use super::pressure::{classify, PressureLevel, PressureThresholds};
use super::responder::PressureResponder;
use super::scheduler::{MonitorScheduler, TickContext};
use super::snapshot::MemorySnapshot;

/// Capacity of the status/error event channel. A slow consumer
/// back-pressures the tick, which only elongates the effective period.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Sampling interval used when a start command does not carry one.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);

/// Events delivered to the host while a monitoring session is active.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum BridgeEvent {
    #[serde(rename = "onMemoryStatusUpdate", rename_all = "camelCase")]
    MemoryStatusUpdate {
        memory_info: MemorySnapshot,
        pressure_level: PressureLevel,
        /// Milliseconds since epoch.
        timestamp: i64,
    },
    #[serde(rename = "onMemoryMonitoringError", rename_all = "camelCase")]
    MemoryMonitoringError { error: String, timestamp: i64 },
}

impl BridgeEvent {
    pub(crate) fn status(snapshot: MemorySnapshot, level: PressureLevel) -> Self {
        BridgeEvent::MemoryStatusUpdate {
            memory_info: snapshot,
            pressure_level: level,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub(crate) fn error<S: Into<String>>(message: S) -> Self {
        BridgeEvent::MemoryMonitoringError {
            error: message.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            BridgeEvent::MemoryStatusUpdate { timestamp, .. } => *timestamp,
            BridgeEvent::MemoryMonitoringError { timestamp, .. } => *timestamp,
        }
    }
}

/// A host method invocation, as carried over the line protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub args: Value,
}

impl MethodCall {
    pub fn new<S: Into<String>>(method: S) -> Self {
        Self {
            method: method.into(),
            args: Value::Null,
        }
    }
}

/// The boundary between the monitor and its host.
///
/// Owns the collector, the classifier thresholds, the responder, and the
/// scheduler; hands the receiving end of its event channel to the caller at
/// construction. At most one monitoring session is active per bridge.
pub struct HostBridge {
    collector: Arc<Mutex<MetricsCollector>>,
    thresholds: PressureThresholds,
    responder: PressureResponder,
    scheduler: MonitorScheduler,
    default_interval: Duration,
}

impl HostBridge {
    /// Bridge for the running host, with default thresholds and interval.
    pub fn new(profile: HostProfile) -> Result<(Self, mpsc::Receiver<BridgeEvent>)> {
        let heap = detect_heap_provider(&profile)?;
        Ok(Self::with_parts(
            profile,
            heap,
            PressureThresholds::default(),
            DEFAULT_INTERVAL,
        ))
    }

    /// Bridge with explicit collaborators; tests inject fakes here.
    pub fn with_parts(
        profile: HostProfile,
        heap: Box<dyn HeapProvider>,
        thresholds: PressureThresholds,
        default_interval: Duration,
    ) -> (Self, mpsc::Receiver<BridgeEvent>) {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let collector = Arc::new(Mutex::new(MetricsCollector::new(profile, heap)));
        let responder = PressureResponder::new();
        let scheduler = MonitorScheduler::new(TickContext {
            collector: Arc::clone(&collector),
            thresholds,
            responder: responder.clone(),
            events: events_tx,
        });

        let bridge = Self {
            collector,
            thresholds,
            responder,
            scheduler,
            default_interval,
        };
        (bridge, events_rx)
    }

    /// Basic memory snapshot. Sampling faults already carry the memory
    /// error kind and pass through unchanged.
    pub fn memory_info(&self) -> Result<MemorySnapshot> {
        self.collector.lock().sample()
    }

    /// Snapshot with the extended best-effort tables.
    pub fn detailed_memory_info(&self) -> Result<MemorySnapshot> {
        self.collector.lock().sample_detailed()
    }

    /// Start (or restart) monitoring. Zero or absent interval means the
    /// bridge default.
    pub fn start_monitoring(&self, interval_ms: Option<u64>) -> Result<bool> {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(MemwatchError::monitoring(
                "no async runtime available to schedule monitoring",
            ));
        }
        let interval = match interval_ms {
            None | Some(0) => self.default_interval,
            Some(ms) => Duration::from_millis(ms),
        };
        self.scheduler.start(interval);
        Ok(true)
    }

    /// Stop monitoring; a no-op when idle.
    pub fn stop_monitoring(&self) -> Result<bool> {
        self.scheduler.stop();
        Ok(true)
    }

    pub fn is_monitoring(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Run the double-reclaim inline, regardless of current pressure.
    pub async fn force_reclaim(&self) -> Result<bool> {
        self.responder.request_reclaim().await;
        Ok(true)
    }

    /// Total reclamation hints issued through this bridge.
    pub fn hints_issued(&self) -> u64 {
        self.responder.hints_issued()
    }

    /// Fresh sample classified on the spot.
    pub fn pressure_level(&self) -> Result<PressureLevel> {
        let snapshot = self
            .collector
            .lock()
            .sample()
            .map_err(|e| MemwatchError::pressure(e.to_string()))?;
        Ok(classify(&snapshot, &self.thresholds))
    }

    /// Stop monitoring and cancel any pending tick. After teardown no tick
    /// targets the event channel again; dropping the bridge closes it.
    pub fn teardown(&self) {
        self.scheduler.stop();
    }

    /// Dispatch a named method call to the matching handler.
    pub async fn dispatch(&self, call: &MethodCall) -> Result<Value> {
        match call.method.as_str() {
            "getMemoryInfo" => to_wire(&self.memory_info()?),
            "getDetailedMemoryInfo" => to_wire(&self.detailed_memory_info()?),
            "startMemoryMonitoring" => {
                let interval_ms = call.args.get("intervalMs").and_then(Value::as_u64);
                Ok(Value::Bool(self.start_monitoring(interval_ms)?))
            }
            "stopMemoryMonitoring" => Ok(Value::Bool(self.stop_monitoring()?)),
            "forceGarbageCollection" => Ok(Value::Bool(self.force_reclaim().await?)),
            "getMemoryPressureLevel" => Ok(Value::from(self.pressure_level()?.as_u8())),
            other => Err(MemwatchError::not_implemented(other)),
        }
    }
}

fn to_wire(snapshot: &MemorySnapshot) -> Result<Value> {
    serde_json::to_value(snapshot).map_err(|e| MemwatchError::memory(e.to_string()))
}

impl Drop for HostBridge {
    fn drop(&mut self) {
        self.teardown();
    }
}

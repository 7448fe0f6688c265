//! Memory telemetry-and-mitigation loop.
//!
//! This module provides the business logic for sampling memory counters,
//! classifying pressure, running the periodic monitoring loop, and nudging
//! the allocator when pressure runs high, all behind a host bridge.

pub mod bridge;
mod collector;
pub mod pressure;
mod responder;
mod scheduler;
mod snapshot;

pub use bridge::{BridgeEvent, HostBridge, MethodCall, DEFAULT_INTERVAL};
pub use collector::MetricsCollector;
pub use pressure::{classify, level_for_ratio, PressureLevel, PressureThresholds};
pub use responder::PressureResponder;
pub use scheduler::MonitorScheduler;
pub use snapshot::MemorySnapshot;

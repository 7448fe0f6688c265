// Memwatch Library - Public API

// Re-export error types
pub mod error;
pub use error::{MemwatchError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod platform;
pub mod ui;

// Re-export commonly used types
pub use crate::core::config::Config;
pub use crate::core::memory_monitor::{
    BridgeEvent, HostBridge, MemorySnapshot, MethodCall, PressureLevel, PressureThresholds,
};

// Initialize logging
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}

use std::io;
use thiserror::Error;

/// Custom error type for the memwatch crate
#[derive(Error, Debug)]
pub enum MemwatchError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read memory info: {0}")]
    Memory(String),

    #[error("Memory monitoring error: {0}")]
    Monitoring(String),

    #[error("Reclaim request failed: {0}")]
    Reclaim(String),

    #[error("Pressure classification failed: {0}")]
    Pressure(String),

    #[error("Method not implemented: {0}")]
    NotImplemented(String),
}

/// Result type alias for the memwatch crate
pub type Result<T> = std::result::Result<T, MemwatchError>;

impl MemwatchError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        MemwatchError::Config(msg.into())
    }

    /// Create a memory info error
    pub fn memory<S: Into<String>>(msg: S) -> Self {
        MemwatchError::Memory(msg.into())
    }

    /// Create a monitoring error
    pub fn monitoring<S: Into<String>>(msg: S) -> Self {
        MemwatchError::Monitoring(msg.into())
    }

    /// Create a reclaim error
    pub fn reclaim<S: Into<String>>(msg: S) -> Self {
        MemwatchError::Reclaim(msg.into())
    }

    /// Create a pressure classification error
    pub fn pressure<S: Into<String>>(msg: S) -> Self {
        MemwatchError::Pressure(msg.into())
    }

    /// Create a not-implemented error for an unrecognized method
    pub fn not_implemented<S: Into<String>>(method: S) -> Self {
        MemwatchError::NotImplemented(method.into())
    }

    /// Wire error kind reported to the host for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            MemwatchError::Io(_) | MemwatchError::Memory(_) => "MEMORY_ERROR",
            MemwatchError::Config(_) | MemwatchError::Monitoring(_) => "MONITORING_ERROR",
            MemwatchError::Reclaim(_) => "GC_ERROR",
            MemwatchError::Pressure(_) => "PRESSURE_ERROR",
            MemwatchError::NotImplemented(_) => "NOT_IMPLEMENTED",
        }
    }
}

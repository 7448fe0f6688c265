//! Pressure classification over app heap usage.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::snapshot::MemorySnapshot;

/// Ordinal memory pressure severity, totally ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PressureLevel {
    Normal = 0,
    Medium = 1,
    High = 2,
    Critical = 3,
}

impl PressureLevel {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(value: u8) -> Option<Self> {
        match value {
            0 => Some(PressureLevel::Normal),
            1 => Some(PressureLevel::Medium),
            2 => Some(PressureLevel::High),
            3 => Some(PressureLevel::Critical),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PressureLevel::Normal => "normal",
            PressureLevel::Medium => "medium",
            PressureLevel::High => "high",
            PressureLevel::Critical => "critical",
        }
    }
}

// The wire value is the ordinal, not a name.
impl Serialize for PressureLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for PressureLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u8::deserialize(deserializer)?;
        PressureLevel::from_ordinal(value)
            .ok_or_else(|| D::Error::custom(format!("pressure level out of range: {value}")))
    }
}

/// Usage-ratio thresholds, inclusive on the lower bound.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PressureThresholds {
    #[serde(default = "default_medium")]
    pub medium: f64,
    #[serde(default = "default_high")]
    pub high: f64,
    #[serde(default = "default_critical")]
    pub critical: f64,
}

fn default_medium() -> f64 {
    0.60
}

fn default_high() -> f64 {
    0.85
}

fn default_critical() -> f64 {
    0.95
}

impl Default for PressureThresholds {
    fn default() -> Self {
        Self {
            medium: default_medium(),
            high: default_high(),
            critical: default_critical(),
        }
    }
}

/// Classify a snapshot's app heap usage into a pressure level.
///
/// The ratio is `appUsedMemory / appMaxMemory`. An unresolved ceiling
/// (`appMaxMemory == 0`) classifies as Medium rather than failing.
pub fn classify(snapshot: &MemorySnapshot, thresholds: &PressureThresholds) -> PressureLevel {
    if snapshot.app_max_memory == 0 {
        return PressureLevel::Medium;
    }
    let ratio = snapshot.app_used_memory as f64 / snapshot.app_max_memory as f64;
    level_for_ratio(ratio, thresholds)
}

/// Level for a raw usage ratio.
pub fn level_for_ratio(ratio: f64, thresholds: &PressureThresholds) -> PressureLevel {
    if ratio >= thresholds.critical {
        PressureLevel::Critical
    } else if ratio >= thresholds.high {
        PressureLevel::High
    } else if ratio >= thresholds.medium {
        PressureLevel::Medium
    } else {
        PressureLevel::Normal
    }
}

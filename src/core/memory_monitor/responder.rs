use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::platform::reclaim_hint;

use super::pressure::PressureLevel;

/// Delay between the two reclamation hints, giving the allocator a chance
/// to act on the first one.
const RECLAIM_PAUSE: Duration = Duration::from_millis(100);

/// Issues reclamation hints when pressure reaches the High threshold.
///
/// Cloning shares the hint counter; the scheduler and the bridge hold the
/// same responder.
#[derive(Clone)]
pub struct PressureResponder {
    trigger_at: PressureLevel,
    pause: Duration,
    hints: Arc<AtomicU64>,
}

impl PressureResponder {
    pub fn new() -> Self {
        Self::with_pause(RECLAIM_PAUSE)
    }

    pub fn with_pause(pause: Duration) -> Self {
        Self {
            trigger_at: PressureLevel::High,
            pause,
            hints: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Total reclamation hints issued so far.
    pub fn hints_issued(&self) -> u64 {
        self.hints.load(Ordering::Relaxed)
    }

    /// React to one tick's classification.
    pub async fn on_tick(&self, level: PressureLevel) {
        if level >= self.trigger_at {
            self.request_reclaim().await;
        }
    }

    /// Double reclamation hint with a bounded pause in between.
    ///
    /// Best-effort: nothing here fails or reports. Runs inline in the tick
    /// that requested it, so the pause elongates that tick's period.
    pub async fn request_reclaim(&self) {
        self.hint();
        tokio::time::sleep(self.pause).await;
        self.hint();
    }

    fn hint(&self) {
        reclaim_hint();
        self.hints.fetch_add(1, Ordering::Relaxed);
        log::debug!("reclaim hint issued");
    }
}

impl Default for PressureResponder {
    fn default() -> Self {
        Self::new()
    }
}

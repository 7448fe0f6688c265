//! Cancellable periodic loop driving the sampling ticks.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use super::bridge::BridgeEvent;
use super::collector::MetricsCollector;
use super::pressure::{classify, PressureThresholds};
use super::responder::PressureResponder;

/// Shared pieces a monitoring tick needs.
pub(crate) struct TickContext {
    pub collector: Arc<Mutex<MetricsCollector>>,
    pub thresholds: PressureThresholds,
    pub responder: PressureResponder,
    pub events: mpsc::Sender<BridgeEvent>,
}

/// Running state of one start/stop lifecycle.
struct MonitoringSession {
    interval: Duration,
    shutdown_tx: broadcast::Sender<()>,
    handle: JoinHandle<()>,
}

/// Drives the periodic sampling loop: one owned, cancellable task, one tick
/// at a time.
///
/// The session mutex is only ever taken by `start`/`stop`, never by the tick
/// task, so both are safe to call from an event consumer.
pub struct MonitorScheduler {
    ctx: Arc<TickContext>,
    session: Mutex<Option<MonitoringSession>>,
}

impl MonitorScheduler {
    pub(crate) fn new(ctx: TickContext) -> Self {
        Self {
            ctx: Arc::new(ctx),
            session: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.lock().is_some()
    }

    /// Interval of the active session, if any.
    pub fn interval(&self) -> Option<Duration> {
        self.session.lock().as_ref().map(|session| session.interval)
    }

    /// Start monitoring. An active session is fully stopped first, so
    /// exactly one tick stream exists afterwards. Must be called within a
    /// tokio runtime.
    pub fn start(&self, interval: Duration) {
        self.stop();

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = tokio::spawn(monitor_task(Arc::clone(&self.ctx), interval, shutdown_rx));

        log::info!("memory monitoring started, interval {}ms", interval.as_millis());
        *self.session.lock() = Some(MonitoringSession {
            interval,
            shutdown_tx,
            handle,
        });
    }

    /// Stop monitoring and cancel any pending tick. No-op when idle.
    pub fn stop(&self) {
        if let Some(session) = self.session.lock().take() {
            let _ = session.shutdown_tx.send(());
            session.handle.abort();
            log::info!("memory monitoring stopped");
        }
    }
}

/// The periodic loop. The first tick fires immediately; each following tick
/// is scheduled `interval` after the previous tick finished, so ticks never
/// overlap and a slow tick stretches the effective period.
async fn monitor_task(
    ctx: Arc<TickContext>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        if run_tick(&ctx).await.is_err() {
            // Event channel closed: nobody is listening any more.
            break;
        }
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.recv() => break,
        }
    }
}

/// One tick: sample, classify, emit, react. A sampling fault degrades to an
/// error event and the loop goes on; only a closed event channel ends it.
async fn run_tick(ctx: &TickContext) -> Result<(), ()> {
    let sampled = {
        let mut collector = ctx.collector.lock();
        collector.sample()
    };

    match sampled {
        Ok(snapshot) => {
            let level = classify(&snapshot, &ctx.thresholds);
            let event = BridgeEvent::status(snapshot, level);
            ctx.events.send(event).await.map_err(|_| ())?;
            ctx.responder.on_tick(level).await;
        }
        Err(e) => {
            log::warn!("memory sampling failed: {e}");
            let event = BridgeEvent::error(e.to_string());
            ctx.events.send(event).await.map_err(|_| ())?;
        }
    }

    Ok(())
}

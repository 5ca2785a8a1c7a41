//! Periodic status refresh.
//!
//! [`RefreshTimer`] only *requests* refreshes; the owner of the controller
//! performs them on its own thread, so a refresh never runs concurrently
//! with a user action. A request raised while the previous one is still
//! pending is coalesced into it.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use super::session::{CycleSessionController, SessionState};
use super::status::StatusProbe;

/// Fixed period of the status refresh
pub const REFRESH_PERIOD: Duration = Duration::from_secs(5);

/// Everything the status display needs, recomputed on every tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub percent: u8,
    pub charging: bool,
    pub cycles: u64,
    pub health: String,
    pub session: SessionState,
    pub taken_at: DateTime<Local>,
}

pub fn snapshot(probe: &StatusProbe, controller: &mut CycleSessionController) -> StatusSnapshot {
    let battery = probe.battery_snapshot();
    let (cycles, health) = probe.cycle_and_health();

    StatusSnapshot {
        percent: battery.percent,
        charging: battery.charging,
        cycles,
        health,
        session: controller.state(),
        taken_at: Local::now(),
    }
}

/// Background ticker that posts `event` every `period` until cancelled.
pub struct RefreshTimer {
    stop_tx: Option<Sender<()>>,
    pending: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshTimer {
    pub fn start<E>(period: Duration, events: Sender<E>, event: E) -> std::io::Result<Self>
    where
        E: Clone + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let pending = Arc::new(AtomicBool::new(false));
        let pending_for_thread = pending.clone();

        let handle = std::thread::Builder::new()
            .name("cycler-refresh".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {
                        // Skip this tick if the last one has not been handled yet
                        if pending_for_thread.swap(true, Ordering::AcqRel) {
                            log::trace!("Refresh still pending, tick coalesced");
                            continue;
                        }
                        if events.send(event.clone()).is_err() {
                            break;
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            pending,
            handle: Some(handle),
        })
    }

    /// Mark the current tick as handled so the next one is delivered
    pub fn acknowledge(&self) {
        self.pending.store(false, Ordering::Release);
    }

    pub fn cancel(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

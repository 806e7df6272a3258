//! Glow pulse loops for critical values.
//!
//! A pulse is owned by the value it animates. Dropping the handle aborts
//! the loop; there is no global timer.

use mastery_core::SourceId;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

const MIN_FRAME: Duration = Duration::from_millis(1);

/// Scale multiplier `elapsed` into a pulse: up to `peak` over the first half
/// of `period`, back to 1.0 over the second half.
pub fn pulse_scale(elapsed: Duration, period: Duration, peak: f64) -> f64 {
    if period.is_zero() {
        return 1.0;
    }
    let phase = (elapsed.as_secs_f64() % period.as_secs_f64()) / period.as_secs_f64();
    let rise = if phase < 0.5 { phase * 2.0 } else { 2.0 - phase * 2.0 };
    1.0 + (peak - 1.0) * rise
}

/// Running pulse loop for one value.
pub struct PulseHandle {
    task: Option<JoinHandle<()>>,
    scale: watch::Receiver<f64>,
}

impl PulseHandle {
    /// Start a pulse loop publishing a new scale every `frame`.
    ///
    /// Outside a tokio runtime no loop is spawned and the scale stays 1.0.
    /// `frame` is raised to at least 1 ms.
    pub fn start(source_id: &SourceId, period: Duration, peak: f64, frame: Duration) -> Self {
        let (tx, rx) = watch::channel(1.0);
        let frame = frame.max(MIN_FRAME);

        let task = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let started_at = Instant::now();
                Some(runtime.spawn(async move {
                    let mut interval = tokio::time::interval(frame);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                    loop {
                        interval.tick().await;
                        let scale = pulse_scale(started_at.elapsed(), period, peak);
                        if tx.send(scale).is_err() {
                            break;
                        }
                    }
                }))
            }
            Err(_) => {
                warn!("No async runtime for pulse on '{}', glow will not animate", source_id);
                None
            }
        };

        debug!("Pulse started for '{}'", source_id);
        Self { task, scale: rx }
    }

    /// Latest published scale.
    pub fn scale(&self) -> f64 {
        *self.scale.borrow()
    }

    /// Receive scale updates. The channel closes when the pulse stops.
    pub fn subscribe(&self) -> watch::Receiver<f64> {
        self.scale.clone()
    }

    /// Whether the loop task is alive.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().map_or(false, |task| !task.is_finished())
    }
}

impl Drop for PulseHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

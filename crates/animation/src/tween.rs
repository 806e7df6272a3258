//! Time-based interpolation between two percentages.

use std::time::Duration;
use tokio::time::Instant;

/// Ease-out cubic on `[0, 1]`. Monotonically non-decreasing, so a tween
/// never overshoots its target.
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    1.0 - (1.0 - t).powi(3)
}

/// One interpolation run from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: f64,
    to: f64,
    started_at: Instant,
    duration: Duration,
}

impl Tween {
    /// Start a tween at `started_at`.
    pub fn new(from: f64, to: f64, started_at: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            started_at,
            duration,
        }
    }

    /// Value to display at `now`.
    pub fn sample(&self, now: Instant) -> f64 {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return self.to;
        }
        let value = self.from + (self.to - self.from) * ease_out_cubic(progress);
        // Guard against rounding past either end
        value.clamp(self.from.min(self.to), self.from.max(self.to))
    }

    /// Fraction of the duration elapsed at `now`, in `[0, 1]`.
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Whether the target has been reached at `now`.
    pub fn is_finished(&self, now: Instant) -> bool {
        self.progress(now) >= 1.0
    }

    /// Where this tween ends.
    pub fn target(&self) -> f64 {
        self.to
    }
}

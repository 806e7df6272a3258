//! Animation controller.
//!
//! Owns one [`AnimatedValue`] per mounted source. Each value has its own
//! tween and, while critical, its own pulse loop; nothing is shared between
//! values. The controller never reads the clock itself: callers pass `now`,
//! which keeps frame scheduling in the render loop and makes runs
//! reproducible.

use mastery_core::{EngineConfig, NormalizedProgress, SourceId, Tier};
use mastery_progress::classify;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::pulse::PulseHandle;
use crate::tween::Tween;

/// Targets closer than this are treated as the same target.
const TARGET_EPSILON: f64 = 1e-9;

/// Kind of visual element being filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FillKind {
    /// Horizontal budget bar
    Bar,
    /// Circular XP / goal ring
    Ring,
}

/// Animation timing.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationConfig {
    /// Fill duration for bars
    pub bar_fill: Duration,
    /// Fill duration for rings
    pub ring_fill: Duration,
    /// Full pulse cycle
    pub pulse_period: Duration,
    /// Scale at the top of a pulse
    pub pulse_peak_scale: f64,
    /// Pulse publish interval
    pub frame_interval: Duration,
}

impl AnimationConfig {
    /// Fill duration for `kind`.
    pub fn fill_duration(&self, kind: FillKind) -> Duration {
        match kind {
            FillKind::Bar => self.bar_fill,
            FillKind::Ring => self.ring_fill,
        }
    }
}

impl From<&EngineConfig> for AnimationConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            bar_fill: config.bar_fill(),
            ring_fill: config.ring_fill(),
            pulse_period: config.pulse_period(),
            pulse_peak_scale: config.pulse_peak_scale,
            frame_interval: config.frame_interval(),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

/// Snapshot of one animated value, as handed to the render layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimatedValue {
    /// Source being animated
    pub source_id: SourceId,
    /// Percentage currently drawn
    pub displayed_percent: f64,
    /// Percentage being animated toward
    pub target_percent: f64,
    /// Tier of the target
    pub tier: Tier,
    /// Whether the glow pulse is active
    pub is_pulsing: bool,
    /// Current pulse scale (1.0 when not pulsing)
    pub pulse_scale: f64,
}

struct Entry {
    kind: FillKind,
    displayed: f64,
    target: f64,
    tier: Tier,
    tween: Option<Tween>,
    pulse: Option<PulseHandle>,
}

impl Entry {
    fn new(kind: FillKind) -> Self {
        Self {
            kind,
            displayed: 0.0,
            target: 0.0,
            tier: Tier::Success,
            tween: None,
            pulse: None,
        }
    }

    fn advance(&mut self, now: Instant) {
        if let Some(tween) = self.tween {
            self.displayed = tween.sample(now);
            if tween.is_finished(now) {
                self.displayed = self.target;
                self.tween = None;
            }
        }
    }

    fn snapshot(&self, source_id: &SourceId) -> AnimatedValue {
        AnimatedValue {
            source_id: source_id.clone(),
            displayed_percent: self.displayed,
            target_percent: self.target,
            tier: self.tier,
            is_pulsing: self.pulse.is_some(),
            pulse_scale: self.pulse.as_ref().map_or(1.0, PulseHandle::scale),
        }
    }
}

/// Drives fill tweens and pulse loops for every mounted value.
pub struct AnimationController {
    config: AnimationConfig,
    entries: HashMap<SourceId, Entry>,
}

impl AnimationController {
    /// Create a controller.
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
        }
    }

    /// Timing in use.
    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Start tracking a value at 0%. Returns false if already mounted.
    pub fn mount(&mut self, source_id: impl Into<SourceId>, kind: FillKind) -> bool {
        let source_id = source_id.into();
        if self.entries.contains_key(&source_id) {
            return false;
        }
        debug!("Mounted {:?} animation for '{}'", kind, source_id);
        self.entries.insert(source_id, Entry::new(kind));
        true
    }

    /// Stop tracking a value, cancelling its pulse. Returns false if it was
    /// not mounted.
    pub fn unmount(&mut self, source_id: &SourceId) -> bool {
        match self.entries.remove(source_id) {
            Some(entry) => {
                if entry.pulse.is_some() {
                    info!("Pulse stopped for '{}' (unmounted)", source_id);
                }
                debug!("Unmounted animation for '{}'", source_id);
                true
            }
            None => false,
        }
    }

    /// Animate `source_id` toward `percent` starting at `now`.
    ///
    /// The new tween starts from whatever is displayed at `now`. Setting the
    /// target it already has is a no-op. Unmounted sources are mounted as
    /// bars.
    pub fn set_target(
        &mut self,
        source_id: impl Into<SourceId>,
        percent: f64,
        now: Instant,
    ) -> AnimatedValue {
        let source_id = source_id.into();
        let percent = if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 100.0) };
        let config = &self.config;
        let entry = self
            .entries
            .entry(source_id.clone())
            .or_insert_with(|| Entry::new(FillKind::Bar));

        entry.advance(now);

        if (entry.target - percent).abs() > TARGET_EPSILON {
            let duration = config.fill_duration(entry.kind);
            debug!(
                "Animating '{}' {:.2}% -> {:.2}% over {:?}",
                source_id, entry.displayed, percent, duration
            );
            entry.tween = Some(Tween::new(entry.displayed, percent, now, duration));
            entry.target = percent;
            entry.tier = classify(percent);
        }

        Self::reconcile_pulse(config, &source_id, entry);
        entry.snapshot(&source_id)
    }

    /// Animate toward a normalized progress value.
    pub fn set_progress(&mut self, progress: &NormalizedProgress, now: Instant) -> AnimatedValue {
        self.set_target(progress.source_id.clone(), progress.percent, now)
    }

    /// Advance every value to `now` and return their snapshots, ordered by
    /// source ID.
    pub fn tick(&mut self, now: Instant) -> Vec<AnimatedValue> {
        let config = &self.config;
        let mut values: Vec<AnimatedValue> = self
            .entries
            .iter_mut()
            .map(|(source_id, entry)| {
                entry.advance(now);
                Self::reconcile_pulse(config, source_id, entry);
                entry.snapshot(source_id)
            })
            .collect();
        values.sort_by(|a, b| a.source_id.cmp(&b.source_id));
        values
    }

    /// Last computed state of a value.
    pub fn snapshot(&self, source_id: &SourceId) -> Option<AnimatedValue> {
        self.entries.get(source_id).map(|entry| entry.snapshot(source_id))
    }

    /// Pulse scale updates for a value, while it is pulsing.
    pub fn subscribe_pulse(&self, source_id: &SourceId) -> Option<watch::Receiver<f64>> {
        self.entries
            .get(source_id)
            .and_then(|entry| entry.pulse.as_ref())
            .map(PulseHandle::subscribe)
    }

    /// Whether any fill tween is still running.
    pub fn is_animating(&self) -> bool {
        self.entries.values().any(|entry| entry.tween.is_some())
    }

    /// Number of running pulse loops.
    pub fn active_pulses(&self) -> usize {
        self.entries.values().filter(|entry| entry.pulse.is_some()).count()
    }

    /// Number of mounted values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is mounted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn reconcile_pulse(config: &AnimationConfig, source_id: &SourceId, entry: &mut Entry) {
        let critical = entry.tier == Tier::Critical;
        match (critical, entry.pulse.is_some()) {
            (true, false) => {
                info!("Pulse started for '{}' at {:.1}%", source_id, entry.target);
                entry.pulse = Some(PulseHandle::start(
                    source_id,
                    config.pulse_period,
                    config.pulse_peak_scale,
                    config.frame_interval,
                ));
            }
            (false, true) => {
                info!("Pulse stopped for '{}' (tier {})", source_id, entry.tier);
                entry.pulse = None;
            }
            _ => {}
        }
    }
}

impl Default for AnimationController {
    fn default() -> Self {
        Self::new(AnimationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn test_bar_reaches_target_in_800ms() {
        let mut controller = AnimationController::default();
        let t0 = Instant::now();
        controller.set_target("Groceries", 73.0, t0);

        let mid = controller.tick(t0 + ms(400));
        assert!(mid[0].displayed_percent > 0.0 && mid[0].displayed_percent < 73.0);
        assert!(controller.is_animating());

        let done = controller.tick(t0 + ms(800));
        assert_eq!(done[0].displayed_percent, 73.0);
        assert_eq!(done[0].tier, Tier::Normal);
        assert!(!controller.is_animating());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ring_takes_1000ms() {
        let mut controller = AnimationController::default();
        let t0 = Instant::now();
        controller.mount("xp", FillKind::Ring);
        controller.set_target("xp", 64.0, t0);

        let at_bar_end = controller.tick(t0 + ms(800));
        assert!(at_bar_end[0].displayed_percent < 64.0);
        let at_ring_end = controller.tick(t0 + ms(1000));
        assert_eq!(at_ring_end[0].displayed_percent, 64.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_target_does_not_restart() {
        let mut controller = AnimationController::default();
        let t0 = Instant::now();
        controller.set_target("Dining", 60.0, t0);
        let before = controller.tick(t0 + ms(400))[0].displayed_percent;

        let again = controller.set_target("Dining", 60.0, t0 + ms(400));
        assert_eq!(again.displayed_percent, before);

        // Still on the original schedule
        let done = controller.tick(t0 + ms(800));
        assert_eq!(done[0].displayed_percent, 60.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retarget_is_continuous() {
        let mut controller = AnimationController::default();
        let t0 = Instant::now();
        controller.set_target("Dining", 80.0, t0);
        let shown = controller.tick(t0 + ms(300))[0].displayed_percent;

        let retargeted = controller.set_target("Dining", 20.0, t0 + ms(300));
        assert_eq!(retargeted.displayed_percent, shown);

        let mut last = shown;
        for step in 1..=16 {
            let value = controller.tick(t0 + ms(300 + step * 50))[0].displayed_percent;
            assert!(value <= last && value >= 20.0);
            last = value;
        }
        assert_eq!(last, 20.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pulse_follows_critical_tier() {
        let mut controller = AnimationController::default();
        let t0 = Instant::now();

        let value = controller.set_target("Subscriptions", 100.0, t0);
        assert!(value.is_pulsing);
        assert_eq!(value.tier, Tier::Critical);
        assert_eq!(controller.active_pulses(), 1);

        let mut rx = controller.subscribe_pulse(&"Subscriptions".into()).unwrap();

        let value = controller.set_target("Subscriptions", 50.0, t0 + ms(100));
        assert!(!value.is_pulsing);
        assert_eq!(value.pulse_scale, 1.0);
        assert_eq!(controller.active_pulses(), 0);

        let closed = tokio::time::timeout(Duration::from_secs(5), async {
            while rx.changed().await.is_ok() {}
        })
        .await;
        assert!(closed.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pulse_stops_within_one_tick() {
        let mut controller = AnimationController::default();
        let t0 = Instant::now();
        controller.set_target("Groceries", 95.0, t0);
        controller.set_target("Groceries", 89.0, t0 + ms(10));

        let values = controller.tick(t0 + ms(20));
        assert!(!values[0].is_pulsing);
        assert_eq!(values[0].tier, Tier::Warning);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pulse_scale_reaches_render_layer() {
        let mut controller = AnimationController::default();
        let t0 = Instant::now();
        controller.set_target("Groceries", 92.0, t0);

        tokio::time::sleep(ms(250)).await;
        let values = controller.tick(Instant::now());
        assert!(values[0].is_pulsing);
        assert!(values[0].pulse_scale > 1.0 && values[0].pulse_scale <= 1.05);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_cancels_pulse() {
        let mut controller = AnimationController::default();
        let t0 = Instant::now();
        let id: SourceId = "Groceries".into();
        controller.set_target(id.clone(), 99.0, t0);
        let mut rx = controller.subscribe_pulse(&id).unwrap();

        assert!(controller.unmount(&id));
        assert!(!controller.unmount(&id));
        assert!(controller.is_empty());

        let closed = tokio::time::timeout(Duration::from_secs(5), async {
            while rx.changed().await.is_ok() {}
        })
        .await;
        assert!(closed.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_values_are_isolated() {
        let mut controller = AnimationController::default();
        let t0 = Instant::now();
        controller.set_target("a", 95.0, t0);
        controller.set_target("b", 30.0, t0 + ms(400));

        let values = controller.tick(t0 + ms(800));
        assert_eq!(values[0].source_id.as_str(), "a");
        assert_eq!(values[0].displayed_percent, 95.0);
        assert!(values[0].is_pulsing);
        assert!(values[1].displayed_percent < 30.0);
        assert!(!values[1].is_pulsing);
        assert_eq!(controller.active_pulses(), 1);
    }

    #[test]
    fn test_mount_is_idempotent() {
        let mut controller = AnimationController::default();
        assert!(controller.mount("a", FillKind::Bar));
        assert!(!controller.mount("a", FillKind::Ring));
        assert_eq!(controller.len(), 1);
        let value = controller.snapshot(&"a".into()).unwrap();
        assert_eq!(value.displayed_percent, 0.0);
        assert!(!value.is_pulsing);
    }

    #[test]
    fn test_targets_are_clamped() {
        let mut controller = AnimationController::default();
        let t0 = Instant::now();
        assert_eq!(controller.set_target("a", 140.0, t0).target_percent, 100.0);
        assert_eq!(controller.set_target("b", -3.0, t0).target_percent, 0.0);
        assert_eq!(controller.set_target("c", f64::NAN, t0).target_percent, 0.0);

        // No runtime here: the critical value is flagged but its scale never moves
        let critical = controller.snapshot(&"a".into()).unwrap();
        assert_eq!(critical.tier, Tier::Critical);
        assert!(critical.is_pulsing);
        assert_eq!(critical.pulse_scale, 1.0);
        assert!(!controller.snapshot(&"b".into()).unwrap().is_pulsing);
    }
}

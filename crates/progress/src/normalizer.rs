//! Value/target to percentage conversion.
//!
//! This is a display path: bad input never errors, it yields 0% and an
//! `invalid` flag.

use mastery_core::{NormalizedProgress, ProgressSource};
use tracing::warn;

use crate::tier::classify;

/// Result of normalizing one (current, target) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalized {
    /// Percentage clamped to 0-100
    pub percent: f64,

    /// Unclamped current / target, 0 when invalid
    pub raw_ratio: f64,

    /// False when target <= 0 or either input is non-finite
    pub valid: bool,
}

impl Normalized {
    const INVALID: Normalized = Normalized {
        percent: 0.0,
        raw_ratio: 0.0,
        valid: false,
    };
}

/// Convert `current` out of `target` into a percentage in `[0, 100]`.
pub fn normalize(current: f64, target: f64) -> Normalized {
    if !current.is_finite() || !target.is_finite() || target <= 0.0 {
        return Normalized::INVALID;
    }

    let raw_ratio = current / target;
    if !raw_ratio.is_finite() {
        // Only reachable with subnormal targets
        return Normalized::INVALID;
    }

    Normalized {
        percent: (raw_ratio * 100.0).clamp(0.0, 100.0),
        raw_ratio,
        valid: true,
    }
}

/// Normalize a source and classify its tier.
pub fn normalize_source(source: &ProgressSource) -> NormalizedProgress {
    let normalized = normalize(source.current_value, source.target_value);
    if !normalized.valid {
        warn!(
            "Invalid progress source '{}' (current {}, target {}), showing 0%",
            source.id, source.current_value, source.target_value
        );
    }

    NormalizedProgress {
        source_id: source.id.clone(),
        percent: normalized.percent,
        raw_ratio: normalized.raw_ratio,
        tier: classify(normalized.percent),
        valid: normalized.valid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mastery_core::Tier;

    #[test]
    fn test_normalize_in_range() {
        let targets = [0.01, 1.0, 80.0, 300.0, 1e9];
        let currents = [-1e6, -1.0, 0.0, 0.5, 220.0, 300.0, 1e12];
        for &target in &targets {
            for &current in &currents {
                let n = normalize(current, target);
                assert!(n.valid);
                assert!((0.0..=100.0).contains(&n.percent), "{current}/{target} -> {}", n.percent);
            }
        }
    }

    #[test]
    fn test_non_positive_target_is_invalid() {
        for target in [0.0, -5.0] {
            let n = normalize(220.0, target);
            assert_eq!(n.percent, 0.0);
            assert!(!n.valid);
        }
    }

    #[test]
    fn test_non_finite_inputs_are_invalid() {
        assert!(!normalize(f64::NAN, 100.0).valid);
        assert!(!normalize(10.0, f64::INFINITY).valid);
        assert!(!normalize(f64::NEG_INFINITY, 100.0).valid);
        assert_eq!(normalize(f64::NAN, 100.0).percent, 0.0);
    }

    #[test]
    fn test_over_achievement_keeps_raw_ratio() {
        let n = normalize(450.0, 300.0);
        assert_eq!(n.percent, 100.0);
        assert!((n.raw_ratio - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_budget_scenario() {
        let progress = normalize_source(&ProgressSource::new("Groceries", 220.0, 300.0));
        assert!((progress.percent - 73.333).abs() < 0.001);
        assert_eq!(progress.display_percent(), 73);
        assert_eq!(progress.tier, Tier::Normal);
        assert!(progress.valid);
    }

    #[test]
    fn test_invalid_source_is_flagged() {
        let progress = normalize_source(&ProgressSource::new("Broken", 50.0, 0.0));
        assert_eq!(progress.percent, 0.0);
        assert_eq!(progress.tier, Tier::Success);
        assert!(!progress.valid);
    }
}

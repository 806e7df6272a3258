//! Percentage to tier classification.

use mastery_core::Tier;
use serde::{Deserialize, Serialize};

/// Lower bounds, highest first. Order matters: a lower bound must never be
/// tested before a higher one.
const TIER_THRESHOLDS: [(f64, Tier); 3] = [
    (90.0, Tier::Critical),
    (75.0, Tier::Warning),
    (50.0, Tier::Normal),
];

/// Map a percentage to its tier. Lower bounds are inclusive.
pub fn classify(percent: f64) -> Tier {
    TIER_THRESHOLDS
        .iter()
        .find(|(bound, _)| percent >= *bound)
        .map(|(_, tier)| *tier)
        .unwrap_or(Tier::Success)
}

/// Standing of a savings goal, where a higher percentage is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GoalStanding {
    /// Below 50%
    Behind,
    /// 50% up to 75%
    Halfway,
    /// 75% up to 100%
    OnTrack,
    /// Goal met or exceeded
    Completed,
}

impl GoalStanding {
    /// Classify an unclamped percentage (`raw_ratio * 100`).
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 100.0 {
            GoalStanding::Completed
        } else if percent >= 75.0 {
            GoalStanding::OnTrack
        } else if percent >= 50.0 {
            GoalStanding::Halfway
        } else {
            GoalStanding::Behind
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStanding::Behind => "behind",
            GoalStanding::Halfway => "halfway",
            GoalStanding::OnTrack => "on-track",
            GoalStanding::Completed => "completed",
        }
    }
}

impl std::fmt::Display for GoalStanding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(100.0), Tier::Critical);
        assert_eq!(classify(90.0), Tier::Critical);
        assert_eq!(classify(89.999), Tier::Warning);
        assert_eq!(classify(75.0), Tier::Warning);
        assert_eq!(classify(74.999), Tier::Normal);
        assert_eq!(classify(50.0), Tier::Normal);
        assert_eq!(classify(49.999), Tier::Success);
        assert_eq!(classify(0.0), Tier::Success);
    }

    #[test]
    fn test_classify_nan_is_success() {
        assert_eq!(classify(f64::NAN), Tier::Success);
    }

    #[test]
    fn test_classify_is_monotonic() {
        let mut last = Tier::Success;
        for step in 0..=1000 {
            let tier = classify(step as f64 / 10.0);
            assert!(tier >= last);
            last = tier;
        }
    }

    #[test]
    fn test_goal_standing() {
        assert_eq!(GoalStanding::from_percent(150.0), GoalStanding::Completed);
        assert_eq!(GoalStanding::from_percent(100.0), GoalStanding::Completed);
        assert_eq!(GoalStanding::from_percent(99.9), GoalStanding::OnTrack);
        assert_eq!(GoalStanding::from_percent(50.0), GoalStanding::Halfway);
        assert_eq!(GoalStanding::from_percent(10.0), GoalStanding::Behind);
        assert_eq!(GoalStanding::OnTrack.to_string(), "on-track");
    }
}

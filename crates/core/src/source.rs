//! Progress sources and their normalized form.

use serde::{Deserialize, Serialize};
use crate::id::SourceId;

/// A (current, target) pair representing one trackable goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSource {
    /// Unique identifier
    pub id: SourceId,

    /// Amount achieved so far (spent, earned, saved)
    pub current_value: f64,

    /// Value that counts as 100%; must be > 0 to be valid
    pub target_value: f64,
}

impl ProgressSource {
    /// Create a new progress source.
    pub fn new(id: impl Into<SourceId>, current_value: f64, target_value: f64) -> Self {
        Self {
            id: id.into(),
            current_value,
            target_value,
        }
    }

    /// The zero-valued source shown when remote data could not be loaded.
    pub fn fallback(id: impl Into<SourceId>) -> Self {
        Self::new(id, 0.0, 100.0)
    }

    /// Whether both values are finite and the target is positive.
    pub fn is_valid(&self) -> bool {
        self.current_value.is_finite() && self.target_value.is_finite() && self.target_value > 0.0
    }
}

/// Discrete severity bucket derived from a percentage.
///
/// Variants are declared in ascending severity so `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Below 50%
    Success,
    /// 50% up to 75%
    Normal,
    /// 75% up to 90%
    Warning,
    /// 90% and above
    Critical,
}

impl Tier {
    /// All tiers in ascending severity.
    pub const ALL: [Tier; 4] = [Tier::Success, Tier::Normal, Tier::Warning, Tier::Critical];

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Success => "success",
            Tier::Normal => "normal",
            Tier::Warning => "warning",
            Tier::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress derived from a [`ProgressSource`]. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedProgress {
    /// Source this was derived from
    pub source_id: SourceId,

    /// Display percentage, clamped to 0-100
    pub percent: f64,

    /// Unclamped current / target (0 when invalid)
    pub raw_ratio: f64,

    /// Severity tier of `percent`
    pub tier: Tier,

    /// False when the source had a non-positive target or non-finite input
    pub valid: bool,
}

impl NormalizedProgress {
    /// Percentage rounded to a whole number for labels ("73% used").
    pub fn display_percent(&self) -> u8 {
        self.percent.round().clamp(0.0, 100.0) as u8
    }

    /// Whether the "limit" marker should be shown next to the bar.
    pub fn shows_limit_warning(&self) -> bool {
        self.tier == Tier::Critical
    }

    /// Whether the goal has been met or exceeded.
    pub fn goal_completed(&self) -> bool {
        self.valid && self.raw_ratio >= 1.0
    }
}

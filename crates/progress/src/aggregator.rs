//! Compound progress for multi-source widgets.
//!
//! This module provides:
//! - Per-category budget normalization and an overall health summary
//! - Crypto savings goal progress from USD, a BTC goal and a live price
//! - XP ring progress

use mastery_core::{
    FetchError, FetchState, NormalizedProgress, PriceQuote, ProgressSource, SourceId, Tier,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::error::ProgressError;
use crate::normalizer::normalize_source;
use crate::tier::GoalStanding;

/// Source ID used for the crypto savings goal.
pub const CRYPTO_GOAL_ID: &str = "crypto-goal";

/// Normalize each budget category against its own limit.
pub fn aggregate_budgets(sources: &[ProgressSource]) -> Vec<NormalizedProgress> {
    sources.iter().map(normalize_source).collect()
}

/// Overall health across budget categories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetHealth {
    /// Number of categories
    pub total: usize,
    /// Most severe tier; `None` when there are no categories
    pub worst_tier: Option<Tier>,
    /// Categories by tier
    pub by_tier: HashMap<Tier, usize>,
    /// Categories at or past their limit
    pub over_limit: usize,
    /// Categories with an unusable limit
    pub invalid: usize,
}

impl BudgetHealth {
    /// Number of categories in `tier`.
    pub fn count(&self, tier: Tier) -> usize {
        self.by_tier.get(&tier).copied().unwrap_or(0)
    }
}

/// Summarize normalized budget categories.
pub fn budget_health(progress: &[NormalizedProgress]) -> BudgetHealth {
    let mut health = BudgetHealth {
        total: progress.len(),
        ..Default::default()
    };

    for item in progress {
        *health.by_tier.entry(item.tier).or_insert(0) += 1;
        if item.goal_completed() {
            health.over_limit += 1;
        }
        if !item.valid {
            health.invalid += 1;
        }
        health.worst_tier = health.worst_tier.max(Some(item.tier));
    }

    health
}

/// Progress toward a BTC savings goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoProgress {
    /// USD saved converted at the live price
    pub btc_saved: f64,
    /// Goal in BTC
    pub btc_goal: f64,
    /// Normalized progress of `btc_saved` toward `btc_goal`
    pub progress: NormalizedProgress,
    /// Goal standing from the unclamped ratio
    pub standing: GoalStanding,
}

impl CryptoProgress {
    /// Clamped display percentage.
    pub fn percent(&self) -> f64 {
        self.progress.percent
    }

    /// Zero progress used when the price is unavailable.
    fn fallback(btc_goal: f64) -> Self {
        Self {
            btc_saved: 0.0,
            btc_goal,
            progress: normalize_source(&ProgressSource::fallback(CRYPTO_GOAL_ID)),
            standing: GoalStanding::Behind,
        }
    }
}

/// Convert USD saved into BTC at `usd_per_btc` and measure it against the goal.
pub fn compute_crypto_progress(
    usd_saved: f64,
    btc_goal: f64,
    usd_per_btc: f64,
) -> Result<CryptoProgress, ProgressError> {
    if !usd_saved.is_finite() {
        return Err(ProgressError::NonFinite("usd_saved"));
    }
    if !btc_goal.is_finite() {
        return Err(ProgressError::NonFinite("btc_goal"));
    }
    if !usd_per_btc.is_finite() || usd_per_btc <= 0.0 {
        return Err(ProgressError::InvalidPrice(usd_per_btc));
    }

    let btc_saved = usd_saved / usd_per_btc;
    let progress = normalize_source(&ProgressSource::new(CRYPTO_GOAL_ID, btc_saved, btc_goal));
    let standing = GoalStanding::from_percent(progress.raw_ratio * 100.0);

    debug!(
        "Crypto goal: {:.8} BTC of {} ({:.2}%)",
        btc_saved, btc_goal, progress.percent
    );

    Ok(CryptoProgress {
        btc_saved,
        btc_goal,
        progress,
        standing,
    })
}

/// Crypto goal widget state fed by the live price binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoGoalView {
    /// Computed progress; zero fallback when unavailable
    pub progress: CryptoProgress,
    /// Price used, if one was available
    pub usd_per_btc: Option<f64>,
    /// Set when the feed failed or the inputs were rejected
    pub error: Option<FetchError>,
    /// Set while the price is still loading
    pub loading: bool,
}

/// Compute the crypto goal from whatever state the price feed is in.
///
/// An unavailable feed is not an error here: the view falls back to zero
/// and carries the failure for the render layer to label.
pub fn crypto_progress_from_feed(
    usd_saved: f64,
    btc_goal: f64,
    price: &FetchState<PriceQuote>,
) -> CryptoGoalView {
    match price {
        FetchState::Ready(quote) => {
            match compute_crypto_progress(usd_saved, btc_goal, quote.usd_per_btc) {
                Ok(progress) => CryptoGoalView {
                    progress,
                    usd_per_btc: Some(quote.usd_per_btc),
                    error: None,
                    loading: false,
                },
                Err(e) => CryptoGoalView {
                    progress: CryptoProgress::fallback(btc_goal),
                    usd_per_btc: Some(quote.usd_per_btc),
                    error: Some(FetchError { kind: e.kind(), message: e.to_string() }),
                    loading: false,
                },
            }
        }
        FetchState::Failed(err) => CryptoGoalView {
            progress: CryptoProgress::fallback(btc_goal),
            usd_per_btc: None,
            error: Some(err.clone()),
            loading: false,
        },
        FetchState::Idle | FetchState::Loading => CryptoGoalView {
            progress: CryptoProgress::fallback(btc_goal),
            usd_per_btc: None,
            error: None,
            loading: true,
        },
    }
}

/// XP ring state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpProgress {
    /// Current level
    pub level: u32,
    /// Ring caption
    pub title: String,
    /// Ring fill
    pub progress: NormalizedProgress,
}

/// Progress of `xp` toward the level cap `max_xp`.
pub fn xp_progress(xp: f64, max_xp: f64, level: u32) -> XpProgress {
    let id = SourceId::new(format!("xp-level-{}", level));
    XpProgress {
        level,
        title: format!("Lvl {}", level),
        progress: normalize_source(&ProgressSource::new(id, xp, max_xp)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sources() -> Vec<ProgressSource> {
        vec![
            ProgressSource::new("Groceries", 220.0, 300.0),
            ProgressSource::new("Dining", 90.0, 150.0),
            ProgressSource::new("Subscriptions", 80.0, 80.0),
            ProgressSource::new("Travel", 10.0, 200.0),
        ]
    }

    #[test]
    fn test_aggregate_budgets_is_per_category() {
        let progress = aggregate_budgets(&sample_sources());
        assert_eq!(progress.len(), 4);
        assert_eq!(progress[0].tier, Tier::Normal);
        assert_eq!(progress[1].percent, 60.0);
        assert_eq!(progress[2].percent, 100.0);
        assert_eq!(progress[2].tier, Tier::Critical);
        assert_eq!(progress[3].tier, Tier::Success);
    }

    #[test]
    fn test_budget_health_summary() {
        let mut sources = sample_sources();
        sources.push(ProgressSource::new("Broken", 5.0, 0.0));
        let health = budget_health(&aggregate_budgets(&sources));

        assert_eq!(health.total, 5);
        assert_eq!(health.worst_tier, Some(Tier::Critical));
        assert_eq!(health.count(Tier::Normal), 2);
        assert_eq!(health.count(Tier::Critical), 1);
        assert_eq!(health.count(Tier::Success), 2);
        assert_eq!(health.count(Tier::Warning), 0);
        assert_eq!(health.over_limit, 1);
        assert_eq!(health.invalid, 1);
    }

    #[test]
    fn test_budget_health_empty() {
        let health = budget_health(&[]);
        assert_eq!(health.total, 0);
        assert!(health.worst_tier.is_none());
    }

    #[test]
    fn test_crypto_scenario() {
        let result = compute_crypto_progress(50.0, 0.01, 50_000.0).unwrap();
        assert!((result.btc_saved - 0.001).abs() < 1e-12);
        assert!((result.percent() - 10.0).abs() < 1e-9);
        assert_eq!(result.progress.tier, Tier::Success);
        assert_eq!(result.standing, GoalStanding::Behind);
    }

    #[test]
    fn test_crypto_rejects_bad_price() {
        assert_eq!(
            compute_crypto_progress(50.0, 0.01, 0.0),
            Err(ProgressError::InvalidPrice(0.0))
        );
        assert!(matches!(
            compute_crypto_progress(50.0, 0.01, -1.0),
            Err(ProgressError::InvalidPrice(_))
        ));
        assert!(matches!(
            compute_crypto_progress(f64::NAN, 0.01, 50_000.0),
            Err(ProgressError::NonFinite("usd_saved"))
        ));
        assert!(matches!(
            compute_crypto_progress(50.0, 0.01, f64::NAN),
            Err(ProgressError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_crypto_goal_exceeded_keeps_raw_ratio() {
        let result = compute_crypto_progress(1_500.0, 0.01, 50_000.0).unwrap();
        assert_eq!(result.percent(), 100.0);
        assert!((result.progress.raw_ratio - 3.0).abs() < 1e-9);
        assert_eq!(result.standing, GoalStanding::Completed);
        assert!(result.progress.goal_completed());
    }

    #[test]
    fn test_crypto_from_failed_feed_falls_back() {
        let state = FetchState::Failed(FetchError::network("connection refused"));
        let view = crypto_progress_from_feed(50.0, 0.01, &state);
        assert_eq!(view.progress.percent(), 0.0);
        assert_eq!(view.progress.progress.tier, Tier::Success);
        assert!(view.error.is_some());
        assert!(!view.loading);
    }

    #[test]
    fn test_crypto_from_loading_feed() {
        let view = crypto_progress_from_feed(50.0, 0.01, &FetchState::Loading);
        assert!(view.loading);
        assert!(view.error.is_none());
        assert!(view.usd_per_btc.is_none());
    }

    #[test]
    fn test_crypto_from_ready_feed() {
        let state = FetchState::Ready(PriceQuote { usd_per_btc: 50_000.0 });
        let view = crypto_progress_from_feed(50.0, 0.01, &state);
        assert!((view.progress.percent() - 10.0).abs() < 1e-9);
        assert_eq!(view.usd_per_btc, Some(50_000.0));
        assert!(view.error.is_none());
    }

    #[test]
    fn test_xp_ring() {
        let xp = xp_progress(320.0, 500.0, 3);
        assert_eq!(xp.title, "Lvl 3");
        assert_eq!(xp.progress.display_percent(), 64);

        let capped = xp_progress(900.0, 500.0, 3);
        assert_eq!(capped.progress.percent, 100.0);
    }
}

//! Validated payloads received from remote endpoints.

use serde::{Deserialize, Serialize};
use crate::fetch_state::IntoProgressSource;
use crate::id::SourceId;
use crate::source::ProgressSource;

/// Budget usage for one category, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    /// Category name
    pub category: String,

    /// Percentage of the limit used
    pub percent: f64,
}

impl IntoProgressSource for BudgetStatus {
    fn to_progress_source(&self, id: &SourceId) -> ProgressSource {
        ProgressSource::new(id.clone(), self.percent, 100.0)
    }
}

/// Live bitcoin price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// USD per BTC; always > 0 once validated
    pub usd_per_btc: f64,
}

/// Server-side evaluation of a crypto savings goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoChallengeResult {
    /// BTC equivalent of the USD saved
    pub btc_saved: f64,

    /// BTC goal
    pub btc_goal: f64,

    /// Percentage as computed by the server (may exceed 100)
    pub percent: f64,
}

impl IntoProgressSource for CryptoChallengeResult {
    fn to_progress_source(&self, id: &SourceId) -> ProgressSource {
        ProgressSource::new(id.clone(), self.btc_saved, self.btc_goal)
    }
}

/// A finance news headline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Headline
    pub title: String,

    /// Link to the full article
    pub url: String,
}

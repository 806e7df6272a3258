//! Progress normalization (Layer 2)
//!
//! Percentages, severity tiers, and compound goal summaries.

#![warn(missing_docs)]

pub mod normalizer;
pub mod tier;
pub mod aggregator;
pub mod budget;
pub mod view;
mod error;

pub use normalizer::{normalize, normalize_source, Normalized};
pub use tier::{classify, GoalStanding};
pub use aggregator::{
    aggregate_budgets, budget_health, compute_crypto_progress, crypto_progress_from_feed,
    xp_progress, BudgetHealth, CRYPTO_GOAL_ID, CryptoGoalView, CryptoProgress, XpProgress,
};
pub use budget::{BudgetBook, BudgetCategory};
pub use view::progress_view;
pub use error::ProgressError;

//! Budget categories with editable limits.

use mastery_core::{NormalizedProgress, ProgressSource};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregator::{aggregate_budgets, budget_health, BudgetHealth};
use crate::error::ProgressError;
use crate::normalizer::normalize_source;

/// One spending category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCategory {
    /// Category name, unique within a book
    pub name: String,
    /// Spending limit
    pub limit: f64,
    /// Amount spent so far
    pub spent: f64,
}

impl BudgetCategory {
    /// Progress source for this category.
    pub fn source(&self) -> ProgressSource {
        ProgressSource::new(self.name.as_str(), self.spent, self.limit)
    }
}

/// The user's budget categories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetBook {
    categories: Vec<BudgetCategory>,
}

impl BudgetBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// The starter categories new users see.
    pub fn starter() -> Self {
        let mut book = Self::new();
        book.upsert("Groceries", 300.0, 220.0);
        book.upsert("Dining", 150.0, 90.0);
        book.upsert("Subscriptions", 80.0, 80.0);
        book
    }

    /// Add a category, or replace the one with the same name.
    pub fn upsert(&mut self, name: impl Into<String>, limit: f64, spent: f64) {
        let name = name.into();
        match self.categories.iter_mut().find(|c| c.name == name) {
            Some(existing) => {
                existing.limit = limit;
                existing.spent = spent;
            }
            None => self.categories.push(BudgetCategory { name, limit, spent }),
        }
    }

    /// Change a category's limit and return its recomputed progress.
    pub fn set_limit(&mut self, name: &str, limit: f64) -> Result<NormalizedProgress, ProgressError> {
        if !limit.is_finite() || limit <= 0.0 {
            return Err(ProgressError::InvalidLimit(limit));
        }

        let category = self
            .categories
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| ProgressError::UnknownCategory(name.to_string()))?;

        info!("Budget limit for '{}' changed {} -> {}", name, category.limit, limit);
        category.limit = limit;
        Ok(normalize_source(&category.source()))
    }

    /// Categories in insertion order.
    pub fn categories(&self) -> &[BudgetCategory] {
        &self.categories
    }

    /// Progress of every category.
    pub fn progress(&self) -> Vec<NormalizedProgress> {
        let sources: Vec<ProgressSource> = self.categories.iter().map(BudgetCategory::source).collect();
        aggregate_budgets(&sources)
    }

    /// Overall health summary.
    pub fn health(&self) -> BudgetHealth {
        budget_health(&self.progress())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mastery_core::Tier;

    #[test]
    fn test_starter_book() {
        let book = BudgetBook::starter();
        let progress = book.progress();
        assert_eq!(progress.len(), 3);
        assert_eq!(progress[0].display_percent(), 73);
        assert_eq!(progress[1].display_percent(), 60);
        assert_eq!(progress[2].display_percent(), 100);
        assert_eq!(book.health().worst_tier, Some(Tier::Critical));
    }

    #[test]
    fn test_set_limit_recomputes() {
        let mut book = BudgetBook::starter();
        let updated = book.set_limit("Subscriptions", 160.0).unwrap();
        assert_eq!(updated.percent, 50.0);
        assert_eq!(updated.tier, Tier::Normal);
        assert_eq!(book.categories()[2].limit, 160.0);
    }

    #[test]
    fn test_set_limit_rejects_bad_input() {
        let mut book = BudgetBook::starter();
        assert_eq!(book.set_limit("Dining", 0.0), Err(ProgressError::InvalidLimit(0.0)));
        assert!(matches!(book.set_limit("Dining", f64::NAN), Err(ProgressError::InvalidLimit(_))));
        assert_eq!(
            book.set_limit("Rent", 1200.0),
            Err(ProgressError::UnknownCategory("Rent".to_string()))
        );
        assert_eq!(book.categories()[1].limit, 150.0);
    }

    #[test]
    fn test_upsert_replaces_by_name() {
        let mut book = BudgetBook::new();
        book.upsert("Fuel", 100.0, 10.0);
        book.upsert("Fuel", 100.0, 95.0);
        assert_eq!(book.categories().len(), 1);
        assert_eq!(book.progress()[0].tier, Tier::Critical);
    }
}

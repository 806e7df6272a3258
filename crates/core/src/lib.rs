//! Money Mastery core data models.
//!
//! This crate defines the values that flow through the progress engine:
//! raw progress sources, their normalized and tiered form, remote fetch
//! states, and the engine configuration.

#![warn(missing_docs)]

// Identities
mod id;

// Progress values
mod source;

// Remote data
mod fetch_state;
mod payload;

// Settings
mod config;

// Re-exports
pub use id::*;

pub use source::{ProgressSource, NormalizedProgress, Tier};
pub use fetch_state::{FetchState, FetchError, FailureKind, ProgressView, IntoProgressSource};
pub use payload::{BudgetStatus, PriceQuote, CryptoChallengeResult, Article};
pub use config::{EngineConfig, ConfigError};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;

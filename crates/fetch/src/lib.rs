//! Remote data bindings (Layer 1)
//!
//! Fetches numeric payloads from the backend, validates them, and publishes
//! a [`FetchState`](mastery_core::FetchState) per binding.

#![warn(missing_docs)]

pub mod transport;
pub mod endpoint;
pub mod binding;
pub mod tips;

pub use transport::{HttpRequest, HttpTransport, Method, RawResponse, Transport};
pub use endpoint::{
    BudgetStatusEndpoint, BudgetStatusRequest, CryptoChallengeEndpoint, CryptoChallengeRequest,
    Endpoint, InsightsEndpoint, InsightsRequest, LivePriceEndpoint, NewsEndpoint,
};
pub use binding::{AsyncDataBinding, BindingHandle, TeardownGuard};
pub use tips::{first_tip, headlines, split_tips, DEFAULT_HEADLINES, NO_TIP};
